//! Request handlers for the synthesis service.
//!
//! Handlers normalize loosely-shaped payloads into explicit records at the
//! boundary, then hand off to the core. Synthesis runs on the blocking pool
//! because the real provider backend uses a blocking HTTP client.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::core::context::FileSet;
use crate::core::synth::demo_fileset;
use crate::ingest::archive::{IngestPolicy, extract_zip};
use crate::ingest::jira::JiraClient;
use crate::ingest::tickets::{Ticket, TicketStore};
use crate::service::{ApiError, AppState, github};

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}

/// Tiny repo returned so a UI is not empty on first load.
pub async fn repo_demo() -> Json<FileSet> {
    Json(demo_fileset())
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

/// List tickets from the local store.
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Json<Vec<Ticket>> {
    let store = TicketStore::open(&state.config);
    Json(store.list(params.limit.unwrap_or(50)))
}

/// Fetch one ticket: tracker first (when configured), then the store, then
/// the fixed demo ticket. Tracker failures are logged and absorbed here;
/// this route exists to always give the UI something to render.
#[instrument(skip(state))]
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Json<Ticket> {
    if let Some(client) = JiraClient::from_config(&state.config.tracker) {
        match client.get_issue(&key).await {
            Ok(ticket) => return Json(ticket),
            Err(e) => warn!(error = %e, "tracker lookup failed; falling back"),
        }
    }

    let ticket = TicketStore::open(&state.config)
        .get(&key)
        .unwrap_or_else(|| Ticket::demo(&key));
    Json(ticket)
}

#[derive(Debug, Deserialize)]
pub struct PatchRequest {
    pub ticket: Option<Ticket>,

    pub files: Option<FileSet>,

    #[serde(alias = "mimicness")]
    pub mu: Option<f64>,
}

/// Synthesize a diff for a JSON payload; responds with plain diff text.
#[instrument(skip(state, req))]
pub async fn propose_patch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PatchRequest>,
) -> Result<String, ApiError> {
    let ticket = req.ticket.unwrap_or_default();
    let files = req.files.unwrap_or_default();
    let mu = req.mu.unwrap_or(state.config.synth.default_mimicness);

    run_synthesis(state, ticket, files, mu).await
}

#[derive(Debug, Serialize)]
pub struct PatchZipResponse {
    pub diff: String,
    pub files: FileSet,
}

/// Accept a zip upload plus ticket fields; respond with both the extracted
/// file set and the synthesized diff so the UI can display them together.
#[instrument(skip(state, multipart))]
pub async fn patch_zip(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<PatchZipResponse>, ApiError> {
    let mut archive: Option<Vec<u8>> = None;
    let mut ticket = Ticket { summary: "Upload".to_string(), ..Ticket::default() };
    let mut mu = state.config.synth.default_mimicness;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                archive = Some(bytes.to_vec());
            }
            "key" => ticket.key = text_field(field).await?,
            "title" => ticket.summary = text_field(field).await?,
            "description" => ticket.description = text_field(field).await?,
            "mu" => {
                let raw = text_field(field).await?;
                mu = raw.parse().unwrap_or(mu);
            }
            _ => {}
        }
    }

    let bytes = archive.ok_or_else(|| ApiError::BadRequest("missing file field".to_string()))?;
    let files = extract_zip(&bytes, &IngestPolicy::from_config(&state.config.ingest))?;

    let diff = run_synthesis(state, ticket, files.clone(), mu).await?;

    Ok(Json(PatchZipResponse { diff, files }))
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Hand off to the synthesizer on the blocking pool.
async fn run_synthesis(
    state: Arc<AppState>,
    ticket: Ticket,
    files: FileSet,
    mu: f64,
) -> Result<String, ApiError> {
    let diff = tokio::task::spawn_blocking(move || {
        state.synthesizer.synthesize(&ticket, &files, mu)
    })
    .await
    .map_err(anyhow::Error::from)??;

    Ok(diff)
}

/// Open a pull request via the configured remote API; remote failures pass
/// through unchanged.
#[instrument(skip(state, req), fields(owner = %req.owner, repo = %req.repo))]
pub async fn open_pr(
    State(state): State<Arc<AppState>>,
    Json(req): Json<github::OpenPrRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let meta = github::open_pr(&state.config.github, &req).await?;
    Ok(Json(meta))
}
