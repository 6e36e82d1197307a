//! HTTP service boundary.
//!
//! Exposes the synthesis pipeline to a browser UI and webhook callers. The
//! provider is constructed once at startup and injected into shared state;
//! handlers hold no mutable state, so requests are served concurrently
//! without coordination.

mod error;
mod routes;
mod webhook;

pub mod github;

pub use error::ApiError;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::cli::{ProviderArg, ServeArgs};
use crate::core::provider::build_provider;
use crate::core::synth::PatchSynthesizer;
use crate::infra::config::Config;

/// Shared application state; everything inside is read-only per request.
pub struct AppState {
    pub config: Config,
    pub synthesizer: PatchSynthesizer,
    pub webhook_secret: Option<String>,
}

/// Build the router over prepared state. Split out from [`start`] so tests
/// can drive it with `tower::ServiceExt::oneshot`.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/repo/demo", get(routes::repo_demo))
        .route("/api/tickets", get(routes::list_tickets))
        .route("/api/tickets/{key}", get(routes::get_ticket))
        .route("/api/patch", post(routes::propose_patch))
        .route("/api/patch-zip", post(routes::patch_zip))
        .route("/api/pr", post(routes::open_pr))
        .route("/webhooks/tracker", post(webhook::tracker_webhook))
        // Permissive CORS so a browser frontend can call us directly
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Assemble state from config and serve until ctrl-c.
pub async fn start(args: ServeArgs) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = crate::infra::config::load_config().unwrap_or_default();

    let kind = match args.provider {
        Some(ProviderArg::Canned) => "canned".to_string(),
        Some(ProviderArg::Openai) => "openai".to_string(),
        None => config.provider.kind.clone(),
    };
    let provider = build_provider(&kind, &config.provider)?;

    let synthesizer =
        PatchSynthesizer::new(provider, config.context.max_files, config.context.head_lines);

    let webhook_secret = std::env::var(&config.service.webhook_secret_env)
        .ok()
        .filter(|s| !s.is_empty());

    let address = args.address.unwrap_or_else(|| config.service.address.clone());

    let state = Arc::new(AppState { config, synthesizer, webhook_secret });

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("bind {address}"))?;

    info!(%address, provider = %kind, "service listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;

    Ok(())
}

/// Resolves when ctrl-c is pressed.
async fn shutdown_signal() {
    signal::ctrl_c()
        .await
        .expect("failed to listen for shutdown signal");
}
