//! Pull-request opener (boundary collaborator).
//!
//! Posts to a GitHub-style pulls endpoint and returns the remote metadata
//! as-is. A non-success response becomes [`ApiError::Upstream`] carrying the
//! remote status and body unchanged; this module has no retry policy.

use anyhow::Context;
use reqwest::header;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::infra::config::GithubConfig;
use crate::service::ApiError;

#[derive(Debug, Deserialize)]
pub struct OpenPrRequest {
    pub owner: String,
    pub repo: String,
    pub head: String,
    pub base: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Open a pull request; returns the remote service's response body.
#[instrument(skip(cfg, req), fields(owner = %req.owner, repo = %req.repo))]
pub async fn open_pr(
    cfg: &GithubConfig,
    req: &OpenPrRequest,
) -> Result<serde_json::Value, ApiError> {
    let token = std::env::var(&cfg.token_env)
        .map_err(|_| ApiError::BadRequest(format!("missing token in ${}", cfg.token_env)))?;

    let url = format!(
        "{}/repos/{}/{}/pulls",
        cfg.api_base.trim_end_matches('/'),
        req.owner,
        req.repo
    );
    debug!(%url, "opening pull request");

    let resp = reqwest::Client::new()
        .post(&url)
        .bearer_auth(token)
        .header(header::ACCEPT, "application/vnd.github+json")
        .header(header::USER_AGENT, "stylepatch")
        .json(&json!({
            "title": req.title,
            "head": req.head,
            "base": req.base,
            "body": req.body,
        }))
        .send()
        .await
        .map_err(anyhow::Error::from)?;

    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();

    if !status.is_success() {
        // Surface the remote failure unchanged; no domain knowledge here
        // to decide a retry
        return Err(ApiError::Upstream { status: status.as_u16(), detail: text });
    }

    serde_json::from_str(&text)
        .context("decode pull-request response")
        .map_err(ApiError::Internal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_payload_deserializes_with_optional_body() {
        let req: OpenPrRequest = serde_json::from_str(
            r#"{"owner":"o","repo":"r","head":"fix/wb-1","base":"main","title":"Fix pager"}"#,
        )
        .unwrap();
        assert_eq!(req.base, "main");
        assert_eq!(req.body, "");
    }
}
