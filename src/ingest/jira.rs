//! Issue-tracker REST client (boundary collaborator).
//!
//! Fetches one issue by key and maps it onto the explicit [`Ticket`]
//! record. Network and auth failures propagate unchanged; callers fall back
//! to the local store and then the demo ticket.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::debug;

use crate::infra::config::TrackerConfig;
use crate::ingest::tickets::Ticket;

#[derive(Debug, Deserialize)]
struct IssueResponse {
    key: String,
    fields: IssueFields,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct IssueFields {
    summary: Option<String>,
    // Rich-text descriptions arrive as structured documents; only plain
    // strings are carried through
    description: Option<serde_json::Value>,
}

/// Thin client for a Jira-style `/rest/api/3/issue/{key}` endpoint.
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    email: String,
    token: String,
}

impl JiraClient {
    /// Build from config. Returns `None` when no tracker base URL is set,
    /// which disables the remote lookup entirely.
    pub fn from_config(cfg: &TrackerConfig) -> Option<Self> {
        if cfg.base_url.trim().is_empty() {
            return None;
        }

        Some(Self {
            http: reqwest::Client::new(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            email: std::env::var(&cfg.email_env).unwrap_or_default(),
            token: std::env::var(&cfg.token_env).unwrap_or_default(),
        })
    }

    /// Fetch one issue. Any HTTP or decode failure is surfaced unchanged.
    pub async fn get_issue(&self, key: &str) -> Result<Ticket> {
        let url = format!("{}/rest/api/3/issue/{key}", self.base_url);
        debug!(%url, "fetching tracker issue");

        let resp = self
            .http
            .get(&url)
            .basic_auth(&self.email, Some(&self.token))
            .send()
            .await
            .context("tracker request failed")?;

        if !resp.status().is_success() {
            bail!("tracker returned {} for {key}", resp.status());
        }

        let issue: IssueResponse = resp.json().await.context("decode tracker issue")?;

        let description = match issue.fields.description {
            Some(serde_json::Value::String(s)) => s,
            _ => String::new(),
        };

        Ok(Ticket {
            key: issue.key,
            summary: issue.fields.summary.unwrap_or_else(|| "Untitled".to_string()),
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_base_url_disables_the_client() {
        let cfg = TrackerConfig {
            base_url: String::new(),
            email_env: "TRACKER_EMAIL".to_string(),
            token_env: "TRACKER_API_TOKEN".to_string(),
        };
        assert!(JiraClient::from_config(&cfg).is_none());
    }

    #[test]
    fn configured_base_url_enables_the_client() {
        let cfg = TrackerConfig {
            base_url: "https://example.atlassian.net/".to_string(),
            email_env: "TRACKER_EMAIL".to_string(),
            token_env: "TRACKER_API_TOKEN".to_string(),
        };
        let client = JiraClient::from_config(&cfg).expect("client");
        assert_eq!(client.base_url, "https://example.atlassian.net");
    }
}
