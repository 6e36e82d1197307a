//! Patch provider boundary.
//!
//! A provider turns an ordered message sequence into unified-diff text. The
//! variant is chosen at construction time via [`build_provider`]; callers
//! hold a `Box<dyn PatchProvider>` and never inspect the concrete type.
//!
//! Implementations must be stateless (pure functions of their inputs) so a
//! single instance can serve concurrent requests.

use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::core::prompt::{MODE_THRESHOLD, Message};
use crate::infra::config::ProviderConfig;

/// Explicit per-call options (no loosely-shaped kwargs).
#[derive(Debug, Clone)]
pub struct ChatOptions {
    /// Mimicness for bucket selection
    pub mimicness: f64,

    /// Ticket key for rule dispatch (matched case-insensitively)
    pub ticket_key: String,
}

/// Capability interface with one operation: messages in, diff text out.
pub trait PatchProvider: Send + Sync {
    /// Generate diff text for the given request.
    fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<String>;

    /// Short backend label for logs.
    fn name(&self) -> &'static str;
}

/// Construct the provider selected by `kind` ("canned" or "openai").
pub fn build_provider(kind: &str, cfg: &ProviderConfig) -> Result<Box<dyn PatchProvider>> {
    match kind {
        "canned" => Ok(Box::new(CannedProvider)),
        "openai" => Ok(Box::new(OpenAiProvider::new(cfg)?)),
        other => bail!("unknown provider kind: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Deterministic reference provider
// ---------------------------------------------------------------------------

// Canned edits for the demo pager module. The best-practice variant rewrites
// the loop and adds validation; the mimic variant keeps the original shape
// and only fixes the boundary.
const PAGER_BEST_PRACTICE: &str = "--- a/src/pager.py\n\
+++ b/src/pager.py\n\
@@ -1,7 +1,9 @@\n\
-class Pager:\n\
-    def page(self, items, size):\n\
-        pages = []\n\
-        for i in range(0, len(items)):\n\
-            if i % size == 0:\n\
-                pages.append(items[i:i+size])\n\
-        return pages\n\
+class Pager:\n\
+    def page(self, items, size):\n\
+        \"\"\"Split items into pages of given size.\"\"\"\n\
+        if size <= 0:\n\
+            raise ValueError(\"size must be > 0\")\n\
+        pages = []\n\
+        for i in range(0, len(items), size):\n\
+            pages.append(items[i:i+size])\n\
+        return pages\n";

const PAGER_FULL_MIMIC: &str = "--- a/src/pager.py\n\
+++ b/src/pager.py\n\
@@ -1,7 +1,7 @@\n\
 class Pager:\n\
-    def page(self, items, size):\n\
-        pages = []\n\
-        for i in range(0, len(items)):\n\
-            if i % size == 0:\n\
-                pages.append(items[i:i+size])\n\
-        return pages\n\
+    def page(self, items, size):\n\
+        # keep shape; fix boundary by stepping size\n\
+        pages = []\n\
+        for i in range(0, len(items), max(1, size)):\n\
+            pages.append(items[i:i+size])\n\
+        return pages\n";

// Canned edits for the demo exporter module: a start/done logging pair for
// the best-practice bucket, a terse count print for the mimic bucket.
const EXPORTER_BEST_PRACTICE: &str = "--- a/src/exporter.py\n\
+++ b/src/exporter.py\n\
@@ -1,4 +1,6 @@\n\
 class Exporter:\n\
     def run(self, items):\n\
+        print(\"export:start\", len(items))\n\
         for it in items:\n\
             self._send(it)\n\
+        print(\"export:done\")\n";

const EXPORTER_FULL_MIMIC: &str = "--- a/src/exporter.py\n\
+++ b/src/exporter.py\n\
@@ -1,4 +1,6 @@\n\
 class Exporter:\n\
     def run(self, items):\n\
+        # add simple progress logging\n\
+        print(len(items))\n\
         for it in items:\n\
             self._send(it)\n";

/// Deterministic reference provider.
///
/// Dispatches on the ticket key (case-insensitive) first, then buckets
/// mimicness at the shared 0.5 cutoff. Identical `(ticket_key, bucket)`
/// pairs always produce byte-identical diffs, and every rule falls back to
/// the default pager target, so this provider never fails.
pub struct CannedProvider;

impl PatchProvider for CannedProvider {
    fn chat(&self, _messages: &[Message], options: &ChatOptions) -> Result<String> {
        let mimic = options.mimicness >= MODE_THRESHOLD;
        let key = options.ticket_key.to_uppercase();

        debug!(key = %key, mimic, "canned provider dispatch");

        let diff = match key.as_str() {
            "WB-2" | "DEMO-2" => {
                if mimic {
                    EXPORTER_FULL_MIMIC
                } else {
                    EXPORTER_BEST_PRACTICE
                }
            }
            _ => {
                if mimic {
                    PAGER_FULL_MIMIC
                } else {
                    PAGER_BEST_PRACTICE
                }
            }
        };

        Ok(diff.to_string())
    }

    fn name(&self) -> &'static str {
        "canned"
    }
}

// ---------------------------------------------------------------------------
// Real backend (OpenAI-compatible chat completions)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Thin blocking client for an OpenAI-compatible `/v1/chat/completions`
/// endpoint. HTTP failures are surfaced unchanged; the caller decides what a
/// retry would mean.
pub struct OpenAiProvider {
    client: reqwest::blocking::Client,
    url_chat: String,
    model: String,
}

impl OpenAiProvider {
    /// Build the client from config. The API key is read from the
    /// environment variable named by `cfg.api_key_env`.
    pub fn new(cfg: &ProviderConfig) -> Result<Self> {
        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            bail!("invalid provider endpoint: {:?}", cfg.endpoint);
        }

        let api_key = std::env::var(&cfg.api_key_env)
            .with_context(|| format!("missing API key in ${}", cfg.api_key_env))?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&format!("Bearer {api_key}"))
                .context("invalid API key header")?,
        );
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .default_headers(headers)
            .build()
            .context("build HTTP client")?;

        let url_chat = format!("{}/v1/chat/completions", endpoint.trim_end_matches('/'));

        info!(model = %cfg.model, url = %url_chat, "OpenAI provider initialized");

        Ok(Self { client, url_chat, model: cfg.model.clone() })
    }
}

impl PatchProvider for OpenAiProvider {
    fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<String> {
        let started = Instant::now();
        let body = ChatCompletionRequest { model: &self.model, messages };

        debug!(
            key = %options.ticket_key,
            mu = options.mimicness,
            messages = messages.len(),
            "POST {}", self.url_chat
        );

        let resp = self
            .client
            .post(&self.url_chat)
            .json(&body)
            .send()
            .context("chat completion request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            let snippet: String = text.chars().take(200).collect();

            error!(%status, snippet = %snippet, "chat completion returned non-success status");
            bail!("chat completion failed with {status}: {snippet}");
        }

        let out: ChatCompletionResponse =
            resp.json().context("decode chat completion response")?;

        let content = out
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .ok_or_else(|| anyhow!("chat completion returned no choices"))?;

        info!(
            latency_ms = started.elapsed().as_millis() as u64,
            "chat completion finished"
        );

        Ok(content)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
