//! Generation request assembly.
//!
//! Compiles a ticket, a context excerpt, style tokens, and the mimicness
//! value into an ordered message sequence: one system message with the
//! generation mode, then one user message with the task. Backends must see
//! system guidance before task content, so the order is part of the
//! contract.
//!
//! Mimicness axis (pinned): 0 = maximal best-practice rewrite, 1 = maximal
//! style preservation. A single 0.5 cutoff selects the mode; the reference
//! provider buckets on the same constant so the label and the observable
//! behavior cannot disagree.

use serde::{Deserialize, Serialize};

/// Mimicness cutoff shared by the prompt mode and the reference provider.
pub const MODE_THRESHOLD: f64 = 0.5;

/// Chat role; serialized lowercase to match chat-completion wire formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// Discrete generation mode derived from mimicness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Rewrite toward general best practice
    BestPractice,
    /// Faithfully mimic the observed style
    FullMimic,
}

impl GenerationMode {
    /// Derive the mode from a mimicness value using the pinned cutoff.
    pub fn from_mimicness(mu: f64) -> Self {
        if mu < MODE_THRESHOLD {
            GenerationMode::BestPractice
        } else {
            GenerationMode::FullMimic
        }
    }

    /// Stable label used in the system message.
    pub fn label(self) -> &'static str {
        match self {
            GenerationMode::BestPractice => "BEST_PRACTICE",
            GenerationMode::FullMimic => "FULL_MIMIC",
        }
    }
}

/// Build the two-message generation request.
///
/// The system message carries the mode label, the mimicness rendered to two
/// decimals, and the comma-joined style tokens; the user message carries the
/// ticket text and the context excerpt behind a diff-only instruction.
pub fn build_prompt(
    ticket_text: &str,
    context: &str,
    style_tokens: &[String],
    mimicness: f64,
) -> Vec<Message> {
    let mode = GenerationMode::from_mimicness(mimicness);

    let header = format!(
        "You are stylepatch, generating a unified diff.\n\
         Mode: {} (mu={:.2}).\n\
         Style tokens: {}\n\
         Output ONLY a valid patch.",
        mode.label(),
        mimicness,
        style_tokens.join(", "),
    );

    vec![
        Message::system(header),
        Message::user(format!("Ticket: {ticket_text}\nContext:\n{context}\n")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> Vec<String> {
        vec!["avg_func_len=4.0".to_string(), "camel_ratio=0.00".to_string()]
    }

    #[test]
    fn low_mimicness_selects_best_practice() {
        assert_eq!(
            GenerationMode::from_mimicness(0.4),
            GenerationMode::BestPractice
        );
        assert_eq!(GenerationMode::from_mimicness(0.0), GenerationMode::BestPractice);
    }

    #[test]
    fn high_mimicness_selects_full_mimic() {
        assert_eq!(GenerationMode::from_mimicness(0.8), GenerationMode::FullMimic);
        // The cutoff itself belongs to the mimic branch
        assert_eq!(GenerationMode::from_mimicness(0.5), GenerationMode::FullMimic);
    }

    #[test]
    fn system_message_comes_first() {
        let msgs = build_prompt("WB-1: fix", "ctx", &tokens(), 0.4);
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, Role::System);
        assert_eq!(msgs[1].role, Role::User);
    }

    #[test]
    fn system_message_carries_mode_mu_and_tokens() {
        let msgs = build_prompt("t", "c", &tokens(), 0.4);
        let header = &msgs[0].content;

        assert!(header.contains("BEST_PRACTICE"));
        assert!(header.contains("mu=0.40"));
        assert!(header.contains("avg_func_len=4.0, camel_ratio=0.00"));
    }

    #[test]
    fn user_message_carries_ticket_and_context() {
        let msgs = build_prompt("WB-2: exporter", "### a.py\ncode", &tokens(), 0.9);
        let body = &msgs[1].content;

        assert!(body.starts_with("Ticket: WB-2: exporter"));
        assert!(body.contains("Context:\n### a.py\ncode"));
    }

    #[test]
    fn identical_inputs_render_identically() {
        let a = build_prompt("t", "c", &tokens(), 0.33);
        let b = build_prompt("t", "c", &tokens(), 0.33);
        assert_eq!(a, b);
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&Message::system("x")).unwrap();
        assert!(json.contains(r#""role":"system""#));
    }
}
