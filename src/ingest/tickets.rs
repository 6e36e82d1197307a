//! Ticket records and the local JSONL store.
//!
//! A ticket is an explicit record with defined defaults for missing fields,
//! validated once at the boundary; the core treats it as opaque input. The
//! store reads one JSON object per line and never fails on a missing file
//! or a malformed line.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, TicketsArgs};
use crate::infra::config::Config;

fn default_key() -> String {
    "WB-1".to_string()
}

fn default_summary() -> String {
    "Untitled".to_string()
}

/// Defect description sourced from a tracker, the local store, or direct
/// user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(default = "default_key")]
    pub key: String,

    /// Some payloads call this field "title"; accept both spellings
    #[serde(default = "default_summary", alias = "title")]
    pub summary: String,

    #[serde(default)]
    pub description: String,
}

impl Default for Ticket {
    /// Boundary defaults for absent fields.
    fn default() -> Self {
        Self {
            key: default_key(),
            summary: default_summary(),
            description: String::new(),
        }
    }
}

impl Ticket {
    /// Fixed demo ticket backing every fallback path.
    pub fn demo(key: &str) -> Self {
        Self {
            key: key.to_string(),
            summary: "Fix pagination".to_string(),
            description: "Boundary bug in Pager".to_string(),
        }
    }

    /// Single-string rendering used in the generation request.
    pub fn prompt_text(&self) -> String {
        format!("{}: {}\n{}", self.key, self.summary, self.description)
    }
}

/// JSONL-backed ticket store.
pub struct TicketStore {
    path: PathBuf,
}

impl TicketStore {
    pub fn open(config: &Config) -> Self {
        Self { path: PathBuf::from(&config.tickets.data_file) }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// List up to `limit` tickets in file order. A missing file yields an
    /// empty list; malformed lines are skipped.
    pub fn list(&self, limit: usize) -> Vec<Ticket> {
        read_jsonl(&self.path)
            .into_iter()
            .take(limit)
            .collect()
    }

    /// Find a ticket by exact key.
    pub fn get(&self, key: &str) -> Option<Ticket> {
        read_jsonl(&self.path).into_iter().find(|t| t.key == key)
    }
}

fn read_jsonl(path: &Path) -> Vec<Ticket> {
    let Ok(data) = std::fs::read_to_string(path) else {
        return Vec::new();
    };

    data.lines()
        .filter_map(|line| serde_json::from_str::<Ticket>(line).ok())
        .collect()
}

/// Public CLI entry point expected by the command layer.
pub fn run(args: TicketsArgs, ctx: &AppContext) -> Result<()> {
    let config = crate::infra::config::load_config().unwrap_or_default();
    let store = TicketStore::open(&config);

    if let Some(key) = &args.key {
        let (ticket, fell_back) = match store.get(key) {
            Some(t) => (t, false),
            None => (Ticket::demo(key), true),
        };

        if args.json {
            println!("{}", serde_json::to_string(&ticket).context("serialize ticket")?);
        } else {
            if fell_back && !ctx.quiet {
                eprintln!("(not in store; showing demo ticket)");
            }
            println!("{}: {}", ticket.key, ticket.summary);
            if !ticket.description.is_empty() {
                println!("{}", ticket.description);
            }
        }
        return Ok(());
    }

    let tickets = store.list(args.limit);

    if args.json {
        for t in &tickets {
            println!("{}", serde_json::to_string(t).context("serialize ticket")?);
        }
        return Ok(());
    }

    if tickets.is_empty() {
        if !ctx.quiet {
            println!("No tickets in {}", config.tickets.data_file);
        }
        return Ok(());
    }

    for t in &tickets {
        println!("{}: {}", t.key, t.summary);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_documented_defaults() {
        let t: Ticket = serde_json::from_str("{}").unwrap();
        assert_eq!(t.key, "WB-1");
        assert_eq!(t.summary, "Untitled");
        assert_eq!(t.description, "");
    }

    #[test]
    fn title_alias_maps_to_summary() {
        let t: Ticket = serde_json::from_str(r#"{"key":"WB-9","title":"Renamed"}"#).unwrap();
        assert_eq!(t.summary, "Renamed");
    }

    #[test]
    fn prompt_text_carries_key_summary_description() {
        let t = Ticket::demo("WB-1");
        assert_eq!(t.prompt_text(), "WB-1: Fix pagination\nBoundary bug in Pager");
    }

    #[test]
    fn missing_store_lists_nothing() {
        let store = TicketStore::at("/nonexistent/tickets.jsonl");
        assert!(store.list(10).is_empty());
        assert!(store.get("WB-1").is_none());
    }

    #[test]
    fn store_reads_jsonl_and_skips_bad_lines() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("tickets.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"key":"WB-1","summary":"First"}"#,
                "\n",
                "not json\n",
                r#"{"key":"WB-2","summary":"Second","description":"More"}"#,
                "\n",
            ),
        )?;

        let store = TicketStore::at(&path);
        let all = store.list(50);
        assert_eq!(all.len(), 2);
        assert_eq!(store.get("WB-2").unwrap().description, "More");
        Ok(())
    }

    #[test]
    fn list_respects_limit() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("tickets.jsonl");
        let lines: Vec<String> = (0..5)
            .map(|i| format!(r#"{{"key":"WB-{i}","summary":"T{i}"}}"#))
            .collect();
        std::fs::write(&path, lines.join("\n"))?;

        assert_eq!(TicketStore::at(&path).list(3).len(), 3);
        Ok(())
    }
}
