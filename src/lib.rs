//! **stylepatch** - Style-conditioned patch synthesis for LLM workflows
//!
//! Profiles a code corpus into a compact style fingerprint, compiles it with
//! a ticket and a bounded context excerpt into a generation request, and asks
//! a pluggable provider for a unified diff. The mimicness slider tunes the
//! result between "preserve the author's quirks" and "apply best practice".

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Core synthesis pipeline
pub mod core {
    /// Style fingerprint extraction over parsed source trees
    pub mod style;
    pub use style::{StyleProfile, analyze, run as analyze_run};

    /// Bounded context excerpts from ordered file sets
    pub mod context;
    pub use context::{FileSet, build_context};

    /// Generation request assembly (messages + mode)
    pub mod prompt;
    pub use prompt::{GenerationMode, Message, Role, build_prompt};

    /// Patch provider boundary and its implementations
    pub mod provider;
    pub use provider::{ChatOptions, PatchProvider, build_provider};

    /// End-to-end patch synthesis orchestrator
    pub mod synth;
    pub use synth::{PatchSynthesizer, demo_fileset, run as patch_run};

    /// Declarative known-bug pattern bank (optional pre-scan)
    pub mod bugbank;
    pub use bugbank::{BugRule, run as scan_run};
}

/// Language processing - per-file style tallies over tree-sitter ASTs
pub mod parsers {
    /// Python style tally (functions, docstrings, logger calls)
    pub mod python_style;
    pub use python_style::PythonStyle;

    /// Rust style tally (fn items, doc comments, log macros)
    pub mod rust_style;
    pub use rust_style::RustStyle;

    // Re-export the shared extractor interface
    pub use crate::core::style::{StyleExtractor, get_extractor};
}

/// Ingestion - archives, tickets, and commit history
pub mod ingest {
    /// Zip archive extraction with allow/deny filtering
    pub mod archive;
    pub use archive::{IngestPolicy, extract_zip};

    /// Ticket records, JSONL store, and demo fallback
    pub mod tickets;
    pub use tickets::{Ticket, TicketStore, run as tickets_run};

    /// Issue-tracker REST client (boundary collaborator)
    pub mod jira;
    pub use jira::JiraClient;

    /// Commit history exporter for training corpora
    pub mod git;
    pub use git::{CommitRecord, GitIngest, run as export_run};
}

/// HTTP service boundary (axum)
pub mod service;

/// Infrastructure - configuration, I/O, and walking
pub mod infra {
    /// Configuration management with TOML support
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Memory-mapped file I/O and lenient text decoding
    pub mod io;
    pub use io::{FileContent, decode_lossy, read_file_smart};

    /// Gitignore-aware directory walking
    pub mod walk;
    pub use walk::FileWalker;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use core::{FileSet, PatchSynthesizer, StyleProfile, build_context, build_prompt};
pub use infra::{Config, FileWalker, load_config};
pub use ingest::Ticket;
