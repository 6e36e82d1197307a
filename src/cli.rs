use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

#[derive(Parser)]
#[command(name = "stylepatch")]
#[command(
    about = "Style-conditioned patch synthesis: ticket + code corpus in, unified diff out"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress progress bars and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show what would be done without executing
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute a style fingerprint for a source tree
    Analyze(AnalyzeArgs),

    /// Synthesize a unified diff for a ticket
    Patch(PatchArgs),

    /// Pre-scan a tree against the known-bug pattern bank
    Scan(ScanArgs),

    /// List or show tickets from the local store
    Tickets(TicketsArgs),

    /// Export commit history as JSONL for corpus building
    ExportCommits(ExportCommitsArgs),

    /// Run the HTTP service
    Serve(ServeArgs),

    /// Initialize a stylepatch.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Root directory to profile
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Languages to include (rust, python)
    #[arg(short, long)]
    pub languages: Vec<String>,

    /// Emit the profile as JSON instead of style tokens
    #[arg(long)]
    pub json: bool,

    /// Write the profile to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct PatchArgs {
    /// Ticket key (looked up in the local store when --summary is omitted)
    #[arg(long, default_value = "WB-1")]
    pub key: String,

    /// Ticket summary (skips the store lookup)
    #[arg(long)]
    pub summary: Option<String>,

    /// Ticket description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Source tree used for context and style profiling
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Zip archive used for context instead of a directory
    #[arg(long, conflicts_with = "path")]
    pub archive: Option<PathBuf>,

    /// Mimicness: 0 = best-practice rewrite, 1 = preserve observed style
    #[arg(long, default_value_t = 0.4)]
    pub mu: f64,

    /// Provider backend
    #[arg(long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Write the diff to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProviderArg {
    /// Deterministic reference provider (canned diffs)
    Canned,
    /// OpenAI-compatible chat completion backend
    Openai,
}

#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Root directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Emit hits as JSON (one object per line)
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct TicketsArgs {
    /// Show a single ticket by key
    pub key: Option<String>,

    /// Limit the number of listed tickets
    #[arg(long, default_value_t = 50)]
    pub limit: usize,

    /// Emit JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ExportCommitsArgs {
    /// Git repository to export from
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Output JSONL path
    #[arg(short, long, default_value = "data/commits.jsonl")]
    pub output: PathBuf,

    /// Maximum number of commits
    #[arg(long, default_value_t = 200)]
    pub limit: usize,
}

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Bind address (host:port); config default when omitted
    #[arg(long)]
    pub address: Option<String>,

    /// Provider backend for the service
    #[arg(long, value_enum)]
    pub provider: Option<ProviderArg>,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
