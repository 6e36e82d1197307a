use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Extra ignore patterns for tree walking (in addition to .gitignore)
    pub ignore_patterns: Vec<String>,

    /// Archive ingestion policy
    pub ingest: IngestConfig,

    /// Context excerpt limits
    pub context: ContextConfig,

    /// Style profiling settings
    pub style: StyleConfig,

    /// Provider backend settings
    pub provider: ProviderConfig,

    /// Synthesis defaults
    pub synth: SynthConfig,

    /// HTTP service settings
    pub service: ServiceConfig,

    /// Local ticket store settings
    pub tickets: TicketsConfig,

    /// Issue tracker API settings
    pub tracker: TrackerConfig,

    /// Pull-request API settings
    pub github: GithubConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// File extensions admitted from an uploaded archive
    pub allow_extensions: Vec<String>,

    /// Path substrings that exclude an entry outright
    pub deny_substrings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Maximum number of files shown to the generator
    pub max_files: usize,

    /// Lines kept from the head of each file
    pub head_lines: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Languages profiled during analysis
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Backend kind: "canned" or "openai"
    pub kind: String,

    /// OpenAI-compatible API base (scheme + host)
    pub endpoint: String,

    /// Model identifier for the chat completion request
    pub model: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Mimicness used when the caller does not supply one
    pub default_mimicness: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Bind address for `spx serve`
    pub address: String,

    /// Environment variable holding the webhook shared secret
    pub webhook_secret_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketsConfig {
    /// JSONL file backing the local ticket store
    pub data_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Tracker REST base URL; empty disables the remote lookup
    pub base_url: String,

    /// Environment variable holding the tracker account email
    pub email_env: String,

    /// Environment variable holding the tracker API token
    pub token_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Pull-request API base URL
    pub api_base: String,

    /// Environment variable holding the API token
    pub token_env: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignore_patterns: vec![
                "target/".to_string(),
                "node_modules/".to_string(),
                "dist/".to_string(),
                "build/".to_string(),
                ".git/".to_string(),
                "*.pyc".to_string(),
                "__pycache__/".to_string(),
                ".DS_Store".to_string(),
            ],
            ingest: IngestConfig {
                allow_extensions: [
                    "py", "ts", "tsx", "js", "jsx", "json", "md", "go", "java", "rb", "rs",
                    "cpp", "c", "cs", "php", "kt", "swift",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                deny_substrings: vec![
                    ".git/".to_string(),
                    "node_modules/".to_string(),
                    "/build/".to_string(),
                    "/dist/".to_string(),
                    "target/".to_string(),
                    "__pycache__/".to_string(),
                ],
            },
            context: ContextConfig { max_files: 80, head_lines: 20 },
            style: StyleConfig {
                languages: vec!["python".to_string(), "rust".to_string()],
            },
            provider: ProviderConfig {
                kind: "canned".to_string(),
                endpoint: "https://api.openai.com".to_string(),
                model: "gpt-4o".to_string(),
                api_key_env: "OPENAI_API_KEY".to_string(),
                timeout_secs: 60,
            },
            synth: SynthConfig { default_mimicness: 0.4 },
            service: ServiceConfig {
                address: "127.0.0.1:8787".to_string(),
                webhook_secret_env: "TRACKER_WEBHOOK_SECRET".to_string(),
            },
            tickets: TicketsConfig { data_file: "data/demo/tickets.jsonl".to_string() },
            tracker: TrackerConfig {
                base_url: String::new(),
                email_env: "TRACKER_EMAIL".to_string(),
                token_env: "TRACKER_API_TOKEN".to_string(),
            },
            github: GithubConfig {
                api_base: "https://api.github.com".to_string(),
                token_env: "GITHUB_TOKEN".to_string(),
            },
        }
    }
}

pub fn load_config() -> Result<Config> {
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    let config_paths = ["stylepatch.toml", ".stylepatch.toml"];

    for path in &config_paths {
        if Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    // Add environment variables with STYLEPATCH_ prefix
    builder = builder.add_source(config::Environment::with_prefix("STYLEPATCH").separator("_"));

    let cfg = builder.build().context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(args: InitArgs, ctx: &AppContext) -> Result<()> {
    let config_path = args.path.join("stylepatch.toml");

    if config_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    if ctx.dry_run {
        if !ctx.quiet {
            println!("Would write config to {}", config_path.display());
        }
        return Ok(());
    }

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_covers_source_and_docs() {
        let cfg = Config::default();
        assert!(cfg.ingest.allow_extensions.iter().any(|e| e == "py"));
        assert!(cfg.ingest.allow_extensions.iter().any(|e| e == "md"));
        assert!(cfg.ingest.deny_substrings.iter().any(|s| s == ".git/"));
    }

    #[test]
    fn default_round_trips_through_toml() {
        let cfg = Config::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.context.max_files, cfg.context.max_files);
        assert_eq!(back.provider.kind, "canned");
    }
}
