//! Style fingerprint extraction pipeline.
//!
//! Walks a source tree, parses each file with the language's tree-sitter
//! grammar, and tallies function-level signals into a compact numeric
//! profile:
//!   - avg_func_len: mean span from a definition's first line to the deepest
//!     line reached by any node in its body (clamped to at least 1)
//!   - camel_ratio: CamelCase names vs snake_case names
//!   - docstring_ratio: documented definitions vs all definitions
//!   - log_usage: logger-receiver calls per definition (every matching call
//!     counts, including module-level ones, so values above 1.0 are valid)
//!
//! One file failing to parse or read is skipped; it never aborts the run.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cli::{AnalyzeArgs, AppContext};
use crate::infra::{io::read_file_smart, walk::FileWalker};
use crate::parsers::{PythonStyle, RustStyle};

/// Receiver names that count as logging calls.
pub const LOGGER_NAMES: [&str; 3] = ["log", "logger", "logging"];

static SNAKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+(_[a-z0-9]+)*$").unwrap());
static CAMEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z][a-zA-Z0-9]+$").unwrap());

/// Compact numeric style fingerprint for a source tree.
///
/// Built fresh per analysis run and owned by the caller; there is no shared
/// cache behind it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile {
    /// Mean function length estimate in lines
    pub avg_func_len: f64,

    /// CamelCase share among classified definition names, in [0, 1]
    pub camel_ratio: f64,

    /// Documented share among definitions, in [0, 1]
    pub docstring_ratio: f64,

    /// Logging calls per definition; may exceed 1.0
    pub log_usage: f64,
}

impl StyleProfile {
    /// Render the profile as ordered `name=value` style tokens.
    ///
    /// Lengths carry one decimal, ratios two; the order is fixed so equal
    /// profiles always serialize identically.
    pub fn to_tokens(&self) -> Vec<String> {
        vec![
            format!("avg_func_len={:.1}", self.avg_func_len),
            format!("camel_ratio={:.2}", self.camel_ratio),
            format!("docstring_ratio={:.2}", self.docstring_ratio),
            format!("log_usage={:.2}", self.log_usage),
        ]
    }
}

/// Raw per-file counters merged across the tree before ratios are computed.
#[derive(Debug, Default, Clone)]
pub struct StyleTally {
    /// Length estimate of every definition seen
    pub fn_lengths: Vec<usize>,

    /// Definitions with a CamelCase name
    pub camel_names: usize,

    /// Definitions with a snake_case name
    pub snake_names: usize,

    /// Definitions carrying a leading documentation string/comment
    pub documented: usize,

    /// Total function-like definitions
    pub functions: usize,

    /// Calls whose receiver is a known logger name
    pub log_calls: usize,
}

impl StyleTally {
    /// Bucket a definition name. A name lands in at most one bucket; the two
    /// patterns are mutually exclusive by construction.
    pub fn classify_name(&mut self, name: &str) {
        if SNAKE.is_match(name) {
            self.snake_names += 1;
        }
        if CAMEL.is_match(name) {
            self.camel_names += 1;
        }
    }

    /// Fold another file's counters into this one.
    pub fn merge(&mut self, other: StyleTally) {
        self.fn_lengths.extend(other.fn_lengths);
        self.camel_names += other.camel_names;
        self.snake_names += other.snake_names;
        self.documented += other.documented;
        self.functions += other.functions;
        self.log_calls += other.log_calls;
    }

    /// Reduce the counters to a profile. Every denominator is floored to 1,
    /// so a tree with zero definitions yields an all-zero profile.
    pub fn profile(&self) -> StyleProfile {
        let avg_func_len = if self.fn_lengths.is_empty() {
            0.0
        } else {
            // Integer sum first: the mean stays deterministic regardless of
            // the order files were merged in
            self.fn_lengths.iter().sum::<usize>() as f64 / self.fn_lengths.len() as f64
        };

        let total_names = (self.camel_names + self.snake_names).max(1);
        let funcs = self.functions.max(1);

        StyleProfile {
            avg_func_len,
            camel_ratio: self.camel_names as f64 / total_names as f64,
            docstring_ratio: self.documented as f64 / funcs as f64,
            log_usage: self.log_calls as f64 / funcs as f64,
        }
    }
}

/// True when `name` is one of the fixed logger receivers.
pub fn is_logger_name(name: &str) -> bool {
    LOGGER_NAMES.contains(&name)
}

/// Per-language tally extractor over a parsed syntax tree.
pub trait StyleExtractor: Send + Sync {
    /// Parse `content` and add its counters to `tally`.
    fn tally(&self, content: &str, tally: &mut StyleTally) -> Result<()>;
}

/// Simple extractor registry, selected by canonical language label.
pub fn get_extractor(lang: &str) -> Result<Box<dyn StyleExtractor + Send + Sync>> {
    match lang {
        "rust" => Ok(Box::new(RustStyle::new()?)),
        "python" => Ok(Box::new(PythonStyle::new()?)),
        _ => Err(anyhow::anyhow!("Unsupported language: {}", lang)),
    }
}

/// Map file extensions to canonical language labels.
fn detect_language(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();

    match ext.as_str() {
        "rs" => Some("rust"),
        "py" => Some("python"),
        _ => None,
    }
}

/// Profile a source tree with the default language set and ignore globs.
pub fn analyze(root: &Path) -> Result<StyleProfile> {
    let cfg = crate::infra::config::load_config().unwrap_or_default();
    analyze_with(root, &cfg.style.languages, &cfg.ignore_patterns, None)
}

/// Profile a source tree with explicit settings.
///
/// Walks `root`, parses every matching file, and merges per-file tallies.
/// Files that fail to read or parse are skipped individually.
pub fn analyze_with(
    root: &Path,
    languages: &[String],
    ignore_patterns: &[String],
    progress: Option<&ProgressBar>,
) -> Result<StyleProfile> {
    let walker = FileWalker::new(ignore_patterns)?;

    // Collect (path, language) pairs for the selected languages
    let files: Vec<(PathBuf, &'static str)> = walker
        .walk_files(root)
        .into_iter()
        .filter_map(|p| {
            let lang = detect_language(&p)?;
            languages.iter().any(|l| l == lang).then_some((p, lang))
        })
        .collect();

    if let Some(pb) = progress {
        pb.set_length(files.len() as u64);
    }

    // Tally per file in parallel; per-file failures degrade to empty tallies
    let tallies: Vec<StyleTally> = files
        .par_iter()
        .map(|(path, lang)| {
            let tally = tally_one(path, lang).unwrap_or_else(|e| {
                tracing::debug!(path = %path.display(), error = %e, "skipping file");
                StyleTally::default()
            });
            if let Some(pb) = progress {
                pb.inc(1);
            }
            tally
        })
        .collect();

    let mut merged = StyleTally::default();
    for t in tallies {
        merged.merge(t);
    }

    Ok(merged.profile())
}

/// Tally a single file; any failure is reported to the caller, which skips it.
fn tally_one(path: &Path, lang: &str) -> Result<StyleTally> {
    let content = read_file_smart(path)?;
    let extractor = get_extractor(lang)?;

    let mut tally = StyleTally::default();
    extractor.tally(content.as_ref(), &mut tally)?;
    Ok(tally)
}

/// Public CLI entry point expected by the command layer.
pub fn run(args: AnalyzeArgs, ctx: &AppContext) -> Result<()> {
    let config = crate::infra::config::load_config().unwrap_or_default();

    // CLI languages win over config defaults
    let languages = if args.languages.is_empty() {
        config.style.languages.clone()
    } else {
        args.languages.clone()
    };

    let progress = if ctx.quiet {
        None
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::with_template("{spinner} {pos}/{len} files {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(pb)
    };

    let profile = analyze_with(
        &args.path,
        &languages,
        &config.ignore_patterns,
        progress.as_ref(),
    )?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let rendered = if args.json {
        serde_json::to_string_pretty(&profile).context("serialize profile")?
    } else {
        profile.to_tokens().join("\n")
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("write profile to {}", path.display()))?;
            if !ctx.quiet {
                println!("Wrote profile to {}", path.display());
            }
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_buckets_are_mutually_exclusive() {
        let mut t = StyleTally::default();
        t.classify_name("snake_case_name");
        t.classify_name("CamelName");
        t.classify_name("_private"); // matches neither pattern
        assert_eq!(t.snake_names, 1);
        assert_eq!(t.camel_names, 1);
    }

    #[test]
    fn empty_tally_profiles_to_zero() {
        let p = StyleTally::default().profile();
        assert_eq!(p, StyleProfile::default());
    }

    #[test]
    fn tokens_render_with_fixed_precision() {
        let p = StyleProfile {
            avg_func_len: 6.25,
            camel_ratio: 0.5,
            docstring_ratio: 1.0 / 3.0,
            log_usage: 1.5,
        };
        assert_eq!(
            p.to_tokens(),
            vec![
                "avg_func_len=6.2",
                "camel_ratio=0.50",
                "docstring_ratio=0.33",
                "log_usage=1.50",
            ]
        );
    }

    #[test]
    fn log_usage_may_exceed_one() {
        let t = StyleTally { functions: 1, log_calls: 3, ..Default::default() };
        assert!(t.profile().log_usage > 1.0);
    }

    #[test]
    fn language_detection_matrix() {
        assert_eq!(detect_language(Path::new("a.rs")), Some("rust"));
        assert_eq!(detect_language(Path::new("b.py")), Some("python"));
        assert_eq!(detect_language(Path::new("c.txt")), None);
    }
}
