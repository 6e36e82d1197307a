//! Zip archive ingestion.
//!
//! Extracts an uploaded archive into an ordered path→content mapping,
//! filtered by an allow-list of extensions and a deny-list of path
//! substrings. Entries that cannot be read decode leniently or are dropped;
//! one bad entry never aborts the extraction. The archive's internal
//! ordering is preserved.

use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use zip::ZipArchive;

use crate::core::context::FileSet;
use crate::infra::config::IngestConfig;
use crate::infra::io::decode_lossy;

/// Allow/deny policy applied to every archive entry path.
#[derive(Debug, Clone)]
pub struct IngestPolicy {
    /// Admitted file extensions (lowercase, without the dot)
    allow_extensions: Vec<String>,

    /// Denied path substrings; entries with a leading `/` match only in the
    /// middle of a path, others match at the start or behind any separator
    deny_substrings: Vec<String>,
}

impl IngestPolicy {
    pub fn from_config(cfg: &IngestConfig) -> Self {
        Self {
            allow_extensions: cfg
                .allow_extensions
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
            deny_substrings: cfg
                .deny_substrings
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
        }
    }

    /// Decide whether an entry path survives the policy. Matching is
    /// case-insensitive; directory entries never survive.
    pub fn keep(&self, path: &str) -> bool {
        let p = path.to_lowercase();

        if p.is_empty() || p.ends_with('/') {
            return false;
        }

        for deny in &self.deny_substrings {
            let hit = if deny.starts_with('/') {
                // "/build/" style: anchored behind a separator only
                p.contains(deny.as_str())
            } else {
                // ".git/" style: at the start or behind any separator
                p.starts_with(deny.as_str()) || p.contains(&format!("/{deny}"))
            };
            if hit {
                return false;
            }
        }

        self.allow_extensions
            .iter()
            .any(|ext| p.ends_with(&format!(".{ext}")))
    }
}

/// Extract `bytes` as a zip container into a FileSet.
///
/// Fails only when the container itself is unreadable; individual entries
/// that error are skipped silently.
pub fn extract_zip(bytes: &[u8], policy: &IngestPolicy) -> Result<FileSet> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).context("open uploaded archive")?;

    let mut files = FileSet::new();

    for i in 0..archive.len() {
        // A corrupt entry is a per-item failure, not a batch failure
        let Ok(mut entry) = archive.by_index(i) else {
            continue;
        };

        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        if !policy.keep(&name) {
            continue;
        }

        let mut buf = Vec::new();
        if entry.read_to_end(&mut buf).is_err() {
            continue;
        }

        files.insert(name, decode_lossy(&buf));
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::config::Config;

    fn policy() -> IngestPolicy {
        IngestPolicy::from_config(&Config::default().ingest)
    }

    #[test]
    fn allows_source_and_docs() {
        let p = policy();
        assert!(p.keep("src/app.py"));
        assert!(p.keep("README.md"));
        assert!(p.keep("lib/core.rs"));
    }

    #[test]
    fn denies_disallowed_extensions() {
        let p = policy();
        assert!(!p.keep("logo.png"));
        assert!(!p.keep("binary.o"));
        assert!(!p.keep("archive.tar.gz"));
    }

    #[test]
    fn denies_vcs_and_dependency_directories() {
        let p = policy();
        assert!(!p.keep(".git/config"));
        assert!(!p.keep("repo/.git/hooks/pre-commit.py"));
        assert!(!p.keep("node_modules/pkg/index.js"));
        assert!(!p.keep("app/node_modules/pkg/index.js"));
    }

    #[test]
    fn denies_build_output_directories() {
        let p = policy();
        assert!(!p.keep("web/build/main.js"));
        assert!(!p.keep("pkg/dist/bundle.js"));
        assert!(!p.keep("target/debug/build.rs"));
    }

    #[test]
    fn directory_entries_never_survive() {
        let p = policy();
        assert!(!p.keep("src/"));
        assert!(!p.keep(""));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let p = policy();
        assert!(p.keep("SRC/App.PY"));
        assert!(!p.keep("NODE_MODULES/x.js"));
    }
}
