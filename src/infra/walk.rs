//! Gitignore-aware file walker used by style profiling and the bug pre-scan.
//! - Respects .gitignore, .git/info/exclude, and global gitignore
//! - Extra ignore globs (early prune + late filter)
//! - Deterministic ordering for stable tests/CI
//!
//! Backed by ripgrep's `ignore` crate and `globset`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};

/// Walker with additional ignore globs applied in two places:
///   1) Early: prune directories during traversal (filter_entry).
///   2) Late: filter out files that still slipped through.
pub struct FileWalker {
    /// Compiled set of additional ignore patterns
    ignore_patterns: GlobSet,
}

impl FileWalker {
    /// Build a walker with additional ignore patterns (e.g., "target/**",
    /// "node_modules/**"). Patterns match on (relative) paths.
    pub fn new(additional_ignores: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();

        for pattern in additional_ignores {
            builder.add(Glob::new(pattern)?);
        }

        Ok(Self { ignore_patterns: builder.build()? })
    }

    /// Internal: construct a configured WalkBuilder for `root`.
    fn build_walk(&self, root: &Path) -> WalkBuilder {
        let mut b = WalkBuilder::new(root);

        // Respect .ignore/.gitignore/.git/info/exclude and global gitignore
        b.git_ignore(true);
        b.git_global(true);
        b.git_exclude(true);

        // Early directory pruning using extra ignores (fast short-circuit).
        let extra = self.ignore_patterns.clone();
        b.filter_entry(move |ent: &DirEntry| {
            let is_dir = ent.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
            !(is_dir && extra.is_match(ent.path()))
        });

        b
    }

    /// Traverse files under `root`, respecting ignore rules and extra globs.
    /// Returns a **sorted** list of file paths for determinism.
    pub fn walk_files<P: AsRef<Path>>(&self, root: P) -> Vec<PathBuf> {
        let root_path = root.as_ref();
        let walker = self.build_walk(root_path).build();

        let mut out: Vec<PathBuf> = walker
            // Drop entries with IO errors; one unreadable entry never aborts a walk
            .filter_map(|res| res.ok())
            // Keep only regular files
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(|entry| entry.into_path())
            // Late file-level extra ignore filtering using RELATIVE path
            .filter(|abs| {
                let rel = abs.strip_prefix(root_path).unwrap_or(abs);
                !self.ignore_patterns.is_match(rel)
            })
            .collect();

        // Deterministic order (stable CLI & tests)
        out.sort();

        out
    }
}
