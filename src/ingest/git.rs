//! Commit history export for corpus building.
//!
//! Reads `git log` with a control-character field separator, fetches each
//! commit's diff lazily, and writes one JSON record per line. This feeds
//! reference corpora only; nothing on the synthesis hot path depends on it.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, ExportCommitsArgs};

const FIELD_SEP: char = '\x01';

/// One exported commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    pub hash: String,
    pub author: String,
    pub email: String,
    pub date: DateTime<FixedOffset>,
    pub subject: String,
    pub body: String,
    pub diff: String,
}

/// Commit reader over a local repository.
pub struct GitIngest {
    repo: PathBuf,
}

impl GitIngest {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }

    fn run_git(&self, args: &[&str]) -> Result<String> {
        let out = Command::new("git")
            .args(args)
            .current_dir(&self.repo)
            .output()
            .context("spawn git")?;

        if !out.status.success() {
            bail!(
                "git {} failed: {}",
                args.first().unwrap_or(&""),
                String::from_utf8_lossy(&out.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }

    /// Lazily iterate up to `limit` commits, newest first. Each call starts
    /// a fresh traversal; the diff is fetched per item on demand. Log lines
    /// that do not parse (e.g. continuation lines of multi-line bodies) are
    /// skipped.
    pub fn iter_commits(
        &self,
        limit: usize,
    ) -> Result<impl Iterator<Item = Result<CommitRecord>> + '_> {
        let fmt = "%H%x01%an%x01%ae%x01%ad%x01%s%x01%b";
        let count = format!("-n{limit}");
        let log = self.run_git(&[
            "log",
            "--date=iso-strict",
            &format!("--pretty=format:{fmt}"),
            &count,
        ])?;

        let lines: Vec<String> = log.lines().map(str::to_string).collect();

        Ok(lines.into_iter().filter_map(move |line| {
            let fields: Vec<&str> = line.splitn(6, FIELD_SEP).collect();
            let &[hash, author, email, date, subject, body] = fields.as_slice() else {
                return None;
            };

            let Ok(date) = DateTime::parse_from_rfc3339(date) else {
                return None;
            };

            Some(
                self.run_git(&["show", "--format=", "-U3", hash])
                    .map(|diff| CommitRecord {
                        hash: hash.to_string(),
                        author: author.to_string(),
                        email: email.to_string(),
                        date,
                        subject: subject.to_string(),
                        body: body.to_string(),
                        diff,
                    }),
            )
        }))
    }

    /// Export up to `limit` commits as JSONL. Returns the record count.
    pub fn export_jsonl(&self, out_path: &Path, limit: usize) -> Result<usize> {
        if let Some(parent) = out_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }

        let mut lines = Vec::new();
        for record in self.iter_commits(limit)? {
            let record = record?;
            lines.push(serde_json::to_string(&record).context("serialize commit")?);
        }

        let mut content = lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        std::fs::write(out_path, content)
            .with_context(|| format!("write {}", out_path.display()))?;

        Ok(lines.len())
    }
}

/// Public CLI entry point expected by the command layer.
pub fn run(args: ExportCommitsArgs, ctx: &AppContext) -> Result<()> {
    if ctx.dry_run {
        if !ctx.quiet {
            println!(
                "Would export up to {} commits from {} to {}",
                args.limit,
                args.repo.display(),
                args.output.display()
            );
        }
        return Ok(());
    }

    let ingest = GitIngest::new(&args.repo);
    let count = ingest.export_jsonl(&args.output, args.limit)?;

    if !ctx.quiet {
        println!("Exported {count} commits to {}", args.output.display());
    }
    Ok(())
}
