//! Declarative known-bug pattern bank.
//!
//! A small list of `{name, pattern, hint}` records consumed by an optional
//! pre-scan. The scan reports per-file hits with hints; it is advisory only
//! and sits outside the synthesis control flow.

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;

use crate::cli::{AppContext, ScanArgs};
use crate::infra::io::read_file_smart;
use crate::infra::walk::FileWalker;

/// One known-bug pattern with a remediation hint.
pub struct BugRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub hint: &'static str,
}

/// The default rule bank.
pub fn default_rules() -> Vec<BugRule> {
    vec![
        BugRule {
            name: "off_by_one",
            pattern: Regex::new(r"range\(.*len\(.*\)\)").expect("static pattern"),
            hint: "Check inclusive/exclusive bounds",
        },
        BugRule {
            name: "missing_await",
            pattern: Regex::new(r"async\s+def[\s\S]*[^_]\b\w+\(.*\)\n").expect("static pattern"),
            hint: "Await async calls",
        },
    ]
}

/// A single rule hit inside one file.
#[derive(Debug, Serialize)]
pub struct BugHit {
    pub path: String,
    pub rule: &'static str,
    pub line: usize,
    pub hint: &'static str,
}

/// Apply every rule to `content`, reporting the first hit per rule with a
/// 1-based line number.
pub fn scan_content(path: &str, content: &str, rules: &[BugRule]) -> Vec<BugHit> {
    let mut hits = Vec::new();

    for rule in rules {
        if let Some(m) = rule.pattern.find(content) {
            let line = content[..m.start()].matches('\n').count() + 1;
            hits.push(BugHit { path: path.to_string(), rule: rule.name, line, hint: rule.hint });
        }
    }

    hits
}

/// Scan every source file under `root`. One unreadable file is skipped.
pub fn scan_tree(root: &Path, ignore_patterns: &[String]) -> Result<Vec<BugHit>> {
    let rules = default_rules();
    let walker = FileWalker::new(ignore_patterns)?;

    let mut hits = Vec::new();
    for path in walker.walk_files(root) {
        let Ok(content) = read_file_smart(&path) else {
            continue;
        };

        let rel = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        hits.extend(scan_content(&rel, content.as_ref(), &rules));
    }

    Ok(hits)
}

/// Public CLI entry point expected by the command layer.
pub fn run(args: ScanArgs, ctx: &AppContext) -> Result<()> {
    let config = crate::infra::config::load_config().unwrap_or_default();
    let hits = scan_tree(&args.path, &config.ignore_patterns)?;

    if args.json {
        for hit in &hits {
            println!("{}", serde_json::to_string(hit).context("serialize hit")?);
        }
        return Ok(());
    }

    if hits.is_empty() {
        if !ctx.quiet {
            println!("No known-bug patterns matched.");
        }
        return Ok(());
    }

    for hit in &hits {
        println!("{}:{}: {} ({})", hit.path, hit.line, hit.rule, hit.hint);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_by_one_pattern_matches_index_loops() {
        let src = "for i in range(0, len(items)):\n    pass\n";
        let hits = scan_content("a.py", src, &default_rules());

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].rule, "off_by_one");
        assert_eq!(hits[0].line, 1);
    }

    #[test]
    fn stepped_range_does_not_match() {
        let src = "for chunk in chunks(items, size):\n    pass\n";
        assert!(scan_content("a.py", src, &default_rules()).is_empty());
    }

    #[test]
    fn missing_await_flags_async_defs_with_bare_calls() {
        let src = "async def handler(req):\n    fetch(req)\n";
        let hits = scan_content("h.py", src, &default_rules());
        assert!(hits.iter().any(|h| h.rule == "missing_await"));
    }

    #[test]
    fn line_numbers_are_one_based() {
        let src = "x = 1\ny = 2\nfor i in range(0, len(xs)):\n    pass\n";
        let hits = scan_content("a.py", src, &default_rules());
        assert_eq!(hits[0].line, 3);
    }
}
