//! Bounded context excerpts.
//!
//! Reduces an ordered path→content mapping to a single string the generator
//! can afford to read: at most `max_files` entries, first `head_lines` lines
//! of each. Full-file inclusion is deliberately avoided; heads keep the
//! request small while staying style-rich.

use indexmap::IndexMap;
use itertools::Itertools;

/// Ordered mapping from relative path to full text content.
/// Insertion order is preserved end to end.
pub type FileSet = IndexMap<String, String>;

/// Sentinel returned for an empty file set, so prompt construction
/// downstream never sees a blank context.
pub const EMPTY_CONTEXT: &str = "No files";

/// Assemble a bounded excerpt from `files`.
///
/// Each included file renders as a `### <path>` header followed by its first
/// `head_lines` lines; entries are joined with a blank line. Deterministic
/// for identical input and limits.
pub fn build_context(files: &FileSet, max_files: usize, head_lines: usize) -> String {
    let excerpt = files
        .iter()
        .take(max_files)
        .map(|(path, content)| {
            let head = content.lines().take(head_lines).join("\n");
            format!("### {path}\n{head}")
        })
        .join("\n\n");

    if excerpt.is_empty() {
        EMPTY_CONTEXT.to_string()
    } else {
        excerpt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fileset(entries: &[(&str, &str)]) -> FileSet {
        entries
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect()
    }

    #[test]
    fn empty_fileset_yields_sentinel() {
        assert_eq!(build_context(&FileSet::new(), 80, 20), EMPTY_CONTEXT);
    }

    #[test]
    fn truncates_to_head_lines_exactly() {
        let files = fileset(&[("src/a.py", "l1\nl2\nl3\nl4\nl5")]);
        let ctx = build_context(&files, 80, 3);

        assert_eq!(ctx, "### src/a.py\nl1\nl2\nl3");
        // header + exactly head_lines content lines
        assert_eq!(ctx.lines().count(), 4);
    }

    #[test]
    fn respects_max_files_in_insertion_order() {
        let files = fileset(&[("one.py", "1"), ("two.py", "2"), ("three.py", "3")]);
        let ctx = build_context(&files, 2, 20);

        assert!(ctx.contains("### one.py"));
        assert!(ctx.contains("### two.py"));
        assert!(!ctx.contains("### three.py"));
    }

    #[test]
    fn entries_join_with_blank_line() {
        let files = fileset(&[("a.py", "x"), ("b.py", "y")]);
        assert_eq!(build_context(&files, 80, 20), "### a.py\nx\n\n### b.py\ny");
    }

    #[test]
    fn short_files_render_whole_head() {
        let files = fileset(&[("a.py", "only line")]);
        assert_eq!(build_context(&files, 80, 20), "### a.py\nonly line");
    }
}
