//! Python style tally built on Tree-sitter 0.25.x.
//! Goals:
//!   - Use broad, stable queries (no fragile field predicates).
//!   - Count function definitions, PEP 257 docstrings, and calls whose
//!     receiver is a known logger name.
//!   - Estimate function length as the span from the `def` line to the
//!     deepest line reached by any node in its body.
//!
//! Notes:
//!   - We rely on tree_sitter::StreamingIterator for matches.
//!   - Logger calls are counted wherever they appear, including module
//!     level; the tally's denominator handling owns that policy.

use anyhow::{Context, Result, anyhow};
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, StreamingIterator};

use crate::core::style::{StyleExtractor, StyleTally, is_logger_name};

/// Tallies Python style signals (functions, docstrings, logger calls).
pub struct PythonStyle {
    /// Python language handle for Tree-sitter.
    language: Language,
    /// Broad query capturing defs and attribute-receiver calls.
    query: Query,
}

impl PythonStyle {
    /// Construct a new extractor with a broad query that captures
    /// function_definition and attribute calls.
    pub fn new() -> Result<Self> {
        let language: Language = tree_sitter_python::LANGUAGE.into();

        // Keep queries broad; avoid grammar field predicates
        // that tend to change across minor versions.
        let query_src = r#"
            (function_definition
              name: (identifier) @name) @func

            (call
              function: (attribute
                object: (identifier) @recv))
        "#;

        let query = Query::new(&language, query_src).context("create Python query")?;

        Ok(Self { language, query })
    }
}

impl StyleExtractor for PythonStyle {
    /// Parse `content`, run the query, and add counters to `tally`.
    fn tally(&self, content: &str, tally: &mut StyleTally) -> Result<()> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .context("set Python language")?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| anyhow!("Failed to parse Python source"))?;

        // Use the same bytes slice for all utf8_text calls.
        let bytes = content.as_bytes();

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.query, tree.root_node(), bytes);

        let cap_names: Vec<&str> = self.query.capture_names().to_vec();

        while let Some(m) = matches.next() {
            let mut func: Option<Node> = None;
            let mut name_text: Option<&str> = None;
            let mut recv_text: Option<&str> = None;

            for cap in m.captures {
                match cap_names[cap.index as usize] {
                    "func" => func = Some(cap.node),
                    "name" => name_text = cap.node.utf8_text(bytes).ok(),
                    "recv" => recv_text = cap.node.utf8_text(bytes).ok(),
                    _ => {}
                }
            }

            // Attribute-call pattern: count logger receivers and move on.
            if let Some(recv) = recv_text {
                if is_logger_name(recv) {
                    tally.log_calls += 1;
                }
                continue;
            }

            // Definition pattern.
            let Some(node) = func else { continue };
            let Some(name) = name_text else { continue };

            tally.functions += 1;
            tally.classify_name(name);

            if has_docstring(node) {
                tally.documented += 1;
            }

            let start = node.start_position().row;
            let deepest = max_reached_row(node);
            tally.fn_lengths.push(deepest.saturating_sub(start).max(1));
        }

        Ok(())
    }
}

/// Deepest line reached by any node under (and including) `node`.
fn max_reached_row(node: Node) -> usize {
    let mut max = node.start_position().row;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        max = max.max(max_reached_row(child));
    }
    max
}

/// PEP 257 check: the first statement of the body is a string literal
/// (or an implicit concatenation of string literals).
fn has_docstring(node: Node) -> bool {
    let Some(body) = node.child_by_field_name("body") else {
        return false;
    };

    // Current grammar exposes the body as a "block" ("suite" in older ones).
    let block = if body.kind() == "block" || body.kind() == "suite" {
        body
    } else {
        return false;
    };

    let Some(first) = block.named_child(0) else {
        return false;
    };
    if first.kind() != "expression_statement" {
        return false;
    }

    matches!(
        first.named_child(0).map(|n| n.kind()),
        Some("string" | "concatenated_string")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally_src(src: &str) -> StyleTally {
        let ex = PythonStyle::new().expect("extractor");
        let mut t = StyleTally::default();
        ex.tally(src, &mut t).expect("tally");
        t
    }

    #[test]
    fn counts_functions_docstrings_and_names() {
        let src = r#"
def documented_one():
    """Greeting"""
    return 1

def UndocumentedTwo():
    return 2
"#;
        let t = tally_src(src);
        assert_eq!(t.functions, 2);
        assert_eq!(t.documented, 1);
        assert_eq!(t.snake_names, 1);
        assert_eq!(t.camel_names, 1);
    }

    #[test]
    fn non_first_string_is_not_a_docstring() {
        let src = r#"
def f():
    x = 1
    "not a docstring"
    return x
"#;
        let t = tally_src(src);
        assert_eq!(t.functions, 1);
        assert_eq!(t.documented, 0);
    }

    #[test]
    fn logger_calls_count_per_call_not_per_function() {
        let src = r#"
import logging

def worker(items):
    logger.info("start")
    for it in items:
        logger.debug(it)
    log.warning("done")
"#;
        let t = tally_src(src);
        assert_eq!(t.functions, 1);
        assert_eq!(t.log_calls, 3);
    }

    #[test]
    fn module_level_logger_calls_count_too() {
        let src = "logging.basicConfig()\n";
        let t = tally_src(src);
        assert_eq!(t.functions, 0);
        assert_eq!(t.log_calls, 1);
    }

    #[test]
    fn non_logger_receivers_do_not_count() {
        let src = "def f(self):\n    self.helper()\n";
        let t = tally_src(src);
        assert_eq!(t.log_calls, 0);
    }

    #[test]
    fn length_spans_def_to_deepest_line() {
        let src = "def f():\n    a = 1\n    b = 2\n    return a + b\n";
        let t = tally_src(src);
        assert_eq!(t.fn_lengths, vec![3]);
    }

    #[test]
    fn one_line_function_clamps_to_length_one() {
        let src = "def f(): return 1\n";
        let t = tally_src(src);
        assert_eq!(t.fn_lengths, vec![1]);
    }
}
