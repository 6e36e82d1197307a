//! Rust style tally built on Tree-sitter.
//!
//! Counts `fn` items (free functions and methods alike), leading `///` doc
//! comments, and logging calls. A logging call is either a scoped macro whose
//! leading path segment is a known logger name (`log::info!(..)`) or a method
//! call on a receiver with a known logger name (`logger.info(..)`).

use anyhow::{Context, Result, anyhow};
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, StreamingIterator};

use crate::core::style::{StyleExtractor, StyleTally, is_logger_name};

/// Tallies Rust style signals (fn items, doc comments, log calls).
pub struct RustStyle {
    language: Language,
    // Broad node queries; avoid field-name constraints that differ across
    // grammar versions.
    query: Query,
}

impl RustStyle {
    pub fn new() -> Result<Self> {
        let language: Language = tree_sitter_rust::LANGUAGE.into();

        let query_src = r#"
            (function_item
              name: (identifier) @name) @func

            (macro_invocation
              macro: (scoped_identifier
                path: (identifier) @recv))

            (call_expression
              function: (field_expression
                value: (identifier) @recv))
        "#;

        let query = Query::new(&language, query_src).context("create Rust query")?;

        Ok(Self { language, query })
    }
}

impl StyleExtractor for RustStyle {
    fn tally(&self, content: &str, tally: &mut StyleTally) -> Result<()> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .context("set Rust language")?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| anyhow!("Failed to parse Rust source"))?;
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

            if let Some(recv) = recv_text {
                if is_logger_name(recv) {
                    tally.log_calls += 1;
                }
                continue;
            }

            let Some(node) = func else { continue };
            let Some(name) = name_text else { continue };

            tally.functions += 1;
            tally.classify_name(name);

            if has_doc_comment(node, bytes) {
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

/// True when the nearest preceding non-attribute sibling is a doc comment.
fn has_doc_comment(node: Node, bytes: &[u8]) -> bool {
    let mut prev = node.prev_sibling();
    while let Some(p) = prev {
        match p.kind() {
            // Attributes sit between doc comments and the item
            "attribute_item" => prev = p.prev_sibling(),
            "line_comment" => {
                return p
                    .utf8_text(bytes)
                    .map(|t| t.starts_with("///"))
                    .unwrap_or(false);
            }
            "block_comment" => {
                return p
                    .utf8_text(bytes)
                    .map(|t| t.starts_with("/**"))
                    .unwrap_or(false);
            }
            _ => return false,
        }
    }
    false
}
