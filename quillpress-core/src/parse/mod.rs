//! Markdown parsing into the document tree.
//!
//! The parser layers three concerns on top of pulldown-cmark: a leading
//! YAML frontmatter block becomes a [`NodeKind::Yaml`] node, block-level
//! directive syntax (`:::name` containers, `::name` leaves) is recognized
//! line-wise, and inline `:name[...]` directives are split out of text
//! nodes after the event fold. Malformed directives degrade to plain text.

pub mod directives;
mod events;

use crate::ast::{Node, NodeKind};
use directives::BlockDirective;
use once_cell::sync::Lazy;
use regex::Regex;

static FRONTMATTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^---[ \t]*\n(.*?)\n---[ \t]*(?:\n(.*))?$").expect("valid regex")
});

/// Parse raw document text into a tree rooted at [`NodeKind::Root`].
pub fn parse_document(source: &str) -> Node {
    let mut children = Vec::new();

    let body = match FRONTMATTER_RE.captures(source) {
        Some(captures) => {
            let yaml = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            children.push(Node::new(NodeKind::Yaml {
                value: yaml.to_string(),
            }));
            captures.get(2).map(|m| m.as_str()).unwrap_or_default()
        }
        None => source,
    };

    children.extend(parse_blocks(body));

    let mut root = Node::parent(NodeKind::Root, children);
    directives::expand_inline_directives(&mut root);
    root
}

/// Parse block content, splitting out directive blocks and folding the
/// plain markdown runs between them.
fn parse_blocks(source: &str) -> Vec<Node> {
    let lines: Vec<&str> = source.lines().collect();
    let mut nodes = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut in_code_fence = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_code_fence = !in_code_fence;
            buffer.push(line);
            i += 1;
            continue;
        }

        let directive = if in_code_fence {
            None
        } else {
            directives::match_block_line(line)
        };

        match directive {
            Some(BlockDirective::Container { fence, name, attrs }) => {
                flush(&mut buffer, &mut nodes);
                let mut end = i + 1;
                while end < lines.len() && !directives::is_closing_fence(lines[end], fence) {
                    end += 1;
                }
                let inner = lines[i + 1..end].join("\n");
                nodes.push(Node::parent(
                    NodeKind::ContainerDirective { name, attrs },
                    parse_blocks(&inner),
                ));
                // An unclosed container runs to the end of the input.
                i = if end < lines.len() { end + 1 } else { end };
            }
            Some(BlockDirective::Leaf { name, label, attrs }) => {
                flush(&mut buffer, &mut nodes);
                let children = match label {
                    Some(label) if !label.is_empty() => vec![Node::text(label)],
                    _ => Vec::new(),
                };
                nodes.push(Node::parent(NodeKind::LeafDirective { name, attrs }, children));
                i += 1;
            }
            None => {
                buffer.push(line);
                i += 1;
            }
        }
    }

    flush(&mut buffer, &mut nodes);
    nodes
}

fn flush(buffer: &mut Vec<&str>, nodes: &mut Vec<Node>) {
    if buffer.is_empty() {
        return;
    }
    let text = buffer.join("\n");
    buffer.clear();
    if !text.trim().is_empty() {
        nodes.extend(events::fold_markdown(&text));
    }
}
