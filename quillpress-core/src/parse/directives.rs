//! Directive surface syntax.
//!
//! Three forms, each carrying a name and optional `{key=value}` attributes:
//! `:::name` fenced containers, standalone `::name[label]` leaves, and
//! inline `:name[content]` text directives.

use crate::ast::{Node, NodeKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// A block-level directive recognized on a single source line.
#[derive(Debug)]
pub enum BlockDirective {
    Container {
        /// Number of colons in the opening fence.
        fence: usize,
        name: String,
        attrs: HashMap<String, String>,
    },
    Leaf {
        name: String,
        label: Option<String>,
        attrs: HashMap<String, String>,
    },
}

static BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<colons>:{2,})(?P<name>[A-Za-z][A-Za-z0-9_-]*)[ \t]*(?:\[(?P<label>[^\]]*)\])?[ \t]*(?:\{(?P<attrs>[^}]*)\})?[ \t]*$",
    )
    .expect("valid regex")
});

static INLINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":(?P<name>[A-Za-z][A-Za-z0-9_-]*)\[(?P<content>[^\]]*)\](?:\{(?P<attrs>[^}]*)\})?")
        .expect("valid regex")
});

/// Match a line as a container opening fence or a leaf directive.
pub fn match_block_line(line: &str) -> Option<BlockDirective> {
    let captures = BLOCK_RE.captures(line)?;
    let colons = captures["colons"].len();
    let name = captures["name"].to_string();
    let attrs = captures
        .name("attrs")
        .map(|m| parse_attributes(m.as_str()))
        .unwrap_or_default();

    if colons >= 3 {
        Some(BlockDirective::Container {
            fence: colons,
            name,
            attrs,
        })
    } else {
        Some(BlockDirective::Leaf {
            name,
            label: captures.name("label").map(|m| m.as_str().to_string()),
            attrs,
        })
    }
}

/// A closing fence is a line of nothing but colons, at least as long as the
/// opening fence.
pub fn is_closing_fence(line: &str, fence: usize) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= fence && trimmed.chars().all(|c| c == ':')
}

/// Parse `{...}` attribute syntax: `key=value`, `key="quoted value"`, and
/// the `#id` / `.class` shorthands.
pub fn parse_attributes(input: &str) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    let mut rest = input.trim_start();

    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix('#') {
            let (token, next) = split_token(tail);
            if !token.is_empty() {
                attrs.insert("id".to_string(), token.to_string());
            }
            rest = next;
        } else if let Some(tail) = rest.strip_prefix('.') {
            let (token, next) = split_token(tail);
            if !token.is_empty() {
                attrs.insert("class".to_string(), token.to_string());
            }
            rest = next;
        } else {
            let boundary = rest.find(char::is_whitespace).unwrap_or(rest.len());
            match rest.find('=') {
                Some(eq) if eq < boundary => {
                    let key = &rest[..eq];
                    let after = &rest[eq + 1..];
                    let (value, next) = if let Some(quoted) = after.strip_prefix('"') {
                        match quoted.find('"') {
                            Some(end) => (
                                quoted[..end].to_string(),
                                quoted[end + 1..].trim_start(),
                            ),
                            None => (quoted.to_string(), ""),
                        }
                    } else {
                        let (token, next) = split_token(after);
                        (token.to_string(), next)
                    };
                    if !key.is_empty() {
                        attrs.insert(key.to_string(), value);
                    }
                    rest = next;
                }
                _ => {
                    // Bare word with no value; skip it.
                    let (_, next) = split_token(rest);
                    rest = next;
                }
            }
        }
    }

    attrs
}

fn split_token(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(pos) => (&s[..pos], s[pos..].trim_start()),
        None => (s, ""),
    }
}

/// Split inline `:name[content]{attrs}` directives out of every text node
/// in the tree.
pub fn expand_inline_directives(node: &mut Node) {
    let children = std::mem::take(&mut node.children);
    for mut child in children {
        if let NodeKind::Text { value } = &child.kind {
            if let Some(expanded) = split_inline_text(value) {
                node.children.extend(expanded);
                continue;
            }
        }
        expand_inline_directives(&mut child);
        node.children.push(child);
    }
}

/// Returns `None` when the text contains no inline directive.
fn split_inline_text(text: &str) -> Option<Vec<Node>> {
    let mut out = Vec::new();
    let mut cursor = 0;

    for captures in INLINE_RE.captures_iter(text) {
        let matched = captures.get(0).expect("whole match");
        // The marker colon must not directly follow a word character or
        // another colon, so URL schemes stay plain text.
        let preceding = text[..matched.start()].chars().next_back();
        if matches!(preceding, Some(c) if c.is_alphanumeric() || c == ':') {
            continue;
        }

        if matched.start() > cursor {
            out.push(Node::text(&text[cursor..matched.start()]));
        }

        let content = &captures["content"];
        let children = if content.is_empty() {
            Vec::new()
        } else {
            vec![Node::text(content)]
        };
        out.push(Node::parent(
            NodeKind::TextDirective {
                name: captures["name"].to_string(),
                attrs: captures
                    .name("attrs")
                    .map(|m| parse_attributes(m.as_str()))
                    .unwrap_or_default(),
            },
            children,
        ));
        cursor = matched.end();
    }

    if cursor == 0 {
        return None;
    }
    if cursor < text.len() {
        out.push(Node::text(&text[cursor..]));
    }
    Some(out)
}
