//! Folding the pulldown-cmark event stream into tree nodes.

use crate::ast::{Node, NodeKind};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

/// Parse a run of plain markdown into block nodes.
pub fn fold_markdown(source: &str) -> Vec<Node> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(source, options);

    let mut stack: Vec<Node> = vec![Node::new(NodeKind::Root)];
    for event in parser {
        match event {
            Event::Start(tag) => stack.push(open_node(tag)),
            Event::End(_) => {
                if let Some(node) = stack.pop() {
                    match stack.last_mut() {
                        Some(parent) => attach(parent, node),
                        None => stack.push(node),
                    }
                }
            }
            Event::Text(text) => push_child(&mut stack, Node::text(text.to_string())),
            Event::Code(code) => push_child(
                &mut stack,
                Node::new(NodeKind::InlineCode {
                    value: code.to_string(),
                }),
            ),
            Event::Html(html) | Event::InlineHtml(html) => push_child(
                &mut stack,
                Node::new(NodeKind::Html {
                    value: html.to_string(),
                }),
            ),
            Event::SoftBreak => push_child(&mut stack, Node::new(NodeKind::SoftBreak)),
            Event::HardBreak => push_child(&mut stack, Node::new(NodeKind::HardBreak)),
            Event::Rule => push_child(&mut stack, Node::new(NodeKind::ThematicBreak)),
            _ => {}
        }
    }

    match stack.pop() {
        Some(root) if stack.is_empty() => root.children,
        // Unbalanced input; salvage whatever was collected.
        Some(node) => {
            let mut rest = node;
            while let Some(mut parent) = stack.pop() {
                parent.children.push(rest);
                rest = parent;
            }
            rest.children
        }
        None => Vec::new(),
    }
}

fn open_node(tag: Tag) -> Node {
    match tag {
        Tag::Paragraph => Node::new(NodeKind::Paragraph),
        Tag::Heading { level, .. } => Node::new(NodeKind::Heading {
            depth: level as u8,
        }),
        Tag::BlockQuote(_) => Node::new(NodeKind::BlockQuote),
        Tag::CodeBlock(kind) => Node::new(NodeKind::CodeBlock {
            lang: match kind {
                CodeBlockKind::Fenced(info) if !info.is_empty() => {
                    info.split([' ', ',']).next().map(str::to_string)
                }
                _ => None,
            },
            value: String::new(),
        }),
        Tag::List(start) => Node::new(NodeKind::List {
            ordered: start.is_some(),
        }),
        Tag::Item => Node::new(NodeKind::ListItem),
        Tag::Emphasis => Node::new(NodeKind::Emphasis),
        Tag::Strong => Node::new(NodeKind::Strong),
        Tag::Strikethrough => Node::new(NodeKind::Strikethrough),
        Tag::Link {
            dest_url, title, ..
        } => Node::new(NodeKind::Link {
            url: dest_url.to_string(),
            title: (!title.is_empty()).then(|| title.to_string()),
        }),
        Tag::Image { dest_url, .. } => Node::new(NodeKind::Image {
            url: dest_url.to_string(),
            alt: String::new(),
        }),
        Tag::Table(_) => Node::new(NodeKind::Table),
        Tag::TableHead => Node::new(NodeKind::TableHead),
        Tag::TableRow => Node::new(NodeKind::TableRow),
        Tag::TableCell => Node::new(NodeKind::TableCell),
        // Containers we do not model are transparent: their children are
        // spliced into the parent when the container closes.
        _ => Node::new(NodeKind::Root),
    }
}

fn attach(parent: &mut Node, mut node: Node) {
    match &mut node.kind {
        NodeKind::CodeBlock { value, .. } => {
            for child in node.children.drain(..) {
                value.push_str(&child.text_content());
            }
            parent.children.push(node);
        }
        NodeKind::Image { alt, .. } => {
            let mut text = String::new();
            for child in node.children.drain(..) {
                text.push_str(&child.text_content());
            }
            *alt = text;
            parent.children.push(node);
        }
        NodeKind::Root => parent.children.append(&mut node.children),
        _ => parent.children.push(node),
    }
}

fn push_child(stack: &mut [Node], child: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_and_paragraph() {
        let nodes = fold_markdown("# Title\n\nSome **bold** text.\n");
        assert!(matches!(nodes[0].kind, NodeKind::Heading { depth: 1 }));
        assert_eq!(nodes[0].text_content(), "Title");
        assert!(matches!(nodes[1].kind, NodeKind::Paragraph));
        assert_eq!(nodes[1].text_content(), "Some bold text.");
    }

    #[test]
    fn test_image_alt_is_flattened() {
        let nodes = fold_markdown("![an *emphatic* alt](https://example.com/pic.png)\n");
        let paragraph = &nodes[0];
        match &paragraph.children[0].kind {
            NodeKind::Image { url, alt } => {
                assert_eq!(url, "https://example.com/pic.png");
                assert_eq!(alt, "an emphatic alt");
            }
            other => panic!("expected image, got {:?}", other),
        }
        assert!(paragraph.children[0].children.is_empty());
    }

    #[test]
    fn test_link_title() {
        let nodes = fold_markdown("[text](https://example.com \"hover\")\n");
        match &nodes[0].children[0].kind {
            NodeKind::Link { url, title } => {
                assert_eq!(url, "https://example.com");
                assert_eq!(title.as_deref(), Some("hover"));
            }
            other => panic!("expected link, got {:?}", other),
        }
    }

    #[test]
    fn test_code_block_value() {
        let nodes = fold_markdown("```rust\nfn main() {}\n```\n");
        match &nodes[0].kind {
            NodeKind::CodeBlock { lang, value } => {
                assert_eq!(lang.as_deref(), Some("rust"));
                assert_eq!(value, "fn main() {}\n");
            }
            other => panic!("expected code block, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_list() {
        let nodes = fold_markdown("1. first\n2. second\n");
        match &nodes[0].kind {
            NodeKind::List { ordered } => assert!(ordered),
            other => panic!("expected list, got {:?}", other),
        }
        assert_eq!(nodes[0].children.len(), 2);
        assert!(matches!(nodes[0].children[0].kind, NodeKind::ListItem));
    }

    #[test]
    fn test_table() {
        let nodes = fold_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(matches!(nodes[0].kind, NodeKind::Table));
        assert!(matches!(nodes[0].children[0].kind, NodeKind::TableHead));
        assert!(matches!(nodes[0].children[1].kind, NodeKind::TableRow));
    }
}
