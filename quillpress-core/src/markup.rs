//! Markup tree and serialization.
//!
//! The finished document tree is bridged to a markup-shaped tree of
//! elements, the heading-anchor pass rewrites it, and the serializer writes
//! the result as an HTML fragment.

use crate::anchor::anchor_id;
use crate::ast::{Node, NodeKind};

/// A node in the serializer-facing markup tree.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    Element(Element),
    Text(String),
    /// Raw markup emitted verbatim.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<MarkupNode>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Convert a document tree (rooted at `Root`) into a markup fragment.
pub fn to_markup(root: &Node) -> Vec<MarkupNode> {
    let mut out = Vec::new();
    for child in &root.children {
        convert(child, &mut out);
    }
    out
}

fn convert(node: &Node, out: &mut Vec<MarkupNode>) {
    match &node.kind {
        NodeKind::Root => {
            for child in &node.children {
                convert(child, out);
            }
        }
        NodeKind::Heading { depth } => {
            let mut element = Element::new(&format!("h{}", depth));
            // Every heading carries an id in markup, whether or not the
            // contents pass visited it; the anchor pass reads it back off
            // the element.
            let id = node
                .annotation
                .id
                .clone()
                .unwrap_or_else(|| anchor_id(&node.text_content()));
            element.attrs.push(("id".to_string(), id));
            if let Some(class) = &node.annotation.class {
                element.attrs.push(("class".to_string(), class.clone()));
            }
            element.children = children_of(node);
            out.push(MarkupNode::Element(element));
        }
        NodeKind::Paragraph => out.push(wrap("p", node)),
        NodeKind::Text { value } => out.push(MarkupNode::Text(value.clone())),
        NodeKind::Emphasis => out.push(wrap("em", node)),
        NodeKind::Strong => out.push(wrap("strong", node)),
        NodeKind::Strikethrough => out.push(wrap("del", node)),
        NodeKind::InlineCode { value } => {
            let mut element = Element::new("code");
            element.children.push(MarkupNode::Text(value.clone()));
            out.push(MarkupNode::Element(element));
        }
        NodeKind::Link { url, title } => {
            let mut element = Element::new("a");
            element.attrs.push(("href".to_string(), url.clone()));
            if let Some(title) = title {
                element.attrs.push(("title".to_string(), title.clone()));
            }
            if let Some(class) = &node.annotation.class {
                element.attrs.push(("class".to_string(), class.clone()));
            }
            element.children = children_of(node);
            out.push(MarkupNode::Element(element));
        }
        NodeKind::Image { url, alt } => {
            let mut element = Element::new("img");
            element.attrs.push(("src".to_string(), url.clone()));
            element.attrs.push(("alt".to_string(), alt.clone()));
            if let Some(class) = &node.annotation.class {
                element.attrs.push(("class".to_string(), class.clone()));
            }
            out.push(MarkupNode::Element(element));
        }
        NodeKind::List { ordered } => {
            out.push(wrap(if *ordered { "ol" } else { "ul" }, node))
        }
        NodeKind::ListItem => out.push(wrap("li", node)),
        NodeKind::BlockQuote => out.push(wrap("blockquote", node)),
        NodeKind::CodeBlock { lang, value } => {
            let mut code = Element::new("code");
            if let Some(lang) = lang {
                code.attrs
                    .push(("class".to_string(), format!("language-{}", lang)));
            }
            code.children.push(MarkupNode::Text(value.clone()));
            let mut pre = Element::new("pre");
            pre.children.push(MarkupNode::Element(code));
            out.push(MarkupNode::Element(pre));
        }
        NodeKind::Table => out.push(wrap("table", node)),
        NodeKind::TableHead => {
            // Header cells arrive as direct children; wrap them in a row.
            let mut row = Element::new("tr");
            row.children = children_of(node);
            let mut head = Element::new("thead");
            head.children.push(MarkupNode::Element(row));
            out.push(MarkupNode::Element(head));
        }
        NodeKind::TableRow => out.push(wrap("tr", node)),
        NodeKind::TableCell => out.push(wrap("td", node)),
        NodeKind::Yaml { .. } => {}
        NodeKind::ContainerDirective { .. } | NodeKind::LeafDirective { .. } => {
            out.push(annotated_element(node, "div"))
        }
        NodeKind::TextDirective { .. } => out.push(annotated_element(node, "span")),
        NodeKind::Html { value } => out.push(MarkupNode::Raw(value.clone())),
        NodeKind::ThematicBreak => out.push(MarkupNode::Element(Element::new("hr"))),
        NodeKind::SoftBreak => out.push(MarkupNode::Text("\n".to_string())),
        NodeKind::HardBreak => out.push(MarkupNode::Element(Element::new("br"))),
    }
}

fn wrap(tag: &str, node: &Node) -> MarkupNode {
    let mut element = Element::new(tag);
    if let Some(class) = &node.annotation.class {
        element.attrs.push(("class".to_string(), class.clone()));
    }
    element.children = children_of(node);
    MarkupNode::Element(element)
}

fn annotated_element(node: &Node, default_tag: &str) -> MarkupNode {
    let tag = node.annotation.element.as_deref().unwrap_or(default_tag);
    let mut element = Element::new(tag);
    if let Some(id) = &node.annotation.id {
        element.attrs.push(("id".to_string(), id.clone()));
    }
    if let Some(class) = &node.annotation.class {
        element.attrs.push(("class".to_string(), class.clone()));
    }
    element.children = children_of(node);
    MarkupNode::Element(element)
}

fn children_of(node: &Node) -> Vec<MarkupNode> {
    let mut out = Vec::new();
    for child in &node.children {
        convert(child, &mut out);
    }
    out
}

/// Wrap every heading element's content in a self-referential anchor.
///
/// Applies uniformly regardless of document kind; the identifier is read
/// back off the element rather than recomputed.
pub fn add_heading_anchors(nodes: &mut Vec<MarkupNode>) {
    for node in nodes {
        if let MarkupNode::Element(element) = node {
            add_heading_anchors(&mut element.children);
            if !is_heading_tag(&element.tag) {
                continue;
            }
            if let Some(id) = element.attr("id").map(str::to_string) {
                let mut anchor = Element::new("a");
                anchor.attrs.push(("href".to_string(), format!("#{}", id)));
                anchor
                    .attrs
                    .push(("class".to_string(), "heading-anchor".to_string()));
                anchor.children = std::mem::take(&mut element.children);
                element.children = vec![MarkupNode::Element(anchor)];
            }
        }
    }
}

fn is_heading_tag(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Serialize a markup fragment to an HTML string.
pub fn render(nodes: &[MarkupNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(node, &mut out);
    }
    out
}

fn render_node(node: &MarkupNode, out: &mut String) {
    match node {
        MarkupNode::Text(text) => out.push_str(&escape_html(text)),
        MarkupNode::Raw(raw) => out.push_str(raw),
        MarkupNode::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_html(value));
                out.push('"');
            }
            if is_void_tag(&element.tag) {
                out.push_str(" />");
            } else {
                out.push('>');
                for child in &element.children {
                    render_node(child, out);
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
            if is_block_tag(&element.tag) {
                out.push('\n');
            }
        }
    }
}

fn is_void_tag(tag: &str) -> bool {
    matches!(tag, "img" | "br" | "hr")
}

fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "ul"
            | "ol"
            | "li"
            | "blockquote"
            | "pre"
            | "hr"
            | "div"
            | "table"
            | "thead"
            | "tr"
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
