//! Directive normalization.
//!
//! Rewrites recognized directive nodes into annotated structural nodes.
//! Unrecognized names pass through untouched and are reported for
//! observability. Synchronous; sibling directives are independent.

use crate::ast::{Node, NodeKind};
use crate::pipeline::PipelineError;
use std::collections::HashMap;

enum Form {
    Container,
    Leaf,
    Text,
}

/// Visit every directive node and rewrite the recognized ones.
pub fn normalize(tree: &mut Node) -> Result<(), PipelineError> {
    let mut failure: Option<PipelineError> = None;
    tree.visit_mut(&mut |node| {
        if failure.is_some() {
            return;
        }
        if let Err(err) = rewrite(node) {
            failure = Some(err);
        }
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn rewrite(node: &mut Node) -> Result<(), PipelineError> {
    let (form, name, attrs) = match &node.kind {
        NodeKind::ContainerDirective { name, attrs } => {
            (Form::Container, name.clone(), attrs.clone())
        }
        NodeKind::LeafDirective { name, attrs } => (Form::Leaf, name.clone(), attrs.clone()),
        NodeKind::TextDirective { name, attrs } => (Form::Text, name.clone(), attrs.clone()),
        _ => return Ok(()),
    };

    match (form, name.as_str()) {
        (Form::Container, "example") => {
            node.annotation.class = Some("example-block".to_string());
        }
        (Form::Container, "thumbnail") => {
            let title = require_attr(&attrs, "thumbnail", "title")?.to_string();
            require_attr(&attrs, "thumbnail", "url")?;
            node.annotation.class = Some("thumbnail".to_string());
            node.children
                .insert(0, Node::heading(2, vec![Node::text(title)]));
        }
        (Form::Leaf, "example") => {
            node.annotation.class = Some("example-note".to_string());
            node.children = vec![Node::text("example")];
        }
        (Form::Leaf, "youtube") => {
            let id = require_attr(&attrs, "youtube", "id")?.to_string();
            node.annotation.class = Some("youtube-embed".to_string());
            node.children = vec![Node::new(NodeKind::Html {
                value: format!(
                    "<iframe src=\"https://www.youtube-nocookie.com/embed/{}\" \
                     title=\"YouTube video\" allowfullscreen></iframe>",
                    id
                ),
            })];
        }
        (Form::Text, "example") => {
            node.annotation.element = Some("span".to_string());
            node.annotation.class = Some("example-inline".to_string());
            node.children = vec![Node::text("example")];
        }
        _ => {
            tracing::warn!("unhandled directive: {}", name);
        }
    }

    Ok(())
}

fn require_attr<'a>(
    attrs: &'a HashMap<String, String>,
    directive: &str,
    attribute: &str,
) -> Result<&'a str, PipelineError> {
    attrs
        .get(attribute)
        .map(String::as_str)
        .ok_or_else(|| PipelineError::MissingAttribute {
            directive: directive.to_string(),
            attribute: attribute.to_string(),
        })
}
