//! Reference collection and favicon resolution.
//!
//! Two strictly ordered traversal phases over the tree: images first, then
//! links. Favicon resolutions are issued concurrently within a phase, but
//! results are written back in pre-order traversal order so concurrency can
//! never reorder the reference list.

use crate::ast::{Node, NodeKind};
use crate::favicon::FaviconResolver;
use crate::metadata::PageKind;
use crate::pipeline::DocumentContext;
use crate::site::Reference;
use futures::future::join_all;
use std::collections::HashMap;

/// Collect references from image and link nodes, resolving an icon for
/// each, and append a References section to non-excerpt documents.
///
/// Skipped entirely for `kind: page` documents.
pub async fn collect(
    tree: &mut Node,
    ctx: &mut DocumentContext,
    favicons: &FaviconResolver,
    site_url: &str,
) {
    if ctx.metadata.kind == PageKind::Page {
        return;
    }

    // The image phase must complete before the link phase inserts its own
    // icon images, or those icons would be captured as spurious references.
    let mut images: Vec<(String, String)> = Vec::new();
    tree.visit(&mut |node| {
        if let NodeKind::Image { url, alt } = &node.kind {
            let name = if alt.is_empty() {
                url.clone()
            } else {
                alt.clone()
            };
            images.push((url.clone(), name));
        }
    });

    let icons = join_all(images.iter().map(|(url, _)| favicons.resolve(url))).await;
    for ((url, name), icon) in images.into_iter().zip(icons) {
        ctx.references.push(Reference {
            url,
            name: Some(name),
            icon_path: Some(icon),
        });
    }

    let mut links: Vec<(String, String)> = Vec::new();
    tree.visit(&mut |node| {
        if let NodeKind::Link { url, .. } = &node.kind {
            links.push((url.clone(), node.text_content()));
        }
    });

    let icons = join_all(links.iter().map(|(url, _)| async move {
        if url.starts_with('#') {
            // Self-link; resolves to the site itself, no fetch.
            site_url.to_string()
        } else {
            favicons.resolve(url).await
        }
    }))
    .await;

    // Splice each link's icon in traversal order: the i-th link node gets
    // the i-th resolution.
    let mut index = 0;
    tree.visit_mut(&mut |node| {
        if let NodeKind::Link { .. } = &node.kind {
            if let Some(icon) = icons.get(index) {
                let original = std::mem::take(&mut node.children);
                let mut wrapper = Node::parent(
                    NodeKind::TextDirective {
                        name: "span".to_string(),
                        attrs: HashMap::new(),
                    },
                    original,
                );
                wrapper.annotation.element = Some("span".to_string());
                wrapper.annotation.class = Some("name".to_string());
                node.children = vec![icon_image(icon), wrapper];
            }
            index += 1;
        }
    });

    for ((url, name), icon) in links.into_iter().zip(icons.iter()) {
        ctx.references.push(Reference {
            url,
            name: Some(name),
            icon_path: Some(icon.clone()),
        });
    }

    if ctx.metadata.kind == PageKind::Excerpt || ctx.references.is_empty() {
        return;
    }
    append_references_section(tree, &ctx.references);
}

fn icon_image(path: &str) -> Node {
    let mut node = Node::new(NodeKind::Image {
        url: path.to_string(),
        alt: String::new(),
    });
    node.annotation.class = Some("icon".to_string());
    node
}

fn append_references_section(tree: &mut Node, references: &[Reference]) {
    tree.children
        .push(Node::heading(2, vec![Node::text("References")]));

    let items = references
        .iter()
        .map(|reference| {
            let label = reference
                .name
                .clone()
                .unwrap_or_else(|| reference.url.clone());

            let mut link_children = Vec::new();
            if let Some(icon) = &reference.icon_path {
                link_children.push(icon_image(icon));
            }
            link_children.push(Node::text(label.clone()));

            let link = Node::parent(
                NodeKind::Link {
                    url: reference.url.clone(),
                    title: Some(label),
                },
                link_children,
            );
            Node::parent(
                NodeKind::ListItem,
                vec![Node::parent(NodeKind::Paragraph, vec![link])],
            )
        })
        .collect();

    tree.children
        .push(Node::parent(NodeKind::List { ordered: false }, items));
}
