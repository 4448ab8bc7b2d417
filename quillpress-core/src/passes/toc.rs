//! Table-of-contents generation.
//!
//! Walks headings in document order, assigns stable identifiers, organizes
//! depth ≥ 2 headings into a forest, and splices the rendered contents list
//! directly after the title heading.

use crate::anchor::anchor_id;
use crate::ast::{Node, NodeKind};
use crate::metadata::{PageKind, PageMetadata};

struct TocEntry {
    id: String,
    text: String,
    children: Vec<TocEntry>,
}

/// Assign heading identifiers and insert the table of contents.
///
/// Skipped for `kind: page` documents. Depth-1 headings receive an
/// identifier but stay out of the forest; they only anchor the insertion
/// point. Nesting follows depth, tolerating skipped levels.
pub fn insert(tree: &mut Node, metadata: &PageMetadata) {
    if metadata.kind == PageKind::Page {
        return;
    }

    let mut forest: Vec<TocEntry> = Vec::new();
    tree.visit_mut(&mut |node| {
        if let NodeKind::Heading { depth } = &node.kind {
            let depth = *depth;
            let text = node.text_content();
            let id = anchor_id(&text);
            node.annotation.id = Some(id.clone());
            node.annotation.class = Some("section-header".to_string());

            if depth == 1 {
                return;
            }

            // Descend into the last-added entry's child list until the
            // tracked depth lines up with this heading's depth.
            let mut cursor = &mut forest;
            let mut level = 1u8;
            while !cursor.is_empty() && level + 1 < depth {
                let last = cursor.len() - 1;
                cursor = &mut cursor[last].children;
                level += 1;
            }
            cursor.push(TocEntry {
                id,
                text,
                children: Vec::new(),
            });
        }
    });

    if forest.is_empty() {
        return;
    }

    let contents = render_entries(&forest);
    let title_index = tree
        .children
        .iter()
        .position(|n| matches!(n.kind, NodeKind::Heading { depth: 1 }));
    if let Some(index) = title_index {
        tree.children.insert(index + 1, contents);
    }
}

fn render_entries(entries: &[TocEntry]) -> Node {
    Node::parent(
        NodeKind::List { ordered: true },
        entries.iter().map(render_entry).collect(),
    )
}

fn render_entry(entry: &TocEntry) -> Node {
    let link = Node::parent(
        NodeKind::Link {
            url: format!("#{}", entry.id),
            title: Some(entry.text.clone()),
        },
        vec![Node::text(entry.text.clone())],
    );

    let mut children = vec![Node::parent(NodeKind::Paragraph, vec![link])];
    if !entry.children.is_empty() {
        children.push(render_entries(&entry.children));
    }
    Node::parent(NodeKind::ListItem, children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::PageMetadata;
    use crate::parse::parse_document;

    fn post() -> PageMetadata {
        PageMetadata::default()
    }

    fn page() -> PageMetadata {
        PageMetadata {
            kind: PageKind::Page,
            ..PageMetadata::default()
        }
    }

    /// Top-level list items of the inserted contents list, each with its
    /// number of nested subsection items.
    fn toc_shape(tree: &Node) -> Vec<(String, usize)> {
        let contents = tree
            .children
            .iter()
            .find(|n| matches!(n.kind, NodeKind::List { ordered: true }))
            .expect("contents list present");
        contents
            .children
            .iter()
            .map(|item| {
                let label = item.children[0].text_content();
                let nested = item
                    .children
                    .iter()
                    .filter(|c| matches!(c.kind, NodeKind::List { .. }))
                    .map(|sub| sub.children.len())
                    .sum();
                (label, nested)
            })
            .collect()
    }

    #[test]
    fn test_forest_nesting_with_depth_jumps() {
        let source = "# Title\n\n## A\n\n### A1\n\n## B\n\n## C\n\n### C1\n";
        let mut tree = parse_document(source);
        insert(&mut tree, &post());

        let shape = toc_shape(&tree);
        assert_eq!(
            shape,
            vec![
                ("A".to_string(), 1),
                ("B".to_string(), 0),
                ("C".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_skipped_depth_levels_still_nest() {
        // A depth-3 heading with no preceding depth-2 lands at the top of
        // the forest.
        let mut tree = parse_document("# Title\n\n### Deep\n\n## Shallow\n");
        insert(&mut tree, &post());

        let shape = toc_shape(&tree);
        assert_eq!(
            shape,
            vec![("Deep".to_string(), 0), ("Shallow".to_string(), 0)]
        );
    }

    #[test]
    fn test_contents_inserted_after_title() {
        let mut tree = parse_document("intro paragraph\n\n# Title\n\n## Section\n");
        insert(&mut tree, &post());

        let title_index = tree
            .children
            .iter()
            .position(|n| matches!(n.kind, NodeKind::Heading { depth: 1 }))
            .unwrap();
        assert!(matches!(
            tree.children[title_index + 1].kind,
            NodeKind::List { ordered: true }
        ));
    }

    #[test]
    fn test_heading_annotations() {
        let mut tree = parse_document("# Main Title\n\n## Sub Section\n");
        insert(&mut tree, &post());

        let title = &tree.children[0];
        assert_eq!(title.annotation.id.as_deref(), Some("Main_Title"));
        assert_eq!(title.annotation.class.as_deref(), Some("section-header"));

        let sub = tree
            .children
            .iter()
            .find(|n| matches!(n.kind, NodeKind::Heading { depth: 2 }))
            .unwrap();
        assert_eq!(sub.annotation.id.as_deref(), Some("Sub_Section"));
    }

    #[test]
    fn test_toc_links_point_at_ids() {
        let mut tree = parse_document("# Title\n\n## Sub Section\n");
        insert(&mut tree, &post());

        let mut hrefs = Vec::new();
        tree.visit(&mut |node| {
            if let NodeKind::Link { url, .. } = &node.kind {
                hrefs.push(url.clone());
            }
        });
        assert_eq!(hrefs, vec!["#Sub_Section".to_string()]);
    }

    #[test]
    fn test_no_subsections_inserts_nothing() {
        let mut tree = parse_document("# Title\n\nbody\n");
        let count = tree.children.len();
        insert(&mut tree, &post());
        assert_eq!(tree.children.len(), count);
    }

    #[test]
    fn test_pages_are_skipped() {
        let mut tree = parse_document("# Title\n\n## Section\n");
        let before = tree.clone();
        insert(&mut tree, &page());
        assert_eq!(tree, before);
    }

    #[test]
    fn test_no_title_heading_inserts_nothing() {
        let mut tree = parse_document("## Only Subsections\n\n### Here\n");
        insert(&mut tree, &post());
        assert!(!tree
            .children
            .iter()
            .any(|n| matches!(n.kind, NodeKind::List { .. })));
        // Identifiers are still assigned.
        assert!(tree.children[0].annotation.id.is_some());
    }
}
