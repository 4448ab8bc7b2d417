//! Metadata and title extraction.

use crate::ast::{Node, NodeKind};
use crate::metadata::PageMetadata;
use crate::pipeline::{DocumentContext, PipelineError};

/// Scan top-level nodes once, decoding structured-data blocks into the
/// context's metadata holder and recording the title heading.
///
/// The last structured-data block and the last depth-1 heading win. No
/// nodes are removed or mutated; when no depth-1 heading exists the title
/// keeps the caller-supplied fallback.
pub fn extract(tree: &Node, ctx: &mut DocumentContext) -> Result<(), PipelineError> {
    for node in &tree.children {
        match &node.kind {
            NodeKind::Yaml { value } => {
                let metadata: PageMetadata = serde_yaml::from_str(value)?;
                ctx.metadata = metadata;
            }
            NodeKind::Heading { depth: 1 } => {
                ctx.title = node.text_content();
            }
            _ => {}
        }
    }
    Ok(())
}
