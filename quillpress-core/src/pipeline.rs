//! Document pipeline: parse, transform, serialize.
//!
//! Flow: raw text → parse → [metadata & title] → [directives] →
//! [references & favicons] → [table of contents] → markup bridge →
//! [heading anchors] → HTML fragment.
//!
//! Passes execute strictly in this order; later passes depend on
//! side-channel state the earlier ones wrote into the [`DocumentContext`].

use crate::favicon::FaviconResolver;
use crate::markup;
use crate::metadata::PageMetadata;
use crate::parse;
use crate::passes;
use crate::site::Reference;
use thiserror::Error;

/// Errors that abort a single document's pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A structured-data block did not decode to the metadata schema.
    #[error("invalid metadata block: {0}")]
    MetadataParse(#[from] serde_yaml::Error),

    /// A directive lacked an attribute it requires.
    #[error("directive `{directive}` is missing required attribute `{attribute}`")]
    MissingAttribute {
        directive: String,
        attribute: String,
    },
}

/// Shared derived state threaded through the passes of one document run.
///
/// Owned by a single document's pipeline invocation; populated
/// monotonically by passes and read by later ones. Never shared across
/// documents.
#[derive(Debug)]
pub struct DocumentContext {
    pub metadata: PageMetadata,
    pub title: String,
    pub references: Vec<Reference>,
}

impl DocumentContext {
    /// New context with the caller-supplied title fallback (typically the
    /// filename stem) and default `kind: post` metadata.
    pub fn new(fallback_title: impl Into<String>) -> Self {
        Self {
            metadata: PageMetadata::default(),
            title: fallback_title.into(),
            references: Vec::new(),
        }
    }
}

/// Everything the pipeline derives from one source document.
#[derive(Debug)]
pub struct RenderedDocument {
    pub title: String,
    pub metadata: PageMetadata,
    pub references: Vec<Reference>,
    pub html: String,
}

/// Run the full pipeline over one document's source text.
pub async fn process_document(
    source: &str,
    fallback_title: &str,
    site_url: &str,
    favicons: &FaviconResolver,
) -> Result<RenderedDocument, PipelineError> {
    let mut tree = parse::parse_document(source);
    let mut ctx = DocumentContext::new(fallback_title);

    passes::metadata::extract(&tree, &mut ctx)?;
    passes::directives::normalize(&mut tree)?;
    passes::references::collect(&mut tree, &mut ctx, favicons, site_url).await;
    passes::toc::insert(&mut tree, &ctx.metadata);

    let mut fragment = markup::to_markup(&tree);
    markup::add_heading_anchors(&mut fragment);
    let html = markup::render(&fragment);

    Ok(RenderedDocument {
        title: ctx.title,
        metadata: ctx.metadata,
        references: ctx.references,
        html,
    })
}
