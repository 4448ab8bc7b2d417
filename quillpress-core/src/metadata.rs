//! Document metadata decoded from structured-data blocks.

use serde::{Deserialize, Serialize};

/// What kind of document a source file describes.
///
/// Pages are standalone (no reference appendix, no table of contents);
/// posts get the full pipeline; excerpts collect references but render no
/// appendix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Page,
    #[default]
    Post,
    Excerpt,
}

impl PageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageKind::Page => "page",
            PageKind::Post => "post",
            PageKind::Excerpt => "excerpt",
        }
    }
}

/// Metadata record for a single document.
///
/// Decoded from the leading YAML block when one is present; `kind` is
/// required there, everything else optional. Unknown keys are ignored.
/// Documents without a block keep the default (`kind: post`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMetadata {
    pub kind: PageKind,

    #[serde(default, rename = "publishedDate")]
    pub published_date: Option<String>,

    #[serde(default)]
    pub tags: Option<Vec<String>>,

    #[serde(default, rename = "abstract")]
    pub abstract_: Option<String>,
}
