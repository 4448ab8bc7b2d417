//! # quillpress-render
//!
//! Template rendering library for quillpress.
//!
//! This crate handles HTML page-shell rendering using Askama: wrapping a
//! rendered content fragment in the site chrome, plus the generated index
//! and tags pages.

pub mod templates;

pub use templates::{IndexTemplate, PageTemplate, PostPreview, TagGroup, TagsTemplate};
