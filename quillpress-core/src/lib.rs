//! # quillpress-core
//!
//! Core library for the quillpress static site generator.
//!
//! This crate provides the document transformation pipeline: markdown
//! parsing into a typed tree, the ordered rewriting passes (metadata,
//! directives, references with favicon resolution, table of contents),
//! markup serialization, and the site builder that ties them together.

pub mod anchor;
pub mod ast;
pub mod builder;
pub mod config;
pub mod favicon;
pub mod markup;
pub mod metadata;
pub mod parse;
pub mod passes;
pub mod pipeline;
pub mod site;

pub use anchor::anchor_id;
pub use builder::{BuildError, SiteBuilder};
pub use config::Config;
pub use favicon::FaviconResolver;
pub use metadata::{PageKind, PageMetadata};
pub use pipeline::{process_document, DocumentContext, PipelineError, RenderedDocument};
pub use site::{Reference, Resource, SiteError, Website};
