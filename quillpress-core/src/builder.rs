//! Site building logic - walks the content tree, runs the document
//! pipeline, and assembles the website model.

use crate::config::Config;
use crate::favicon::FaviconResolver;
use crate::pipeline::{self, PipelineError};
use crate::site::{Resource, SiteError, Website};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Site error: {0}")]
    Site(#[from] SiteError),
}

/// Main site builder.
pub struct SiteBuilder {
    config: Config,
    favicons: FaviconResolver,
}

impl SiteBuilder {
    pub fn new(config: Config) -> Self {
        let favicons = FaviconResolver::new(
            config.output_dir(),
            config.placeholder_favicon.clone(),
        );
        Self { config, favicons }
    }

    /// Build the website model from the content directory.
    ///
    /// Per-document failures are isolated: one malformed document is
    /// logged and skipped without aborting its siblings.
    pub async fn build(&self) -> Result<Website, BuildError> {
        std::fs::create_dir_all(self.config.output_dir())?;

        let files = self.discover_files()?;
        tracing::info!("Found {} source files", files.len());

        let mut website = Website::new(
            self.config.site.url.clone(),
            self.config.site.name.clone(),
        );

        for rel in &files {
            match self.construct_resource(rel).await {
                Ok(resource) => {
                    if let Err(err) = website.add_resource(resource) {
                        tracing::error!("Failed to add {}: {}", rel.display(), err);
                    }
                }
                Err(err) => {
                    tracing::error!("Failed to construct {}: {}", rel.display(), err);
                    // Continue with other files
                }
            }
        }

        tracing::info!("Built website with {} resources", website.resources.len());
        Ok(website)
    }

    /// Discover all source files in the content directory.
    fn discover_files(&self) -> Result<Vec<PathBuf>, BuildError> {
        let content_dir = self.config.content_dir();
        let mut files = Vec::new();

        for entry in WalkDir::new(&content_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let rel = entry
                .path()
                .strip_prefix(&content_dir)
                .unwrap_or(entry.path())
                .to_path_buf();
            files.push(rel);
        }

        Ok(files)
    }

    async fn construct_resource(&self, rel: &Path) -> Result<Resource, BuildError> {
        if rel.extension().and_then(|e| e.to_str()) == Some("md") {
            self.construct_markdown(rel).await
        } else {
            let route = path_to_route(rel);
            Ok(Resource::Raw {
                name: route.clone(),
                route,
                references: Vec::new(),
            })
        }
    }

    async fn construct_markdown(&self, rel: &Path) -> Result<Resource, BuildError> {
        let source = std::fs::read_to_string(self.config.content_dir().join(rel))?;

        // Fall back to the filename stem when the document has no title
        // heading of its own.
        let stem = rel
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled")
            .to_string();

        let document = pipeline::process_document(
            &source,
            &stem,
            &self.config.site.url,
            &self.favicons,
        )
        .await?;

        Ok(Resource::Html {
            route: path_to_route(&rel.with_extension("html")),
            name: document.title,
            references: document.references,
            metadata: document.metadata,
            content: document.html,
        })
    }
}

/// Forward-slash route for a content-relative path.
fn path_to_route(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
