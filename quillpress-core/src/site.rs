//! Site model: resources, references, and the website they belong to.

use crate::metadata::PageMetadata;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("a resource already exists at route: {0}")]
    DuplicateRoute(String),
}

/// An outbound link or image target recorded while processing a document,
/// enriched with a resolved icon path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub url: String,
    pub name: Option<String>,
    pub icon_path: Option<String>,
}

/// A thing that exists in a website.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Resource {
    /// A renderable document: an HTML fragment plus derived data.
    Html {
        route: String,
        name: String,
        references: Vec<Reference>,
        metadata: PageMetadata,
        content: String,
    },
    /// A passthrough asset copied to the output store untouched.
    Raw {
        route: String,
        name: String,
        references: Vec<Reference>,
    },
}

impl Resource {
    pub fn route(&self) -> &str {
        match self {
            Resource::Html { route, .. } | Resource::Raw { route, .. } => route,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Resource::Html { name, .. } | Resource::Raw { name, .. } => name,
        }
    }
}

/// Everything that describes a website.
#[derive(Debug, Clone, Serialize)]
pub struct Website {
    pub url: String,
    pub name: String,
    pub resources: Vec<Resource>,
}

impl Website {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            resources: Vec::new(),
        }
    }

    /// Add a resource, rejecting a second resource at the same route.
    pub fn add_resource(&mut self, resource: Resource) -> Result<(), SiteError> {
        if self
            .resources
            .iter()
            .any(|existing| existing.route() == resource.route())
        {
            return Err(SiteError::DuplicateRoute(resource.route().to_string()));
        }
        self.resources.push(resource);
        Ok(())
    }

    pub fn find_by_route(&self, route: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.route() == route)
    }
}
