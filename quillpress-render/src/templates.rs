//! Askama template definitions.

use askama::Template;
use quillpress_core::{PageKind, Resource};

/// A post entry for display in preview lists.
#[derive(Debug, Clone)]
pub struct PostPreview {
    pub route: String,
    pub title: String,
    pub date: Option<String>,
    pub tags: Vec<String>,
    pub summary: Option<String>,
}

impl PostPreview {
    /// Preview entry for a built resource; `None` for raw assets and for
    /// documents that are not posts.
    pub fn from_resource(resource: &Resource) -> Option<Self> {
        match resource {
            Resource::Html {
                route,
                name,
                metadata,
                ..
            } if metadata.kind == PageKind::Post => Some(Self {
                route: route.clone(),
                title: name.clone(),
                date: metadata.published_date.clone(),
                tags: metadata.tags.clone().unwrap_or_default(),
                summary: metadata.abstract_.clone(),
            }),
            _ => None,
        }
    }
}

/// Posts grouped under one tag on the tags page.
#[derive(Debug, Clone)]
pub struct TagGroup {
    pub tag: String,
    /// Fragment identifier for linking directly to the group.
    pub anchor: String,
    pub posts: Vec<PostPreview>,
}

/// Page shell wrapping a rendered content fragment.
#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub title: String,
    pub site_name: String,
    pub content: String,
}

/// Index page template: all post previews, newest first.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub site_name: String,
    pub posts: Vec<PostPreview>,
}

/// Tags page template.
#[derive(Template)]
#[template(path = "tags.html")]
pub struct TagsTemplate {
    pub site_name: String,
    pub groups: Vec<TagGroup>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview() -> PostPreview {
        PostPreview {
            route: "first-post.html".into(),
            title: "First Post".into(),
            date: Some("2025-11-02".into()),
            tags: vec!["rust".into()],
            summary: Some("An opening entry.".into()),
        }
    }

    #[test]
    fn test_page_template_embeds_fragment() {
        let html = PageTemplate {
            title: "Hello".into(),
            site_name: "Example".into(),
            content: "<p>frag</p>".into(),
        }
        .render()
        .unwrap();

        assert!(html.contains("<title>Hello — Example</title>"));
        assert!(html.contains("<p>frag</p>"));
    }

    #[test]
    fn test_index_template_lists_posts() {
        let html = IndexTemplate {
            site_name: "Example".into(),
            posts: vec![preview()],
        }
        .render()
        .unwrap();

        assert!(html.contains("href=\"first-post.html\""));
        assert!(html.contains("First Post"));
        assert!(html.contains("2025-11-02"));
        assert!(html.contains("An opening entry."));
    }

    #[test]
    fn test_tags_template_groups_posts() {
        let html = TagsTemplate {
            site_name: "Example".into(),
            groups: vec![TagGroup {
                tag: "rust".into(),
                anchor: "rust".into(),
                posts: vec![preview()],
            }],
        }
        .render()
        .unwrap();

        assert!(html.contains("id=\"rust\""));
        assert!(html.contains("First Post"));
    }
}
