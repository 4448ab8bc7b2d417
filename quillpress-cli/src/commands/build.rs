//! Build command implementation.

use anyhow::{Context, Result};
use askama::Template;
use chrono::NaiveDate;
use quillpress_core::{anchor_id, Config, Resource, SiteBuilder, Website};
use quillpress_render::{IndexTemplate, PageTemplate, PostPreview, TagGroup, TagsTemplate};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Build the static site (writes output) and discard the in-memory model.
pub async fn build_site(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    build_site_with_config(config).await.map(|_| ())
}

pub fn load_config(config_path: &Path) -> Result<Config> {
    tracing::info!("Loading config from {:?}", config_path);
    Config::from_file(config_path).context("Failed to load configuration")
}

/// Build the site from an already loaded config, writing output and
/// returning the website model.
pub async fn build_site_with_config(config: Config) -> Result<Website> {
    tracing::info!("Building site: {}", config.site.name);

    let builder = SiteBuilder::new(config.clone());
    let website = builder.build().await.context("Failed to build site")?;

    let output_dir = config.output_dir();
    fs::create_dir_all(&output_dir).context("Failed to create output directory")?;

    // Compile every resource into the output store.
    for resource in &website.resources {
        match resource {
            Resource::Html {
                route,
                name,
                content,
                ..
            } => {
                let html = PageTemplate {
                    title: name.clone(),
                    site_name: config.site.name.clone(),
                    content: content.clone(),
                }
                .render()
                .context("Failed to render page template")?;

                let path = output_dir.join(route);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, html)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                tracing::debug!("Compiled: {}", route);
            }
            Resource::Raw { route, .. } => {
                let source = config.content_dir().join(route);
                let target = output_dir.join(route);
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(&source, &target)
                    .with_context(|| format!("Failed to copy {:?} to {:?}", source, target))?;
                tracing::debug!("Copied: {}", route);
            }
        }
    }

    // Generated pages: index (newest posts first) and tags.
    let mut posts: Vec<PostPreview> = website
        .resources
        .iter()
        .filter_map(PostPreview::from_resource)
        .collect();
    posts.sort_by(|a, b| parse_date(&b.date).cmp(&parse_date(&a.date)));

    render_tags_page(&config, &posts)?;
    generate_previews_json(&config, &posts)?;

    let post_count = posts.len();
    let index = IndexTemplate {
        site_name: config.site.name.clone(),
        posts,
    }
    .render()
    .context("Failed to render index template")?;
    fs::write(output_dir.join("index.html"), index).context("Failed to write index.html")?;

    tracing::info!("✓ Built {} posts", post_count);
    tracing::info!("✓ Output written to {:?}", output_dir);

    Ok(website)
}

fn parse_date(date: &Option<String>) -> Option<NaiveDate> {
    date.as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

/// Generate previews.json for link previews and machine consumers.
fn generate_previews_json(config: &Config, posts: &[PostPreview]) -> Result<()> {
    use serde_json::json;

    let mut previews = serde_json::Map::new();
    for post in posts {
        previews.insert(
            post.route.clone(),
            json!({
                "title": post.title,
                "date": post.date,
                "tags": post.tags,
                "summary": post.summary,
            }),
        );
    }

    let json =
        serde_json::to_string_pretty(&previews).context("Failed to serialize previews")?;
    fs::write(config.output_dir().join("previews.json"), json)
        .context("Failed to write previews.json")?;

    tracing::info!("Generated previews.json");
    Ok(())
}

fn render_tags_page(config: &Config, posts: &[PostPreview]) -> Result<()> {
    let mut by_tag: BTreeMap<String, Vec<PostPreview>> = BTreeMap::new();
    for post in posts {
        for tag in &post.tags {
            by_tag.entry(tag.clone()).or_default().push(post.clone());
        }
    }

    let groups = by_tag
        .into_iter()
        .map(|(tag, posts)| TagGroup {
            anchor: anchor_id(&tag),
            tag,
            posts,
        })
        .collect();

    let html = TagsTemplate {
        site_name: config.site.name.clone(),
        groups,
    }
    .render()
    .context("Failed to render tags template")?;
    fs::write(config.output_dir().join("tags.html"), html).context("Failed to write tags.html")?;

    Ok(())
}
