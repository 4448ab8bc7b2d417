//! Favicon discovery, download, and output-store caching.

use base64::Engine as _;
use reqwest::Url;
use scraper::{Html, Selector};
use std::path::{Path, PathBuf};

/// Local asset recorded for root-relative reference targets.
const LOCAL_FAVICON: &str = "favicon.ico";

/// Icon `<link>` selectors, in priority order.
const ICON_SELECTORS: &[&str] = &[
    r#"link[rel="icon"]"#,
    r#"link[rel="shortcut icon"]"#,
    r#"link[rel="apple-touch-icon"]"#,
    r#"link[rel="apple-touch-icon-precomposed"]"#,
    r#"link[rel="mask-icon"]"#,
];

/// Resolves a representative icon for external reference targets and
/// persists it into the output store.
///
/// Resolution is cached by destination file: names derive from the target
/// hostname, and an existing destination file skips all network activity.
pub struct FaviconResolver {
    client: reqwest::Client,
    output_dir: PathBuf,
    placeholder: String,
}

impl FaviconResolver {
    pub fn new(output_dir: PathBuf, placeholder: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            output_dir,
            placeholder,
        }
    }

    /// Resolve the icon path recorded for a reference target.
    ///
    /// Never fails: anything that prevents discovery or download is logged
    /// and degrades to the placeholder asset path.
    pub async fn resolve(&self, target: &str) -> String {
        if target.starts_with('/') {
            return LOCAL_FAVICON.to_string();
        }

        let url = match Url::parse(target) {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!("unparseable reference target {}: {}", target, err);
                return self.placeholder.clone();
            }
        };
        let host = match url.host_str() {
            Some(host) => host.to_string(),
            None => return self.placeholder.clone(),
        };

        if let Some(cached) = find_cached(&self.output_dir, &host) {
            tracing::debug!("favicon cache hit for {}: {}", host, cached);
            return cached;
        }

        let domain = registrable_domain(&host);
        let favicon_url = match self.discover(url.scheme(), &domain).await {
            Some(found) => found,
            None => {
                tracing::warn!("no favicon discoverable for {}", domain);
                return self.placeholder.clone();
            }
        };

        match self.persist(&host, &favicon_url).await {
            Some(name) => name,
            None => self.placeholder.clone(),
        }
    }

    /// Discover a favicon URL for a domain: home-page `<link>` extraction
    /// first, then a `/favicon.ico` existence probe.
    async fn discover(&self, scheme: &str, domain: &str) -> Option<String> {
        let page_url = match Url::parse(&format!("{}://{}", scheme, domain)) {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!("invalid favicon page url for {}: {}", domain, err);
                return None;
            }
        };

        let response = match self.client.get(page_url.clone()).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!("favicon page fetch for {} failed: {}", domain, err);
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::debug!(
                "favicon page fetch for {} returned {}",
                domain,
                response.status()
            );
            return None;
        }
        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase().contains("text/html"))
            .unwrap_or(false);
        if !is_html {
            tracing::debug!("favicon page for {} is not html", domain);
            return None;
        }
        let body = response.text().await.ok()?;

        if let Some(href) = extract_icon_href(&body, &page_url) {
            return Some(href);
        }

        // No icon link declared; probe the well-known path. A lightweight
        // HEAD first, then a body-discarding GET if HEAD is unsupported.
        let fallback = page_url.join("/favicon.ico").ok()?;
        if let Ok(response) = self.client.head(fallback.clone()).send().await {
            if response.status().is_success() {
                return Some(fallback.to_string());
            }
        }
        match self.client.get(fallback.clone()).send().await {
            Ok(response) if response.status().is_success() => Some(fallback.to_string()),
            _ => None,
        }
    }

    /// Download the favicon into the output store, unless the destination
    /// already exists.
    async fn persist(&self, host: &str, favicon_url: &str) -> Option<String> {
        let name = destination_name(host, &extension_of(favicon_url));
        let destination = self.output_dir.join(&name);
        if destination.exists() {
            return Some(name);
        }

        let bytes = if let Some(rest) = favicon_url.strip_prefix("data:") {
            decode_data_uri(rest)?
        } else {
            let response = match self.client.get(favicon_url).send().await {
                Ok(response) => response,
                Err(err) => {
                    tracing::warn!("favicon download from {} failed: {}", favicon_url, err);
                    return None;
                }
            };
            if !response.status().is_success() {
                tracing::warn!(
                    "favicon download from {} returned {}",
                    favicon_url,
                    response.status()
                );
                return None;
            }
            response.bytes().await.ok()?.to_vec()
        };

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await.ok()?;
        }
        match tokio::fs::write(&destination, bytes).await {
            Ok(()) => {
                tracing::info!("downloaded {} to {:?}", favicon_url, destination);
                Some(name)
            }
            Err(err) => {
                tracing::warn!("failed to write favicon {:?}: {}", destination, err);
                None
            }
        }
    }
}

/// Registrable domain: the last two dot-separated labels of a hostname.
pub(crate) fn registrable_domain(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() > 2 {
        labels[labels.len() - 2..].join(".")
    } else {
        host.to_string()
    }
}

/// Deterministic destination name for a hostname's favicon.
pub(crate) fn destination_name(host: &str, extension: &str) -> String {
    format!("{}_favicon.{}", host.replace('.', "_"), extension)
}

/// Look for an already-persisted favicon for this hostname, whatever its
/// extension turned out to be.
fn find_cached(output_dir: &Path, host: &str) -> Option<String> {
    let stem = format!("{}_favicon.", host.replace('.', "_"));
    let entries = std::fs::read_dir(output_dir).ok()?;
    for entry in entries.flatten() {
        let name = entry.file_name();
        if let Some(name) = name.to_str() {
            if name.starts_with(&stem) {
                return Some(name.to_string());
            }
        }
    }
    None
}

fn extension_of(favicon_url: &str) -> String {
    if let Some(rest) = favicon_url.strip_prefix("data:") {
        let mediatype = rest.split([';', ',']).next().unwrap_or_default();
        return match mediatype {
            "image/png" => "png",
            "image/gif" => "gif",
            "image/jpeg" => "jpg",
            "image/svg+xml" => "svg",
            "image/webp" => "webp",
            _ => "ico",
        }
        .to_string();
    }

    let path = favicon_url
        .split(['?', '#'])
        .next()
        .unwrap_or(favicon_url);
    match path.rsplit('/').next().and_then(|segment| segment.rsplit_once('.')) {
        Some((_, ext)) if !ext.is_empty() => ext.to_string(),
        _ => "ico".to_string(),
    }
}

fn decode_data_uri(rest: &str) -> Option<Vec<u8>> {
    let (meta, payload) = rest.split_once(',')?;
    if meta.ends_with(";base64") {
        match base64::engine::general_purpose::STANDARD.decode(payload) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                tracing::warn!("invalid base64 favicon data uri: {}", err);
                None
            }
        }
    } else {
        Some(
            percent_encoding::percent_decode_str(payload)
                .collect::<Vec<u8>>(),
        )
    }
}

/// Extract the first matching icon `<link>` from a fetched page, honoring
/// `data:` hrefs verbatim and resolving everything else against the page's
/// base URL.
fn extract_icon_href(html: &str, page_url: &Url) -> Option<String> {
    let document = Html::parse_document(html);
    let base = extract_base_url(&document, page_url).unwrap_or_else(|| page_url.clone());

    for selector_str in ICON_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        let Some(element) = document.select(&selector).next() else {
            continue;
        };
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if href.is_empty() {
            continue;
        }
        if href.starts_with("data:") {
            return Some(href.to_string());
        }
        if let Ok(resolved) = base.join(href) {
            return Some(resolved.to_string());
        }
    }

    None
}

fn extract_base_url(document: &Html, page_url: &Url) -> Option<Url> {
    let selector = Selector::parse("base[href]").ok()?;
    let href = document.select(&selector).next()?.value().attr("href")?;
    page_url
        .join(href)
        .ok()
        .or_else(|| Url::parse(href).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn page_url() -> Url {
        Url::parse("https://example.com").unwrap()
    }

    #[test]
    fn test_registrable_domain() {
        assert_eq!(registrable_domain("example.com"), "example.com");
        assert_eq!(registrable_domain("docs.example.com"), "example.com");
        assert_eq!(registrable_domain("a.b.example.co"), "example.co");
        assert_eq!(registrable_domain("localhost"), "localhost");
    }

    #[test]
    fn test_destination_name() {
        assert_eq!(destination_name("docs.rs", "ico"), "docs_rs_favicon.ico");
        assert_eq!(
            destination_name("www.example.com", "png"),
            "www_example_com_favicon.png"
        );
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("https://a.example/favicon.ico"), "ico");
        assert_eq!(extension_of("https://a.example/img/icon.svg?v=2"), "svg");
        assert_eq!(extension_of("https://a.example/icon"), "ico");
        assert_eq!(extension_of("data:image/png;base64,AAAA"), "png");
    }

    #[test]
    fn test_decode_data_uri() {
        assert_eq!(
            decode_data_uri("image/png;base64,aGk=").as_deref(),
            Some(b"hi".as_slice())
        );
        assert_eq!(
            decode_data_uri("text/plain,a%20b").as_deref(),
            Some(b"a b".as_slice())
        );
        assert!(decode_data_uri("image/png;base64,!!!").is_none());
    }

    #[test]
    fn test_extract_icon_href_priority_order() {
        let html = r#"<html><head>
            <link rel="mask-icon" href="/mask.svg">
            <link rel="icon" href="/primary.png">
        </head></html>"#;
        assert_eq!(
            extract_icon_href(html, &page_url()).as_deref(),
            Some("https://example.com/primary.png")
        );
    }

    #[test]
    fn test_extract_icon_href_honors_base() {
        let html = r#"<html><head>
            <base href="https://cdn.example.net/assets/">
            <link rel="icon" href="icon.png">
        </head></html>"#;
        assert_eq!(
            extract_icon_href(html, &page_url()).as_deref(),
            Some("https://cdn.example.net/assets/icon.png")
        );
    }

    #[test]
    fn test_extract_icon_href_data_uri_verbatim() {
        let html = r#"<link rel="icon" href="data:image/png;base64,AAAA">"#;
        assert_eq!(
            extract_icon_href(html, &page_url()).as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }

    #[test]
    fn test_extract_icon_href_skips_empty_href() {
        let html = r#"<html><head>
            <link rel="icon" href="  ">
            <link rel="apple-touch-icon" href="/touch.png">
        </head></html>"#;
        assert_eq!(
            extract_icon_href(html, &page_url()).as_deref(),
            Some("https://example.com/touch.png")
        );
    }

    #[test]
    fn test_extract_icon_href_absent() {
        assert_eq!(extract_icon_href("<html></html>", &page_url()), None);
    }

    #[test]
    fn test_find_cached() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("docs_rs_favicon.ico"), b"x").unwrap();
        assert_eq!(
            find_cached(dir.path(), "docs.rs").as_deref(),
            Some("docs_rs_favicon.ico")
        );
        assert_eq!(find_cached(dir.path(), "other.example"), None);
    }

    #[tokio::test]
    async fn test_resolve_root_relative_short_circuits() {
        let dir = TempDir::new().unwrap();
        let resolver = FaviconResolver::new(dir.path().to_path_buf(), "placeholder.ico".into());
        assert_eq!(resolver.resolve("/local/page.html").await, "favicon.ico");
    }

    #[tokio::test]
    async fn test_resolve_uses_cached_destination() {
        // A pre-existing destination file must satisfy the resolution with
        // no network activity at all; any attempted fetch here would fail
        // and degrade to the placeholder instead.
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("docs_rs_favicon.png"), b"x").unwrap();
        let resolver = FaviconResolver::new(dir.path().to_path_buf(), "placeholder.ico".into());
        assert_eq!(
            resolver.resolve("https://docs.rs/quillpress").await,
            "docs_rs_favicon.png"
        );
    }

    #[tokio::test]
    async fn test_resolve_unparseable_target_degrades() {
        let dir = TempDir::new().unwrap();
        let resolver = FaviconResolver::new(dir.path().to_path_buf(), "placeholder.ico".into());
        assert_eq!(resolver.resolve("not a url").await, "placeholder.ico");
        assert_eq!(resolver.resolve("mailto:a@b.example").await, "placeholder.ico");
    }
}
