//! Configuration parsing and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Main configuration struct matching the quillpress.yml schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub paths: PathsConfig,

    #[serde(default)]
    pub server: ServerConfig,

    /// Asset path recorded when no favicon is discoverable for a target.
    #[serde(default = "default_placeholder_favicon")]
    pub placeholder_favicon: String,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_placeholder_favicon() -> String {
    String::from("favicon.ico")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Public base URL of the site.
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub content: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Get the content directory, resolved relative to the config file.
    pub fn content_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.content)
    }

    /// Get the output directory, resolved relative to the config file.
    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.output)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(config_path) = &self.config_path {
            if let Some(parent) = config_path.parent() {
                parent.join(path)
            } else {
                path.to_path_buf()
            }
        } else {
            path.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            site: SiteConfig {
                url: "https://site.example".into(),
                name: "Example".into(),
            },
            paths: PathsConfig {
                content: PathBuf::from("content"),
                output: PathBuf::from("public"),
            },
            server: ServerConfig::default(),
            placeholder_favicon: default_placeholder_favicon(),
            config_path: None,
        }
    }

    #[test]
    fn test_defaults() {
        let config = sample();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.placeholder_favicon, "favicon.ico");
    }

    #[test]
    fn test_decode_minimal_yaml() {
        let yaml = r#"
site:
  url: https://site.example
  name: Example
paths:
  content: content
  output: public
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.site.name, "Example");
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_paths_resolve_relative_to_config_file() {
        let mut config = sample();
        config.config_path = Some(PathBuf::from("/srv/site/quillpress.yml"));
        assert_eq!(config.content_dir(), PathBuf::from("/srv/site/content"));
        assert_eq!(config.output_dir(), PathBuf::from("/srv/site/public"));
    }
}
