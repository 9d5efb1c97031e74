// File: src/config.rs
// Purpose: Configuration parsing from switchyard.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use switchyard_router::Router;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub statics: Vec<StaticConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutingConfig {
    /// Prefix applied to groups added through `App::group` (e.g., "/api")
    #[serde(default)]
    pub base_prefix: String,

    /// Renderer kind for routes that configure none (default: "json")
    #[serde(default = "default_renderer")]
    pub default_renderer: Option<String>,
}

/// A static directory served under a URL prefix
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaticConfig {
    pub prefix: String,
    pub dir: PathBuf,

    #[serde(default)]
    pub name: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, overridden by `RUST_LOG` (default: "info")
    #[serde(default = "default_filter")]
    pub filter: String,

    #[serde(default = "default_true")]
    pub ansi: bool,
}

// Default values
fn default_renderer() -> Option<String> {
    Some("json".to_string())
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_prefix: String::new(),
            default_renderer: default_renderer(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            ansi: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Missing file means defaults
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Self::parse(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from the default path (./switchyard.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("switchyard.toml")
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Registers every configured static directory on `router`
    pub fn register_statics(&self, router: &mut Router) -> Result<()> {
        for entry in &self.statics {
            router
                .add_static(&entry.prefix, &entry.dir, entry.name.as_deref())
                .with_context(|| format!("Failed to register static directory {:?}", entry.dir))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.routing.base_prefix, "");
        assert_eq!(config.routing.default_renderer.as_deref(), Some("json"));
        assert_eq!(config.logging.filter, "info");
        assert!(config.logging.ansi);
        assert!(config.statics.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
            [routing]
            base_prefix = "/api"
            default_renderer = "text"

            [[statics]]
            prefix = "/assets"
            dir = "public/assets"
            name = "assets"

            [[statics]]
            prefix = "/media"
            dir = "public/media"

            [logging]
            filter = "switchyard=debug"
            ansi = false
            "#,
        )
        .unwrap();

        assert_eq!(config.routing.base_prefix, "/api");
        assert_eq!(config.routing.default_renderer.as_deref(), Some("text"));
        assert_eq!(config.statics.len(), 2);
        assert_eq!(config.statics[0].name.as_deref(), Some("assets"));
        assert_eq!(config.statics[1].name, None);
        assert_eq!(config.logging.filter, "switchyard=debug");
        assert!(!config.logging.ansi);
    }

    #[test]
    fn test_partial_sections_use_defaults() {
        let config = Config::parse("[routing]\nbase_prefix = \"/v1\"\n").unwrap();
        assert_eq!(config.routing.base_prefix, "/v1");
        assert_eq!(config.routing.default_renderer.as_deref(), Some("json"));
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_load_missing_and_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path().join("absent.toml")).unwrap(), Config::default());

        let empty = dir.path().join("empty.toml");
        fs::write(&empty, "   \n").unwrap();
        assert_eq!(Config::load(&empty).unwrap(), Config::default());
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[routing\nbase_prefix = ").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config file"));
    }

    #[test]
    fn test_register_statics() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            statics: vec![StaticConfig {
                prefix: "/assets".to_string(),
                dir: dir.path().to_path_buf(),
                name: Some("assets".to_string()),
            }],
            ..Config::default()
        };

        let mut router = Router::new();
        config.register_statics(&mut router).unwrap();
        assert_eq!(
            router.static_url("assets", "app.css", false, None).unwrap(),
            "/assets/app.css"
        );

        // registering the same directories twice collides on the prefix
        assert!(config.register_statics(&mut router).is_err());
    }
}
