// File: src/config.rs
// Purpose: Configuration parsing from tempest.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "tempest.toml";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub templates: TemplatesConfig,

    #[serde(default)]
    pub log: LogConfig,

    /// Route pattern -> `Class[:method]`
    #[serde(default)]
    pub routes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_name")]
    pub name: String,

    /// Include routing details in error pages
    #[serde(default)]
    pub debug: bool,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Template source location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatesConfig {
    /// Directory containing template files (default: "templates")
    #[serde(default = "default_templates_dir")]
    pub dir: PathBuf,

    /// File extension without the dot (default: "html")
    #[serde(default = "default_extension")]
    pub extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter directive used when RUST_LOG is unset
    #[serde(default = "default_level")]
    pub level: String,
}

// Default values
fn default_name() -> String {
    "tempest-app".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_extension() -> String {
    "html".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

// Default implementations
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            debug: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: default_templates_dir(),
            extension: default_extension(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Missing or empty file means defaults
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from ./tempest.toml
    pub fn load_default() -> Result<Self> {
        Self::load(DEFAULT_CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.address(), "127.0.0.1:3000");
        assert_eq!(config.templates.dir, PathBuf::from("templates"));
        assert_eq!(config.templates.extension, "html");
        assert_eq!(config.log.level, "info");
        assert!(!config.app.debug);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [app]
            debug = true

            [templates]
            dir = "views"

            [routes]
            "/" = "Home"
            "/users/[id]" = "Users:show"
        "#;
        let config: Config = toml::from_str(toml).unwrap();

        assert!(config.app.debug);
        assert_eq!(config.app.name, "tempest-app");
        assert_eq!(config.templates.dir, PathBuf::from("views"));
        assert_eq!(config.templates.extension, "html");
        assert_eq!(config.routes.get("/users/[id]").map(String::as_str), Some("Users:show"));
        assert_eq!(config.routes.len(), 2);
    }

    #[test]
    fn test_missing_and_empty_files_use_defaults() {
        let dir = TempDir::new().unwrap();
        let missing = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(missing.server.port, 3000);

        let empty = dir.path().join("tempest.toml");
        fs::write(&empty, "   \n").unwrap();
        assert_eq!(Config::load(&empty).unwrap().server.port, 3000);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tempest.toml");
        fs::write(&path, "[server]\nport = \"not a number\"").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
