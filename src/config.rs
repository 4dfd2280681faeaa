use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::paths;

// ============================================================================
// Provider Config
// ============================================================================

/// Provider configuration, read from `config.toml`
///
/// ```toml
/// [provider]
/// name = "file"
/// namespace = "example"
/// version = "0.1.0"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub provider: ProviderIdentity,
}

/// Identity the provider reports to the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderIdentity {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_name() -> String {
    "file".to_string()
}

fn default_namespace() -> String {
    "example".to_string()
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for ProviderIdentity {
    fn default() -> Self {
        Self {
            name: default_name(),
            namespace: default_namespace(),
            version: default_version(),
        }
    }
}

impl ProviderConfig {
    /// Load config from an explicit path, or from the default location
    ///
    /// An explicit path must exist. A missing default file means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = paths::config_file()?;
                if !path.exists() {
                    log::debug!(
                        "Config file {} does not exist, using defaults",
                        path.display()
                    );
                    return Ok(Self::default());
                }
                Self::load_from(&path)
            }
        }
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config: ProviderConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config format: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.provider.name, "file");
        assert_eq!(config.provider.namespace, "example");
        assert_eq!(config.provider.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[provider]\nnamespace = \"acme\"\n").unwrap();

        let config = ProviderConfig::load(Some(&path)).unwrap();
        assert_eq!(config.provider.namespace, "acme");
        assert_eq!(config.provider.name, "file");
    }

    #[test]
    fn test_empty_file_is_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "").unwrap();

        assert_eq!(
            ProviderConfig::load_from(&path).unwrap(),
            ProviderConfig::default()
        );
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");

        let err = ProviderConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Could not read"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[provider\nname = ").unwrap();

        let err = ProviderConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config format"));
    }
}
