use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use serde::Deserialize;
use tracing::{debug, info};

use crate::classify::{Band, ClassificationTable, Tier};

pub const ENV_CONFIG_PATH: &str = "PORTAL_CONFIG";
pub const ENV_API_URL: &str = "PORTAL_API_URL";
pub const ENV_API_TOKEN: &str = "PORTAL_API_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "PORTAL_TIMEOUT_SECS";
pub const DEFAULT_CONFIG_FILE: &str = "portal.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            token: None,
            timeout_secs: 15,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// `v1`, `v2`, or `custom`.
    pub table: String,
    /// Name reported for a custom table.
    pub version: Option<String>,
    pub tiers: Vec<Tier>,
    pub fallback: Option<Band>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            table: crate::classify::CANONICAL_VERSION.to_string(),
            version: None,
            tiers: Vec::new(),
            fallback: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub api: ApiConfig,
    pub classification: ClassificationConfig,
}

impl PortalConfig {
    /// Resolution order: explicit path, `PORTAL_CONFIG`, `./portal.toml`,
    /// built-in defaults. Environment overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let env_path = std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from);
        let path = match (explicit, env_path) {
            (Some(path), _) => Some(path.to_path_buf()),
            (None, Some(path)) => Some(path),
            (None, None) => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                local.exists().then_some(local)
            }
        };

        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                info!(path = %path.display(), "loaded configuration");
                Self::from_toml_str(&raw)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => {
                debug!("no config file found, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).context("failed to parse TOML")
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.api.token = Some(token.trim().to_string());
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS).and_then(|v| v.trim().parse::<u64>().ok()) {
            self.api.timeout_secs = secs;
        }
    }

    pub fn classification_table(&self) -> anyhow::Result<ClassificationTable> {
        let settings = &self.classification;
        if settings.table.trim().eq_ignore_ascii_case("custom") {
            if settings.tiers.is_empty() {
                bail!("classification.table = \"custom\" requires at least one [[classification.tiers]] entry");
            }
            let fallback = settings
                .fallback
                .clone()
                .unwrap_or_else(|| ClassificationTable::v1().fallback().clone());
            let version = settings.version.clone().unwrap_or_else(|| "custom".to_string());
            return Ok(ClassificationTable::new(version, settings.tiers.clone(), fallback));
        }

        ClassificationTable::builtin(&settings.table).with_context(|| {
            format!(
                "unknown classification table {:?} (expected v1, v2 or custom)",
                settings.table
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = PortalConfig::from_toml_str("").unwrap();
        assert_eq!(config, PortalConfig::default());
        assert_eq!(config.classification_table().unwrap().version(), "v1");
    }

    #[test]
    fn parses_api_and_builtin_table() {
        let config = PortalConfig::from_toml_str(
            r#"
            [api]
            base_url = "https://portal.example.edu/api"
            timeout_secs = 5

            [classification]
            table = "v2"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://portal.example.edu/api");
        assert_eq!(config.api.timeout(), Duration::from_secs(5));
        assert_eq!(config.api.token, None);
        assert_eq!(config.classification_table().unwrap().version(), "v2");
    }

    #[test]
    fn builds_custom_tables() {
        let config = PortalConfig::from_toml_str(
            r#"
            [classification]
            table = "custom"
            version = "district-2026"

            [[classification.tiers]]
            min = 85
            label = "متميز"
            color = "green"

            [[classification.tiers]]
            min = 65
            label = "ناجح"
            color = "blue"
            "#,
        )
        .unwrap();

        let table = config.classification_table().unwrap();
        assert_eq!(table.version(), "district-2026");
        assert_eq!(table.classify(70.0).label, "ناجح");
        assert_eq!(table.classify(10.0).label, "ضعيف");
    }

    #[test]
    fn rejects_unknown_or_empty_custom_tables() {
        let unknown = PortalConfig::from_toml_str("[classification]\ntable = \"v9\"").unwrap();
        assert!(unknown.classification_table().is_err());

        let empty = PortalConfig::from_toml_str("[classification]\ntable = \"custom\"").unwrap();
        assert!(empty.classification_table().is_err());
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = PortalConfig::default();
        config.apply_env_overrides(|name| match name {
            ENV_API_URL => Some(" https://override.example/api ".to_string()),
            ENV_API_TOKEN => Some("secret".to_string()),
            ENV_TIMEOUT_SECS => Some("not-a-number".to_string()),
            _ => None,
        });

        assert_eq!(config.api.base_url, "https://override.example/api");
        assert_eq!(config.api.token.as_deref(), Some("secret"));
        assert_eq!(config.api.timeout_secs, 15);
    }
}
