//! Client settings management

use crate::PathManager;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_SERVICE_URL: &str = "https://bsky.social";

const SERVICE_URL_ENV: &str = "BSKY_SERVICE_URL";
const USER_AGENT_ENV: &str = "BSKY_USER_AGENT";

/// Client settings stored in settings.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the personal data server, without the `/xrpc` suffix
    #[serde(default = "default_service_url")]
    pub service_url: String,
    /// User-Agent header sent with every request
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Whole-request timeout applied by the HTTP transport
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Page size requested when fetching the timeline
    #[serde(default)]
    pub timeline_page_size: Option<u32>,
}

fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            user_agent: None,
            request_timeout_secs: None,
            timeline_page_size: None,
        }
    }
}

impl Settings {
    /// Load settings from the settings file, or return defaults if not found.
    /// Environment overrides are applied on top either way.
    pub fn load() -> Self {
        let mut settings = PathManager::settings_path()
            .and_then(|path| Self::load_from(&path).ok())
            .unwrap_or_default();
        settings.apply_overrides(|key| std::env::var(key).ok());
        settings
    }

    /// Load settings from an explicit TOML file.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }

    /// Save settings to the settings file
    pub fn save(&self) -> anyhow::Result<()> {
        let path = PathManager::settings_path().context("Could not determine settings path")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config dir")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, content).context("Failed to write settings")?;
        Ok(())
    }

    /// Apply `BSKY_SERVICE_URL` / `BSKY_USER_AGENT` style overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(SERVICE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.service_url = url;
        }
        if let Some(agent) = lookup(USER_AGENT_ENV).filter(|v| !v.trim().is_empty()) {
            self.user_agent = Some(agent);
        }
    }

    /// Service URL with any trailing slash removed.
    pub fn service_base(&self) -> &str {
        self.service_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.service_url, "https://bsky.social");
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let settings = Settings {
            service_url: "https://pds.example.com".to_string(),
            user_agent: Some("bsky-actions-test".to_string()),
            request_timeout_secs: Some(15),
            timeline_page_size: Some(50),
        };

        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "service_url = [").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse settings"));
    }

    #[test]
    fn test_overrides_replace_only_non_empty_values() {
        let mut settings = Settings::default();
        settings.apply_overrides(|key| match key {
            "BSKY_SERVICE_URL" => Some("http://localhost:2583/".to_string()),
            "BSKY_USER_AGENT" => Some("  ".to_string()),
            _ => None,
        });

        assert_eq!(settings.service_url, "http://localhost:2583/");
        assert_eq!(settings.service_base(), "http://localhost:2583");
        assert_eq!(settings.user_agent, None);
    }
}
