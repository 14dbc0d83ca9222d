//! Service configuration loaded from `~/.config/avd/config.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Media suffixes eligible for download when the config does not override.
const DEFAULT_FILE_TYPES: [&str; 2] = [".mov", ".mp4"];

/// Ordered source locations tried when resolving a component URL: the main
/// server storage first, then the review/encoded storage.
const DEFAULT_LOCATIONS: [&str; 2] = ["asset.server", "asset.review"];

const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;

/// Global configuration for the action service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvdConfig {
    /// Base URL of the asset-tracking server, e.g. "https://studio.example.com".
    pub server_url: String,
    /// API user the session authenticates as.
    pub api_user: String,
    /// API key paired with `api_user`.
    pub api_key: String,
    /// Destination directory for downloads; defaults to the invoking user's
    /// home "Downloads" folder when unset.
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// Media suffixes (with leading dot) eligible for download.
    #[serde(default)]
    pub file_types: Option<Vec<String>>,
    /// Ordered source location names tried when resolving component URLs.
    #[serde(default)]
    pub locations: Option<Vec<String>>,
    /// Seconds between event hub polls.
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
}

impl AvdConfig {
    /// Effective media suffix allow-list.
    pub fn file_types(&self) -> Vec<String> {
        match &self.file_types {
            Some(types) if !types.is_empty() => types.clone(),
            _ => DEFAULT_FILE_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Effective ordered source location names.
    pub fn locations(&self) -> Vec<String> {
        match &self.locations {
            Some(names) if !names.is_empty() => names.clone(),
            _ => DEFAULT_LOCATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Destination root for downloads: the configured directory, or the
    /// user's home "Downloads" folder.
    pub fn download_root(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.download_dir {
            return Ok(dir.clone());
        }
        let home = dirs::home_dir().context("cannot determine home directory")?;
        Ok(home.join("Downloads"))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(
            self.poll_interval_secs
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
                .max(1),
        )
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("avd")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, writing a template file if none exists.
/// The template has empty credentials; the session refuses to open until
/// they are filled in.
pub fn load_or_init() -> Result<AvdConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = AvdConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created config template at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: AvdConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allow_list_and_locations() {
        let cfg = AvdConfig::default();
        assert_eq!(cfg.file_types(), vec![".mov".to_string(), ".mp4".to_string()]);
        assert_eq!(
            cfg.locations(),
            vec!["asset.server".to_string(), "asset.review".to_string()]
        );
        assert_eq!(cfg.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = AvdConfig {
            server_url: "https://studio.example.com".to_string(),
            api_user: "pipeline".to_string(),
            api_key: "secret".to_string(),
            ..AvdConfig::default()
        };
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: AvdConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.server_url, cfg.server_url);
        assert_eq!(parsed.api_user, cfg.api_user);
        assert_eq!(parsed.api_key, cfg.api_key);
        assert!(parsed.download_dir.is_none());
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            server_url = "https://studio.example.com"
            api_user = "pipeline"
            api_key = "secret"
            download_dir = "/srv/dailies"
            file_types = [".exr"]
            locations = ["asset.server"]
            poll_interval_secs = 5
        "#;
        let cfg: AvdConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.download_root().unwrap(), PathBuf::from("/srv/dailies"));
        assert_eq!(cfg.file_types(), vec![".exr".to_string()]);
        assert_eq!(cfg.locations(), vec!["asset.server".to_string()]);
        assert_eq!(cfg.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn empty_overrides_fall_back_to_defaults() {
        let toml = r#"
            server_url = "https://studio.example.com"
            api_user = "pipeline"
            api_key = "secret"
            file_types = []
            locations = []
        "#;
        let cfg: AvdConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.file_types(), vec![".mov".to_string(), ".mp4".to_string()]);
        assert_eq!(cfg.locations().len(), 2);
    }
}
