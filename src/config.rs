use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";
pub const DEFAULT_IMAGE_API_URL: &str = "https://en.wikipedia.org/w/api.php";
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 300;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub service_url: String,
    pub image_api_url: String,
    pub thumbnail_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            image_api_url: DEFAULT_IMAGE_API_URL.to_string(),
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Apply a command-line or environment override of the service URL
    pub fn with_service_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.service_url = url;
        }
        self
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("symptom-chat"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.service_url, "http://localhost:8000");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            service_url: "http://diagnosis.internal:9000".to_string(),
            thumbnail_size: 120,
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"service_url": "http://10.0.0.5:8000"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.service_url, "http://10.0.0.5:8000");
        assert_eq!(config.image_api_url, DEFAULT_IMAGE_API_URL);
        assert_eq!(config.thumbnail_size, DEFAULT_THUMBNAIL_SIZE);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_override_wins_over_file() {
        let config = Config::default().with_service_url(Some("http://remote:8000".to_string()));
        assert_eq!(config.service_url, "http://remote:8000");

        let unchanged = Config::default().with_service_url(Some("  ".to_string()));
        assert_eq!(unchanged.service_url, DEFAULT_SERVICE_URL);
        assert_eq!(Config::default().with_service_url(None), Config::default());
    }
}
