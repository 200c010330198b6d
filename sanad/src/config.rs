// sanad configuration management

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const DEFAULT_BACKEND: &str = "gemini";
const DEFAULT_VOICE: &str = "Puck";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanadConfig {
    /// Remote speech backend
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Requested voice identity for remote synthesis
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Speak questions and feedback aloud
    #[serde(default = "default_audio")]
    pub audio: bool,
}

fn default_backend() -> String {
    DEFAULT_BACKEND.to_string()
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_audio() -> bool {
    true
}

impl Default for SanadConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            voice: default_voice(),
            audio: default_audio(),
        }
    }
}

impl SanadConfig {
    /// Get the config directory: ~/.config/sanad
    pub fn config_dir() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home).join(".config").join("sanad"))
    }

    /// Get the config file path: ~/.config/sanad/sanad.toml
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("sanad.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: SanadConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SanadConfig::default();
        assert_eq!(config.backend, "gemini");
        assert_eq!(config.voice, "Puck");
        assert!(config.audio);
    }

    #[test]
    fn test_config_path() {
        let path = SanadConfig::config_path();
        assert!(path.is_ok());
        let path = path.unwrap();
        assert!(path.ends_with("sanad/sanad.toml"));
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
backend = "gemini"
voice = "Zephyr"
audio = false
"#;
        let config: SanadConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend, "gemini");
        assert_eq!(config.voice, "Zephyr");
        assert!(!config.audio);
    }

    #[test]
    fn test_parse_empty_config() {
        let toml_str = "";
        let config: SanadConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend, "gemini");
        assert_eq!(config.voice, "Puck");
        assert!(config.audio);
    }
}
