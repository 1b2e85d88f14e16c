//! Application configuration, loaded from `~/.config/coc-import/config.toml`.
//! Missing or unparseable files fall back to defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::importer::{language_or_default, Language};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Default statblock language code.
    pub language: String,
    /// Catalog source codes, searched in order.
    pub item_search_order: Vec<String>,
    /// Override for the imported-characters container name.
    pub container: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            import: ImportConfig::default(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            item_search_order: vec!["world".to_string(), "compendium".to_string()],
            container: None,
        }
    }
}

impl AppConfig {
    /// Load configuration, falling back to defaults when the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::debug!(path = %config_path.display(), "loaded config");
                    config
                }
                Err(e) => {
                    tracing::warn!(
                        path = %config_path.display(),
                        error = %e,
                        "failed to parse config, using defaults"
                    );
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// The configured default language, resolved to a supported locale.
    pub fn language(&self) -> Language {
        language_or_default(&self.import.language)
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("coc-import").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.import.language, "en");
        assert_eq!(config.import.item_search_order, vec!["world", "compendium"]);
        assert!(config.import.container.is_none());
        assert_eq!(config.language(), Language::En);
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        let mut config = AppConfig::default();
        config.import.language = "tlh".to_string();
        assert_eq!(config.language(), Language::En);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AppConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.import.language, config.import.language);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("[import]\nlanguage = \"fr\"\n").unwrap();
        assert_eq!(config.language(), Language::Fr);
        assert_eq!(config.import.item_search_order, vec!["world", "compendium"]);
    }
}
