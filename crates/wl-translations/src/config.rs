//! Loader configuration
//!
//! ```yaml
//! strings_dir: /config/custom_components/weatherlink
//! language: de
//! fallback_language: en
//! require_parity: true
//! ```
//!
//! `WEATHERLINK_STRINGS_DIR` overrides `strings_dir`. Without a directory
//! the bundled table is used.

use crate::error::TranslationError;
use crate::language::{StructureDiff, TranslationSet, SOURCE_LANGUAGE};
use crate::table::Translations;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable overriding [`LoaderConfig::strings_dir`]
pub const STRINGS_DIR_ENV: &str = "WEATHERLINK_STRINGS_DIR";

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading configuration or opening translations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML
    #[error("failed to parse YAML in {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Translations could not be loaded
    #[error(transparent)]
    Translations(#[from] TranslationError),

    /// Parity was required but some languages differ from the source
    #[error("translations differ from source structure: {}", languages.join(", "))]
    ParityMismatch {
        languages: Vec<String>,
        gaps: IndexMap<String, StructureDiff>,
    },
}

/// How and where translations are loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Integration directory holding `strings.json` and `translations/`
    pub strings_dir: Option<PathBuf>,
    /// Preferred display language
    pub language: String,
    /// Language consulted before the source language
    pub fallback_language: String,
    /// Refuse translation files whose keys differ from the source
    pub require_parity: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            strings_dir: None,
            language: SOURCE_LANGUAGE.to_string(),
            fallback_language: SOURCE_LANGUAGE.to_string(),
            require_parity: false,
        }
    }
}

impl LoaderConfig {
    /// Load configuration from a YAML file, then apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("Loading loader config: {:?}", path);

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(Self::parse(&content, path)?.with_env_overrides())
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        Self::parse(content, Path::new("<string>"))
    }

    fn parse(content: &str, source_path: &Path) -> ConfigResult<Self> {
        // An empty document means all defaults
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
            path: source_path.to_path_buf(),
            source: e,
        })
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(STRINGS_DIR_ENV).filter(|dir| !dir.is_empty()) {
            debug!("{} overrides strings_dir: {}", STRINGS_DIR_ENV, dir);
            self.strings_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Build the translation set this configuration describes
    pub fn open(&self) -> ConfigResult<TranslationSet> {
        let mut set = match &self.strings_dir {
            Some(dir) => TranslationSet::load_dir(dir)?,
            None => {
                info!("No strings directory configured, using bundled translations");
                TranslationSet::new(SOURCE_LANGUAGE, Translations::bundled().clone())
            }
        };
        set.set_fallback_language(self.fallback_language.clone());

        if self.require_parity {
            let gaps = set.check_parity();
            if !gaps.is_empty() {
                return Err(ConfigError::ParityMismatch {
                    languages: gaps.keys().cloned().collect(),
                    gaps,
                });
            }
        }

        Ok(set)
    }
}
