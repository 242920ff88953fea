//! The localization table
//!
//! A [`Translations`] value is built once, validated, and then only read.
//! It holds no interior mutability, so a single instance behind an `Arc`
//! (or the process-wide [`Translations::bundled`] table) can serve any
//! number of concurrent readers.

use crate::error::{TranslationError, TranslationResult};
use crate::node::{KeyPath, Node, RawNode};
use crate::schema::{ConfigStep, EntityDescriptor, Namespace, Platform, Schema};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::{debug, error, warn};

/// Integration domain the bundled table belongs to
pub const DOMAIN: &str = "weatherlink";

/// The integration's source-language strings, embedded at build time
const BUNDLED_STRINGS: &str = include_str!("../data/strings.json");

/// Bundled table - parsed once on first access
static BUNDLED: OnceLock<Translations> = OnceLock::new();

/// Immutable, validated translation table for one language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translations {
    root: Node,
    schema: Schema,
}

/// A lookup that found no entry
///
/// Not fatal: the caller logs it and shows a humanized form of the raw key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKeyWarning {
    pub namespace: Namespace,
    pub path: KeyPath,
}

impl MissingKeyWarning {
    pub fn new<S: AsRef<str>>(namespace: Namespace, path: &[S]) -> Self {
        Self {
            namespace,
            path: KeyPath::new(path.iter().map(|s| s.as_ref())),
        }
    }

    /// Display text used in place of the missing translation
    pub fn fallback(&self) -> String {
        humanize_key(self.path.last().unwrap_or(self.namespace.as_str()))
    }
}

impl fmt::Display for MissingKeyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "missing translation for {}", self.namespace)
        } else {
            write!(f, "missing translation for {}.{}", self.namespace, self.path)
        }
    }
}

/// Turn a machine key into a display label (`wind_gust_2_min` -> `Wind gust 2 min`)
pub fn humanize_key(key: &str) -> String {
    let spaced = key
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Translations {
    /// A table with no entries; every lookup falls back to the raw key
    pub fn empty() -> Self {
        Self {
            root: Node::Branch(IndexMap::new()),
            schema: Schema::default(),
        }
    }

    /// Build a table from an already validated tree
    pub fn from_node(root: Node) -> TranslationResult<Self> {
        let schema = Schema::from_node(&root)?;
        Ok(Self { root, schema })
    }

    /// Parse and validate a JSON document
    pub fn from_slice(bytes: &[u8]) -> TranslationResult<Self> {
        let raw: RawNode = serde_json::from_slice(bytes)?;
        let root = Node::from_raw(raw, &KeyPath::root())?;
        Self::from_node(root)
    }

    /// Load a translation file from disk
    pub fn load(path: impl AsRef<Path>) -> TranslationResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| TranslationError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let translations = Self::from_slice(&bytes)?;
        debug!(
            "Loaded {} translation strings from {:?}",
            translations.leaf_count(),
            path
        );
        Ok(translations)
    }

    /// Load a translation file from disk without blocking the runtime
    pub async fn load_async(path: impl AsRef<Path>) -> TranslationResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| TranslationError::ReadFile {
                path: path.to_path_buf(),
                source: e,
            })?;

        let translations = Self::from_slice(&bytes)?;
        debug!(
            "Loaded {} translation strings from {:?}",
            translations.leaf_count(),
            path
        );
        Ok(translations)
    }

    /// The WeatherLink table shipped with this crate (lazily parsed)
    ///
    /// If the embedded data fails validation the error is logged and an
    /// empty table is returned, so every lookup falls back to raw keys.
    pub fn bundled() -> &'static Translations {
        BUNDLED.get_or_init(|| match BUNDLED_STRINGS.parse() {
            Ok(translations) => translations,
            Err(e) => {
                error!("Bundled {} translations rejected: {}", DOMAIN, e);
                Translations::empty()
            }
        })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_count() == 0
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// Every string in the table with its full path
    pub fn leaves(&self) -> Vec<(KeyPath, &str)> {
        self.root.leaves()
    }

    /// Look up the string at `namespace` + `path`
    ///
    /// Returns `None` when the path is absent or addresses a mapping.
    pub fn lookup<S: AsRef<str>>(&self, namespace: Namespace, path: &[S]) -> Option<&str> {
        self.root
            .child(namespace.as_str())?
            .get(path)?
            .as_text()
    }

    /// Look up a dotted key such as `entity.sensor.wind_direction.state.n`
    pub fn lookup_key(&self, key: &str) -> Option<&str> {
        let path = KeyPath::from(key);
        let (namespace, rest) = path.segments().split_first()?;
        self.lookup(namespace.parse().ok()?, rest)
    }

    /// Look up with fallback to the humanized last key
    ///
    /// A miss is logged as a [`MissingKeyWarning`].
    pub fn display<S: AsRef<str>>(&self, namespace: Namespace, path: &[S]) -> Cow<'_, str> {
        match self.lookup(namespace, path) {
            Some(text) => Cow::Borrowed(text),
            None => {
                let warning = MissingKeyWarning::new(namespace, path);
                warn!("{}", warning);
                Cow::Owned(warning.fallback())
            }
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.schema.title.as_deref()
    }

    pub fn config_step(&self, step_id: &str) -> Option<&ConfigStep> {
        self.schema.config.step.get(step_id)
    }

    pub fn config_error(&self, code: &str) -> Option<&str> {
        self.schema.config.error.get(code).map(String::as_str)
    }

    pub fn config_abort(&self, code: &str) -> Option<&str> {
        self.schema.config.abort.get(code).map(String::as_str)
    }

    pub fn entity(&self, platform: Platform, key: &str) -> Option<&EntityDescriptor> {
        self.schema.entity(platform, key)
    }

    pub fn entity_name(&self, platform: Platform, key: &str) -> Option<&str> {
        self.entity(platform, key)?.name.as_deref()
    }

    /// Display label for an enumerated sensor state
    pub fn entity_state(&self, platform: Platform, key: &str, token: &str) -> Option<&str> {
        self.entity(platform, key)?.state_label(token)
    }

    pub fn selector_option(&self, selector: &str, value: &str) -> Option<&str> {
        self.schema
            .selector
            .get(selector)?
            .options
            .get(value)
            .map(String::as_str)
    }

    /// Serialize back into the nested mapping format
    pub fn to_json(&self) -> TranslationResult<String> {
        Ok(serde_json::to_string(&self.root)?)
    }

    /// Serialize with two-space indentation, as translation files are stored
    pub fn to_json_pretty(&self) -> TranslationResult<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    /// Write the table to disk
    pub fn save(&self, path: impl AsRef<Path>) -> TranslationResult<()> {
        let path = path.as_ref();
        let mut content = self.to_json_pretty()?;
        content.push('\n');

        std::fs::write(path, content).map_err(|e| TranslationError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!("Saved translations to {:?}", path);
        Ok(())
    }
}

impl Default for Translations {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromStr for Translations {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(s.as_bytes())
    }
}

impl Serialize for Translations {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.root.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Translations {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawNode::deserialize(deserializer)?;
        let root = Node::from_raw(raw, &KeyPath::root()).map_err(serde::de::Error::custom)?;
        let schema = Schema::from_node(&root).map_err(serde::de::Error::custom)?;
        Ok(Self { root, schema })
    }
}
