//! Localization table for the WeatherLink integration
//!
//! This crate maps the integration's stable identifiers (config flow steps,
//! entity keys, state tokens, selector options) to display strings:
//!
//! - Load and validate a `strings.json` table ([`Translations`])
//! - Look up strings by namespace and key path, with humanized fallback
//! - Flatten tables into frontend `component.<domain>.*` resources
//! - Check tables against the integration's entity keys ([`EntityCatalog`])
//! - Combine translated languages into a [`TranslationSet`]
//!
//! # Example
//!
//! ```ignore
//! use wl_translations::{Namespace, Translations};
//!
//! let strings = Translations::bundled();
//! assert_eq!(
//!     strings.lookup(Namespace::Entity, &["sensor", "wind_direction", "state", "n"]),
//!     Some("N")
//! );
//! ```

mod catalog;
mod config;
mod error;
mod language;
mod lint;
mod node;
mod resources;
mod schema;
mod table;

pub use catalog::{
    CatalogEntry, CoverageReport, EntityCatalog, BAR_TREND_TOKENS, COMPASS_TOKENS, RX_STATE_TOKENS,
};
pub use config::{ConfigError, ConfigResult, LoaderConfig, STRINGS_DIR_ENV};
pub use error::{SchemaError, TranslationError, TranslationResult};
pub use language::{structure_diff, StructureDiff, TranslationSet, SOURCE_LANGUAGE};
pub use lint::LintWarning;
pub use node::{KeyPath, Node};
pub use resources::resolve_key_reference;
pub use schema::{
    is_state_token, normalize_token, ConfigStep, EntityDescriptor, FlowStrings, Labels, Namespace,
    Platform, Schema, SelectorDescriptor,
};
pub use table::{humanize_key, MissingKeyWarning, Translations, DOMAIN};
