//! Translation sets spanning several languages
//!
//! An integration ships `strings.json` in its source language and one
//! `translations/<lang>.json` per translated language. All files share
//! the same key structure; only the values differ.

use crate::error::{TranslationError, TranslationResult};
use crate::node::KeyPath;
use crate::schema::Namespace;
use crate::table::Translations;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Language of `strings.json`
pub const SOURCE_LANGUAGE: &str = "en";

/// Key paths present in one table but not in another
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureDiff {
    /// In the reference, absent from the other table
    pub missing: Vec<KeyPath>,
    /// In the other table, absent from the reference
    pub extra: Vec<KeyPath>,
}

impl StructureDiff {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// Compare the key structure of two tables, ignoring their values
pub fn structure_diff(reference: &Translations, other: &Translations) -> StructureDiff {
    let reference_paths: BTreeSet<KeyPath> =
        reference.leaves().into_iter().map(|(path, _)| path).collect();
    let other_paths: BTreeSet<KeyPath> = other.leaves().into_iter().map(|(path, _)| path).collect();

    StructureDiff {
        missing: reference_paths.difference(&other_paths).cloned().collect(),
        extra: other_paths.difference(&reference_paths).cloned().collect(),
    }
}

/// A source-language table plus its translations
#[derive(Debug, Clone)]
pub struct TranslationSet {
    source_language: String,
    source: Arc<Translations>,
    fallback_language: Option<String>,
    translations: IndexMap<String, Arc<Translations>>,
}

impl TranslationSet {
    pub fn new(source_language: impl Into<String>, source: impl Into<Arc<Translations>>) -> Self {
        Self {
            source_language: source_language.into(),
            source: source.into(),
            fallback_language: None,
            translations: IndexMap::new(),
        }
    }

    /// Add or replace a translated language
    pub fn insert(
        &mut self,
        language: impl Into<String>,
        translations: impl Into<Arc<Translations>>,
    ) -> Option<Arc<Translations>> {
        self.translations.insert(language.into(), translations.into())
    }

    /// Language consulted after the requested one and before the source
    pub fn set_fallback_language(&mut self, language: impl Into<String>) {
        self.fallback_language = Some(language.into());
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn source(&self) -> &Arc<Translations> {
        &self.source
    }

    /// Source language first, then translations in load order
    pub fn languages(&self) -> Vec<&str> {
        std::iter::once(self.source_language.as_str())
            .chain(
                self.translations
                    .keys()
                    .map(String::as_str)
                    .filter(|lang| *lang != self.source_language),
            )
            .collect()
    }

    /// Table for a language; a translation file takes precedence over the source
    pub fn get(&self, language: &str) -> Option<&Arc<Translations>> {
        self.translations.get(language).or_else(|| {
            (language == self.source_language).then_some(&self.source)
        })
    }

    /// Look up in `language`, then the fallback language, then the source
    pub fn lookup<S: AsRef<str>>(
        &self,
        language: &str,
        namespace: Namespace,
        path: &[S],
    ) -> Option<&str> {
        let requested = self.get(language).and_then(|t| t.lookup(namespace, path));
        if requested.is_some() {
            return requested;
        }

        let fallback = self
            .fallback_language
            .as_deref()
            .and_then(|lang| self.get(lang))
            .and_then(|t| t.lookup(namespace, path));
        if fallback.is_some() {
            return fallback;
        }

        self.source.lookup(namespace, path)
    }

    /// Flatten resources for `language` as [`TranslationSet::lookup`] resolves them
    ///
    /// The source table is overlaid with the fallback language and then the
    /// requested language, so every key the source defines is present.
    pub fn flatten(
        &self,
        language: &str,
        domain: &str,
        category: Option<Namespace>,
    ) -> IndexMap<String, String> {
        let mut resources = self.source.flatten(domain, category);

        let fallback = self.fallback_language.as_deref().and_then(|lang| self.get(lang));
        for table in [fallback, self.get(language)].into_iter().flatten() {
            resources.extend(table.flatten(domain, category));
        }
        resources
    }

    /// Languages whose key structure differs from the source
    pub fn check_parity(&self) -> IndexMap<String, StructureDiff> {
        let mut gaps = IndexMap::new();
        for (language, translations) in &self.translations {
            let diff = structure_diff(&self.source, translations);
            if !diff.is_empty() {
                warn!(
                    "Translation '{}' differs from source: {} missing, {} extra keys",
                    language,
                    diff.missing.len(),
                    diff.extra.len()
                );
                gaps.insert(language.clone(), diff);
            }
        }
        gaps
    }

    /// Load `strings.json` and `translations/*.json` from an integration directory
    pub fn load_dir(dir: impl AsRef<Path>) -> TranslationResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(TranslationError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        let source = Translations::load(dir.join("strings.json"))?;
        let mut set = Self::new(SOURCE_LANGUAGE, source);

        for (language, path) in translation_files(&dir.join("translations"))? {
            set.insert(language, Translations::load(&path)?);
        }

        debug!(
            "Loaded {} languages from {:?}",
            set.languages().len(),
            dir
        );
        Ok(set)
    }

    /// Async variant of [`TranslationSet::load_dir`]
    pub async fn load_dir_async(dir: impl AsRef<Path>) -> TranslationResult<Self> {
        let dir = dir.as_ref();
        let is_dir = tokio::fs::metadata(dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(TranslationError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        let source = Translations::load_async(dir.join("strings.json")).await?;
        let mut set = Self::new(SOURCE_LANGUAGE, source);

        let files = translation_files_async(&dir.join("translations")).await?;
        for (language, path) in files {
            set.insert(language, Translations::load_async(&path).await?);
        }

        debug!(
            "Loaded {} languages from {:?}",
            set.languages().len(),
            dir
        );
        Ok(set)
    }
}

/// Language code for a `translations/<lang>.json` file
fn language_of(path: &Path) -> Option<String> {
    if path.extension()? != "json" {
        return None;
    }
    path.file_stem()?.to_str().map(String::from)
}

fn read_error(path: &Path, source: io::Error) -> TranslationError {
    TranslationError::ReadFile {
        path: path.to_path_buf(),
        source,
    }
}

/// `(language, path)` pairs sorted by language; a missing directory is empty
fn translation_files(dir: &Path) -> TranslationResult<Vec<(String, PathBuf)>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(read_error(dir, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| read_error(dir, e))?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(language) = language_of(&path) {
            files.push((language, path));
        }
    }

    files.sort();
    Ok(files)
}

/// Async variant of [`translation_files`]; skips the same entries
async fn translation_files_async(dir: &Path) -> TranslationResult<Vec<(String, PathBuf)>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(read_error(dir, e)),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| read_error(dir, e))? {
        let path = entry.path();
        // Follows symlinks, like `Path::is_file`
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }
        if let Some(language) = language_of(&path) {
            files.push((language, path));
        }
    }

    files.sort();
    Ok(files)
}
