//! # Translator
//!
//! The runtime lookup table.
//!
//! A `Translator` is built once from a catalog (or a compiled catalog) and is
//! immutable afterwards. It holds only resolvable entries, keyed by context,
//! then source text, then disambiguation. Lookups never fail: when nothing
//! matches, the source text comes back unchanged.
//!
//! ## Fallback order for `translate_disambiguated`
//!
//! 1. exact `(context, source, disambiguation)`
//! 2. `(context, source)` without disambiguation
//! 3. the source text itself

use crate::formats::{compiled, ts};
use crate::primitives::MAX_CATALOG_SIZE;
use crate::{Catalog, CatalogError, TranslationStatus};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// disambiguation -> translated text
type Variants = BTreeMap<String, String>;

/// source text -> variants
type SourceTable = BTreeMap<String, Variants>;

/// Options applied when a catalog is turned into a lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Resolve `type="unfinished"` translations. `lrelease` does by default.
    pub include_unfinished: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            include_unfinished: true,
        }
    }
}

/// One resolvable entry, borrowed from a `Translator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'a> {
    pub context: &'a str,
    pub source: &'a str,
    pub disambiguation: &'a str,
    pub translation: &'a str,
}

/// Immutable translation lookup table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translator {
    language: Option<String>,
    contexts: BTreeMap<String, SourceTable>,
}

impl Translator {
    /// A table with no entries: every lookup returns its source text.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn with_language(language: Option<String>) -> Self {
        Self {
            language,
            contexts: BTreeMap::new(),
        }
    }

    /// Build a table from a parsed catalog.
    ///
    /// Retired messages are skipped, as are empty translations. Returns
    /// `CatalogError::DuplicateSource` when two active messages of one
    /// context share `(source, disambiguation)`.
    pub fn from_catalog(catalog: &Catalog, options: &LoadOptions) -> Result<Self, CatalogError> {
        let mut table = Self::with_language(catalog.language.clone());
        let mut seen: BTreeSet<(&str, &str, &str)> = BTreeSet::new();

        for (context, message) in catalog.messages() {
            if message.is_retired() {
                continue;
            }

            let key = (
                context.name.as_str(),
                message.source.as_str(),
                message.disambiguation(),
            );
            if !seen.insert(key) {
                return Err(CatalogError::DuplicateSource {
                    context: context.name.clone(),
                    source_text: message.source.clone(),
                    comment: message.disambiguation().to_string(),
                });
            }

            if message.status() == TranslationStatus::Unfinished && !options.include_unfinished {
                continue;
            }
            if let Some(text) = message.translated_text() {
                table.insert(&context.name, &message.source, message.disambiguation(), text);
            }
        }

        tracing::debug!(
            language = table.language.as_deref().unwrap_or("-"),
            contexts = table.contexts.len(),
            entries = table.len(),
            "translation table built"
        );
        Ok(table)
    }

    /// Build a table from catalog bytes in either form.
    ///
    /// Compiled input already had its options applied at compile time, so
    /// `options` only affects `.ts` input.
    pub fn from_bytes(bytes: &[u8], options: &LoadOptions) -> Result<Self, CatalogError> {
        if compiled::is_compiled(bytes) {
            compiled::translator_from_bytes(bytes)
        } else {
            let catalog = ts::catalog_from_bytes(bytes)?;
            Self::from_catalog(&catalog, options)
        }
    }

    /// Read a catalog file (`.ts` or compiled) and build a table.
    pub fn load(path: &Path, options: &LoadOptions) -> Result<Self, CatalogError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            CatalogError::IoError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CATALOG_SIZE as u64 {
            return Err(CatalogError::IoError(format!(
                "File size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CATALOG_SIZE
            )));
        }

        let bytes = std::fs::read(path).map_err(|e| {
            CatalogError::IoError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        let table = Self::from_bytes(&bytes, options)?;

        tracing::info!(
            path = %path.display(),
            entries = table.len(),
            "catalog loaded"
        );
        Ok(table)
    }

    /// Like `load`, but a catalog that cannot be loaded is reported and
    /// replaced by an empty table, so the host keeps running untranslated.
    pub fn load_or_untranslated(path: &Path, options: &LoadOptions) -> Self {
        match Self::load(path, options) {
            Ok(table) => table,
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "catalog rejected, falling back to untranslated text"
                );
                Self::empty()
            }
        }
    }

    /// Insert an entry. Returns false if the key is already present.
    pub(crate) fn insert(
        &mut self,
        context: &str,
        source: &str,
        disambiguation: &str,
        translation: &str,
    ) -> bool {
        let variants = self
            .contexts
            .entry(context.to_string())
            .or_default()
            .entry(source.to_string())
            .or_default();
        if variants.contains_key(disambiguation) {
            return false;
        }
        variants.insert(disambiguation.to_string(), translation.to_string());
        true
    }

    // =========================================================================
    // LOOKUPS
    // =========================================================================

    /// Exact lookup. `None` means there is no resolvable translation.
    #[must_use]
    pub fn find(&self, context: &str, source: &str, disambiguation: &str) -> Option<&str> {
        self.contexts
            .get(context)?
            .get(source)?
            .get(disambiguation)
            .map(String::as_str)
    }

    /// Translate `source` in `context`, falling back to `source` itself.
    #[must_use]
    pub fn translate<'a>(&'a self, context: &str, source: &'a str) -> &'a str {
        self.find(context, source, "").unwrap_or(source)
    }

    /// Translate with a disambiguation comment.
    ///
    /// Falls back to the undisambiguated entry, then to `source`.
    #[must_use]
    pub fn translate_disambiguated<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        disambiguation: &str,
    ) -> &'a str {
        self.resolve(context, source, disambiguation).unwrap_or(source)
    }

    /// The translation `translate_disambiguated` would return, or `None`
    /// when it would fall back to the source text.
    #[must_use]
    pub fn resolve(&self, context: &str, source: &str, disambiguation: &str) -> Option<&str> {
        self.find(context, source, disambiguation).or_else(|| {
            if disambiguation.is_empty() {
                None
            } else {
                self.find(context, source, "")
            }
        })
    }

    // =========================================================================
    // INSPECTION
    // =========================================================================

    /// Target language of the source catalog.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Number of resolvable entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts
            .values()
            .flat_map(|sources| sources.values())
            .map(|variants| variants.len())
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Context names with at least one entry, sorted.
    pub fn context_names(&self) -> impl Iterator<Item = &str> {
        self.contexts.keys().map(String::as_str)
    }

    /// All entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        self.contexts.iter().flat_map(|(context, sources)| {
            sources.iter().flat_map(move |(source, variants)| {
                variants
                    .iter()
                    .map(move |(disambiguation, translation)| Entry {
                        context,
                        source,
                        disambiguation,
                        translation,
                    })
            })
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
