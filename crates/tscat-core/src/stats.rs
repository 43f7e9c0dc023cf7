//! # Catalog Statistics
//!
//! Counts per translation status, overall and per context.
//! Integer arithmetic only: completion is reported in parts per thousand.

use crate::{Catalog, Context, TranslationStatus};
use serde::Serialize;

/// Message counts for one context or a whole catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Messages that are neither obsolete nor vanished.
    pub active: usize,
    /// Active messages with a finished, non-empty translation.
    pub translated: usize,
    /// Active messages marked unfinished (with or without text).
    pub unfinished: usize,
    /// Active messages with no translated text at all.
    pub untranslated: usize,
    pub obsolete: usize,
    pub vanished: usize,
    /// Location hints across all messages.
    pub locations: usize,
}

impl StatusCounts {
    fn add_context(&mut self, context: &Context) {
        for message in &context.messages {
            self.locations += message.locations.len();
            match message.status() {
                TranslationStatus::Obsolete => {
                    self.obsolete += 1;
                    continue;
                }
                TranslationStatus::Vanished => {
                    self.vanished += 1;
                    continue;
                }
                TranslationStatus::Unfinished => self.unfinished += 1,
                TranslationStatus::Finished => {
                    if message.translated_text().is_some() {
                        self.translated += 1;
                    }
                }
            }
            self.active += 1;
            if message.translated_text().is_none() {
                self.untranslated += 1;
            }
        }
    }

    /// All messages, retired included.
    #[must_use]
    pub fn total(&self) -> usize {
        self.active + self.obsolete + self.vanished
    }

    /// Finished translations per thousand active messages.
    ///
    /// An empty set counts as complete.
    #[must_use]
    pub fn completion_per_thousand(&self) -> u64 {
        if self.active == 0 {
            return 1000;
        }
        (self.translated as u64).saturating_mul(1000) / (self.active as u64)
    }
}

/// Counts for one context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextStats {
    pub name: String,
    pub counts: StatusCounts,
}

/// Statistics for a whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub language: Option<String>,
    pub contexts: Vec<ContextStats>,
    pub totals: StatusCounts,
}

impl CatalogStats {
    /// Compute statistics from a catalog.
    ///
    /// Contexts that appear several times in the file are reported once
    /// per appearance, in file order.
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut totals = StatusCounts::default();
        let contexts = catalog
            .contexts
            .iter()
            .map(|context| {
                let mut counts = StatusCounts::default();
                counts.add_context(context);
                totals.add_context(context);
                ContextStats {
                    name: context.name.clone(),
                    counts,
                }
            })
            .collect();

        Self {
            language: catalog.language.clone(),
            contexts,
            totals,
        }
    }
}
