//! # Catalog Validation
//!
//! Full diagnostic pass over a parsed catalog.
//!
//! Loading stops at the first problem; `validate` keeps going and reports
//! every one, which is what a maintainer fixing a file wants.
//!
//! - Active messages must have non-empty source text
//! - Active `(source, disambiguation)` keys must be unique per context
//! - Context names must be non-empty

use crate::Catalog;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// What is wrong with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DiagnosticKind {
    EmptySource,
    EmptyContextName,
    /// The key repeats an earlier active message; `count` is how many
    /// active messages share it in total.
    DuplicateSource { count: usize },
}

/// One problem found in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub context: String,
    pub source_text: String,
    pub disambiguation: String,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::EmptySource => {
                write!(f, "[{}] message without source text", self.context)
            }
            DiagnosticKind::EmptyContextName => {
                write!(f, "context without a name (source {:?})", self.source_text)
            }
            DiagnosticKind::DuplicateSource { count } => {
                write!(
                    f,
                    "[{}] {:?} is defined {} times",
                    self.context, self.source_text, count
                )?;
                if !self.disambiguation.is_empty() {
                    write!(f, " (disambiguation {:?})", self.disambiguation)?;
                }
                Ok(())
            }
        }
    }
}

/// Check every invariant a lookup table relies on.
///
/// Diagnostics come out in catalog order; each duplicated key is reported
/// once.
pub fn validate(catalog: &Catalog) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut key_counts: BTreeMap<(&str, &str, &str), usize> = BTreeMap::new();
    let mut key_order = Vec::new();

    for context in &catalog.contexts {
        if context.name.is_empty() {
            diagnostics.push(Diagnostic {
                context: String::new(),
                source_text: context
                    .messages
                    .first()
                    .map(|m| m.source.clone())
                    .unwrap_or_default(),
                disambiguation: String::new(),
                kind: DiagnosticKind::EmptyContextName,
            });
        }

        for message in context.messages.iter().filter(|m| !m.is_retired()) {
            if message.source.is_empty() {
                diagnostics.push(Diagnostic {
                    context: context.name.clone(),
                    source_text: String::new(),
                    disambiguation: message.disambiguation().to_string(),
                    kind: DiagnosticKind::EmptySource,
                });
                continue;
            }

            let key = (
                context.name.as_str(),
                message.source.as_str(),
                message.disambiguation(),
            );
            let count = key_counts.entry(key).or_insert(0);
            *count += 1;
            if *count == 2 {
                key_order.push(key);
            }
        }
    }

    for key in key_order {
        let count = key_counts.get(&key).copied().unwrap_or_default();
        let (context, source, disambiguation) = key;
        diagnostics.push(Diagnostic {
            context: context.to_string(),
            source_text: source.to_string(),
            disambiguation: disambiguation.to_string(),
            kind: DiagnosticKind::DuplicateSource { count },
        });
    }

    diagnostics
}

// =============================================================================
// TESTS
// =============================================================================
