//! # tscat-core
//!
//! Translation catalog engine for tscat - THE LOGIC.
//!
//! A catalog is a Qt Linguist `.ts` file: contexts of messages, each mapping
//! an English source string to a translation, with advisory location hints
//! and an optional obsolete marker. This crate reads and writes that format
//! losslessly and turns it into an immutable lookup table.
//!
//! ```text
//!  .ts text ──parse──▶ Catalog ──from_catalog──▶ Translator ──translate──▶ &str
//!     ▲                  │                          │  ▲
//!     └────serialize─────┘                  compile │  │ decode
//!                                                   ▼  │
//!                                              compiled bytes
//! ```
//!
//! ## Constraints
//!
//! - Lookups never fail. A missing, empty or obsolete translation yields the
//!   source text unchanged.
//! - A `Translator` is immutable after construction and `Send + Sync`.
//! - Deterministic: `BTreeMap` only, no floats.
//! - No async, no network.

// =============================================================================
// MODULES
// =============================================================================

pub mod formats;
pub mod primitives;
pub mod stats;
pub mod translator;
pub mod types;
pub mod validate;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Catalog, CatalogError, Context, LineNumber, Location, Message, Translation,
    TranslationStatus,
};

// =============================================================================
// RE-EXPORTS: Lookup
// =============================================================================

pub use translator::{Entry, LoadOptions, Translator};

// =============================================================================
// RE-EXPORTS: Formats, Validation, Statistics
// =============================================================================

pub use formats::{
    CompiledHeader, catalog_from_bytes, catalog_from_str, catalog_to_string, compile,
    is_compiled, translator_from_bytes, translator_to_bytes,
};
pub use stats::{CatalogStats, ContextStats, StatusCounts};
pub use validate::{Diagnostic, DiagnosticKind, validate};
