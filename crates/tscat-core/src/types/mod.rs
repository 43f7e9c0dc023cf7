//! # Core Type Definitions
//!
//! This module contains the document model of a translation catalog:
//! - Catalog structure (`Catalog`, `Context`, `Message`)
//! - Translation payload and lifecycle (`Translation`, `TranslationStatus`)
//! - Advisory source positions (`Location`, `LineNumber`)
//! - Error types (`CatalogError`)
//!
//! ## Model Guarantees
//!
//! The model mirrors the catalog file one-to-one. Every optional element of
//! the file is an `Option` here, so a parsed catalog can be written back
//! without inventing or dropping anything. Order of contexts, messages and
//! locations is the file order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// LOCATIONS
// =============================================================================

/// Line reference of a location hint.
///
/// lupdate writes absolute lines (`line="36"`) or, in relative mode, an offset
/// from the previous location of the same file (`line="+3"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LineNumber {
    Absolute(u32),
    Relative(i32),
}

impl fmt::Display for LineNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(line) => write!(f, "{}", line),
            Self::Relative(offset) => write!(f, "{:+}", offset),
        }
    }
}

impl FromStr for LineNumber {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || CatalogError::InvalidAttribute {
            attribute: "line".to_string(),
            value: s.to_string(),
        };

        if trimmed.starts_with('+') || trimmed.starts_with('-') {
            trimmed
                .parse::<i32>()
                .map(Self::Relative)
                .map_err(|_| invalid())
        } else {
            trimmed
                .parse::<u32>()
                .map(Self::Absolute)
                .map_err(|_| invalid())
        }
    }
}

/// Where a source string appeared in the host program at extraction time.
///
/// Purely informational. Lookups never consult locations, and a stale
/// location does not affect correctness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Originating file, relative to the catalog.
    pub filename: Option<String>,
    /// Line in the originating file.
    pub line: Option<LineNumber>,
}

impl Location {
    /// Create an absolute location hint.
    #[must_use]
    pub fn new(filename: impl Into<String>, line: u32) -> Self {
        Self {
            filename: Some(filename.into()),
            line: Some(LineNumber::Absolute(line)),
        }
    }
}

// =============================================================================
// TRANSLATION
// =============================================================================

/// Lifecycle state of a translation, taken from its `type` attribute.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum TranslationStatus {
    /// No `type` attribute: the translation is done.
    #[default]
    Finished,
    /// `type="unfinished"`: a draft, or not yet translated at all.
    Unfinished,
    /// `type="obsolete"`: the host no longer uses this string.
    Obsolete,
    /// `type="vanished"`: newer spelling of obsolete.
    Vanished,
}

impl TranslationStatus {
    /// Parse the value of a `type` attribute.
    #[must_use]
    pub fn from_type_attr(value: &str) -> Option<Self> {
        match value {
            "unfinished" => Some(Self::Unfinished),
            "obsolete" => Some(Self::Obsolete),
            "vanished" => Some(Self::Vanished),
            _ => None,
        }
    }

    /// The `type` attribute written for this status, if any.
    #[must_use]
    pub const fn type_attr(self) -> Option<&'static str> {
        match self {
            Self::Finished => None,
            Self::Unfinished => Some("unfinished"),
            Self::Obsolete => Some("obsolete"),
            Self::Vanished => Some("vanished"),
        }
    }

    /// Retired entries are kept for translators but never resolve.
    #[must_use]
    pub const fn is_retired(self) -> bool {
        matches!(self, Self::Obsolete | Self::Vanished)
    }
}

/// The `<translation>` element of a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Translation {
    /// Translated text. Empty means "no translation yet".
    pub text: String,
    pub status: TranslationStatus,
}

impl Translation {
    #[must_use]
    pub fn new(text: impl Into<String>, status: TranslationStatus) -> Self {
        Self {
            text: text.into(),
            status,
        }
    }
}

// =============================================================================
// MESSAGE
// =============================================================================

/// One translatable string of a context.
///
/// The lookup key is `(source, comment)`: Qt uses the comment to tell apart
/// identical source strings that need different translations. An absent and
/// an empty comment are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Optional stable message id (`<message id="...">`).
    pub id: Option<String>,
    /// Source text, the lookup key.
    pub source: String,
    /// Source text before the last lupdate merge.
    pub old_source: Option<String>,
    /// Disambiguation comment.
    pub comment: Option<String>,
    pub old_comment: Option<String>,
    /// Comment extracted from the host source for translators.
    pub extra_comment: Option<String>,
    /// Translator's own note.
    pub translator_comment: Option<String>,
    pub translation: Option<Translation>,
    /// Opaque tool data (`<userdata>`).
    pub user_data: Option<String>,
    /// `<extra-NAME>` elements as `(NAME, text)`, in file order.
    pub extras: Vec<(String, String)>,
    pub locations: Vec<Location>,
}

impl Message {
    /// Create a message with only a source text.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            id: None,
            source: source.into(),
            old_source: None,
            comment: None,
            old_comment: None,
            extra_comment: None,
            translator_comment: None,
            translation: None,
            user_data: None,
            extras: Vec::new(),
            locations: Vec::new(),
        }
    }

    /// Attach a finished translation.
    #[must_use]
    pub fn with_translation(self, text: impl Into<String>) -> Self {
        self.with_status_translation(text, TranslationStatus::Finished)
    }

    /// Attach a translation with an explicit status.
    #[must_use]
    pub fn with_status_translation(
        mut self,
        text: impl Into<String>,
        status: TranslationStatus,
    ) -> Self {
        self.translation = Some(Translation::new(text, status));
        self
    }

    /// Attach a disambiguation comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Append a location hint.
    #[must_use]
    pub fn with_location(mut self, filename: impl Into<String>, line: u32) -> Self {
        self.locations.push(Location::new(filename, line));
        self
    }

    /// Status of the entry. A message without a translation element is active.
    #[must_use]
    pub fn status(&self) -> TranslationStatus {
        self.translation
            .as_ref()
            .map(|t| t.status)
            .unwrap_or_default()
    }

    /// Whether the entry is obsolete or vanished.
    #[must_use]
    pub fn is_retired(&self) -> bool {
        self.status().is_retired()
    }

    /// Disambiguation as used in keys: absent and empty are the same.
    #[must_use]
    pub fn disambiguation(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }

    /// Translated text, if the message carries a non-empty one.
    #[must_use]
    pub fn translated_text(&self) -> Option<&str> {
        self.translation
            .as_ref()
            .map(|t| t.text.as_str())
            .filter(|text| !text.is_empty())
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// A named group of messages, usually one screen or subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    /// Context-level comment.
    pub comment: Option<String>,
    pub messages: Vec<Message>,
}

impl Context {
    /// Create an empty context.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: None,
            messages: Vec::new(),
        }
    }

    /// Append a message (builder style).
    #[must_use]
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Find the active message for `(source, disambiguation)`.
    #[must_use]
    pub fn find_active(&self, source: &str, disambiguation: &str) -> Option<&Message> {
        self.messages.iter().find(|m| {
            !m.is_retired() && m.source == source && m.disambiguation() == disambiguation
        })
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// Default value of the `version` attribute for new catalogs.
pub const DEFAULT_TS_VERSION: &str = "2.1";

/// A whole translation file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Format version (`<TS version="...">`).
    pub version: String,
    /// Target language, e.g. `fi_FI`.
    pub language: Option<String>,
    /// Source language, when declared.
    pub source_language: Option<String>,
    /// Legacy `<defaultcodec>` of version 1.x files.
    pub default_codec: Option<String>,
    /// Catalogs this one depends on (`<dependency catalog="..."/>`).
    pub dependencies: Vec<String>,
    /// Root-level `<extra-NAME>` elements as `(NAME, text)`.
    pub extras: Vec<(String, String)>,
    pub contexts: Vec<Context>,
}

impl Catalog {
    /// Create an empty catalog for the given target language.
    #[must_use]
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            version: DEFAULT_TS_VERSION.to_string(),
            language: Some(language.into()),
            source_language: None,
            default_codec: None,
            dependencies: Vec::new(),
            extras: Vec::new(),
            contexts: Vec::new(),
        }
    }

    /// Append a context (builder style).
    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.contexts.push(context);
        self
    }

    /// First context with the given name.
    #[must_use]
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// All messages with their context, in file order.
    pub fn messages(&self) -> impl Iterator<Item = (&Context, &Message)> {
        self.contexts
            .iter()
            .flat_map(|c| c.messages.iter().map(move |m| (c, m)))
    }

    /// Total number of messages, retired ones included.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|c| c.messages.len()).sum()
    }

    /// Remove obsolete and vanished messages.
    ///
    /// Contexts left without messages are dropped. Returns the number of
    /// messages removed.
    pub fn prune_retired(&mut self) -> usize {
        let before = self.message_count();
        for context in &mut self.contexts {
            context.messages.retain(|m| !m.is_retired());
        }
        self.contexts.retain(|c| !c.messages.is_empty());
        before.saturating_sub(self.message_count())
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Error types for catalog loading and encoding.
///
/// Lookups never fail; every variant here is a load-time or write-time
/// diagnostic for the developer, never for the end user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The document is not well-formed XML.
    #[error("Malformed XML at line {line}: {message}")]
    Xml { line: usize, message: String },

    /// The root element is not `<TS>`.
    #[error("Not a translation catalog: root element is <{0}>")]
    NotACatalog(String),

    /// A message has no `<source>` or an empty one.
    #[error("Message without source text in context '{context}' (line {line})")]
    MissingSource { context: String, line: usize },

    /// A context has no `<name>`.
    #[error("Context without a name (line {line})")]
    MissingContextName { line: usize },

    /// An element appeared where the format does not allow it.
    #[error("Unexpected element <{element}> (line {line})")]
    UnexpectedElement { element: String, line: usize },

    /// An attribute value could not be understood.
    #[error("Invalid value {value:?} for attribute '{attribute}'")]
    InvalidAttribute { attribute: String, value: String },

    /// Two active messages of one context share a key.
    #[error("Duplicate source text in context '{context}': {source_text:?}")]
    DuplicateSource {
        context: String,
        source_text: String,
        comment: String,
    },

    /// The catalog uses a feature this crate does not handle.
    #[error("Unsupported catalog feature: {0}")]
    Unsupported(String),

    /// Encoding the compiled form failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Decoding the compiled form failed.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_number_parse_and_display() {
        let abs: LineNumber = "36".parse().expect("absolute");
        assert_eq!(abs, LineNumber::Absolute(36));
        assert_eq!(abs.to_string(), "36");

        let up: LineNumber = "+3".parse().expect("relative");
        assert_eq!(up, LineNumber::Relative(3));
        assert_eq!(up.to_string(), "+3");

        let down: LineNumber = "-2".parse().expect("relative");
        assert_eq!(down, LineNumber::Relative(-2));
        assert_eq!(down.to_string(), "-2");
    }

    #[test]
    fn line_number_rejects_garbage() {
        let result = "abc".parse::<LineNumber>();
        assert!(matches!(
            result,
            Err(CatalogError::InvalidAttribute { ref attribute, .. }) if attribute == "line"
        ));
    }

    #[test]
    fn status_type_attr_mapping() {
        for status in [
            TranslationStatus::Unfinished,
            TranslationStatus::Obsolete,
            TranslationStatus::Vanished,
        ] {
            let attr = status.type_attr().expect("has attr");
            assert_eq!(TranslationStatus::from_type_attr(attr), Some(status));
        }
        assert_eq!(TranslationStatus::Finished.type_attr(), None);
        assert_eq!(TranslationStatus::from_type_attr("bogus"), None);
    }

    #[test]
    fn message_without_translation_is_active() {
        let msg = Message::new("Play");
        assert_eq!(msg.status(), TranslationStatus::Finished);
        assert!(!msg.is_retired());
        assert_eq!(msg.translated_text(), None);
    }

    #[test]
    fn empty_translation_is_not_translated_text() {
        let msg = Message::new("---").with_translation("");
        assert_eq!(msg.translated_text(), None);
    }

    #[test]
    fn find_active_skips_retired() {
        let ctx = Context::new("QObject")
            .with_message(
                Message::new("60 fps")
                    .with_status_translation("60 ruutua/s", TranslationStatus::Obsolete),
            )
            .with_message(Message::new("GO!!!").with_translation("AJA!!!"));

        assert!(ctx.find_active("60 fps", "").is_none());
        assert_eq!(
            ctx.find_active("GO!!!", "").and_then(|m| m.translated_text()),
            Some("AJA!!!")
        );
    }

    #[test]
    fn prune_retired_drops_empty_contexts() {
        let mut catalog = Catalog::new("fi_FI")
            .with_context(Context::new("Old").with_message(
                Message::new("FONT").with_status_translation("FONTTI", TranslationStatus::Obsolete),
            ))
            .with_context(
                Context::new("MainMenu")
                    .with_message(Message::new("Play").with_translation("Pelaa"))
                    .with_message(
                        Message::new("PATCHES")
                            .with_status_translation("PÄTSIT", TranslationStatus::Vanished),
                    ),
            );

        let removed = catalog.prune_retired();

        assert_eq!(removed, 2);
        assert_eq!(catalog.contexts.len(), 1);
        assert_eq!(catalog.contexts[0].name, "MainMenu");
        assert_eq!(catalog.message_count(), 1);
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CatalogError = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }
}
