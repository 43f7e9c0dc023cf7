//! # Compiled Catalog Format
//!
//! Binary release form of a catalog, the counterpart of `lrelease` output.
//!
//! Format: Header (5 bytes) + postcard-serialized entries.
//! - 4 bytes: Magic ("TSCT")
//! - 1 byte: Version
//!
//! Only resolvable entries are stored: retired messages, empty translations
//! and (depending on `LoadOptions`) unfinished ones are dropped at compile
//! time. Location hints and comments for translators are not carried.
//!
//! ## Size limits
//!
//! Payload size is checked before deserialization, and the header is
//! validated before the payload is touched.

use crate::primitives::{self, HEADER_SIZE, MAX_CATALOG_SIZE};
use crate::{Catalog, CatalogError, LoadOptions, Translator};
use serde::{Deserialize, Serialize};

// =============================================================================
// FILE HEADER
// =============================================================================

/// The header precedes all compiled data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompiledHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl CompiledHeader {
    /// Create a new header with current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(CatalogError::DeserializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(CatalogError::DeserializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Write header to bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    /// Read header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CatalogError> {
        if bytes.len() < HEADER_SIZE {
            return Err(CatalogError::DeserializationError(
                "Header too short".to_string(),
            ));
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        Ok(Self {
            magic,
            version: bytes[4],
        })
    }
}

impl Default for CompiledHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `bytes` start with the compiled magic.
#[must_use]
pub fn is_compiled(bytes: &[u8]) -> bool {
    bytes.starts_with(primitives::MAGIC_BYTES)
}

// =============================================================================
// PAYLOAD
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct CompiledCatalog {
    language: Option<String>,
    entries: Vec<CompiledEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CompiledEntry {
    context: String,
    source: String,
    disambiguation: String,
    translation: String,
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Compile a catalog: build the lookup table and encode it.
///
/// Fails when the catalog has duplicate active keys.
pub fn compile(catalog: &Catalog, options: &LoadOptions) -> Result<Vec<u8>, CatalogError> {
    let translator = Translator::from_catalog(catalog, options)?;
    translator_to_bytes(&translator)
}

/// Serialize a translator to bytes (header + payload).
///
/// Entries are written in key order, so equal tables give equal bytes.
pub fn translator_to_bytes(translator: &Translator) -> Result<Vec<u8>, CatalogError> {
    let compiled = CompiledCatalog {
        language: translator.language().map(str::to_string),
        entries: translator
            .entries()
            .map(|entry| CompiledEntry {
                context: entry.context.to_string(),
                source: entry.source.to_string(),
                disambiguation: entry.disambiguation.to_string(),
                translation: entry.translation.to_string(),
            })
            .collect(),
    };

    let payload = postcard::to_stdvec(&compiled)
        .map_err(|e| CatalogError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_SIZE + payload.len());
    result.extend_from_slice(&CompiledHeader::new().to_bytes());
    result.extend_from_slice(&payload);

    Ok(result)
}

/// Deserialize a translator from bytes.
///
/// Validates, in order: minimum size, maximum size, header, then payload.
/// A payload with a repeated key is rejected like a catalog would be.
pub fn translator_from_bytes(bytes: &[u8]) -> Result<Translator, CatalogError> {
    if bytes.len() < HEADER_SIZE {
        return Err(CatalogError::DeserializationError(format!(
            "Data too short: minimum {} bytes required",
            HEADER_SIZE
        )));
    }

    if bytes.len() > MAX_CATALOG_SIZE {
        return Err(CatalogError::DeserializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_CATALOG_SIZE
        )));
    }

    let header = CompiledHeader::from_bytes(bytes)?;
    header.validate()?;

    let compiled: CompiledCatalog = postcard::from_bytes(&bytes[HEADER_SIZE..]).map_err(|e| {
        CatalogError::DeserializationError(format!("Failed to decode catalog data: {}", e))
    })?;

    let mut translator = Translator::with_language(compiled.language);
    for entry in compiled.entries {
        if !translator.insert(
            &entry.context,
            &entry.source,
            &entry.disambiguation,
            &entry.translation,
        ) {
            return Err(CatalogError::DuplicateSource {
                context: entry.context,
                source_text: entry.source,
                comment: entry.disambiguation,
            });
        }
    }

    Ok(translator)
}

// =============================================================================
// TESTS
// =============================================================================
