//! # Format Primitives
//!
//! Fixed constants for the catalog formats.
//! These are compiled into the binary and are immutable at runtime.

/// Magic bytes for the compiled catalog header.
///
/// - File Header = Magic Bytes ("TSCT") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"TSCT";

/// Current compiled format version.
///
/// Increment this when making breaking changes to the compiled format.
pub const FORMAT_VERSION: u8 = 1;

/// Size of the compiled header in bytes.
pub const HEADER_SIZE: usize = 5;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum size of a catalog file, in either form (64 MB).
///
/// Checked before reading or decoding so that a corrupted or hostile file
/// cannot exhaust memory.
pub const MAX_CATALOG_SIZE: usize = 64 * 1024 * 1024;
