//! # Catalog Formats
//!
//! - `ts`: the Qt Linguist XML source format, read and written losslessly.
//! - `compiled`: the binary release format consumed at runtime.
//!
//! Both are pure transformations between bytes and values. File I/O is done
//! by callers, apart from `Translator::load`.

pub mod compiled;
pub mod ts;

pub use compiled::{
    CompiledHeader, compile, is_compiled, translator_from_bytes, translator_to_bytes,
};
pub use ts::{catalog_from_bytes, catalog_from_str, catalog_to_string};
