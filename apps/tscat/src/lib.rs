//! # tscat
//!
//! Command-line front end for `tscat-core`.
//!
//! The binary in `main.rs` only sets up logging and calls [`cli::execute`];
//! everything else lives here so integration tests can drive the commands
//! directly.

pub mod cli;
pub mod config;
