//! # do-you-spotify common library
//!
//! Shared code for the sync tool:
//! - Error type used across store and configuration layers
//! - Per-user filesystem layout (config directory, credential file, store document)
//! - TOML bootstrap configuration

pub mod config;
pub mod error;

pub use error::{Error, Result};
