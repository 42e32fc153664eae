//! # confidant-core
//!
//! Shared configuration and utilities for the Confidant client crates.
//!
//! - **Configuration**: JSON5 loading, environment overrides, validation
//! - **Paths**: resolution of the per-user config directory
//! - **Environment**: typed accessors and `$VAR` expansion

pub mod config;
pub mod env;
pub mod error;
pub mod paths;

pub use config::Config;
pub use error::{ConfigError, Result};
