//! CLI command implementations.

pub mod config;
pub mod credentials;
pub mod grants;
pub mod roles;
pub mod service;
pub mod whoami;
