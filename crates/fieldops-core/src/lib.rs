//! # fieldops-core
//!
//! Core types, configuration, and utilities for the FieldOps client.
//!
//! This crate provides shared functionality used across all FieldOps crates:
//!
//! - **Configuration**: Loading, validation, and management of the client config
//! - **Types**: User identity and API envelope definitions
//! - **Utilities**: Path resolution and secure string handling

pub mod config;
pub mod types;
pub mod error;
pub mod paths;
pub mod secret;

// Re-exports for convenience
pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
pub use secret::SecretString;
