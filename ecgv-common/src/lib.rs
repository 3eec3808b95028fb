//! # ECGView Common Library
//!
//! Shared code for ECGView crates:
//! - Bootstrap configuration (TOML file, environment, compiled defaults)
//! - Logging initialization
//! - Common error type

pub mod config;
pub mod error;
pub mod logging;

pub use config::{LayoutKind, TomlConfig};
pub use error::{Error, Result};
