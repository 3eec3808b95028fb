//! Error types for ecgv-sr
//!
//! Whole-document failures only. Per-lead sample problems are recovered
//! inside the extractor (see `ecg::samples::SampleParseError`) and never
//! reach this type.

use thiserror::Error;

/// Main error type for the strip renderer pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Upload is not well-formed XML
    #[error("Malformed XML document at line {line}, column {column}: {message}")]
    MalformedDocument {
        line: u32,
        column: u32,
        message: String,
    },

    /// Required node or attribute is absent
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Sample rate attribute has no usable positive integer
    #[error("Invalid sample rate: '{0}'")]
    InvalidSampleRate(String),

    /// Every lead ended up empty after extraction
    #[error("No valid ECG data found after parsing leads")]
    NoLeadData,

    /// Upload could not be decoded as text
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Scene could not be rasterized or encoded
    #[error("Render error: {0}")]
    Render(String),
}

/// Convenience Result type using ecgv-sr Error
pub type Result<T> = std::result::Result<T, Error>;
