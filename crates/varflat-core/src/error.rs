//! Error types for the flattening engine.
//!
//! Decode and coercion failures are unrecoverable for the record in progress
//! and abort the whole stream: malformed input indicates an upstream contract
//! violation worth surfacing immediately rather than masking.

use thiserror::Error;

/// Error types that can occur while flattening variant records.
#[derive(Error, Debug)]
pub enum VarflatError {
    /// File I/O error while reading input or writing output.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error while writing a document.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Malformed packed annotation entry (e.g. fewer positional sub-fields
    /// than the fixed ANN layout requires).
    #[error("annotation decode error: {0}")]
    DecodeError(String),

    /// A raw value could not be parsed as its header-declared type.
    #[error("cannot coerce {field}={value:?} to {ty}")]
    CoercionError {
        /// Name of the offending field.
        field: String,
        /// Header-declared type the value failed to satisfy.
        ty: String,
        /// The raw value as it appeared in the record.
        value: String,
    },

    /// The header declared a type name outside Integer/Float/String/Flag.
    /// The coercer never guesses.
    #[error("unrecognized type {ty:?} declared for field {field}")]
    UnknownFieldType {
        /// Name of the field carrying the declaration.
        field: String,
        /// The unrecognized type name, verbatim.
        ty: String,
    },

    /// A record referenced a field name with no header declaration.
    #[error("{scope} field {field:?} is not declared in the header")]
    UndeclaredField {
        /// "INFO" or "FORMAT".
        scope: &'static str,
        /// The undeclared field name.
        field: String,
    },

    /// Error from the VCF text parser.
    #[error("parse error: {0}")]
    ParseError(#[from] anyhow::Error),
}

/// Type alias for [`Result<T, VarflatError>`].
pub type Result<T> = std::result::Result<T, VarflatError>;
