//! Error types for the order splitting pipeline.
//!
//! - [`LoadError`] - Source could not be read or parsed as CSV
//! - [`SchemaError`] - Required column missing or a value is malformed
//! - [`EmitError`] - An artifact could not be written
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while reading the tabular source.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read the source file.
    #[error("Cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source is not valid CSV.
    #[error("Invalid CSV at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// The source has no header row.
    #[error("CSV source is empty")]
    EmptyFile,
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Errors about the shape or content of the sales table.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A required column is absent from the header.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A column that is derived already exists in the source.
    #[error("Column already exists: {0}")]
    DuplicateColumn(String),

    /// A column that should have been dropped is still present.
    #[error("Unexpected column: {0}")]
    UnexpectedColumn(String),

    /// A cell could not be interpreted as the column's type.
    #[error("Line {line}, column '{column}' (value '{value}'): {message}")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
        message: String,
    },
}

impl SchemaError {
    pub fn invalid(
        line: u64,
        column: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            line,
            column: column.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Emit Errors
// =============================================================================

/// Errors while writing an order artifact.
#[derive(Debug, Error)]
pub enum EmitError {
    /// The destination could not be written.
    #[error("Cannot write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The spreadsheet writer rejected the sheet.
    #[error("Spreadsheet error for '{}': {message}", path.display())]
    Xlsx { path: PathBuf, message: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::split_sales_file`].
/// Every variant is fatal for the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source load error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Schema error.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Artifact write error.
    #[error("Emit error: {0}")]
    Emit(#[from] EmitError),

    /// The source has a header but no data rows.
    #[error("Source has no data rows")]
    EmptyInput,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for schema-checked operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for emit operations.
pub type EmitResult<T> = Result<T, EmitError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
