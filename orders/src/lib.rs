//! # Sales Orders - split a sales export into one spreadsheet per order
//!
//! Reads a flat sales-transaction CSV, adds a TOTAL PRICE column, groups the
//! rows by ORDER ID and writes one formatted `.xlsx` per order, each ending
//! with a grand-total row.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Transform  │────▶│ Order XLSX  │
//! │  (ISO/UTF8) │     │  + Loader   │     │ (enrich +   │     │ (one/order) │
//! └─────────────┘     └─────────────┘     │  partition) │     └─────────────┘
//!                                         └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sales_orders::{split_sales_file, SplitOptions};
//! use std::path::Path;
//!
//! let report = split_sales_file(
//!     Path::new("sales.csv"),
//!     Path::new("Orders_2024-03-01"),
//!     &SplitOptions::default(),
//! )?;
//! println!("Wrote {} orders", report.artifacts.len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Cells, exact amounts, tables and order sheets
//! - [`parser`] - CSV parsing with auto-detection
//! - [`loader`] - Schema validation into a typed table
//! - [`transform`] - Enrichment, partitioning and the pipeline
//! - [`emit`] - Artifact naming, column formats and the xlsx sink
//! - [`config`] - Pipeline options and CLI defaults
//! - [`paths`] - Dated output directory
//! - [`logs`] - Run log with stderr echo and captures

// Core modules
pub mod error;
pub mod models;

// Loading
pub mod loader;
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod emit;
pub mod paths;

// Support
pub mod config;
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{EmitError, LoadError, PipelineError, SchemaError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Cell, Decimal, EnrichedTable, OrderSheet, Row, SalesTable};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use loader::load_sales_table;
pub use parser::{
    detect_delimiter, detect_encoding, parse_bytes, parse_bytes_auto, parse_file, parse_str,
    ParseResult,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{enrich, partition, sanitize_customer_name};

// =============================================================================
// Re-exports - Emit
// =============================================================================

pub use emit::{emit, ColumnFormat, ColumnFormatSpec, SheetEmitter, SheetSink, XlsxSink};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use config::{AppConfig, SplitOptions};
pub use logs::{LogCapture, LogEntry, LogLevel};
pub use transform::pipeline::{
    plan_sales_bytes, plan_sales_file, split_sales_bytes, split_sales_file, write_plan,
    Artifact, CsvInfo, SplitPlan, SplitReport,
};
