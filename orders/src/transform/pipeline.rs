//! High-level pipeline API: sales CSV in, one spreadsheet per order out.
//!
//! This module combines all steps: parsing, schema validation, enrichment,
//! partitioning and emission.
//!
//! # Example
//!
//! ```rust,ignore
//! use sales_orders::{split_sales_file, SplitOptions};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = split_sales_file(
//!         Path::new("sales.csv"),
//!         Path::new("Orders_2024-03-01"),
//!         &SplitOptions::default(),
//!     )?;
//!
//!     println!("Wrote {} order files", report.artifacts.len());
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::SplitOptions;
use crate::emit::{column_letter, SheetEmitter, SheetSink, XlsxSink};
use crate::error::{PipelineError, PipelineResult};
use crate::loader::load_sales_table;
use crate::logs::{self, LogLevel};
use crate::models::{Decimal, OrderSheet};
use crate::parser::{parse_bytes, parse_file, ParseResult};
use crate::paths::ensure_dir;

use super::enrich::enrich;
use super::partition::partition;

/// CSV file information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Every order sheet of a source, not yet written.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitPlan {
    pub csv_info: CsvInfo,
    pub sheets: Vec<OrderSheet>,
}

/// One written artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub order_id: i64,
    pub path: PathBuf,
    /// Item rows, excluding the grand-total row
    pub item_count: usize,
    pub grand_total: Decimal,
}

/// Result of a complete run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitReport {
    pub csv_info: CsvInfo,
    pub artifacts: Vec<Artifact>,
}

/// Split a sales CSV file into one `.xlsx` per order inside `destination`.
///
/// The whole source is read and validated first; `destination` (and any
/// missing parent) is only created once that succeeds, so a bad source
/// leaves the filesystem untouched. Existing artifacts with the same name
/// are overwritten. The run stops at the first failed write; artifacts
/// written before it are left in place.
pub fn split_sales_file(
    path: &Path,
    destination: &Path,
    options: &SplitOptions,
) -> PipelineResult<SplitReport> {
    let plan = plan_sales_file(path, options)?;
    write_with_options(plan, destination, options)
}

/// Same as [`split_sales_file`] but from raw CSV bytes.
pub fn split_sales_bytes(
    bytes: &[u8],
    destination: &Path,
    options: &SplitOptions,
) -> PipelineResult<SplitReport> {
    let plan = plan_sales_bytes(bytes, options)?;
    write_with_options(plan, destination, options)
}

/// Run everything except emission.
pub fn plan_sales_bytes(bytes: &[u8], options: &SplitOptions) -> PipelineResult<SplitPlan> {
    plan_parsed(parse_bytes(bytes, options.delimiter)?)
}

/// Run everything except emission, reading from a file.
pub fn plan_sales_file(path: &Path, options: &SplitOptions) -> PipelineResult<SplitPlan> {
    logs::info(format!("📖 Reading {}", path.display()));
    let parsed = parse_file(path, options.delimiter).map_err(|e| {
        logs::error(e.to_string());
        e
    })?;
    plan_parsed(parsed)
}

/// Emit every sheet of `plan` through `emitter`, in plan order.
pub fn write_plan<S: SheetSink>(
    plan: &SplitPlan,
    destination: &Path,
    emitter: &mut SheetEmitter<S>,
) -> PipelineResult<Vec<Artifact>> {
    let total = plan.sheets.len();
    logs::info(format!("💾 Writing {} order file(s) to {}", total, destination.display()));

    let mut artifacts = Vec::with_capacity(total);
    for sheet in &plan.sheets {
        let path = match emitter.emit(sheet, destination) {
            Ok(path) => path,
            Err(e) => {
                logs::order(LogLevel::Error, sheet.order_id, e.to_string());
                logs::error(format!("Stopped after {} of {} orders", artifacts.len(), total));
                return Err(PipelineError::Emit(e));
            }
        };

        let items = sheet.item_rows().len();
        logs::order(
            LogLevel::Success,
            sheet.order_id,
            format!("{} ({} items, total {})", file_name(&path), items, sheet.grand_total),
        );
        artifacts.push(Artifact {
            order_id: sheet.order_id,
            path,
            item_count: sheet.item_rows().len(),
            grand_total: sheet.grand_total,
        });
    }

    logs::success(format!("Wrote {} order file(s)", artifacts.len()));
    Ok(artifacts)
}

fn write_with_options(
    plan: SplitPlan,
    destination: &Path,
    options: &SplitOptions,
) -> PipelineResult<SplitReport> {
    ensure_dir(destination).map_err(|e| {
        logs::error(e.to_string());
        e
    })?;

    let mut emitter = SheetEmitter::new(XlsxSink)
        .with_formats(options.formats.clone())
        .with_extension(options.extension.clone());

    for directive in &emitter.formats().columns {
        let range = directive.range_label();
        match directive.num_format {
            Some(ref mask) => {
                logs::detail(format!("{} width {} format {}", range, directive.width, mask))
            }
            None => logs::detail(format!("{} width {}", range, directive.width)),
        }
    }

    let artifacts = write_plan(&plan, destination, &mut emitter)?;
    Ok(SplitReport {
        csv_info: plan.csv_info,
        artifacts,
    })
}

/// Internal: validate, enrich and partition parsed CSV data
fn plan_parsed(parse_result: ParseResult) -> PipelineResult<SplitPlan> {
    logs::success(format!("Detected encoding: {}", parse_result.encoding));
    let separator = format_delimiter(parse_result.delimiter);
    logs::success(format!("Detected separator: '{}'", separator));
    logs::success(format!("Read {} rows", parse_result.rows.len()));

    let csv_info = CsvInfo {
        encoding: parse_result.encoding.clone(),
        delimiter: parse_result.delimiter,
        headers: parse_result.headers.clone(),
        row_count: parse_result.rows.len(),
    };

    logs::info(format!("📋 CSV has {} columns:", parse_result.headers.len()));
    for (i, col) in parse_result.headers.iter().enumerate() {
        let letter = u16::try_from(i).map(column_letter).unwrap_or_else(|_| i.to_string());
        logs::detail(format!("[{}] {}", letter, col));
    }

    // Schema first, so a header-only file with a missing column names it
    let table = load_sales_table(&parse_result).map_err(|e| {
        logs::error(e.to_string());
        e
    })?;

    if table.is_empty() {
        logs::error("CSV has a header but no data rows");
        return Err(PipelineError::EmptyInput);
    }

    logs::info("➕ Adding TOTAL PRICE, dropping address columns...");
    let enriched = enrich(table).map_err(|e| {
        logs::error(e.to_string());
        e
    })?;
    if let Some(total) = enriched.total() {
        logs::success(format!("Sales total: {}", total));
    }

    logs::info("📦 Grouping by ORDER ID...");
    let sheets = partition(&enriched).map_err(|e| {
        logs::error(e.to_string());
        e
    })?;
    logs::success(format!("{} orders", sheets.len()));
    for sheet in sheets.iter().filter(|s| s.customer_name.is_empty()) {
        let message = "customer name has no word characters, file is named by order only";
        logs::order(LogLevel::Warning, sheet.order_id, message);
    }

    Ok(SplitPlan { csv_info, sheets })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format delimiter for display
fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}
