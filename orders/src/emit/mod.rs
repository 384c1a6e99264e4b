//! Turn an [`OrderSheet`] into a named, formatted artifact.
//!
//! The byte-level writer sits behind [`SheetSink`]; this module only decides
//! the artifact name, the sheet label and the per-column format directives.
//!
//! # Example
//!
//! ```rust,ignore
//! use sales_orders::emit::{SheetEmitter, XlsxSink};
//!
//! let mut emitter = SheetEmitter::new(XlsxSink);
//! for sheet in &sheets {
//!     let path = emitter.emit(sheet, &orders_dir)?;
//!     println!("wrote {}", path.display());
//! }
//! ```

pub mod xlsx;

pub use xlsx::XlsxSink;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::EmitResult;
use crate::models::{Cell, OrderSheet};

/// Display mask for the money columns.
pub const CURRENCY_MASK: &str = "$#,##0.00";

/// Default artifact extension.
pub const DEFAULT_EXTENSION: &str = "xlsx";

// =============================================================================
// Column Formats
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid column range '{0}'")]
pub struct ColumnRangeError(pub String);

/// Spreadsheet letter for a 0-based column: 0 → `A`, 26 → `AA`.
pub fn column_letter(index: u16) -> String {
    let mut n = u32::from(index) + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

fn column_index(letters: &str) -> Option<u16> {
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let n = letters
        .bytes()
        .try_fold(0u32, |acc, b| acc.checked_mul(26)?.checked_add(u32::from(b - b'A') + 1))?;
    u16::try_from(n - 1).ok()
}

/// Width and optional number format for a contiguous column range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFormat {
    /// First column, 0-based.
    pub first: u16,
    /// Last column, inclusive.
    pub last: u16,
    /// Width in characters.
    pub width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_format: Option<String>,
}

impl ColumnFormat {
    pub fn new(first: u16, last: u16, width: f64) -> Self {
        Self {
            first,
            last,
            width,
            num_format: None,
        }
    }

    /// Parse a letter range such as `"F:G"` or `"A:A"`.
    pub fn parse_range(range: &str, width: f64) -> Result<Self, ColumnRangeError> {
        let invalid = || ColumnRangeError(range.to_string());
        let (first, last) = range.split_once(':').unwrap_or((range, range));
        let first = column_index(first.trim()).ok_or_else(invalid)?;
        let last = column_index(last.trim()).ok_or_else(invalid)?;
        if last < first {
            return Err(invalid());
        }
        Ok(Self::new(first, last, width))
    }

    pub fn with_num_format(mut self, mask: impl Into<String>) -> Self {
        self.num_format = Some(mask.into());
        self
    }

    pub fn covers(&self, column: u16) -> bool {
        (self.first..=self.last).contains(&column)
    }

    /// `"F:G"` style label.
    pub fn range_label(&self) -> String {
        format!("{}:{}", column_letter(self.first), column_letter(self.last))
    }
}

/// Format directives for every column of an order sheet.
///
/// Positions refer to the final sheet layout (ORDER ID already removed,
/// TOTAL PRICE already inserted), not to the source column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFormatSpec {
    pub columns: Vec<ColumnFormat>,
}

impl ColumnFormatSpec {
    /// Fixed layout of the standard sales export.
    ///
    /// | Col | Content       | Width |
    /// |-----|---------------|-------|
    /// | A   | ORDER DATE    | 11    |
    /// | B   | ITEM NUMBER   | 13    |
    /// | C   | PRODUCT LINE  | 15    |
    /// | D   | PRODUCT CODE  | 15    |
    /// | E   | ITEM QUANTITY | 15    |
    /// | F:G | prices, money | 13    |
    /// | H   | STATUS        | 10    |
    /// | I   | CUSTOMER NAME | 30    |
    pub fn order_sheet() -> Self {
        Self {
            columns: vec![
                ColumnFormat::new(5, 6, 13.0).with_num_format(CURRENCY_MASK),
                ColumnFormat::new(0, 0, 11.0),
                ColumnFormat::new(1, 1, 13.0),
                ColumnFormat::new(2, 2, 15.0),
                ColumnFormat::new(3, 3, 15.0),
                ColumnFormat::new(4, 4, 15.0),
                ColumnFormat::new(7, 7, 10.0),
                ColumnFormat::new(8, 8, 30.0),
            ],
        }
    }

    /// First directive covering `column`.
    pub fn format_for(&self, column: u16) -> Option<&ColumnFormat> {
        self.columns.iter().find(|f| f.covers(column))
    }

    pub fn num_format_for(&self, column: u16) -> Option<&str> {
        self.format_for(column).and_then(|f| f.num_format.as_deref())
    }
}

impl Default for ColumnFormatSpec {
    fn default() -> Self {
        Self::order_sheet()
    }
}

// =============================================================================
// Sink
// =============================================================================

/// Everything a sink needs to write one sheet.
#[derive(Debug, Clone)]
pub struct SheetData<'a> {
    pub name: String,
    pub columns: &'a [String],
    pub rows: &'a [Vec<Cell>],
    pub formats: &'a ColumnFormatSpec,
}

/// Writes one single-sheet artifact to `path`, replacing any existing file.
pub trait SheetSink {
    fn write_sheet(&mut self, path: &Path, sheet: &SheetData<'_>) -> EmitResult<()>;
}

// =============================================================================
// Emitter
// =============================================================================

/// Names, formats and writes order sheets through a [`SheetSink`].
pub struct SheetEmitter<S> {
    sink: S,
    formats: ColumnFormatSpec,
    extension: String,
}

impl<S: SheetSink> SheetEmitter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            formats: ColumnFormatSpec::order_sheet(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_formats(mut self, formats: ColumnFormatSpec) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn formats(&self) -> &ColumnFormatSpec {
        &self.formats
    }

    pub fn artifact_path(&self, sheet: &OrderSheet, destination: &Path) -> PathBuf {
        destination.join(sheet.artifact_name(&self.extension))
    }

    /// Write `sheet` into `destination` and return the artifact path.
    pub fn emit(&mut self, sheet: &OrderSheet, destination: &Path) -> EmitResult<PathBuf> {
        let path = self.artifact_path(sheet, destination);
        let data = SheetData {
            name: sheet.sheet_name(),
            columns: &sheet.columns,
            rows: &sheet.rows,
            formats: &self.formats,
        };
        self.sink.write_sheet(&path, &data)?;
        Ok(path)
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Write `sheet` as an `.xlsx` file in `destination` with the standard layout.
pub fn emit(sheet: &OrderSheet, destination: &Path) -> EmitResult<PathBuf> {
    SheetEmitter::new(XlsxSink).emit(sheet, destination)
}
