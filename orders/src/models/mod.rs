//! Domain models for the order splitting pipeline.
//!
//! - [`Cell`] - One typed spreadsheet value
//! - [`Decimal`] - Exact decimal used for prices and totals (`rust_decimal`)
//! - [`SalesTable`] - Loaded source rows with the required columns resolved
//! - [`EnrichedTable`] - Source rows with TOTAL PRICE added and address columns dropped
//! - [`OrderSheet`] - Finalized per-order table, ready for emission

pub mod sheet;
pub mod table;

pub use rust_decimal::Decimal;
pub use sheet::OrderSheet;
pub use table::{EnrichedColumns, EnrichedTable, Row, SalesColumns, SalesTable};

use serde::Serialize;
use std::fmt;

// =============================================================================
// Column Names
// =============================================================================

pub const ORDER_ID: &str = "ORDER ID";
pub const ITEM_NUMBER: &str = "ITEM NUMBER";
pub const ITEM_QUANTITY: &str = "ITEM QUANTITY";
pub const ITEM_PRICE: &str = "ITEM PRICE";
pub const CUSTOMER_NAME: &str = "CUSTOMER NAME";
pub const TOTAL_PRICE: &str = "TOTAL PRICE";

/// Columns removed before grouping.
pub const ADDRESS_COLUMNS: [&str; 5] = ["ADDRESS", "CITY", "STATE", "POSTAL CODE", "COUNTRY"];

/// Index, in the original column order, where TOTAL PRICE is inserted.
pub const TOTAL_PRICE_POSITION: usize = 7;

/// Label written in the ITEM PRICE cell of the grand-total row.
pub const GRAND_TOTAL_LABEL: &str = "GRAND TOTAL:";

/// Position of `name` in `columns`.
pub fn column_position(columns: &[String], name: &str) -> Option<usize> {
    columns.iter().position(|c| c == name)
}

/// Sum of all amounts, or `None` on overflow.
pub fn checked_sum<I>(amounts: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
}

// =============================================================================
// Cell
// =============================================================================

/// A typed table value.
///
/// Serializes untagged: `null`, a number, or a string (amounts are strings
/// so no precision is lost in JSON output).
///
/// Text cells keep their source bytes, surrounding whitespace included.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Integer(i64),
    Amount(Decimal),
    Text(String),
}

impl Cell {
    /// Text cell, or [`Cell::Empty`] for an empty string.
    pub fn text(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Cell::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value as an exact amount. Integers widen losslessly.
    pub fn as_amount(&self) -> Option<Decimal> {
        match self {
            Cell::Amount(a) => Some(*a),
            Cell::Integer(v) => Some(Decimal::from(*v)),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Integer(v) => write!(f, "{}", v),
            Cell::Amount(a) => write!(f, "{}", a),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
