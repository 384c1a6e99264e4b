//! In-memory sales tables.
//!
//! Rows are ordered cell vectors. The positions of the columns the
//! pipeline reads are resolved once, when the table is built, so lookups
//! by name never happen per row.

use super::{
    checked_sum, column_position, Cell, Decimal, ADDRESS_COLUMNS, CUSTOMER_NAME, ITEM_NUMBER,
    ITEM_PRICE, ITEM_QUANTITY, ORDER_ID, TOTAL_PRICE,
};
use crate::error::{SchemaError, SchemaResult};

static EMPTY_CELL: Cell = Cell::Empty;

/// One source row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// 1-based line in the source, for error context.
    pub line: u64,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(line: u64, cells: Vec<Cell>) -> Self {
        Self { line, cells }
    }

    pub fn cell(&self, index: usize) -> &Cell {
        self.cells.get(index).unwrap_or(&EMPTY_CELL)
    }
}

fn require(columns: &[String], name: &str) -> SchemaResult<usize> {
    column_position(columns, name).ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
}

// =============================================================================
// Sales Table
// =============================================================================

/// Resolved positions of the required source columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalesColumns {
    pub order_id: usize,
    pub item_number: usize,
    pub item_quantity: usize,
    pub item_price: usize,
    pub customer_name: usize,
}

impl SalesColumns {
    pub fn resolve(columns: &[String]) -> SchemaResult<Self> {
        Ok(Self {
            order_id: require(columns, ORDER_ID)?,
            item_number: require(columns, ITEM_NUMBER)?,
            item_quantity: require(columns, ITEM_QUANTITY)?,
            item_price: require(columns, ITEM_PRICE)?,
            customer_name: require(columns, CUSTOMER_NAME)?,
        })
    }
}

/// The loaded source table.
#[derive(Debug, Clone)]
pub struct SalesTable {
    columns: Vec<String>,
    rows: Vec<Row>,
    index: SalesColumns,
}

impl SalesTable {
    /// Build a table, failing if a required column is missing or TOTAL PRICE
    /// already exists.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> SchemaResult<Self> {
        let index = SalesColumns::resolve(&columns)?;
        if column_position(&columns, TOTAL_PRICE).is_some() {
            return Err(SchemaError::DuplicateColumn(TOTAL_PRICE.to_string()));
        }
        Ok(Self {
            columns,
            rows,
            index,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn index(&self) -> SalesColumns {
        self.index
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Row>, SalesColumns) {
        (self.columns, self.rows, self.index)
    }
}

// =============================================================================
// Enriched Table
// =============================================================================

/// Resolved positions of the columns the partitioner reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichedColumns {
    pub order_id: usize,
    pub item_number: usize,
    pub item_price: usize,
    pub total_price: usize,
    pub customer_name: usize,
}

/// Source rows with TOTAL PRICE inserted and the address columns removed.
#[derive(Debug, Clone)]
pub struct EnrichedTable {
    columns: Vec<String>,
    rows: Vec<Row>,
    index: EnrichedColumns,
}

impl EnrichedTable {
    /// Build from already-enriched columns and rows.
    pub fn from_parts(columns: Vec<String>, rows: Vec<Row>) -> SchemaResult<Self> {
        if let Some(dropped) = ADDRESS_COLUMNS
            .iter()
            .find(|name| column_position(&columns, name).is_some())
        {
            return Err(SchemaError::UnexpectedColumn(dropped.to_string()));
        }

        let index = EnrichedColumns {
            order_id: require(&columns, ORDER_ID)?,
            item_number: require(&columns, ITEM_NUMBER)?,
            item_price: require(&columns, ITEM_PRICE)?,
            total_price: require(&columns, TOTAL_PRICE)?,
            customer_name: require(&columns, CUSTOMER_NAME)?,
        };
        Ok(Self {
            columns,
            rows,
            index,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn index(&self) -> EnrichedColumns {
        self.index
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of TOTAL PRICE over every row.
    pub fn total(&self) -> Option<Decimal> {
        let col = self.index.total_price;
        checked_sum(
            self.rows
                .iter()
                .map(|row| row.cell(col).as_amount().unwrap_or(Decimal::ZERO)),
        )
    }
}
