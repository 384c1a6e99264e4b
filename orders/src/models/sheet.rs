//! Finalized per-order table.

use serde::Serialize;

use super::{Cell, Decimal};

/// One order, ready to be written.
///
/// `rows` holds the order's items sorted by ITEM NUMBER followed by exactly
/// one grand-total row. ORDER ID is not a column here; it is carried in
/// [`OrderSheet::order_id`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSheet {
    pub order_id: i64,
    /// Customer name with every non-word character removed.
    pub customer_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub grand_total: Decimal,
}

impl OrderSheet {
    /// Internal sheet label, `Order <id>`.
    pub fn sheet_name(&self) -> String {
        format!("Order {}", self.order_id)
    }

    /// Output file name, `Order<id>_<customer>.<ext>`.
    pub fn artifact_name(&self, extension: &str) -> String {
        format!("Order{}_{}.{}", self.order_id, self.customer_name, extension)
    }

    /// Item rows, without the grand-total row.
    pub fn item_rows(&self) -> &[Vec<Cell>] {
        &self.rows[..self.rows.len().saturating_sub(1)]
    }

    pub fn grand_total_row(&self) -> Option<&[Cell]> {
        self.rows.last().map(Vec::as_slice)
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        super::column_position(&self.columns, name)
    }
}
