//! Split an enriched sales table into one [`OrderSheet`] per ORDER ID.
//!
//! # Architecture
//!
//! ```text
//! Enriched rows (flat)                 →  Order sheets
//! ┌──────────────────────────────┐       ┌──────────────────────────────┐
//! │ ORDER 10, ITEM 2, TOTAL 15.0 │       │ Order 10                     │
//! │ ORDER 10, ITEM 1, TOTAL 2.5  │  →    │ ITEM 1 2.5 / ITEM 2 15.0     │
//! │ ORDER 11, ITEM 1, TOTAL 20.0 │       │ GRAND TOTAL: 17.5            │
//! └──────────────────────────────┘       ├──────────────────────────────┤
//!                                        │ Order 11                     │
//!                                        │ ITEM 1 20.0                  │
//!                                        │ GRAND TOTAL: 20.0            │
//!                                        └──────────────────────────────┘
//! ```
//!
//! Sheets come out in ascending ORDER ID. Within a sheet, rows are stably
//! sorted by ITEM NUMBER, so duplicates keep their input order.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::error::{SchemaError, SchemaResult};
use crate::models::{
    checked_sum, Cell, Decimal, EnrichedTable, OrderSheet, Row, GRAND_TOTAL_LABEL, ITEM_NUMBER,
    ORDER_ID, TOTAL_PRICE,
};

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("non-word pattern is valid"));

/// Remove every character outside `[A-Za-z0-9_]`.
///
/// `"O'Brien & Sons, Inc."` becomes `"OBrienSonsInc"`; an all-punctuation
/// name becomes the empty string.
pub fn sanitize_customer_name(name: &str) -> String {
    NON_WORD.replace_all(name, "").into_owned()
}

/// Group `table` by ORDER ID and finalize each group.
///
/// Fails with [`SchemaError::InvalidValue`] if a row's ORDER ID or ITEM NUMBER
/// is not an integer or its TOTAL PRICE is not numeric. Nothing is returned
/// on failure.
pub fn partition(table: &EnrichedTable) -> SchemaResult<Vec<OrderSheet>> {
    let index = table.index();
    let layout = SheetLayout::new(table);
    let mut orders: BTreeMap<i64, OrderBuilder> = BTreeMap::new();

    for row in table.rows() {
        let order_id = integer_cell(row, index.order_id, ORDER_ID)?;
        let item_number = integer_cell(row, index.item_number, ITEM_NUMBER)?;
        let total_cell = row.cell(index.total_price);
        let total = total_cell.as_amount().ok_or_else(|| {
            SchemaError::invalid(row.line, TOTAL_PRICE, total_cell.to_string(), "expected a number")
        })?;

        orders
            .entry(order_id)
            .or_insert_with(|| {
                OrderBuilder::new(order_id, row, row.cell(index.customer_name).to_string())
            })
            .add_item(item_number, total, layout.strip_order_id(row));
    }

    orders.into_values().map(|builder| builder.build(&layout)).collect()
}

fn integer_cell(row: &Row, col: usize, name: &str) -> SchemaResult<i64> {
    let cell = row.cell(col);
    cell.as_integer().ok_or_else(|| {
        SchemaError::invalid(row.line, name, cell.to_string(), "expected an integer")
    })
}

/// Output column order shared by every sheet of one table.
struct SheetLayout {
    columns: Vec<String>,
    order_id: usize,
    item_price: usize,
    total_price: usize,
}

impl SheetLayout {
    fn new(table: &EnrichedTable) -> Self {
        let index = table.index();
        let shift = |col: usize| if col > index.order_id { col - 1 } else { col };

        let columns = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index.order_id)
            .map(|(_, name)| name.clone())
            .collect();

        Self {
            columns,
            order_id: index.order_id,
            item_price: shift(index.item_price),
            total_price: shift(index.total_price),
        }
    }

    fn strip_order_id(&self, row: &Row) -> Vec<Cell> {
        let mut cells: Vec<Cell> = row
            .cells
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.order_id)
            .map(|(_, cell)| cell.clone())
            .collect();
        cells.resize(self.columns.len(), Cell::Empty);
        cells
    }

    fn grand_total_row(&self, grand_total: Decimal) -> Vec<Cell> {
        let mut cells = vec![Cell::Empty; self.columns.len()];
        cells[self.item_price] = Cell::text(GRAND_TOTAL_LABEL);
        cells[self.total_price] = Cell::Amount(grand_total);
        cells
    }
}

/// Accumulates the rows of one order while grouping.
struct OrderBuilder {
    order_id: i64,
    first_line: u64,
    /// Raw name from the first row of the group.
    customer_name: String,
    items: Vec<(i64, Vec<Cell>)>,
    totals: Vec<Decimal>,
}

impl OrderBuilder {
    fn new(order_id: i64, first_row: &Row, customer_name: String) -> Self {
        Self {
            order_id,
            first_line: first_row.line,
            customer_name,
            items: Vec::new(),
            totals: Vec::new(),
        }
    }

    fn add_item(&mut self, item_number: i64, total: Decimal, cells: Vec<Cell>) {
        self.items.push((item_number, cells));
        self.totals.push(total);
    }

    fn build(mut self, layout: &SheetLayout) -> SchemaResult<OrderSheet> {
        // sort_by_key is stable
        self.items.sort_by_key(|(item_number, _)| *item_number);

        let grand_total = checked_sum(self.totals).ok_or_else(|| {
            SchemaError::invalid(
                self.first_line,
                TOTAL_PRICE,
                format!("order {}", self.order_id),
                "grand total out of range",
            )
        })?;

        let mut rows: Vec<Vec<Cell>> = self.items.into_iter().map(|(_, cells)| cells).collect();
        rows.push(layout.grand_total_row(grand_total));

        Ok(OrderSheet {
            order_id: self.order_id,
            customer_name: sanitize_customer_name(&self.customer_name),
            columns: layout.columns.clone(),
            rows,
            grand_total,
        })
    }
}
