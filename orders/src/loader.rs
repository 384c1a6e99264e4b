//! Schema validation from raw CSV rows into a typed [`SalesTable`].
//!
//! Required columns are resolved once, then every row's numeric cells are
//! parsed. The first malformed value fails the whole load.
//!
//! Only the numeric cells are trimmed; every other value is kept exactly as
//! it appears in the source.

use std::str::FromStr;

use crate::error::{SchemaError, SchemaResult};
use crate::models::{Cell, Decimal, Row, SalesColumns, SalesTable};
use crate::parser::{ParseResult, RawRow};

/// Type every cell of `raw` and build a [`SalesTable`].
///
/// ORDER ID, ITEM NUMBER and ITEM QUANTITY must be integers, ITEM PRICE an
/// exact decimal. Every other column is passed through as text, untrimmed.
pub fn load_sales_table(raw: &ParseResult) -> SchemaResult<SalesTable> {
    let index = SalesColumns::resolve(&raw.headers)?;

    let rows = raw
        .rows
        .iter()
        .map(|row| type_row(row, &raw.headers, index))
        .collect::<SchemaResult<Vec<_>>>()?;

    SalesTable::new(raw.headers.clone(), rows)
}

fn type_row(raw: &RawRow, headers: &[String], index: SalesColumns) -> SchemaResult<Row> {
    let cells = raw
        .values
        .iter()
        .enumerate()
        .map(|(col, value)| {
            if col == index.order_id || col == index.item_number || col == index.item_quantity {
                parse_integer(raw.line, &headers[col], value).map(Cell::Integer)
            } else if col == index.item_price {
                parse_amount(raw.line, &headers[col], value).map(Cell::Amount)
            } else {
                Ok(Cell::text(value))
            }
        })
        .collect::<SchemaResult<Vec<_>>>()?;

    Ok(Row::new(raw.line, cells))
}

fn parse_integer(line: u64, column: &str, value: &str) -> SchemaResult<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| SchemaError::invalid(line, column, value, "expected an integer"))
}

fn parse_amount(line: u64, column: &str, value: &str) -> SchemaResult<Decimal> {
    Decimal::from_str(value.trim()).map_err(|e| {
        let message = format!("expected a decimal number ({})", e);
        SchemaError::invalid(line, column, value, message)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CUSTOMER_NAME, ITEM_PRICE};
    use crate::parser::parse_str;

    const HEADER: &str = "ORDER ID,ORDER DATE,ITEM NUMBER,ITEM QUANTITY,ITEM PRICE,CUSTOMER NAME";

    fn load(body: &str) -> SchemaResult<SalesTable> {
        let raw = parse_str(&format!("{}\n{}", HEADER, body), ',').unwrap();
        load_sales_table(&raw)
    }

    #[test]
    fn test_cells_are_typed() {
        let table = load("10,2024-01-05,2,3,5.00,Jo Doe").unwrap();
        let row = &table.rows()[0];

        assert_eq!(row.cells[0], Cell::Integer(10));
        assert_eq!(row.cells[1], Cell::text("2024-01-05"));
        assert_eq!(row.cells[2], Cell::Integer(2));
        assert_eq!(row.cells[3], Cell::Integer(3));
        assert_eq!(row.cells[4], Cell::Amount("5".parse().unwrap()));
        assert_eq!(row.cells[5], Cell::text("Jo Doe"));
    }

    #[test]
    fn test_numeric_cells_trimmed_text_kept() {
        let table = load(" 10 ,  2024-01-05 , 2 ,3, 5.00 ,  Jo Doe  ").unwrap();
        let row = &table.rows()[0];

        assert_eq!(row.cells[0], Cell::Integer(10));
        assert_eq!(row.cells[1], Cell::text("  2024-01-05 "));
        assert_eq!(row.cells[4], Cell::Amount("5".parse().unwrap()));
        assert_eq!(row.cells[5], Cell::text("  Jo Doe  "));
    }

    #[test]
    fn test_non_numeric_quantity_names_line_and_column() {
        let err = load("10,2024-01-05,1,3,5.00,Jo\n10,2024-01-05,2,three,5.00,Jo").unwrap_err();
        match err {
            SchemaError::InvalidValue { line, column, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "ITEM QUANTITY");
                assert_eq!(value, "three");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_price_is_schema_error() {
        let err = load("10,2024-01-05,1,3,$5.00,Jo").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidValue { ref column, .. } if column == ITEM_PRICE
        ));
    }

    #[test]
    fn test_missing_required_column() {
        let raw = parse_str("ORDER ID,ITEM NUMBER,ITEM QUANTITY,ITEM PRICE\n1,1,1,1", ',').unwrap();
        let err = load_sales_table(&raw).unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn(ref c) if c == CUSTOMER_NAME));
    }

    #[test]
    fn test_missing_order_id_value_is_invalid() {
        let err = load(",2024-01-05,1,3,5.00,Jo").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidValue { line: 2, .. }));
    }

    #[test]
    fn test_header_only_loads_empty() {
        let raw = parse_str(HEADER, ',').unwrap();
        assert!(load_sales_table(&raw).unwrap().is_empty());
    }
}
