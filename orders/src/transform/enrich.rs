//! Derive TOTAL PRICE and drop the address columns.

use crate::error::{SchemaError, SchemaResult};
use crate::models::{
    Cell, Decimal, EnrichedTable, Row, SalesTable, ADDRESS_COLUMNS, TOTAL_PRICE,
    TOTAL_PRICE_POSITION,
};

/// Insert TOTAL PRICE (= ITEM QUANTITY x ITEM PRICE) at
/// [`TOTAL_PRICE_POSITION`] of the original column order, then remove
/// every column in [`ADDRESS_COLUMNS`]. Row count and row order are kept.
pub fn enrich(table: SalesTable) -> SchemaResult<EnrichedTable> {
    let (mut columns, rows, index) = table.into_parts();
    let insert_at = TOTAL_PRICE_POSITION.min(columns.len());
    columns.insert(insert_at, TOTAL_PRICE.to_string());

    let keep: Vec<bool> = columns
        .iter()
        .map(|name| !ADDRESS_COLUMNS.contains(&name.as_str()))
        .collect();

    let mut enriched_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let quantity = row.cell(index.item_quantity);
        let price = row.cell(index.item_price);

        let total = match (quantity.as_integer(), price.as_amount()) {
            (Some(q), Some(p)) => p.checked_mul(Decimal::from(q)).ok_or_else(|| {
                let value = format!("{} x {}", q, p);
                SchemaError::invalid(row.line, TOTAL_PRICE, value, "total out of range")
            })?,
            _ => {
                return Err(SchemaError::invalid(
                    row.line,
                    TOTAL_PRICE,
                    format!("{} x {}", quantity, price),
                    "quantity and price must be numeric",
                ))
            }
        };

        let Row { line, mut cells } = row;
        cells.resize(keep.len() - 1, Cell::Empty);
        cells.insert(insert_at, Cell::Amount(total));
        let cells = cells
            .into_iter()
            .zip(&keep)
            .filter_map(|(cell, &kept)| kept.then_some(cell))
            .collect();
        enriched_rows.push(Row::new(line, cells));
    }

    let columns = columns
        .into_iter()
        .zip(&keep)
        .filter_map(|(name, &kept)| kept.then_some(name))
        .collect();

    EnrichedTable::from_parts(columns, enriched_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_sales_table;
    use crate::models::ORDER_ID;
    use crate::parser::parse_str;

    const HEADER: &str = "ORDER ID,ORDER DATE,ITEM NUMBER,PRODUCT LINE,PRODUCT CODE,ITEM QUANTITY,\
        ITEM PRICE,STATUS,CUSTOMER NAME,ADDRESS,CITY,STATE,POSTAL CODE,COUNTRY,CONTACT";

    fn enriched(body: &str) -> EnrichedTable {
        let raw = parse_str(&format!("{}\n{}", HEADER, body), ',').unwrap();
        enrich(load_sales_table(&raw).unwrap()).unwrap()
    }

    #[test]
    fn test_column_layout() {
        let table = enriched(
            "10,2024-01-05,1,Cars,S10,3,5.00,Shipped,Jo Doe,1 Main St,Springfield,IL,62701,USA,555",
        );
        assert_eq!(
            table.columns(),
            [
                "ORDER ID",
                "ORDER DATE",
                "ITEM NUMBER",
                "PRODUCT LINE",
                "PRODUCT CODE",
                "ITEM QUANTITY",
                "ITEM PRICE",
                "TOTAL PRICE",
                "STATUS",
                "CUSTOMER NAME",
                "CONTACT",
            ]
        );
        let row = &table.rows()[0];
        assert_eq!(row.cells.len(), table.columns().len());
        assert_eq!(row.cells[7], Cell::Amount(Decimal::from(15)));
        assert_eq!(row.cells[10], Cell::text("555"));
    }

    #[test]
    fn test_row_count_unchanged() {
        let table = enriched(
            "10,d,1,l,c,3,5.00,s,Jo,a,b,c,d,e,f\n\
             10,d,2,l,c,1,2.50,s,Jo,a,b,c,d,e,f\n\
             11,d,1,l,c,0,10.00,s,AB,a,b,c,d,e,f",
        );
        assert_eq!(table.len(), 3);
        assert_eq!(table.total(), Some("17.5".parse().unwrap()));
        assert!(table.columns().contains(&ORDER_ID.to_string()));
    }

    #[test]
    fn test_short_header_appends_total() {
        let raw = parse_str(
            "ORDER ID,ITEM NUMBER,ITEM QUANTITY,ITEM PRICE,CUSTOMER NAME\n1,1,4,0.25,Jo",
            ',',
        )
        .unwrap();
        let table = enrich(load_sales_table(&raw).unwrap()).unwrap();

        assert_eq!(table.columns().last().map(String::as_str), Some(TOTAL_PRICE));
        assert_eq!(table.rows()[0].cells[5], Cell::Amount(Decimal::ONE));
    }

    #[test]
    fn test_total_overflow_is_reported() {
        let raw = parse_str(
            "ORDER ID,ITEM NUMBER,ITEM QUANTITY,ITEM PRICE,CUSTOMER NAME\n\
             1,1,1000,79228162514264337593543950335,Jo",
            ',',
        )
        .unwrap();
        let err = enrich(load_sales_table(&raw).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidValue { line: 2, ref column, .. } if column == TOTAL_PRICE
        ));
    }

    #[test]
    fn test_non_numeric_cells_fail() {
        let columns = vec![
            "ORDER ID".to_string(),
            "ITEM NUMBER".to_string(),
            "ITEM QUANTITY".to_string(),
            "ITEM PRICE".to_string(),
            "CUSTOMER NAME".to_string(),
        ];
        let rows = vec![Row::new(
            2,
            vec![
                Cell::Integer(1),
                Cell::Integer(1),
                Cell::text("x"),
                Cell::Integer(1),
                Cell::text("Jo"),
            ],
        )];
        let err = enrich(SalesTable::new(columns, rows).unwrap()).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidValue { line: 2, .. }));
    }
}
