//! `.xlsx` sink backed by `rust_xlsxwriter`.

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use std::path::Path;

use super::{SheetData, SheetSink};
use crate::error::{EmitError, EmitResult};
use crate::models::Cell;

/// Writes one workbook with one worksheet per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxSink;

impl SheetSink for XlsxSink {
    fn write_sheet(&mut self, path: &Path, sheet: &SheetData<'_>) -> EmitResult<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        fill_worksheet(worksheet, sheet).map_err(|e| to_emit_error(path, e))?;
        workbook.save(path).map_err(|e| to_emit_error(path, e))
    }
}

fn fill_worksheet(worksheet: &mut Worksheet, sheet: &SheetData<'_>) -> Result<(), XlsxError> {
    worksheet.set_name(&sheet.name)?;

    for directive in &sheet.formats.columns {
        let format = directive
            .num_format
            .as_deref()
            .map(|mask| Format::new().set_num_format(mask));
        for col in directive.first..=directive.last {
            worksheet.set_column_width(col, directive.width)?;
            if let Some(ref format) = format {
                worksheet.set_column_format(col, format)?;
            }
        }
    }

    // Header row, styled the way spreadsheet exports usually are
    let header = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center);
    for (col, name) in sheet.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, column_index(col)?, name, &header)?;
    }

    // Money cells carry their own format so they render the same in every reader
    let cell_formats = sheet
        .columns
        .iter()
        .enumerate()
        .map(|(col, _)| {
            let mask = sheet.formats.num_format_for(column_index(col)?);
            Ok(mask.map(|mask| Format::new().set_num_format(mask)))
        })
        .collect::<Result<Vec<Option<Format>>, XlsxError>>()?;

    for (r, row) in sheet.rows.iter().enumerate() {
        let row_num = row_index(r)?;
        for (c, cell) in row.iter().enumerate() {
            let col = column_index(c)?;
            let format = cell_formats.get(c).and_then(Option::as_ref);
            match cell {
                Cell::Empty => {}
                Cell::Integer(v) => write_number(worksheet, row_num, col, *v as f64, format)?,
                Cell::Amount(a) => {
                    let value = a.to_f64().ok_or_else(|| {
                        XlsxError::ParameterError(format!("amount {} has no f64 value", a))
                    })?;
                    write_number(worksheet, row_num, col, value, format)?
                }
                Cell::Text(s) => {
                    worksheet.write_string(row_num, col, s)?;
                }
            }
        }
    }

    Ok(())
}

fn write_number(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: f64,
    format: Option<&Format>,
) -> Result<(), XlsxError> {
    match format {
        Some(fmt) => worksheet.write_number_with_format(row, col, value, fmt)?,
        None => worksheet.write_number(row, col, value)?,
    };
    Ok(())
}

/// Sheet column for a 0-based position; positions past `u16` are out of range.
fn column_index(col: usize) -> Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}

/// Sheet row for a 0-based data row, below the header.
fn row_index(row: usize) -> Result<u32, XlsxError> {
    u32::try_from(row)
        .ok()
        .and_then(|r| r.checked_add(1))
        .ok_or(XlsxError::RowColumnLimitError)
}

fn to_emit_error(path: &Path, err: XlsxError) -> EmitError {
    match err {
        XlsxError::IoError(source) => EmitError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => EmitError::Xlsx {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::ColumnFormatSpec;
    use crate::models::Decimal;
    use calamine::{open_workbook, Data, Reader, Xlsx};

    fn write(dir: &Path, name: &str, rows: &[Vec<Cell>]) -> EmitResult<std::path::PathBuf> {
        let columns: Vec<String> = vec!["ITEM NUMBER".into(), "NOTE".into()];
        let formats = ColumnFormatSpec::order_sheet();
        let path = dir.join("Order1_Jo.xlsx");
        let data = SheetData {
            name: name.to_string(),
            columns: &columns,
            rows,
            formats: &formats,
        };
        XlsxSink.write_sheet(&path, &data)?;
        Ok(path)
    }

    #[test]
    fn test_written_workbook_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![
            vec![Cell::Integer(1), Cell::text("first")],
            vec![Cell::Empty, Cell::Amount("2.50".parse::<Decimal>().unwrap())],
        ];
        let path = write(dir.path(), "Order 1", &rows).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Order 1".to_string()]);

        let range = workbook.worksheet_range("Order 1").unwrap();
        let cells: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
        assert_eq!(
            cells[0],
            vec![Data::String("ITEM NUMBER".into()), Data::String("NOTE".into())]
        );
        assert_eq!(cells[1], vec![Data::Float(1.0), Data::String("first".into())]);
        assert_eq!(cells[2], vec![Data::Empty, Data::Float(2.5)]);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = write(&missing, "Order 1", &[]).unwrap_err();

        assert!(matches!(err, EmitError::Io { .. }));
        assert!(err.to_string().contains("does-not-exist"));
    }

    #[test]
    fn test_invalid_sheet_name_is_xlsx_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = write(dir.path(), "bad[name]", &[]).unwrap_err();
        assert!(matches!(err, EmitError::Xlsx { .. }));
    }

    #[test]
    fn test_padded_text_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![vec![Cell::Integer(1), Cell::text("  padded note  ")]];
        let path = write(dir.path(), "Order 1", &rows).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range("Order 1").unwrap();
        assert_eq!(range.get((1, 1)), Some(&Data::String("  padded note  ".into())));
    }

    #[test]
    fn test_positions_past_sheet_limits_are_rejected() {
        assert_eq!(column_index(65_535).unwrap(), 65_535);
        assert!(matches!(column_index(65_536), Err(XlsxError::RowColumnLimitError)));
        assert_eq!(row_index(0).unwrap(), 1);
        assert!(matches!(row_index(u32::MAX as usize), Err(XlsxError::RowColumnLimitError)));
    }

    #[test]
    fn test_too_many_columns_is_xlsx_error() {
        let dir = tempfile::tempdir().unwrap();
        let columns: Vec<String> = (0..70_000).map(|i| format!("C{}", i)).collect();
        let formats = ColumnFormatSpec::order_sheet();
        let data = SheetData {
            name: "Order 1".to_string(),
            columns: &columns,
            rows: &[],
            formats: &formats,
        };

        let err = XlsxSink.write_sheet(&dir.path().join("wide.xlsx"), &data).unwrap_err();
        assert!(matches!(err, EmitError::Xlsx { .. }));
    }
}
