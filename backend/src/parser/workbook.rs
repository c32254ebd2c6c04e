//! Binary spreadsheet decoding (xlsx, xls, xlsb, ods) via calamine.
//!
//! Only the first worksheet is read; later sheets are ignored.

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;

use crate::error::{FormatError, FormatResult};
use crate::models::{RawRow, RawValue};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Decode a workbook and return the rows of its first worksheet.
pub fn parse_workbook(bytes: &[u8]) -> FormatResult<Vec<RawRow>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| FormatError::UnreadableWorkbook(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(FormatError::NoWorksheet)?
        .map_err(|e| FormatError::UnreadableWorkbook(e.to_string()))?;

    Ok(rows_from_range(&range))
}

/// Turn a cell grid into rows keyed by its first (header) row.
pub fn rows_from_range(range: &Range<Data>) -> Vec<RawRow> {
    let mut grid = range.rows();

    let headers: Vec<String> = match grid.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect(),
        None => return Vec::new(),
    };

    grid.map(|cells| {
        headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let value = cells.get(i).map(cell_value).unwrap_or_else(|| RawValue::from(""));
                (header.clone(), value)
            })
            .collect::<RawRow>()
    })
    .filter(|row| !row.is_blank())
    .collect()
}

fn cell_value(cell: &Data) -> RawValue {
    match cell {
        Data::Empty | Data::Error(_) => RawValue::from(""),
        Data::Int(i) => RawValue::Number(*i as f64),
        Data::Float(f) => RawValue::Number(*f),
        Data::String(s) => RawValue::from(s.as_str()),
        Data::Bool(b) => RawValue::from(b.to_string()),
        Data::DateTime(dt) if dt.is_duration() || dt.as_f64() < 1.0 => {
            RawValue::from(day_fraction_to_clock(dt.as_f64()))
        }
        other => RawValue::from(other.to_string()),
    }
}

/// Spreadsheet times are fractions of a day; render them as `H:MM:SS`.
fn day_fraction_to_clock(days: f64) -> String {
    let total = (days * SECONDS_PER_DAY).round().max(0.0) as u64;
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}
