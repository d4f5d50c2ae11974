//! Spreadsheet workbook reader on top of `calamine`.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use heatkit_heat::{EnumCellValue, SpecSourceTable};
use tracing::{debug, warn};

use crate::spec::LoadError;
use crate::util::{derive_date_text_from_serial, derive_headers, fit_row, is_blank_row};

/// Convert one workbook cell.
///
/// Date cells become ISO text, durations stay numeric and error cells
/// (`#N/A`, `#DIV/0!`) read as missing.
pub fn derive_cell_value_from_data(data: &Data) -> EnumCellValue {
    match data {
        Data::Empty | Data::Error(_) => EnumCellValue::None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            EnumCellValue::from_text(s)
        }
        Data::Int(n) => EnumCellValue::Number(*n as f64),
        Data::Float(n) => EnumCellValue::Number(*n),
        Data::Bool(b) => EnumCellValue::String(if *b { "True" } else { "False" }.to_string()),
        Data::DateTime(dt) if dt.is_datetime() => derive_date_text_from_serial(dt.as_f64())
            .map_or(EnumCellValue::None, EnumCellValue::String),
        Data::DateTime(dt) => EnumCellValue::Number(dt.as_f64()),
    }
}

/// Read one worksheet; the first row of its used range is the header.
pub fn read_workbook(path: &Path, sheet_name: Option<&str>) -> Result<SpecSourceTable, LoadError> {
    let err_workbook = |source: calamine::Error| LoadError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(err_workbook)?;
    let l_sheet_names = workbook.sheet_names();
    let c_sheet = match sheet_name {
        Some(c_name) => l_sheet_names
            .iter()
            .find(|c_candidate| c_candidate.as_str() == c_name)
            .cloned()
            .ok_or_else(|| LoadError::SheetNotFound {
                sheet: c_name.to_string(),
                available: l_sheet_names.clone(),
            })?,
        None => l_sheet_names
            .first()
            .cloned()
            .ok_or_else(|| LoadError::EmptySource(path.to_path_buf()))?,
    };
    if sheet_name.is_none() && l_sheet_names.len() > 1 {
        warn!(sheet = %c_sheet, sheets = l_sheet_names.len(), "reading first worksheet only");
    }

    let range = workbook.worksheet_range(&c_sheet).map_err(err_workbook)?;
    let mut iter_rows = range.rows();
    let Some(row_header) = iter_rows.next() else {
        return Err(LoadError::EmptySource(path.to_path_buf()));
    };
    let l_columns = derive_headers(
        row_header
            .iter()
            .map(|data| derive_cell_value_from_data(data).to_text()),
    )?;
    let n_width = l_columns.len();

    let mut l_rows = Vec::new();
    for row_raw in iter_rows {
        let row = fit_row(row_raw.iter().map(derive_cell_value_from_data).collect(), n_width);
        if !is_blank_row(&row) {
            l_rows.push(row);
        }
    }
    debug!(
        path = %path.display(),
        sheet = %c_sheet,
        rows = l_rows.len(),
        columns = n_width,
        "read workbook source"
    );

    Ok(SpecSourceTable {
        columns: l_columns,
        rows: l_rows,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_xlsxwriter::{Format, Workbook};

    use super::*;

    fn write_workbook(path: &Path) {
        let mut workbook = Workbook::new();
        let fmt_date = Format::new().set_num_format("yyyy-mm-dd");

        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Notes").expect("name");
        worksheet.write_string(0, 0, "ignored").expect("cell");

        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Entries").expect("name");
        for (n_col, c_header) in ["Name", "Bib", "Club", "DOB", "Events"].iter().enumerate() {
            worksheet
                .write_string(0, n_col as u16, *c_header)
                .expect("header");
        }
        worksheet.write_string(1, 0, "Ana").expect("cell");
        worksheet.write_number(1, 1, 101).expect("cell");
        worksheet.write_string(1, 2, "Owls").expect("cell");
        worksheet
            .write_datetime_with_format(
                1,
                3,
                &rust_xlsxwriter::ExcelDateTime::from_ymd(2008, 3, 14).expect("date"),
                &fmt_date,
            )
            .expect("cell");
        worksheet.write_string(1, 4, "100m & 200m").expect("cell");
        worksheet.write_string(3, 0, "Ben").expect("cell");
        worksheet.write_boolean(3, 2, true).expect("cell");

        workbook.save(path).expect("save");
    }

    #[test]
    fn test_read_workbook_named_sheet_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("entries.xlsx");
        write_workbook(&path);

        let table = read_workbook(&path, Some("Entries")).expect("table");
        assert_eq!(table.columns, vec!["Name", "Bib", "Club", "DOB", "Events"]);
        assert_eq!(table.height(), 2);
        assert_eq!(table.value(0, 1), EnumCellValue::Number(101.0));
        assert_eq!(table.value(0, 3), EnumCellValue::from("2008-03-14"));
        assert_eq!(table.value(0, 4), EnumCellValue::from("100m & 200m"));
        assert_eq!(table.value(1, 0), EnumCellValue::from("Ben"));
        assert_eq!(table.value(1, 2), EnumCellValue::from("True"));
        assert_eq!(table.value(1, 4), EnumCellValue::None);
    }

    #[test]
    fn test_read_workbook_defaults_to_first_sheet_and_reports_missing_sheet() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("entries.xlsx");
        write_workbook(&path);

        let table = read_workbook(&path, None).expect("table");
        assert_eq!(table.columns, vec!["ignored"]);

        let err = read_workbook(&path, Some("Heats")).expect_err("missing sheet");
        match err {
            LoadError::SheetNotFound { sheet, available } => {
                assert_eq!(sheet, "Heats");
                assert_eq!(available, vec!["Notes", "Entries"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
