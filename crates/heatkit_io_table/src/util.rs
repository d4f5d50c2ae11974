//! Header normalization, numeric detection and date serial helpers.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, Timelike};
use heatkit_heat::{EnumCellValue, SpecSourceTable};

use crate::conf::{C_HEADER_UNNAMED_PREFIX, TUP_SPREADSHEET_EPOCH};
use crate::spec::LoadError;

/// Trim header names, name blank ones by position and reject duplicates.
pub fn derive_headers<I, S>(raw: I) -> Result<Vec<String>, LoadError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set_seen = BTreeSet::new();
    let mut l_headers = Vec::new();
    for (n_idx, c_raw) in raw.into_iter().enumerate() {
        let c_trimmed = c_raw.as_ref().trim();
        let c_name = if c_trimmed.is_empty() {
            format!("{C_HEADER_UNNAMED_PREFIX}{n_idx}")
        } else {
            c_trimmed.to_string()
        };
        if !set_seen.insert(c_name.clone()) {
            return Err(LoadError::DuplicateHeader(c_name));
        }
        l_headers.push(c_name);
    }
    Ok(l_headers)
}

/// Pad or cut a row to `n_width` cells.
pub fn fit_row(mut row: Vec<EnumCellValue>, n_width: usize) -> Vec<EnumCellValue> {
    row.resize(n_width, EnumCellValue::None);
    row
}

/// Whether every cell of the row is blank.
pub fn is_blank_row(row: &[EnumCellValue]) -> bool {
    row.iter().all(EnumCellValue::is_missing)
}

fn parse_finite(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Turn text columns whose present values all parse as finite numbers into
/// numeric columns. Columns with no present value stay untouched.
pub fn infer_numeric_columns(table: &mut SpecSourceTable) {
    for n_idx_col in 0..table.width() {
        let mut if_has_value = false;
        let if_numeric = table.rows.iter().all(|row| match row.get(n_idx_col) {
            Some(EnumCellValue::String(s)) => {
                if_has_value = true;
                parse_finite(s).is_some()
            }
            _ => true,
        });
        if !(if_has_value && if_numeric) {
            continue;
        }
        for row in &mut table.rows {
            if let Some(cell) = row.get_mut(n_idx_col)
                && let EnumCellValue::String(s) = cell
                && let Some(n) = parse_finite(s)
            {
                *cell = EnumCellValue::Number(n);
            }
        }
    }
}

/// ISO text for a spreadsheet date serial (1900 system).
///
/// Whole days render as `YYYY-MM-DD`, otherwise `YYYY-MM-DD HH:MM:SS`.
pub fn derive_date_text_from_serial(serial: f64) -> Option<String> {
    if !serial.is_finite() {
        return None;
    }
    let (n_year, n_month, n_day) = TUP_SPREADSHEET_EPOCH;
    let dt_epoch = NaiveDate::from_ymd_opt(n_year, n_month, n_day)?.and_hms_opt(0, 0, 0)?;
    let n_millis = (serial * 86_400_000.0).round() as i64;
    let dt = dt_epoch.checked_add_signed(Duration::milliseconds(n_millis))?;
    if dt.num_seconds_from_midnight() == 0 {
        Some(dt.format("%Y-%m-%d").to_string())
    } else {
        Some(dt.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}
