//! Stateless helper utilities used by the XLSX writer kernel.

use std::collections::BTreeSet;

use heatkit_heat::{EnumCellValue, format_number};

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL};
use crate::spec::{EnumAutofitColumnsRule, SpecAutofitCellsPolicy, XlsxWriteError};

////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().trim_matches('\'').to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Create suffixed sheet name (`base_2`, `base_3`, ...), respecting length cap.
pub fn create_sheet_identifier(base_name: &str, part_idx_1based: usize) -> String {
    let c_sheet_name_suffix = format!("_{part_idx_1based}");
    let n_len_base_name_max = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_sheet_name_suffix.len());

    let c_sheet_name_base: String = base_name
        .chars()
        .take(usize::max(1, n_len_base_name_max))
        .collect();

    format!("{c_sheet_name_base}{c_sheet_name_suffix}")
}

/// Pick a sheet name not yet in `existing` and record it.
///
/// Excel compares sheet names case-insensitively, so does this.
pub fn derive_unique_sheet_name(name: &str, existing: &mut BTreeSet<String>) -> String {
    if existing.insert(name.to_lowercase()) {
        return name.to_string();
    }

    let mut n_idx = 2usize;
    loop {
        let candidate = create_sheet_identifier(name, n_idx);
        if existing.insert(candidate.to_lowercase()) {
            return candidate;
        }
        n_idx += 1;
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DataFrameLikeUtils

/// Make header names unique by suffixing repeats (`Name`, `Name_2`, ...).
///
/// Returns the unique headers and the list of renamed originals.
pub fn derive_unique_headers(headers: &[String]) -> (Vec<String>, Vec<String>) {
    let mut set_seen: BTreeSet<String> = BTreeSet::new();
    let mut l_headers = Vec::with_capacity(headers.len());
    let mut l_renamed = Vec::new();

    for c_name in headers {
        if set_seen.insert(c_name.clone()) {
            l_headers.push(c_name.clone());
            continue;
        }
        let mut n_idx = 2usize;
        let c_unique = loop {
            let candidate = format!("{c_name}_{n_idx}");
            if !set_seen.contains(&candidate) {
                break candidate;
            }
            n_idx += 1;
        };
        set_seen.insert(c_unique.clone());
        l_renamed.push(c_name.clone());
        l_headers.push(c_unique);
    }

    (l_headers, l_renamed)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Autofit

/// Validate autofit bounds.
pub fn validate_policy_autofit(policy_autofit: &SpecAutofitCellsPolicy) -> Result<(), XlsxWriteError> {
    if policy_autofit.width_cell_min == 0 {
        return Err(XlsxWriteError::InvalidPolicy(
            "width_cell_min must be >= 1.".to_string(),
        ));
    }
    if policy_autofit.width_cell_max < policy_autofit.width_cell_min {
        return Err(XlsxWriteError::InvalidPolicy(
            "width_cell_max must be >= width_cell_min.".to_string(),
        ));
    }
    Ok(())
}

/// Estimate displayed width units for one cell value.
pub fn estimate_width_len(value: &EnumCellValue, missing_value_str: Option<&str>) -> usize {
    match value {
        EnumCellValue::None => missing_value_str.map_or(0, str::len),
        EnumCellValue::String(s) => estimate_unicode_string_width(s),
        EnumCellValue::Number(n) => format_number(*n).len(),
    }
}

/// Width estimate where non-ASCII glyphs count as wider than ASCII.
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

/// Final column width from recorded header/body widths and policy bounds.
pub fn calculate_column_width(
    width_header: usize,
    width_body: usize,
    policy_autofit: &SpecAutofitCellsPolicy,
) -> Option<usize> {
    let n_width_recorded = match policy_autofit.rule_columns {
        EnumAutofitColumnsRule::None => return None,
        EnumAutofitColumnsRule::Header => width_header,
        EnumAutofitColumnsRule::Body => width_body,
        EnumAutofitColumnsRule::All => usize::max(width_header, width_body),
    };
    let n_min = usize::max(1, policy_autofit.width_cell_min);
    let n_max = usize::min(255, usize::max(n_min, policy_autofit.width_cell_max));
    Some(usize::min(
        n_max,
        usize::max(n_min, n_width_recorded + policy_autofit.width_cell_padding),
    ))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Coordinates

/// Convert a row index into an Excel row number.
pub fn cast_row_num(value: usize) -> Result<u32, XlsxWriteError> {
    if value >= N_NROWS_EXCEL_MAX {
        return Err(XlsxWriteError::IndexOverflow(format!(
            "row index overflow: {value}"
        )));
    }
    u32::try_from(value)
        .map_err(|_| XlsxWriteError::IndexOverflow(format!("row index overflow: {value}")))
}

/// Convert a column index into an Excel column number.
pub fn cast_col_num(value: usize) -> Result<u16, XlsxWriteError> {
    if value >= N_NCOLS_EXCEL_MAX {
        return Err(XlsxWriteError::IndexOverflow(format!(
            "column index overflow: {value}"
        )));
    }
    u16::try_from(value)
        .map_err(|_| XlsxWriteError::IndexOverflow(format!("column index overflow: {value}")))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
