//! Conversion between heat/roster tables and Polars DataFrames.
//!
//! Columns whose present values are all numbers become numeric dtypes
//! (`Int64` when every value is integral, `Float64` otherwise); anything else
//! becomes a `String` column. The writer infers cell formats from these dtypes.

use heatkit_heat::{EnumCellValue, SpecHeat, SpecRoster};
use polars::prelude::{AnyValue, Column, DataFrame, PlSmallStr};

use crate::spec::XlsxWriteError;
use crate::util::derive_unique_headers;

/// Build a DataFrame from headers and row-major cells.
pub fn derive_dataframe_from_grid(
    headers: &[String],
    grid: &[Vec<EnumCellValue>],
) -> Result<DataFrame, XlsxWriteError> {
    let (l_headers, _) = derive_unique_headers(headers);

    let mut l_cols = Vec::with_capacity(l_headers.len());
    for (n_idx_col, c_name) in l_headers.iter().enumerate() {
        let l_values: Vec<&EnumCellValue> = grid
            .iter()
            .map(|row| row.get(n_idx_col).unwrap_or(&EnumCellValue::None))
            .collect();
        l_cols.push(derive_column(c_name, &l_values));
    }

    DataFrame::new(l_cols).map_err(|err| XlsxWriteError::Frame(err.to_string()))
}

/// Expanded roster as a DataFrame (roster headers, one row per entry).
pub fn derive_dataframe_from_roster(roster: &SpecRoster) -> Result<DataFrame, XlsxWriteError> {
    let layout = &roster.layout;
    let l_grid: Vec<Vec<EnumCellValue>> =
        roster.rows.iter().map(|row| layout.values(row)).collect();
    derive_dataframe_from_grid(&layout.headers(), &l_grid)
}

/// One heat as a DataFrame with the position column first.
pub fn derive_dataframe_from_heat(
    layout: &heatkit_heat::SpecColumnLayout,
    heat: &SpecHeat,
) -> Result<DataFrame, XlsxWriteError> {
    let l_grid: Vec<Vec<EnumCellValue>> = heat
        .entries()
        .iter()
        .map(|entry| layout.heat_values(entry.position(), entry.row()))
        .collect();
    derive_dataframe_from_grid(&layout.heat_headers(), &l_grid)
}

fn derive_column(name: &str, values: &[&EnumCellValue]) -> Column {
    let c_name = PlSmallStr::from(name);

    let if_has_value = values.iter().any(|value| !value.is_missing());
    let if_all_numeric = values
        .iter()
        .all(|value| matches!(value, EnumCellValue::None | EnumCellValue::Number(_)));

    if if_has_value && if_all_numeric {
        let if_all_integer = values.iter().all(|value| {
            value
                .as_number()
                .is_none_or(|n| n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15)
        });
        if if_all_integer {
            let l_ints: Vec<Option<i64>> = values
                .iter()
                .map(|value| value.as_number().map(|n| n as i64))
                .collect();
            return Column::new(c_name, l_ints);
        }
        let l_floats: Vec<Option<f64>> = values.iter().map(|value| value.as_number()).collect();
        return Column::new(c_name, l_floats);
    }

    let l_texts: Vec<Option<String>> = values
        .iter()
        .map(|value| match value {
            EnumCellValue::None => None,
            other => Some(other.to_text()),
        })
        .collect();
    Column::new(c_name, l_texts)
}

/// Convert one Polars value back into a cell value.
pub fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => {
            EnumCellValue::String(if val { "True" } else { "False" }.to_string())
        }
        AnyValue::UInt8(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt16(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt32(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int8(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int16(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        _ => EnumCellValue::String(value.to_string()),
    }
}
