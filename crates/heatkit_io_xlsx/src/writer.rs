//! XLSX writer kernel that lays rosters and heat plans out as workbook sheets.

use std::collections::BTreeSet;
use std::path::PathBuf;

use heatkit_heat::{EnumCellValue, SpecHeatPlan, SpecRoster};
use polars::prelude::DataFrame;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use tracing::{debug, info};

use crate::conf::{N_NROWS_EXCEL_MAX, derive_default_xlsx_formats};
use crate::frame::{
    derive_cell_value_from_any_value, derive_dataframe_from_heat, derive_dataframe_from_roster,
};
use crate::spec::{
    SpecCellFormat, SpecXlsxFormats, SpecXlsxReport, SpecXlsxWriteOptions, XlsxWriteError,
};
use crate::util::{
    calculate_column_width, cast_col_num, cast_row_num, derive_unique_sheet_name,
    estimate_unicode_string_width, estimate_width_len, sanitize_sheet_name,
    validate_policy_autofit,
};

/// Realized cell formats for one sheet.
struct SpecSheetFormats {
    text: Format,
    integer: Format,
    decimal: Format,
    header: Format,
    title: Format,
}

impl SpecSheetFormats {
    fn from_spec(formats: &SpecXlsxFormats) -> Self {
        Self {
            text: derive_rust_xlsx_format(&formats.text),
            integer: derive_rust_xlsx_format(&formats.integer),
            decimal: derive_rust_xlsx_format(&formats.decimal),
            header: derive_rust_xlsx_format(&formats.header),
            title: derive_rust_xlsx_format(&formats.title),
        }
    }
}

/// Running header/body width record for autofit.
#[derive(Debug, Default)]
struct SpecColumnWidths {
    l_width_by_col_header: Vec<usize>,
    l_width_by_col_body: Vec<usize>,
}

impl SpecColumnWidths {
    fn record(l_widths: &mut Vec<usize>, n_idx_col: usize, n_width: usize) {
        if l_widths.len() <= n_idx_col {
            l_widths.resize(n_idx_col + 1, 0);
        }
        l_widths[n_idx_col] = usize::max(l_widths[n_idx_col], n_width);
    }

    fn record_header(&mut self, n_idx_col: usize, n_width: usize) {
        Self::record(&mut self.l_width_by_col_header, n_idx_col, n_width);
    }

    fn record_body(&mut self, n_idx_col: usize, n_width: usize) {
        Self::record(&mut self.l_width_by_col_body, n_idx_col, n_width);
    }

    fn width(&self) -> usize {
        usize::max(self.l_width_by_col_header.len(), self.l_width_by_col_body.len())
    }
}

/// Stateful workbook writer.
pub struct XlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    formats: SpecXlsxFormats,
    write_options: SpecXlsxWriteOptions,
    set_sheet_names_existing: BTreeSet<String>,
    l_reports: Vec<SpecXlsxReport>,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer bound to output path with default format presets.
    ///
    /// The workbook is buffered in memory until [`Self::close`] is called.
    pub fn new(path_file_out: impl Into<PathBuf>, write_options: SpecXlsxWriteOptions) -> Self {
        Self::with_formats(path_file_out, derive_default_xlsx_formats(), write_options)
    }

    /// Create writer with explicit format presets.
    pub fn with_formats(
        path_file_out: impl Into<PathBuf>,
        formats: SpecXlsxFormats,
        write_options: SpecXlsxWriteOptions,
    ) -> Self {
        Self {
            path_file_out: path_file_out.into(),
            workbook: Workbook::new(),
            formats,
            write_options,
            set_sheet_names_existing: BTreeSet::new(),
            l_reports: Vec::new(),
            if_closed: false,
        }
    }

    /// Output file path as display text.
    pub fn file_out(&self) -> String {
        self.path_file_out.to_string_lossy().to_string()
    }

    /// Return immutable snapshot of per-call write reports.
    pub fn report(&self) -> Vec<SpecXlsxReport> {
        self.l_reports.clone()
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> Result<(), XlsxWriteError> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook.save(&self.path_file_out)?;
        self.if_closed = true;
        info!(path = %self.path_file_out.display(), "Saved workbook");
        Ok(())
    }

    /// Write the expanded roster as one sheet: a header row and one row per entry.
    pub fn write_entries(
        &mut self,
        entries: &SpecRoster,
        sheet_name: &str,
    ) -> Result<(), XlsxWriteError> {
        let df = derive_dataframe_from_roster(entries)?;
        self.write_sheet_from_dataframe(&df, sheet_name)
    }

    /// Write one single-table sheet from an in-memory dataframe.
    pub fn write_sheet_from_dataframe(
        &mut self,
        df: &DataFrame,
        sheet_name: &str,
    ) -> Result<(), XlsxWriteError> {
        self.validate_open()?;
        validate_policy_autofit(&self.write_options.policy_autofit)?;

        let c_sheet_name = sanitize_sheet_name(sheet_name, "_");
        let n_rows_total = df.height() + 1;
        if n_rows_total > N_NROWS_EXCEL_MAX {
            return Err(XlsxWriteError::TooManyRows {
                sheet: c_sheet_name,
                rows: n_rows_total,
                limit: N_NROWS_EXCEL_MAX,
            });
        }

        let mut report = SpecXlsxReport::default();
        let sheet_name_unique =
            derive_unique_sheet_name(&c_sheet_name, &mut self.set_sheet_names_existing);
        if sheet_name_unique != sheet_name {
            report.warn(format!(
                "Sheet name {sheet_name:?} written as {sheet_name_unique:?}."
            ));
        }

        let fmts = SpecSheetFormats::from_spec(&self.formats);
        let write_options = &self.write_options;
        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&sheet_name_unique)?;

        let mut widths = SpecColumnWidths::default();
        write_table_block(worksheet, 0, df, &fmts, write_options, &mut widths)?;
        if write_options.if_freeze_header {
            worksheet.set_freeze_panes(1, 0)?;
        }
        apply_column_widths(worksheet, &widths, write_options)?;

        report.sheets.push(sheet_name_unique);
        report.cnt_rows = df.height();
        debug!(rows = report.cnt_rows, sheet = %report.sheets[0], "Wrote table sheet");
        self.l_reports.push(report);
        Ok(())
    }

    /// Write one sheet per heat group.
    ///
    /// Each heat is laid out as a `Heat {n}` title row, a header row, one row
    /// per entry, then `n_rows_spacer` blank rows.
    pub fn write_plan(&mut self, plan: &SpecHeatPlan) -> Result<(), XlsxWriteError> {
        self.validate_open()?;
        validate_policy_autofit(&self.write_options.policy_autofit)?;

        let mut report = SpecXlsxReport::default();
        let fmts = SpecSheetFormats::from_spec(&self.formats);

        for group in plan.groups() {
            let c_label = group.label();
            let c_sheet_name = sanitize_sheet_name(&c_label, "_");

            let l_frames = group
                .heats()
                .iter()
                .map(|heat| derive_dataframe_from_heat(plan.layout(), heat))
                .collect::<Result<Vec<_>, _>>()?;

            let n_rows_total: usize = l_frames
                .iter()
                .map(|df| 2 + df.height() + self.write_options.n_rows_spacer)
                .sum();
            if n_rows_total > N_NROWS_EXCEL_MAX {
                return Err(XlsxWriteError::TooManyRows {
                    sheet: c_sheet_name,
                    rows: n_rows_total,
                    limit: N_NROWS_EXCEL_MAX,
                });
            }

            let sheet_name_unique =
                derive_unique_sheet_name(&c_sheet_name, &mut self.set_sheet_names_existing);
            if sheet_name_unique != c_label {
                report.warn(format!(
                    "Group {c_label:?} written to sheet {sheet_name_unique:?}."
                ));
            }

            let write_options = &self.write_options;
            let worksheet = self.workbook.add_worksheet();
            worksheet.set_name(&sheet_name_unique)?;

            let mut widths = SpecColumnWidths::default();
            let mut n_row_cursor = 0usize;
            for (heat, df) in group.heats().iter().zip(&l_frames) {
                let c_title = format!("Heat {}", heat.heat_number());
                worksheet.write_string_with_format(
                    cast_row_num(n_row_cursor)?,
                    0,
                    &c_title,
                    &fmts.title,
                )?;
                n_row_cursor += 1;

                n_row_cursor += write_table_block(
                    worksheet,
                    n_row_cursor,
                    df,
                    &fmts,
                    write_options,
                    &mut widths,
                )?;
                n_row_cursor += write_options.n_rows_spacer;
                report.cnt_rows += df.height();
            }
            apply_column_widths(worksheet, &widths, write_options)?;

            debug!(
                sheet = %sheet_name_unique,
                heats = group.heats().len(),
                "Wrote heat group sheet"
            );
            report.sheets.push(sheet_name_unique);
        }

        info!(
            sheets = report.sheets.len(),
            rows = report.cnt_rows,
            "Laid out heat plan"
        );
        self.l_reports.push(report);
        Ok(())
    }

    fn validate_open(&self) -> Result<(), XlsxWriteError> {
        if self.if_closed {
            return Err(XlsxWriteError::Closed);
        }
        Ok(())
    }
}

/// Write header + body of `df` starting at `n_row_start`; return rows written.
fn write_table_block(
    worksheet: &mut Worksheet,
    n_row_start: usize,
    df: &DataFrame,
    fmts: &SpecSheetFormats,
    write_options: &SpecXlsxWriteOptions,
    widths: &mut SpecColumnWidths,
) -> Result<usize, XlsxWriteError> {
    let c_missing = if write_options.keep_missing_values {
        Some(write_options.missing_value_str.as_str())
    } else {
        None
    };

    for (n_idx_col, c_name) in df.get_column_names_str().into_iter().enumerate() {
        worksheet.write_string_with_format(
            cast_row_num(n_row_start)?,
            cast_col_num(n_idx_col)?,
            c_name,
            &fmts.header,
        )?;
        widths.record_header(n_idx_col, estimate_unicode_string_width(c_name));
    }

    for (n_idx_col, col) in df.get_columns().iter().enumerate() {
        let if_is_numeric_col = write_options.infer_numeric_cols && col.dtype().is_numeric();
        let fmt_body = if !if_is_numeric_col {
            &fmts.text
        } else if col.dtype().is_integer() {
            &fmts.integer
        } else {
            &fmts.decimal
        };

        for n_idx_row in 0..df.height() {
            let value_raw = derive_cell_value_from_any_value(
                col.get(n_idx_row)
                    .map_err(|err| XlsxWriteError::Frame(format!("Failed to access cell value: {err}")))?,
            );
            let value = match value_raw {
                EnumCellValue::Number(n) if !if_is_numeric_col => {
                    EnumCellValue::String(heatkit_heat::format_number(n))
                }
                EnumCellValue::None => match c_missing {
                    Some(c_text) => EnumCellValue::String(c_text.to_string()),
                    None => EnumCellValue::None,
                },
                other => other,
            };

            widths.record_body(n_idx_col, estimate_width_len(&value, None));
            write_cell_with_format(
                worksheet,
                n_row_start + 1 + n_idx_row,
                n_idx_col,
                &value,
                fmt_body,
            )?;
        }
    }

    Ok(1 + df.height())
}

fn apply_column_widths(
    worksheet: &mut Worksheet,
    widths: &SpecColumnWidths,
    write_options: &SpecXlsxWriteOptions,
) -> Result<(), XlsxWriteError> {
    for n_idx_col in 0..widths.width() {
        let n_header = widths.l_width_by_col_header.get(n_idx_col).copied().unwrap_or(0);
        let n_body = widths.l_width_by_col_body.get(n_idx_col).copied().unwrap_or(0);
        if let Some(n_width_final) =
            calculate_column_width(n_header, n_body, &write_options.policy_autofit)
        {
            worksheet.set_column_width(cast_col_num(n_idx_col)?, n_width_final as f64)?;
        }
    }
    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), XlsxWriteError> {
    match value {
        EnumCellValue::None => {
            worksheet.write_blank(cast_row_num(row_idx)?, cast_col_num(col_idx)?, format)?;
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(
                cast_row_num(row_idx)?,
                cast_col_num(col_idx)?,
                val,
                format,
            )?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(
                cast_row_num(row_idx)?,
                cast_col_num(col_idx)?,
                *val,
                format,
            )?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.italic.unwrap_or(false) {
        format = format.set_italic();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}
