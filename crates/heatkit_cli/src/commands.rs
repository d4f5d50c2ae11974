//! Subcommand arguments and handlers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use heatkit_heat::{
    EnumFieldRole, ReportHeats, SpecColumnMapping, SpecHeatPlan, SpecRoster, SpecSourceTable,
    expand, partition, render_entries, render_plan, render_table,
};
use heatkit_io_pdf::{SpecPdfOptions, write_plan_pdf};
use heatkit_io_table::{SpecLoadOptions, load_table};
use heatkit_io_xlsx::{C_SHEET_NAME_ENTRIES, XlsxWriter, derive_default_xlsx_write_options};
use tracing::{info, warn};

use crate::config::SpecHeatkitConfig;

////////////////////////////////////////////////////////////////////////////////
// #region Arguments

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Registration file (csv, tsv, xlsx, xlsm, xls, ods)
    pub input: PathBuf,

    /// Worksheet to read from a workbook (first sheet by default)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Field delimiter for delimited text (`,` for csv, tab for tsv by default)
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Keep delimited columns as text instead of detecting numbers
    #[arg(long)]
    pub keep_text: bool,

    /// Map a role onto a source column, e.g. `--map bib="Bib No"` (repeatable)
    #[arg(short = 'm', long = "map", value_name = "ROLE=COLUMN", value_parser = parse_mapping_pair)]
    pub mappings: Vec<(EnumFieldRole, String)>,
}

#[derive(Debug, Args)]
pub struct ExpandArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output workbook for the expanded table
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Print a preview of the expanded table
    #[arg(long)]
    pub print: bool,

    /// Rows shown by `--print`
    #[arg(long, default_value_t = 20)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct HeatsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Maximum intended heat size
    #[arg(short = 'n', long)]
    pub capacity: Option<usize>,

    /// Heat workbook output path
    #[arg(long)]
    pub xlsx: Option<PathBuf>,

    /// Heat sheet PDF output path
    #[arg(long)]
    pub pdf: Option<PathBuf>,

    /// Also write the expanded table to this workbook
    #[arg(long)]
    pub transformed: Option<PathBuf>,

    /// Skip the heat workbook
    #[arg(long)]
    pub no_xlsx: bool,

    /// Skip the heat sheet PDF
    #[arg(long)]
    pub no_pdf: bool,

    /// PDF document title
    #[arg(long)]
    pub title: Option<String>,

    /// Print every heat table
    #[arg(long)]
    pub print: bool,
}

/// Parse `ROLE=COLUMN`.
pub fn parse_mapping_pair(text: &str) -> Result<(EnumFieldRole, String), String> {
    let Some((c_role, c_column)) = text.split_once('=') else {
        return Err(format!("expected ROLE=COLUMN, got {text:?}"));
    };
    let role = c_role.trim().parse::<EnumFieldRole>().map_err(|err| err.to_string())?;
    let c_column = c_column.trim();
    if c_column.is_empty() {
        return Err(format!("empty column name for {role}"));
    }
    Ok((role, c_column.to_string()))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Pipeline

fn derive_delimiter(delimiter: Option<char>) -> Result<Option<u8>> {
    match delimiter {
        None => Ok(None),
        Some(chr) if chr.is_ascii() => Ok(Some(chr as u8)),
        Some(chr) => bail!("delimiter must be a single ASCII character, got {chr:?}"),
    }
}

fn load_source(source: &SourceArgs, config: &SpecHeatkitConfig) -> Result<SpecSourceTable> {
    let options = SpecLoadOptions {
        sheet_name: source.sheet.clone().or_else(|| config.input.sheet.clone()),
        delimiter: derive_delimiter(source.delimiter.or(config.input.delimiter))?,
        if_keep_text: source.keep_text || config.input.keep_text,
    };
    load_table(&source.input, &options)
        .with_context(|| format!("failed to load {}", source.input.display()))
}

/// Inferred mapping, overlaid by the config file, overlaid by `--map` flags.
pub fn resolve_mapping(
    columns: &[String],
    config: &SpecHeatkitConfig,
    overrides: &[(EnumFieldRole, String)],
) -> SpecColumnMapping {
    let mut mapping = SpecColumnMapping::infer(columns).merge(&config.mapping);
    for (role, column) in overrides {
        mapping.set(*role, column.clone());
    }
    mapping
}

fn load_roster(source: &SourceArgs, config: &SpecHeatkitConfig) -> Result<SpecRoster> {
    let table = load_source(source, config)?;
    let mapping = resolve_mapping(&table.columns, config, &source.mappings);
    mapping.apply(&table).with_context(|| {
        format!(
            "cannot map columns of {} (available: {}); use --map ROLE=COLUMN or [mapping] in the config",
            source.input.display(),
            table.columns.join(", ")
        )
    })
}

/// Write the expanded table; returns the written path.
fn write_entries_xlsx(entries: &SpecRoster, path: &Path) -> Result<String> {
    let mut writer = XlsxWriter::new(path, derive_default_xlsx_write_options());
    writer.write_entries(entries, C_SHEET_NAME_ENTRIES)?;
    writer
        .close()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(writer.file_out())
}

/// Write one sheet per heat group; returns the written path.
fn write_plan_xlsx(plan: &SpecHeatPlan, path: &Path) -> Result<String> {
    let mut writer = XlsxWriter::new(path, derive_default_xlsx_write_options());
    writer.write_plan(plan)?;
    writer
        .close()
        .with_context(|| format!("failed to write {}", path.display()))?;
    for report in writer.report() {
        for c_warning in &report.warnings {
            warn!("{c_warning}");
        }
    }
    Ok(writer.file_out())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Handlers

/// List source columns with the role each one resolves to.
pub fn run_columns(source: &SourceArgs, config: &SpecHeatkitConfig) -> Result<()> {
    let table = load_source(source, config)?;
    let mapping = resolve_mapping(&table.columns, config, &source.mappings);

    let l_grid: Vec<Vec<String>> = table
        .columns
        .iter()
        .map(|c_name| {
            let l_roles: Vec<&str> = mapping
                .iter()
                .filter(|(_, c_column)| *c_column == c_name.as_str())
                .map(|(role, _)| role.label())
                .collect();
            vec![c_name.clone(), l_roles.join(", ")]
        })
        .collect();
    print!(
        "{}",
        render_table(&["Column".to_string(), "Role".to_string()], &l_grid)
    );

    for (c_column, l_roles) in mapping.shared_columns() {
        let l_labels: Vec<&str> = l_roles.iter().map(EnumFieldRole::label).collect();
        println!(
            "Column {c_column:?} is mapped to several fields: {}",
            l_labels.join(", ")
        );
    }
    for (role, c_column) in mapping.iter() {
        if table.column_index(c_column).is_none() {
            println!("{role} is mapped to missing column {c_column:?}");
        }
    }
    let l_missing = mapping.missing_roles();
    if l_missing.is_empty() {
        println!("All required fields are mapped.");
    } else {
        let l_labels: Vec<&str> = l_missing.iter().map(EnumFieldRole::label).collect();
        println!("Missing required fields: {}", l_labels.join(", "));
    }
    Ok(())
}

/// Expand multi-event registrations and write the one-row-per-event table.
pub fn run_expand(args: &ExpandArgs, config: &SpecHeatkitConfig) -> Result<()> {
    let roster = load_roster(&args.source, config)?;
    let entries = expand(&roster);

    if args.print {
        print!("{}", render_entries(&entries, Some(args.rows)));
    }

    let path_out = args
        .output
        .clone()
        .unwrap_or_else(|| config.output.transformed.clone());
    let c_path_written = write_entries_xlsx(&entries, &path_out)?;
    info!(path = %c_path_written, entries = entries.len(), "wrote transformed table");
    println!(
        "rows={} entries={} -> {c_path_written}",
        roster.len(),
        entries.len()
    );
    Ok(())
}

/// Full pipeline: load, map, expand, partition and export.
pub fn run_heats(args: &HeatsArgs, config: &SpecHeatkitConfig) -> Result<()> {
    let roster = load_roster(&args.source, config)?;
    let entries = expand(&roster);
    let capacity = args.capacity.unwrap_or(config.capacity);
    let plan = partition(&entries, capacity)?;
    let report = ReportHeats::from_stages(&roster, &entries, &plan);
    for c_warning in &report.warnings {
        warn!("{c_warning}");
    }

    if args.print {
        print!("{}", render_plan(&plan));
    }

    if let Some(path) = &args.transformed {
        let c_path_written = write_entries_xlsx(&entries, path)?;
        println!("transformed -> {c_path_written}");
    }

    if plan.groups().is_empty() {
        warn!("no entries after expansion; skipping heat exports");
    } else {
        if !args.no_xlsx {
            let path = args.xlsx.as_ref().unwrap_or(&config.output.heats_xlsx);
            let c_path_written = write_plan_xlsx(&plan, path)?;
            println!("heats xlsx -> {c_path_written}");
        }
        if !args.no_pdf {
            let path = args.pdf.as_ref().unwrap_or(&config.output.heats_pdf);
            write_plan_pdf(&plan, path, args.title.as_deref(), &SpecPdfOptions::default())?;
            println!("heats pdf -> {}", path.display());
        }
    }

    println!("{report}");
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_mapping_pair() {
        assert_eq!(
            parse_mapping_pair("bib = Bib No"),
            Ok((EnumFieldRole::Bib, "Bib No".to_string()))
        );
        assert_eq!(
            parse_mapping_pair("Date of Birth=DOB"),
            Ok((EnumFieldRole::DateOfBirth, "DOB".to_string()))
        );
        assert!(parse_mapping_pair("bib").is_err());
        assert!(parse_mapping_pair("bib=").is_err());
        assert!(parse_mapping_pair("lane=Lane").is_err());
    }

    #[test]
    fn test_resolve_mapping_precedence() {
        let l_columns: Vec<String> = ["Name", "Bib", "Club", "Team", "Events", "Category"]
            .iter()
            .map(|c_name| c_name.to_string())
            .collect();
        let mut config = SpecHeatkitConfig::default();
        config.mapping.set(EnumFieldRole::Affiliation, "Team");
        config.mapping.set(EnumFieldRole::Category, "Category");

        let mapping = resolve_mapping(
            &l_columns,
            &config,
            &[(EnumFieldRole::Category, "Division".to_string())],
        );
        assert_eq!(mapping.get(EnumFieldRole::Bib), Some("Bib"));
        assert_eq!(mapping.get(EnumFieldRole::Affiliation), Some("Team"));
        assert_eq!(mapping.get(EnumFieldRole::Category), Some("Division"));
        assert_eq!(mapping.get(EnumFieldRole::DateOfBirth), None);
    }

    #[test]
    fn test_derive_delimiter_rejects_non_ascii() {
        assert_eq!(derive_delimiter(Some(';')).ok(), Some(Some(b';')));
        assert!(derive_delimiter(Some('¦')).is_err());
    }
}
