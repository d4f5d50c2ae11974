//! `heatkit_heat` v1:
//! Roster → heats kernel.
//!
//! Module layout:
//! - `conf`      : constants and default presets
//! - `spec`      : cell values, roles, tables and errors
//! - `mapping`   : source column → logical role resolution
//! - `expand`    : one row per (athlete, event)
//! - `partition` : grouping and round-robin heat assignment
//! - `report`    : run-time report model
//! - `render`    : plain-text review tables
pub mod conf;
pub mod expand;
pub mod mapping;
pub mod partition;
pub mod render;
pub mod report;
pub mod spec;

pub use conf::{C_COLUMN_POSITION, N_CAPACITY_HEAT_DEFAULT};
pub use expand::{count_rows_without_events, expand, expand_rows, split_event_text};
pub use mapping::{SpecColumnMapping, normalize_dates, parse_date};
pub use partition::{
    SpecHeat, SpecHeatEntry, SpecHeatGroup, SpecHeatPlan, calculate_heat_count, partition,
    partition_rows,
};
pub use render::{render_entries, render_plan, render_table};
pub use report::ReportHeats;
pub use spec::{
    EnumCellValue, EnumFieldRole, HeatError, SpecAthleteRow, SpecColumnLayout, SpecRoster,
    SpecSourceTable, compare_cells_as_text, format_number,
};
