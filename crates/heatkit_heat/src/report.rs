//! Run report for one roster → heats pipeline.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::expand::count_rows_without_events;
use crate::partition::SpecHeatPlan;
use crate::spec::SpecRoster;

/// Aggregate counters and diagnostics for one heat generation run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportHeats {
    /// Registration rows read from the source.
    pub cnt_rows_source: u64,
    /// Registration rows dropped for lack of any event name.
    pub cnt_rows_dropped: u64,
    /// Expanded (athlete, event) entries.
    pub cnt_entries: u64,
    /// Distinct (event, category) groups.
    pub cnt_groups: u64,
    /// Heats across all groups.
    pub cnt_heats: u64,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl ReportHeats {
    /// Collect counters from each pipeline stage.
    ///
    /// Duplicate bib identifiers inside one group are reported as warnings.
    pub fn from_stages(roster: &SpecRoster, entries: &SpecRoster, plan: &SpecHeatPlan) -> Self {
        let mut report = Self {
            cnt_rows_source: roster.len() as u64,
            cnt_rows_dropped: count_rows_without_events(&roster.rows) as u64,
            cnt_entries: entries.len() as u64,
            cnt_groups: plan.groups().len() as u64,
            cnt_heats: plan.heat_count() as u64,
            warnings: vec![],
        };

        for group in plan.groups() {
            let mut set_bibs_seen = BTreeSet::new();
            let mut set_bibs_dup = BTreeSet::new();
            for heat in group.heats() {
                for entry in heat.entries() {
                    let c_bib = entry.row().bib.to_text();
                    if c_bib.is_empty() {
                        continue;
                    }
                    if !set_bibs_seen.insert(c_bib.clone()) {
                        set_bibs_dup.insert(c_bib);
                    }
                }
            }
            for c_bib in set_bibs_dup {
                report.warn(format!(
                    "Duplicate bib {c_bib:?} in group {:?}.",
                    group.label()
                ));
            }
        }

        if report.cnt_rows_dropped > 0 {
            report.warn(format!(
                "{} registration row(s) had no event and were dropped.",
                report.cnt_rows_dropped
            ));
        }

        report
    }

    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_rows_source".to_string(), self.cnt_rows_source);
        dict_counts.insert("cnt_rows_dropped".to_string(), self.cnt_rows_dropped);
        dict_counts.insert("cnt_entries".to_string(), self.cnt_entries);
        dict_counts.insert("cnt_groups".to_string(), self.cnt_groups);
        dict_counts.insert("cnt_heats".to_string(), self.cnt_heats);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} rows={} dropped={} entries={} groups={} heats={} warnings={}",
            self.cnt_rows_source,
            self.cnt_rows_dropped,
            self.cnt_entries,
            self.cnt_groups,
            self.cnt_heats,
            self.warning_count()
        )
    }
}

impl fmt::Display for ReportHeats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[HEATS]"))
    }
}
