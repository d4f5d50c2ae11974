//! Column mapping from arbitrary source headers onto logical roles.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::conf::{C_DATE_FORMAT_OUT, TUP_DATE_FORMATS_IN, TUP_DATETIME_FORMATS_IN};
use crate::spec::{
    EnumCellValue, EnumFieldRole, HeatError, SpecAthleteRow, SpecColumnLayout, SpecRoster,
    SpecSourceTable,
};

/// Role → source column assignment, resolved once at the table boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecColumnMapping {
    dict_role_to_column: BTreeMap<EnumFieldRole, String>,
}

impl SpecColumnMapping {
    /// Empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`Self::set`].
    pub fn with_role(mut self, role: EnumFieldRole, column: impl Into<String>) -> Self {
        self.set(role, column);
        self
    }

    /// Assign `column` to `role`, replacing any previous assignment.
    pub fn set(&mut self, role: EnumFieldRole, column: impl Into<String>) {
        self.dict_role_to_column.insert(role, column.into());
    }

    /// Source column assigned to `role`.
    pub fn get(&self, role: EnumFieldRole) -> Option<&str> {
        self.dict_role_to_column.get(&role).map(String::as_str)
    }

    /// Iterate `(role, column)` pairs in canonical role order.
    pub fn iter(&self) -> impl Iterator<Item = (EnumFieldRole, &str)> {
        self.dict_role_to_column
            .iter()
            .map(|(role, column)| (*role, column.as_str()))
    }

    /// Overlay `other` onto `self`; roles set in `other` win.
    pub fn merge(&self, other: &SpecColumnMapping) -> SpecColumnMapping {
        let mut dict_merged = self.dict_role_to_column.clone();
        for (role, column) in &other.dict_role_to_column {
            dict_merged.insert(*role, column.clone());
        }
        SpecColumnMapping {
            dict_role_to_column: dict_merged,
        }
    }

    /// Map every role whose exact label is a source column.
    pub fn identity(columns: &[String]) -> Self {
        let mut mapping = Self::new();
        for role in EnumFieldRole::ALL {
            if columns.iter().any(|c_name| c_name == role.label()) {
                mapping.set(role, role.label());
            }
        }
        mapping
    }

    /// Guess a mapping from header spellings (case-insensitive label or alias).
    ///
    /// Each source column is assigned to at most one role.
    pub fn infer(columns: &[String]) -> Self {
        let mut mapping = Self::new();
        let mut set_cols_used = BTreeSet::new();

        for role in EnumFieldRole::ALL {
            let c_match = columns.iter().find(|c_name| {
                let c_norm = c_name.trim().to_lowercase();
                !set_cols_used.contains(c_name.as_str())
                    && (c_norm == role.label().to_lowercase()
                        || role.aliases().contains(&c_norm.as_str()))
            });
            if let Some(c_name) = c_match {
                set_cols_used.insert(c_name.as_str());
                mapping.set(role, c_name.clone());
            }
        }

        mapping
    }

    /// Required roles without an assigned column, in canonical order.
    pub fn missing_roles(&self) -> Vec<EnumFieldRole> {
        EnumFieldRole::ALL
            .into_iter()
            .filter(|role| role.is_required() && !self.dict_role_to_column.contains_key(role))
            .collect()
    }

    /// Source columns assigned to more than one role, each with its roles in
    /// canonical order.
    pub fn shared_columns(&self) -> Vec<(String, Vec<EnumFieldRole>)> {
        let mut dict_column_to_roles: BTreeMap<&str, Vec<EnumFieldRole>> = BTreeMap::new();
        for (role, column) in self.iter() {
            dict_column_to_roles.entry(column).or_default().push(role);
        }
        dict_column_to_roles
            .into_iter()
            .filter(|(_, l_roles)| l_roles.len() > 1)
            .map(|(column, l_roles)| (column.to_string(), l_roles))
            .collect()
    }

    /// Resolve `table` into a roster.
    ///
    /// Mapped roles become fixed fields; every unmapped source column is carried
    /// through as an extra column in source order. A mapped date-of-birth column
    /// is normalized to `YYYY-MM-DD` when all its values parse as dates.
    pub fn apply(&self, table: &SpecSourceTable) -> Result<SpecRoster, HeatError> {
        let l_roles_missing = self.missing_roles();
        if !l_roles_missing.is_empty() {
            return Err(HeatError::MissingMapping(l_roles_missing));
        }
        for (column, l_roles) in self.shared_columns() {
            let l_labels: Vec<&str> = l_roles.iter().map(EnumFieldRole::label).collect();
            warn!(
                column = %column,
                roles = %l_labels.join(", "),
                "Column mapped to several roles"
            );
        }

        let mut l_role_cols = Vec::with_capacity(self.dict_role_to_column.len());
        for (role, column) in self.iter() {
            let n_idx = table
                .column_index(column)
                .ok_or_else(|| HeatError::UnknownColumn {
                    role,
                    column: column.to_string(),
                })?;
            l_role_cols.push((role, n_idx));
        }

        let set_cols_idx_mapped: BTreeSet<usize> = l_role_cols.iter().map(|(_, n)| *n).collect();
        let l_cols_idx_extra: Vec<usize> = (0..table.width())
            .filter(|n_idx| !set_cols_idx_mapped.contains(n_idx))
            .collect();

        let mut l_rows = Vec::with_capacity(table.height());
        for n_idx_row in 0..table.height() {
            let mut row = SpecAthleteRow::default();
            for (role, n_idx_col) in &l_role_cols {
                row.set(*role, table.value(n_idx_row, *n_idx_col));
            }
            row.extras = l_cols_idx_extra
                .iter()
                .map(|n_idx_col| table.value(n_idx_row, *n_idx_col))
                .collect();
            l_rows.push(row);
        }

        let if_has_date_of_birth = self.get(EnumFieldRole::DateOfBirth).is_some();
        if if_has_date_of_birth {
            let l_dob: Vec<EnumCellValue> =
                l_rows.iter().map(|row| row.date_of_birth.clone()).collect();
            for (row, value) in l_rows.iter_mut().zip(normalize_dates(&l_dob)) {
                row.date_of_birth = value;
            }
        }

        debug!(
            rows = l_rows.len(),
            extras = l_cols_idx_extra.len(),
            "Applied column mapping"
        );

        Ok(SpecRoster {
            layout: SpecColumnLayout {
                columns_extra: l_cols_idx_extra
                    .iter()
                    .map(|n_idx| table.columns[*n_idx].clone())
                    .collect(),
                if_has_date_of_birth,
            },
            rows: l_rows,
        })
    }
}

/// Normalize a whole date column.
///
/// All-or-nothing: when every present value parses, each becomes `YYYY-MM-DD`;
/// otherwise every present value is kept as its text form. Missing stays missing.
pub fn normalize_dates(values: &[EnumCellValue]) -> Vec<EnumCellValue> {
    let l_parsed: Option<Vec<Option<NaiveDate>>> = values
        .iter()
        .map(|value| match value {
            EnumCellValue::None => Some(None),
            EnumCellValue::String(s) => parse_date(s).map(Some),
            EnumCellValue::Number(_) => None,
        })
        .collect();

    match l_parsed {
        Some(l_dates) => l_dates
            .into_iter()
            .map(|date| match date {
                Some(d) => EnumCellValue::String(d.format(C_DATE_FORMAT_OUT).to_string()),
                None => EnumCellValue::None,
            })
            .collect(),
        None => values
            .iter()
            .map(|value| match value {
                EnumCellValue::None => EnumCellValue::None,
                other => EnumCellValue::String(other.to_text()),
            })
            .collect(),
    }
}

/// Parse one date in any accepted input format.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let c_text = text.trim();
    TUP_DATE_FORMATS_IN
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(c_text, fmt).ok())
        .or_else(|| {
            TUP_DATETIME_FORMATS_IN
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(c_text, fmt).ok())
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn build_table() -> SpecSourceTable {
        SpecSourceTable {
            columns: vec![
                "Athlete".to_string(),
                "Club".to_string(),
                "Chest".to_string(),
                "Events".to_string(),
                "Age Group".to_string(),
                "Gender".to_string(),
            ],
            rows: vec![
                vec![
                    "Ana".into(),
                    "Hawks".into(),
                    EnumCellValue::Number(101.0),
                    "100m & 200m".into(),
                    "U18".into(),
                    "F".into(),
                ],
                vec![
                    "Ben".into(),
                    "Owls".into(),
                    EnumCellValue::Number(102.0),
                    "Relay".into(),
                    "U20".into(),
                ],
            ],
        }
    }

    #[test]
    fn test_infer_matches_aliases_case_insensitively() {
        let table = build_table();
        let mapping = SpecColumnMapping::infer(&table.columns);
        assert_eq!(mapping.get(EnumFieldRole::Name), Some("Athlete"));
        assert_eq!(mapping.get(EnumFieldRole::Affiliation), Some("Club"));
        assert_eq!(mapping.get(EnumFieldRole::Event), Some("Events"));
        assert_eq!(mapping.get(EnumFieldRole::Category), Some("Age Group"));
        assert_eq!(mapping.get(EnumFieldRole::Bib), None);
        assert_eq!(mapping.missing_roles(), vec![EnumFieldRole::Bib]);
    }

    #[test]
    fn test_identity_maps_exact_labels_only() {
        let l_columns: Vec<String> = ["Name", "Bib Number", "club", "Event", "Date of Birth"]
            .iter()
            .map(|c_name| c_name.to_string())
            .collect();
        let mapping = SpecColumnMapping::identity(&l_columns);
        assert_eq!(mapping.get(EnumFieldRole::Bib), Some("Bib Number"));
        assert_eq!(mapping.get(EnumFieldRole::DateOfBirth), Some("Date of Birth"));
        assert_eq!(
            mapping.missing_roles(),
            vec![EnumFieldRole::Affiliation, EnumFieldRole::Category]
        );
    }

    #[test]
    fn test_apply_reports_missing_roles() {
        let table = build_table();
        let err = SpecColumnMapping::infer(&table.columns)
            .apply(&table)
            .expect_err("bib is unmapped");
        assert_eq!(err, HeatError::MissingMapping(vec![EnumFieldRole::Bib]));
    }

    #[test]
    fn test_apply_rejects_unknown_column() {
        let table = build_table();
        let mapping = SpecColumnMapping::infer(&table.columns).with_role(EnumFieldRole::Bib, "Bib");
        let err = mapping.apply(&table).expect_err("no Bib column");
        assert_eq!(
            err,
            HeatError::UnknownColumn {
                role: EnumFieldRole::Bib,
                column: "Bib".to_string()
            }
        );
    }

    #[test]
    fn test_shared_columns_lists_every_role_of_a_column() {
        let table = build_table();
        let mapping = SpecColumnMapping::infer(&table.columns)
            .with_role(EnumFieldRole::Bib, "Chest")
            .with_role(EnumFieldRole::Category, "Club");
        assert_eq!(
            mapping.shared_columns(),
            vec![(
                "Club".to_string(),
                vec![EnumFieldRole::Affiliation, EnumFieldRole::Category]
            )]
        );

        let roster = mapping.apply(&table).expect("shared column still resolves");
        assert_eq!(roster.rows[0].affiliation, roster.rows[0].category);
        assert_eq!(
            roster.layout.columns_extra,
            vec!["Age Group".to_string(), "Gender".to_string()]
        );
        assert!(
            SpecColumnMapping::infer(&table.columns)
                .shared_columns()
                .is_empty()
        );
    }

    #[test]
    fn test_apply_carries_unmapped_columns_and_pads_short_rows() {
        let table = build_table();
        let mapping =
            SpecColumnMapping::infer(&table.columns).with_role(EnumFieldRole::Bib, "Chest");
        let roster = mapping.apply(&table).expect("mapping applies");

        assert_eq!(roster.layout.columns_extra, vec!["Gender".to_string()]);
        assert!(!roster.layout.if_has_date_of_birth);
        assert_eq!(roster.rows[0].bib, EnumCellValue::Number(101.0));
        assert_eq!(roster.rows[0].extras, vec![EnumCellValue::from("F")]);
        assert_eq!(roster.rows[1].extras, vec![EnumCellValue::None]);
    }

    #[test]
    fn test_normalize_dates_all_parseable() {
        let l_values = vec![
            EnumCellValue::from("2008-03-01"),
            EnumCellValue::None,
            EnumCellValue::from("15.07.2007"),
            EnumCellValue::from("2006-01-02 00:00:00"),
        ];
        assert_eq!(
            normalize_dates(&l_values),
            vec![
                EnumCellValue::from("2008-03-01"),
                EnumCellValue::None,
                EnumCellValue::from("2007-07-15"),
                EnumCellValue::from("2006-01-02"),
            ]
        );
    }

    #[test]
    fn test_normalize_dates_falls_back_to_text_for_whole_column() {
        let l_values = vec![
            EnumCellValue::from("2008-03-01"),
            EnumCellValue::from("unknown"),
            EnumCellValue::Number(2007.0),
        ];
        assert_eq!(
            normalize_dates(&l_values),
            vec![
                EnumCellValue::from("2008-03-01"),
                EnumCellValue::from("unknown"),
                EnumCellValue::from("2007"),
            ]
        );
    }

    #[test]
    fn test_parse_date_prefers_month_first() {
        assert_eq!(parse_date("01/02/2000"), NaiveDate::from_ymd_opt(2000, 1, 2));
        assert_eq!(parse_date("25/02/2000"), NaiveDate::from_ymd_opt(2000, 2, 25));
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn test_merge_overrides_roles() {
        let base = SpecColumnMapping::new()
            .with_role(EnumFieldRole::Name, "Athlete")
            .with_role(EnumFieldRole::Bib, "Bib");
        let patch = SpecColumnMapping::new().with_role(EnumFieldRole::Bib, "Chest");
        let merged = base.merge(&patch);
        assert_eq!(merged.get(EnumFieldRole::Name), Some("Athlete"));
        assert_eq!(merged.get(EnumFieldRole::Bib), Some("Chest"));
    }
}
