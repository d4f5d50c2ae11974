//! Roster models, logical field roles and top-level error types.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::conf::C_COLUMN_POSITION;

////////////////////////////////////////////////////////////////////////////////
// #region CellValue

/// One cell of a source or roster table.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Missing/blank value.
    #[default]
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
}

impl EnumCellValue {
    /// Build a text cell; empty or whitespace-only text becomes [`EnumCellValue::None`].
    pub fn from_text(text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        if text.trim().is_empty() {
            Self::None
        } else {
            Self::String(text.to_string())
        }
    }

    /// Whether the cell is blank.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Numeric view of the cell, if it holds a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text coercion used for grouping, sorting and rendering.
    ///
    /// Missing values render as the empty string.
    pub fn to_text(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::String(s) => s.clone(),
            Self::Number(n) => format_number(*n),
        }
    }
}

impl fmt::Display for EnumCellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::from_text(value)
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::from_text(value)
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Render a number without a fractional part when it is integral.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Total order over cells: present values by text (codepoint order), missing last.
pub fn compare_cells_as_text(a: &EnumCellValue, b: &EnumCellValue) -> Ordering {
    match (a.is_missing(), b.is_missing()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.to_text().cmp(&b.to_text()),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FieldRoles

/// Logical roles a source column can be mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumFieldRole {
    /// Athlete name.
    Name,
    /// Bib identifier.
    Bib,
    /// Team/club/region.
    Affiliation,
    /// One or more delimited event names.
    Event,
    /// Competition category (age group, gender class, ...).
    Category,
    /// Optional date of birth, normalized to `YYYY-MM-DD` when parseable.
    DateOfBirth,
}

impl EnumFieldRole {
    /// All roles in canonical column order.
    pub const ALL: [EnumFieldRole; 6] = [
        Self::Name,
        Self::Bib,
        Self::Affiliation,
        Self::Event,
        Self::Category,
        Self::DateOfBirth,
    ];

    /// Column header used for this role in rendered output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Bib => "Bib Number",
            Self::Affiliation => "Affiliation",
            Self::Event => "Event",
            Self::Category => "Category",
            Self::DateOfBirth => "Date of Birth",
        }
    }

    /// Whether a mapping must name a source column for this role.
    pub fn is_required(&self) -> bool {
        !matches!(self, Self::DateOfBirth)
    }

    /// Lower-case header spellings recognized by mapping inference.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Name => &["name", "athlete name", "athlete", "full name"],
            Self::Bib => &["bib number", "bib", "bib no", "bib no.", "chest number"],
            Self::Affiliation => &["affiliation", "club", "team", "school", "region"],
            Self::Event => &["event", "events"],
            Self::Category => &["category", "age group", "class", "division"],
            Self::DateOfBirth => &["date of birth", "dob", "birth date", "birthdate"],
        }
    }
}

impl FromStr for EnumFieldRole {
    type Err = HeatError;

    /// Accepts the snake_case key (`date_of_birth`) or the label (`Date of Birth`),
    /// ignoring case, spaces and underscores.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let normalize = |s: &str| {
            s.chars()
                .filter(|chr| chr.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        };
        let c_norm = normalize(text);
        Self::ALL
            .into_iter()
            .find(|role| {
                normalize(role.label()) == c_norm || normalize(&format!("{role:?}")) == c_norm
            })
            .ok_or_else(|| HeatError::UnknownRole(text.to_string()))
    }
}

impl fmt::Display for EnumFieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Tables

/// Raw table handed over by a source loader: ordered headers plus row cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSourceTable {
    /// Source column names in file order.
    pub columns: Vec<String>,
    /// Row cells aligned with `columns`; short rows are padded with missing values.
    pub rows: Vec<Vec<EnumCellValue>>,
}

impl SpecSourceTable {
    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of data rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Zero-based index of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c_name| c_name == name)
    }

    /// Cell at `(row, col)`; out-of-range cells read as missing.
    pub fn value(&self, row_idx: usize, col_idx: usize) -> EnumCellValue {
        self.rows
            .get(row_idx)
            .and_then(|row| row.get(col_idx))
            .cloned()
            .unwrap_or_default()
    }
}

/// One registration, resolved onto logical roles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecAthleteRow {
    pub name: EnumCellValue,
    pub bib: EnumCellValue,
    pub affiliation: EnumCellValue,
    pub event: EnumCellValue,
    pub category: EnumCellValue,
    pub date_of_birth: EnumCellValue,
    /// Unmapped source fields, aligned with [`SpecColumnLayout::columns_extra`].
    pub extras: Vec<EnumCellValue>,
}

impl SpecAthleteRow {
    /// Value stored for a logical role.
    pub fn get(&self, role: EnumFieldRole) -> &EnumCellValue {
        match role {
            EnumFieldRole::Name => &self.name,
            EnumFieldRole::Bib => &self.bib,
            EnumFieldRole::Affiliation => &self.affiliation,
            EnumFieldRole::Event => &self.event,
            EnumFieldRole::Category => &self.category,
            EnumFieldRole::DateOfBirth => &self.date_of_birth,
        }
    }

    pub(crate) fn set(&mut self, role: EnumFieldRole, value: EnumCellValue) {
        match role {
            EnumFieldRole::Name => self.name = value,
            EnumFieldRole::Bib => self.bib = value,
            EnumFieldRole::Affiliation => self.affiliation = value,
            EnumFieldRole::Event => self.event = value,
            EnumFieldRole::Category => self.category = value,
            EnumFieldRole::DateOfBirth => self.date_of_birth = value,
        }
    }

    /// Copy of this row with the event field replaced by one event name.
    pub fn with_event(&self, event: &str) -> Self {
        Self {
            event: EnumCellValue::String(event.to_string()),
            ..self.clone()
        }
    }
}

/// Column shape shared by a roster and the heats built from it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecColumnLayout {
    /// Headers of carried-through unmapped source fields, in source order.
    pub columns_extra: Vec<String>,
    /// Whether a date-of-birth column was mapped.
    pub if_has_date_of_birth: bool,
}

impl SpecColumnLayout {
    /// Roles present in this layout, in canonical order.
    pub fn roles(&self) -> Vec<EnumFieldRole> {
        EnumFieldRole::ALL
            .into_iter()
            .filter(|role| *role != EnumFieldRole::DateOfBirth || self.if_has_date_of_birth)
            .collect()
    }

    /// Roster headers: mapped roles first, then extras.
    pub fn headers(&self) -> Vec<String> {
        self.roles()
            .iter()
            .map(|role| role.label().to_string())
            .chain(self.columns_extra.iter().cloned())
            .collect()
    }

    /// Row values aligned with [`Self::headers`].
    pub fn values(&self, row: &SpecAthleteRow) -> Vec<EnumCellValue> {
        let mut l_values: Vec<EnumCellValue> = self
            .roles()
            .iter()
            .map(|role| row.get(*role).clone())
            .collect();
        for n_idx in 0..self.columns_extra.len() {
            l_values.push(row.extras.get(n_idx).cloned().unwrap_or_default());
        }
        l_values
    }

    /// Heat headers: position, name, bib, affiliation, then every other field.
    pub fn heat_headers(&self) -> Vec<String> {
        let mut l_headers = vec![C_COLUMN_POSITION.to_string()];
        l_headers.extend(self.headers());
        l_headers
    }

    /// Heat row values aligned with [`Self::heat_headers`].
    pub fn heat_values(&self, position: usize, row: &SpecAthleteRow) -> Vec<EnumCellValue> {
        let mut l_values = vec![EnumCellValue::Number(position as f64)];
        l_values.extend(self.values(row));
        l_values
    }
}

/// Registration table after column mapping (or after event expansion).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecRoster {
    pub layout: SpecColumnLayout,
    pub rows: Vec<SpecAthleteRow>,
}

impl SpecRoster {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the roster has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Validation failures surfaced by mapping and partitioning.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeatError {
    /// Heat capacity must be a positive integer.
    #[error("Heat capacity must be >= 1, got {0}.")]
    InvalidCapacity(usize),
    /// Required roles have no source column.
    #[error("Required fields are not mapped: {}", format_roles(.0))]
    MissingMapping(Vec<EnumFieldRole>),
    /// A role name that matches no logical role.
    #[error("Unknown field role {0:?} (expected name, bib, affiliation, event, category or date_of_birth).")]
    UnknownRole(String),
    /// A mapping names a column that the source does not have.
    #[error("Column {column:?} mapped to {role} does not exist in the source.")]
    UnknownColumn {
        /// Role whose mapping is invalid.
        role: EnumFieldRole,
        /// Column name from the mapping.
        column: String,
    },
}

fn format_roles(roles: &[EnumFieldRole]) -> String {
    roles
        .iter()
        .map(EnumFieldRole::label)
        .collect::<Vec<_>>()
        .join(", ")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text_coercion() {
        assert_eq!(EnumCellValue::Number(12.0).to_text(), "12");
        assert_eq!(EnumCellValue::Number(12.5).to_text(), "12.5");
        assert_eq!(EnumCellValue::None.to_text(), "");
        assert_eq!(EnumCellValue::from_text("  "), EnumCellValue::None);
        assert_eq!(
            EnumCellValue::from("Relay"),
            EnumCellValue::String("Relay".to_string())
        );
    }

    #[test]
    fn test_compare_cells_puts_missing_last() {
        let a = EnumCellValue::from("Alpha");
        let b = EnumCellValue::from("beta");
        let z = EnumCellValue::from("Zulu");
        assert_eq!(compare_cells_as_text(&a, &z), Ordering::Less);
        // Codepoint order: upper case before lower case.
        assert_eq!(compare_cells_as_text(&z, &b), Ordering::Less);
        assert_eq!(
            compare_cells_as_text(&EnumCellValue::None, &a),
            Ordering::Greater
        );
        assert_eq!(
            compare_cells_as_text(&EnumCellValue::Number(10.0), &EnumCellValue::from("9")),
            Ordering::Less
        );
    }

    #[test]
    fn test_layout_heat_headers_follow_standard_order() {
        let layout = SpecColumnLayout {
            columns_extra: vec!["Gender".to_string()],
            if_has_date_of_birth: true,
        };
        assert_eq!(
            layout.heat_headers(),
            vec![
                "SL",
                "Name",
                "Bib Number",
                "Affiliation",
                "Event",
                "Category",
                "Date of Birth",
                "Gender"
            ]
        );

        let row = SpecAthleteRow {
            name: "Ana".into(),
            extras: vec!["F".into()],
            ..Default::default()
        };
        let l_values = layout.heat_values(3, &row);
        assert_eq!(l_values[0], EnumCellValue::Number(3.0));
        assert_eq!(l_values[1], EnumCellValue::from("Ana"));
        assert_eq!(l_values[7], EnumCellValue::from("F"));
    }

    #[test]
    fn test_field_role_from_str_accepts_keys_and_labels() {
        assert_eq!("date_of_birth".parse(), Ok(EnumFieldRole::DateOfBirth));
        assert_eq!("Date of Birth".parse(), Ok(EnumFieldRole::DateOfBirth));
        assert_eq!("BIB".parse(), Ok(EnumFieldRole::Bib));
        assert_eq!("bib number".parse(), Ok(EnumFieldRole::Bib));
        assert_eq!(
            "heat".parse::<EnumFieldRole>(),
            Err(HeatError::UnknownRole("heat".to_string()))
        );
    }

    #[test]
    fn test_missing_mapping_message_lists_labels() {
        let err = HeatError::MissingMapping(vec![EnumFieldRole::Bib, EnumFieldRole::Event]);
        assert_eq!(
            err.to_string(),
            "Required fields are not mapped: Bib Number, Event"
        );
    }
}
