//! Heat constants and default presets.

/// Default maximum intended heat size.
pub const N_CAPACITY_HEAT_DEFAULT: usize = 8;
/// Primary delimiter between event names in one registration cell.
pub const C_EVENT_DELIMITER: char = ',';
/// Secondary delimiter, normalized to [`C_EVENT_DELIMITER`] before splitting.
pub const C_EVENT_DELIMITER_ALT: char = '&';
/// Header of the per-heat position column.
pub const C_COLUMN_POSITION: &str = "SL";
/// Separator between category and event in a heat group label.
pub const C_LABEL_SEPARATOR: &str = " - ";
/// Output format for normalized dates of birth.
pub const C_DATE_FORMAT_OUT: &str = "%Y-%m-%d";

/// Accepted date-only input formats, tried in order (month-first before day-first).
pub const TUP_DATE_FORMATS_IN: [&str; 6] = [
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y",
];
/// Accepted datetime input formats; the time part is discarded.
pub const TUP_DATETIME_FORMATS_IN: [&str; 3] =
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
