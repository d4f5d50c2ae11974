//! Expansion of multi-event registrations into one row per event.

use tracing::debug;

use crate::conf::{C_EVENT_DELIMITER, C_EVENT_DELIMITER_ALT};
use crate::spec::{SpecAthleteRow, SpecRoster};

/// Split one event cell into trimmed, non-empty event names.
///
/// `&` is treated as `,` before splitting; split order is preserved.
pub fn split_event_text(text: &str) -> Vec<String> {
    text.replace(C_EVENT_DELIMITER_ALT, &C_EVENT_DELIMITER.to_string())
        .split(C_EVENT_DELIMITER)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Emit one row per (row, event) pair.
///
/// Rows whose event text yields no event name are dropped.
pub fn expand_rows(rows: &[SpecAthleteRow]) -> Vec<SpecAthleteRow> {
    let mut l_rows_out = Vec::with_capacity(rows.len());
    for row in rows {
        for event in split_event_text(&row.event.to_text()) {
            l_rows_out.push(row.with_event(&event));
        }
    }
    l_rows_out
}

/// Expand a whole roster; the column layout is unchanged.
pub fn expand(roster: &SpecRoster) -> SpecRoster {
    let l_rows = expand_rows(&roster.rows);
    debug!(
        rows_in = roster.len(),
        rows_out = l_rows.len(),
        "Expanded event registrations"
    );
    SpecRoster {
        layout: roster.layout.clone(),
        rows: l_rows,
    }
}

/// Number of rows that [`expand_rows`] drops for lack of any event name.
pub fn count_rows_without_events(rows: &[SpecAthleteRow]) -> usize {
    rows.iter()
        .filter(|row| split_event_text(&row.event.to_text()).is_empty())
        .count()
}
