//! Plain-text rendering of rosters and heat plans for terminal review.

use std::fmt::Write as _;

use crate::partition::{SpecHeat, SpecHeatPlan};
use crate::spec::{EnumCellValue, SpecRoster};

/// Render every group as a heading followed by one table per heat.
pub fn render_plan(plan: &SpecHeatPlan) -> String {
    let layout = plan.layout();
    let l_headers = layout.heat_headers();

    let mut c_out = String::new();
    for (n_idx_group, group) in plan.groups().iter().enumerate() {
        if n_idx_group > 0 {
            c_out.push('\n');
        }
        let c_label = group.label();
        let _ = writeln!(c_out, "{c_label}");
        let _ = writeln!(c_out, "{}", "=".repeat(estimate_text_width(&c_label)));
        for heat in group.heats() {
            let _ = writeln!(c_out, "\nHeat {}", heat.heat_number());
            c_out.push_str(&render_table(&l_headers, &derive_heat_grid(plan, heat)));
        }
    }
    c_out
}

/// Render the expanded table, limited to `n_rows_max` rows when given.
pub fn render_entries(entries: &SpecRoster, n_rows_max: Option<usize>) -> String {
    let layout = &entries.layout;
    let n_rows = n_rows_max.map_or(entries.len(), |n| n.min(entries.len()));
    let l_grid: Vec<Vec<String>> = entries.rows[..n_rows]
        .iter()
        .map(|row| to_text_row(layout.values(row)))
        .collect();

    let mut c_out = render_table(&layout.headers(), &l_grid);
    if n_rows < entries.len() {
        let _ = writeln!(c_out, "... {} more row(s)", entries.len() - n_rows);
    }
    c_out
}

fn derive_heat_grid(plan: &SpecHeatPlan, heat: &SpecHeat) -> Vec<Vec<String>> {
    heat.entries()
        .iter()
        .map(|entry| to_text_row(plan.layout().heat_values(entry.position(), entry.row())))
        .collect()
}

fn to_text_row(values: Vec<EnumCellValue>) -> Vec<String> {
    values.iter().map(EnumCellValue::to_text).collect()
}

/// Left-aligned table with a dashed rule under the header.
pub fn render_table(headers: &[String], grid: &[Vec<String>]) -> String {
    let mut l_widths: Vec<usize> = headers.iter().map(|h| estimate_text_width(h)).collect();
    for row in grid {
        for (n_idx_col, c_cell) in row.iter().enumerate().take(l_widths.len()) {
            l_widths[n_idx_col] = usize::max(l_widths[n_idx_col], estimate_text_width(c_cell));
        }
    }

    let mut c_out = String::new();
    push_table_line(&mut c_out, headers, &l_widths);
    let l_rule: Vec<String> = l_widths.iter().map(|n| "-".repeat(*n)).collect();
    push_table_line(&mut c_out, &l_rule, &l_widths);
    for row in grid {
        push_table_line(&mut c_out, row, &l_widths);
    }
    c_out
}

fn push_table_line(c_out: &mut String, cells: &[String], widths: &[usize]) {
    let l_cells: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(n_idx_col, n_width)| {
            let c_cell = cells.get(n_idx_col).map(String::as_str).unwrap_or("");
            let n_pad = n_width.saturating_sub(estimate_text_width(c_cell));
            format!("{c_cell}{}", " ".repeat(n_pad))
        })
        .collect();
    c_out.push_str(l_cells.join("  ").trim_end());
    c_out.push('\n');
}

fn estimate_text_width(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::partition::partition;
    use crate::spec::{SpecAthleteRow, SpecColumnLayout};

    fn build_roster() -> SpecRoster {
        let build_row = |name: &str, bib: f64, club: &str| SpecAthleteRow {
            name: name.into(),
            bib: EnumCellValue::Number(bib),
            affiliation: club.into(),
            event: "100m".into(),
            category: "U18".into(),
            ..Default::default()
        };
        SpecRoster {
            layout: SpecColumnLayout::default(),
            rows: vec![
                build_row("Ana", 11.0, "Owls"),
                build_row("Ben", 12.0, "Hawks"),
                build_row("Cai", 13.0, "Bears"),
            ],
        }
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let c_out = render_table(
            &["SL".to_string(), "Name".to_string()],
            &[vec!["1".to_string(), "Ana".to_string()]],
        );
        assert_eq!(c_out, "SL  Name\n--  ----\n1   Ana\n");
    }

    #[test]
    fn test_render_plan_lists_heats_in_order() {
        let plan = partition(&build_roster(), 2).expect("partition");
        let c_out = render_plan(&plan);

        let l_lines: Vec<&str> = c_out.lines().collect();
        assert_eq!(l_lines[0], "U18 - 100m");
        assert_eq!(l_lines[2], "");
        assert_eq!(l_lines[3], "Heat 1");
        assert!(l_lines[4].starts_with("SL  Name  Bib Number  Affiliation  Event  Category"));
        assert!(l_lines[6].starts_with("1   Cai   13"));
        assert!(l_lines[7].starts_with("2   Ana   11"));
        assert!(c_out.contains("Heat 2"));
    }

    #[test]
    fn test_render_entries_truncates() {
        let c_out = render_entries(&build_roster(), Some(2));
        assert_eq!(c_out.lines().count(), 5);
        assert!(c_out.ends_with("... 1 more row(s)\n"));
    }
}
