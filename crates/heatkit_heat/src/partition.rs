//! Heat partitioning: grouping, affiliation sort and round-robin distribution.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::conf::C_LABEL_SEPARATOR;
use crate::spec::{
    EnumCellValue, HeatError, SpecAthleteRow, SpecColumnLayout, SpecRoster, compare_cells_as_text,
};

////////////////////////////////////////////////////////////////////////////////
// #region HeatModels

/// One athlete entry inside a heat, with its 1-based position.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecHeatEntry {
    position: usize,
    row: SpecAthleteRow,
}

impl SpecHeatEntry {
    /// 1-based position within the heat.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The expanded row placed at this position.
    pub fn row(&self) -> &SpecAthleteRow {
        &self.row
    }
}

/// A finalized heat. Numbering is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecHeat {
    heat_number: usize,
    entries: Vec<SpecHeatEntry>,
}

impl SpecHeat {
    fn new(heat_number: usize, rows: Vec<SpecAthleteRow>) -> Self {
        let entries = rows
            .into_iter()
            .enumerate()
            .map(|(n_idx, row)| SpecHeatEntry {
                position: n_idx + 1,
                row,
            })
            .collect();
        Self {
            heat_number,
            entries,
        }
    }

    /// 1-based heat number within its group.
    pub fn heat_number(&self) -> usize {
        self.heat_number
    }

    /// Entries in position order.
    pub fn entries(&self) -> &[SpecHeatEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the heat has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All heats of one (event, category) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecHeatGroup {
    event: String,
    category: String,
    heats: Vec<SpecHeat>,
}

impl SpecHeatGroup {
    /// Event name shared by every entry.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Category shared by every entry.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Heats in heat-number order.
    pub fn heats(&self) -> &[SpecHeat] {
        &self.heats
    }

    /// Display label, category first: `"{category} - {event}"`.
    pub fn label(&self) -> String {
        format!("{}{C_LABEL_SEPARATOR}{}", self.category, self.event)
    }

    /// Total entries across all heats.
    pub fn entry_count(&self) -> usize {
        self.heats.iter().map(SpecHeat::len).sum()
    }
}

/// Heat groups keyed by (event, category), in first-encounter order.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecHeatPlan {
    layout: SpecColumnLayout,
    capacity: usize,
    groups: Vec<SpecHeatGroup>,
}

impl SpecHeatPlan {
    /// Column shape of every entry row.
    pub fn layout(&self) -> &SpecColumnLayout {
        &self.layout
    }

    /// Capacity used to size the heats.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Groups in first-encounter order.
    pub fn groups(&self) -> &[SpecHeatGroup] {
        &self.groups
    }

    /// Group for one (event, category) key.
    pub fn get(&self, event: &str, category: &str) -> Option<&SpecHeatGroup> {
        self.groups
            .iter()
            .find(|group| group.event == event && group.category == category)
    }

    /// Total heats across all groups.
    pub fn heat_count(&self) -> usize {
        self.groups.iter().map(|group| group.heats.len()).sum()
    }

    /// Total entries across all groups.
    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(SpecHeatGroup::entry_count).sum()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Partitioning

/// Number of heats for `n_rows` entries: `ceil(n_rows / capacity)`, `0` when empty.
pub fn calculate_heat_count(n_rows: usize, capacity: usize) -> usize {
    if n_rows == 0 || capacity == 0 {
        return 0;
    }
    n_rows.div_ceil(capacity)
}

/// Partition an expanded roster into heats of at most about `capacity` entries.
pub fn partition(entries: &SpecRoster, capacity: usize) -> Result<SpecHeatPlan, HeatError> {
    let groups = partition_rows(&entries.rows, capacity)?;
    let plan = SpecHeatPlan {
        layout: entries.layout.clone(),
        capacity,
        groups,
    };
    info!(
        groups = plan.groups.len(),
        heats = plan.heat_count(),
        entries = plan.entry_count(),
        capacity,
        "Generated heats"
    );
    Ok(plan)
}

/// Partition expanded rows into heat groups.
///
/// Per (event, category) group, rows are stably sorted by affiliation text and
/// the row at sorted position `i` goes to heat `i % heat_count + 1`.
pub fn partition_rows(
    rows: &[SpecAthleteRow],
    capacity: usize,
) -> Result<Vec<SpecHeatGroup>, HeatError> {
    if capacity == 0 {
        return Err(HeatError::InvalidCapacity(capacity));
    }

    let mut l_keys: Vec<(String, String)> = Vec::new();
    let mut dict_rows_by_key: BTreeMap<(String, String), Vec<&SpecAthleteRow>> = BTreeMap::new();
    for row in rows {
        let key = (row.event.to_text(), row.category.to_text());
        let l_rows_group = dict_rows_by_key.entry(key.clone()).or_insert_with(|| {
            l_keys.push(key);
            Vec::new()
        });
        l_rows_group.push(row);
    }

    let mut l_groups = Vec::with_capacity(l_keys.len());
    for key in l_keys {
        let Some(l_rows_group) = dict_rows_by_key.remove(&key) else {
            continue;
        };
        let (event, category) = key;
        let heats = distribute_round_robin(l_rows_group, capacity);
        if heats.is_empty() {
            continue;
        }
        debug!(
            event = %event,
            category = %category,
            heats = heats.len(),
            "Partitioned group"
        );
        l_groups.push(SpecHeatGroup {
            event,
            category,
            heats,
        });
    }

    Ok(l_groups)
}

fn distribute_round_robin(mut rows: Vec<&SpecAthleteRow>, capacity: usize) -> Vec<SpecHeat> {
    rows.sort_by(|a, b| compare_affiliation(&a.affiliation, &b.affiliation));

    let n_heats = calculate_heat_count(rows.len(), capacity);
    if n_heats == 0 {
        return vec![];
    }

    let mut l_slots: Vec<Vec<SpecAthleteRow>> = vec![Vec::new(); n_heats];
    for (n_idx, row) in rows.into_iter().enumerate() {
        l_slots[n_idx % n_heats].push(row.clone());
    }

    l_slots
        .into_iter()
        .enumerate()
        .map(|(n_slot, l_rows)| SpecHeat::new(n_slot + 1, l_rows))
        .collect()
}

fn compare_affiliation(a: &EnumCellValue, b: &EnumCellValue) -> std::cmp::Ordering {
    compare_cells_as_text(a, b)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn build_row(name: &str, affiliation: &str, event: &str, category: &str) -> SpecAthleteRow {
        SpecAthleteRow {
            name: name.into(),
            bib: EnumCellValue::from(format!("B-{name}")),
            affiliation: affiliation.into(),
            event: event.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    /// Rows already in affiliation order so sorted index == input index.
    fn build_sorted_group(n_rows: usize) -> Vec<SpecAthleteRow> {
        (0..n_rows)
            .map(|n_idx| build_row(&format!("a{n_idx:02}"), &format!("club{n_idx:02}"), "100m", "U18"))
            .collect()
    }

    fn names(heat: &SpecHeat) -> Vec<String> {
        heat.entries()
            .iter()
            .map(|entry| entry.row().name.to_text())
            .collect()
    }

    #[test]
    fn test_calculate_heat_count() {
        assert_eq!(calculate_heat_count(0, 8), 0);
        assert_eq!(calculate_heat_count(1, 8), 1);
        assert_eq!(calculate_heat_count(8, 8), 1);
        assert_eq!(calculate_heat_count(9, 8), 2);
        assert_eq!(calculate_heat_count(17, 8), 3);
    }

    #[test]
    fn test_partition_rejects_zero_capacity() {
        let err = partition_rows(&build_sorted_group(3), 0).expect_err("capacity 0");
        assert_eq!(err, HeatError::InvalidCapacity(0));
    }

    #[test]
    fn test_partition_ten_rows_alternates_between_two_heats() {
        let l_groups = partition_rows(&build_sorted_group(10), 8).expect("partition");
        assert_eq!(l_groups.len(), 1);
        let heats = l_groups[0].heats();
        assert_eq!(heats.len(), 2);
        assert_eq!(names(&heats[0]), vec!["a00", "a02", "a04", "a06", "a08"]);
        assert_eq!(names(&heats[1]), vec!["a01", "a03", "a05", "a07", "a09"]);
    }

    #[test]
    fn test_partition_seventeen_rows_smears_remainder_by_modulo() {
        let l_groups = partition_rows(&build_sorted_group(17), 8).expect("partition");
        let heats = l_groups[0].heats();

        assert_eq!(
            heats.iter().map(SpecHeat::len).collect::<Vec<_>>(),
            vec![6, 6, 5]
        );
        assert_eq!(
            names(&heats[0]),
            vec!["a00", "a03", "a06", "a09", "a12", "a15"]
        );
        assert_eq!(
            names(&heats[1]),
            vec!["a01", "a04", "a07", "a10", "a13", "a16"]
        );
        assert_eq!(names(&heats[2]), vec!["a02", "a05", "a08", "a11", "a14"]);
        assert_eq!(
            heats.iter().map(SpecHeat::heat_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_partition_small_group_yields_single_heat() {
        let l_groups = partition_rows(&build_sorted_group(3), 8).expect("partition");
        assert_eq!(l_groups[0].heats().len(), 1);
        assert_eq!(l_groups[0].heats()[0].len(), 3);
    }

    #[test]
    fn test_partition_sorts_by_affiliation_stably() {
        let l_rows = vec![
            build_row("p", "Owls", "100m", "U18"),
            build_row("q", "Hawks", "100m", "U18"),
            build_row("r", "Owls", "100m", "U18"),
            build_row("s", "Bears", "100m", "U18"),
            build_row("t", "Hawks", "100m", "U18"),
        ];
        let l_groups = partition_rows(&l_rows, 8).expect("partition");
        assert_eq!(names(&l_groups[0].heats()[0]), vec!["s", "q", "t", "p", "r"]);
    }

    #[test]
    fn test_partition_missing_affiliation_sorts_last() {
        let mut row_missing = build_row("m", "", "100m", "U18");
        row_missing.affiliation = EnumCellValue::None;
        let l_rows = vec![row_missing, build_row("z", "Zebras", "100m", "U18")];
        let l_groups = partition_rows(&l_rows, 8).expect("partition");
        assert_eq!(names(&l_groups[0].heats()[0]), vec!["z", "m"]);
    }

    #[test]
    fn test_partition_groups_in_first_encounter_order() {
        let l_rows = vec![
            build_row("a", "X", "Relay", "U20"),
            build_row("b", "X", "100m", "U18"),
            build_row("c", "X", "Relay", "U20"),
            build_row("d", "X", "100m", "U20"),
        ];
        let l_groups = partition_rows(&l_rows, 8).expect("partition");
        assert_eq!(
            l_groups.iter().map(SpecHeatGroup::label).collect::<Vec<_>>(),
            vec!["U20 - Relay", "U18 - 100m", "U20 - 100m"]
        );
        assert_eq!(l_groups[0].entry_count(), 2);
    }

    #[test]
    fn test_positions_are_contiguous_and_rows_conserved() {
        let mut l_rows = build_sorted_group(23);
        l_rows.reverse();
        let l_groups = partition_rows(&l_rows, 4).expect("partition");
        let heats = l_groups[0].heats();
        assert_eq!(heats.len(), 6);

        let n_rows = l_rows.len() as f64;
        let mut l_seen = Vec::new();
        for heat in heats {
            let l_positions: Vec<usize> = heat.entries().iter().map(SpecHeatEntry::position).collect();
            assert_eq!(l_positions, (1..=heat.len()).collect::<Vec<_>>());
            assert!((heat.len() as f64 - n_rows / heats.len() as f64).abs() <= 1.0);
            l_seen.extend(heat.entries().iter().map(|entry| entry.row().clone()));
        }

        let mut l_expected = l_rows.clone();
        l_expected.sort_by_key(|row| row.name.to_text());
        l_seen.sort_by_key(|row| row.name.to_text());
        assert_eq!(l_seen, l_expected);
    }

    #[test]
    fn test_partition_is_idempotent() {
        let roster = SpecRoster {
            layout: SpecColumnLayout::default(),
            rows: vec![
                build_row("a", "Owls", "100m", "U18"),
                build_row("b", "Hawks", "100m", "U18"),
                build_row("c", "Owls", "200m", "U18"),
            ],
        };
        let plan_1 = partition(&roster, 1).expect("partition");
        let plan_2 = partition(&roster, 1).expect("partition");
        assert_eq!(plan_1, plan_2);
        assert_eq!(plan_1.heat_count(), 3);
        assert_eq!(plan_1.entry_count(), 3);
        assert_eq!(plan_1.capacity(), 1);
        assert!(plan_1.get("200m", "U18").is_some());
        assert!(plan_1.get("U18", "200m").is_none());
    }
}
