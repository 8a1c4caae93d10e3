//! Cycle Grouping

use crate::{CycleId, MeasurementRow};
use std::collections::BTreeMap;

/// Rows of one table grouped by cycle, iterated in ascending cycle order
pub type CycleRows<'a> = BTreeMap<CycleId, Vec<&'a MeasurementRow>>;

/// Group rows by cycle, preserving row order within each cycle
pub fn group_by_cycle<'a, I>(rows: I) -> CycleRows<'a>
where
    I: IntoIterator<Item = &'a MeasurementRow>,
{
    let mut groups: CycleRows<'a> = BTreeMap::new();
    for row in rows {
        groups.entry(row.cycle_id).or_default().push(row);
    }
    groups
}

/// Distinct cycle ids in ascending order
pub fn cycle_ids(rows: &[MeasurementRow]) -> Vec<CycleId> {
    group_by_cycle(rows).into_keys().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cycle_id: CycleId, current: f64) -> MeasurementRow {
        MeasurementRow {
            cycle_id,
            current,
            ..Default::default()
        }
    }

    #[test]
    fn test_groups_in_ascending_order() {
        let rows = vec![row(3, 1.0), row(1, 2.0), row(3, 3.0), row(2, 4.0)];
        let groups = group_by_cycle(&rows);
        let keys: Vec<CycleId> = groups.keys().copied().collect();
        assert_eq!(keys, vec![1, 2, 3]);

        let currents: Vec<f64> = groups[&3].iter().map(|r| r.current).collect();
        assert_eq!(currents, vec![1.0, 3.0]);
    }

    #[test]
    fn test_cycle_zero_is_kept() {
        let rows = vec![row(0, 1.0), row(1, 1.0)];
        assert_eq!(cycle_ids(&rows), vec![0, 1]);
    }

    #[test]
    fn test_empty_table() {
        assert!(cycle_ids(&[]).is_empty());
    }

    proptest::proptest! {
        #[test]
        fn prop_grouping_keeps_every_row(ids in proptest::collection::vec(0i64..20, 0..200)) {
            let rows: Vec<MeasurementRow> = ids.iter().map(|&id| row(id, 0.0)).collect();
            let groups = group_by_cycle(&rows);
            let total: usize = groups.values().map(Vec::len).sum();
            proptest::prop_assert_eq!(total, rows.len());
            for (id, members) in &groups {
                proptest::prop_assert!(members.iter().all(|r| r.cycle_id == *id));
            }
        }
    }
}
