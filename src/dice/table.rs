//! Random tables: weighted draws and clamped die-indexed rows

use crate::core::error::{ChargenError, Result};

/// An entry that carries its own draw weight
pub trait Weighted {
    fn weight(&self) -> u32;
}

/// A table whose draws honor each entry's declared weight exactly
///
/// A draw point `p` in `1..=total_weight` selects the first entry whose
/// cumulative weight reaches `p`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTable<T> {
    entries: Vec<T>,
    cumulative: Vec<u32>,
}

impl<T: Weighted> WeightedTable<T> {
    /// Build a table; empty tables and zero total weight are rule defects
    pub fn new(name: &str, entries: Vec<T>) -> Result<Self> {
        let mut cumulative = Vec::with_capacity(entries.len());
        let mut total: u32 = 0;
        for entry in &entries {
            total = total.checked_add(entry.weight()).ok_or_else(|| {
                ChargenError::InvalidRule(format!("table {} weight overflows", name))
            })?;
            cumulative.push(total);
        }

        if total == 0 {
            return Err(ChargenError::InvalidRule(format!(
                "table {} has no weighted entries",
                name
            )));
        }

        Ok(Self {
            entries,
            cumulative,
        })
    }
}

impl<T> WeightedTable<T> {
    /// Sum of all weights
    pub fn total_weight(&self) -> u32 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    /// Entry selected by draw point `point` (clamped into `1..=total_weight`)
    pub fn select(&self, point: u32) -> &T {
        let point = point.clamp(1, self.total_weight());
        let idx = self.cumulative.partition_point(|&c| c < point);
        &self.entries[idx]
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Row of a die-indexed table for a modified total
///
/// Rows are numbered from 1; totals below 1 read the first row and totals
/// past the end read the last, as printed tables are read at the table.
pub fn clamped_row<T>(rows: &[T], total: i32) -> Option<&T> {
    if rows.is_empty() {
        return None;
    }
    let idx = (total.max(1) as usize).min(rows.len()) - 1;
    rows.get(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry(&'static str, u32);

    impl Weighted for Entry {
        fn weight(&self) -> u32 {
            self.1
        }
    }

    fn table() -> WeightedTable<Entry> {
        WeightedTable::new(
            "test",
            vec![Entry("common", 3), Entry("never", 0), Entry("rare", 1)],
        )
        .unwrap()
    }

    #[test]
    fn test_cumulative_selection_boundaries() {
        let table = table();
        assert_eq!(table.total_weight(), 4);
        assert_eq!(table.select(1).0, "common");
        assert_eq!(table.select(3).0, "common");
        assert_eq!(table.select(4).0, "rare");
    }

    #[test]
    fn test_zero_weight_entry_never_selected() {
        let table = table();
        for point in 0..=10 {
            assert_ne!(table.select(point).0, "never");
        }
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = WeightedTable::<Entry>::new("empty", vec![]).unwrap_err();
        assert!(err.is_configuration());

        let err = WeightedTable::new("zero", vec![Entry("a", 0)]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_clamped_rows() {
        let rows = [10, 20, 30];
        assert_eq!(clamped_row(&rows, -2), Some(&10));
        assert_eq!(clamped_row(&rows, 2), Some(&20));
        assert_eq!(clamped_row(&rows, 9), Some(&30));
        assert_eq!(clamped_row::<i32>(&[], 1), None);
    }
}
