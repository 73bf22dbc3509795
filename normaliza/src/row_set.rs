//! Row partitions over column subsets and the functional-dependency test.
use std::collections::HashMap;

use crate::columns::ColumnSet;
use crate::table::Table;

/// A partition of a table's row indices by equality of the values projected
/// onto one column subset. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct RowSet {
    /// The column subset this partition was projected onto
    pub columns: ColumnSet,
    /// Disjoint groups of row indices with identical projected tuples
    groups: Vec<Vec<u32>>,
    /// The group that each row index belongs to
    assignment: Vec<u32>,
}

impl RowSet {
    pub fn new(table: &Table, columns: ColumnSet) -> Self {
        let projected: Vec<usize> = columns
            .iter()
            .filter_map(|name| table.column_index(name))
            .collect();
        debug_assert_eq!(projected.len(), columns.len());

        let mut by_tuple: HashMap<Vec<&str>, u32> = HashMap::new();
        let mut groups: Vec<Vec<u32>> = Vec::new();
        let mut assignment = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            let tuple: Vec<&str> = projected.iter().map(|&c| table.cell(row, c)).collect();
            let gid = *by_tuple.entry(tuple).or_insert_with(|| {
                groups.push(Vec::new());
                (groups.len() - 1) as u32
            });
            groups[gid as usize].push(row as u32);
            assignment.push(gid);
        }
        Self {
            columns,
            groups,
            assignment,
        }
    }

    /// The number of distinct row-groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> impl Iterator<Item = &[u32]> {
        self.groups.iter().map(|g| g.as_slice())
    }

    /// Whether `other` functionally determines `self`: every row-group of
    /// `other` must fall inside a single row-group of `self`, so equality on
    /// `other`'s columns implies equality on `self`'s columns. Called as
    /// `dependent.has_dependency(determinant)`.
    pub fn has_dependency(&self, other: &RowSet) -> bool {
        debug_assert_eq!(self.assignment.len(), other.assignment.len());
        for group in other.groups.iter() {
            let mut ids = group.iter().map(|&row| self.assignment[row as usize]);
            if let Some(first) = ids.next() {
                if ids.any(|gid| gid != first) {
                    return false;
                }
            }
        }
        true
    }
}

/// A per-analysis cache of [`RowSet`]s keyed by column subset. One partition
/// is built per distinct subset queried and discarded with the manager.
#[derive(Debug)]
pub struct RowSetManager<'a> {
    table: &'a Table,
    cache: HashMap<ColumnSet, RowSet>,
}

impl<'a> RowSetManager<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self {
            table,
            cache: HashMap::new(),
        }
    }

    pub fn get(&mut self, columns: &ColumnSet) -> &RowSet {
        self.ensure(columns);
        &self.cache[columns]
    }

    fn ensure(&mut self, columns: &ColumnSet) {
        if !self.cache.contains_key(columns) {
            self.cache
                .insert(columns.clone(), RowSet::new(self.table, columns.clone()));
        }
    }

    /// Test whether `determinant -> dependent` holds on the cached table
    pub fn has_dependency(&mut self, dependent: &ColumnSet, determinant: &ColumnSet) -> bool {
        self.ensure(dependent);
        self.ensure(determinant);
        self.cache[dependent].has_dependency(&self.cache[determinant])
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn zip_table() -> Table {
        Table::from_rows(
            vec!["id", "zip", "city", "state"],
            vec![
                vec!["1", "20740", "College Park", "MD"],
                vec!["2", "20740", "College Park", "MD"],
                vec!["3", "21201", "Baltimore", "MD"],
                vec!["4", "02139", "Cambridge", "MA"],
                vec!["5", "21201", "Baltimore", "MD"],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_partition_covers_all_rows_exactly_once() {
        let t = zip_table();
        let rs = RowSet::new(&t, ColumnSet::single("zip"));
        assert_eq!(rs.len(), 3);
        let mut seen: Vec<u32> = rs.groups().flatten().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_rows_grouped_iff_tuples_equal() {
        let t = zip_table();
        let rs = RowSet::new(&t, ["zip", "state"].into_iter().collect());
        for group in rs.groups() {
            let zip = t.column("zip").unwrap();
            let first = &zip[group[0] as usize];
            assert!(group.iter().all(|&r| &zip[r as usize] == first));
        }
    }

    #[test]
    fn test_dependency_refinement() {
        let t = zip_table();
        let mut mgr = RowSetManager::new(&t);
        // city is a function of zip but not the reverse direction of state
        assert!(mgr.has_dependency(&ColumnSet::single("city"), &ColumnSet::single("zip")));
        assert!(mgr.has_dependency(&ColumnSet::single("state"), &ColumnSet::single("zip")));
        assert!(!mgr.has_dependency(&ColumnSet::single("zip"), &ColumnSet::single("state")));
        // a unique column determines everything
        assert!(mgr.has_dependency(&ColumnSet::single("zip"), &ColumnSet::single("id")));
        // nothing but itself determines a unique column
        assert!(!mgr.has_dependency(&ColumnSet::single("id"), &ColumnSet::single("zip")));
    }

    #[test]
    fn test_derived_column_always_depends() {
        let names = vec!["a", "b"];
        let rows: Vec<Vec<String>> = (0..50)
            .map(|i| vec![format!("{}", i % 7), format!("{}", (i % 7) * 3 + 1)])
            .collect();
        let t = Table::from_rows(names, rows).unwrap();
        let mut mgr = RowSetManager::new(&t);
        assert!(mgr.has_dependency(&ColumnSet::single("b"), &ColumnSet::single("a")));
    }
}
