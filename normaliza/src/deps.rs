//! Candidate enumeration and minimality-pruned dependency discovery.
use std::collections::BTreeSet;
use std::fmt::Display;

use itertools::Itertools;

use crate::columns::ColumnSet;
use crate::row_set::RowSetManager;
use crate::table::Table;

/// An ordered pair of column subsets meaning `determinant -> dependent`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnDependency {
    determinant: ColumnSet,
    dependent: ColumnSet,
}

impl ColumnDependency {
    pub fn new(determinant: ColumnSet, dependent: ColumnSet) -> Self {
        Self {
            determinant,
            dependent,
        }
    }

    pub fn determinant(&self) -> &ColumnSet {
        &self.determinant
    }

    pub fn dependent(&self) -> &ColumnSet {
        &self.dependent
    }

    /// Whether this dependency makes `determinant -> dependent` redundant:
    /// the same dependent already follows from a subset of the determinant
    pub fn is_narrower_than(&self, determinant: &ColumnSet, dependent: &ColumnSet) -> bool {
        self.dependent == *dependent && self.determinant.is_subset(determinant)
    }
}

impl Display for ColumnDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.determinant, self.dependent)
    }
}

/// The set of functional dependencies discovered for one table, with the
/// stability-checked re-analysis path used by iterative sampling.
#[derive(Debug, Default, Clone)]
pub struct DependencySet {
    deps: BTreeSet<ColumnDependency>,
    single_dep: bool,
    analyzed: bool,
}

impl DependencySet {
    /// In single-dependency mode enumeration for a column stops at the
    /// smallest determinant size that yields any dependency; only minimal
    /// determinants matter for normalization.
    pub fn new(single_dep: bool) -> Self {
        Self {
            single_dep,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDependency> {
        self.deps.iter()
    }

    pub fn contains(&self, dep: &ColumnDependency) -> bool {
        self.deps.contains(dep)
    }

    pub fn insert(&mut self, dep: ColumnDependency) -> bool {
        self.deps.insert(dep)
    }

    /// Analyze `table`. The first call enumerates candidate determinants and
    /// always reports an unstable round; every later call re-tests the
    /// recorded dependencies against the new table, keeps the survivors, and
    /// reports whether the set came through unchanged.
    pub fn analyze(&mut self, table: &Table) -> bool {
        if !self.analyzed {
            self.enumerate(table);
            self.analyzed = true;
            false
        } else {
            self.recheck(table)
        }
    }

    fn enumerate(&mut self, table: &Table) {
        let mut manager = RowSetManager::new(table);
        let columns: Vec<&str> = table.column_names().collect();
        for column in columns.iter() {
            let dependent = ColumnSet::single(*column);
            let candidates: Vec<&str> =
                columns.iter().copied().filter(|c| c != column).collect();
            // Non-empty proper subsets of the remaining columns, smallest first
            for size in 1..candidates.len() {
                let mut found_at_size = false;
                for combo in candidates.iter().copied().combinations(size) {
                    let determinant: ColumnSet = combo.into_iter().collect();
                    if self.is_known_wider(&determinant, &dependent) {
                        continue;
                    }
                    if manager.has_dependency(&dependent, &determinant) {
                        tracing::trace!("found {determinant} -> {dependent}");
                        self.deps
                            .insert(ColumnDependency::new(determinant, dependent.clone()));
                        found_at_size = true;
                    }
                }
                if self.single_dep && found_at_size {
                    break;
                }
            }
        }
        tracing::debug!(
            "enumerated {} dependencies over {} partitions",
            self.deps.len(),
            manager.len()
        );
    }

    /// Minimality pruning: a candidate that is a superset of an already-found
    /// determinant for the same dependent cannot be minimal
    fn is_known_wider(&self, determinant: &ColumnSet, dependent: &ColumnSet) -> bool {
        self.deps
            .iter()
            .any(|d| d.is_narrower_than(determinant, dependent))
    }

    fn recheck(&mut self, table: &Table) -> bool {
        let mut manager = RowSetManager::new(table);
        let before = self.deps.len();
        let retained: BTreeSet<ColumnDependency> = std::mem::take(&mut self.deps)
            .into_iter()
            .filter(|dep| manager.has_dependency(dep.dependent(), dep.determinant()))
            .collect();
        let stable = retained.len() == before;
        if !stable {
            tracing::debug!(
                "re-analysis dropped {} of {} dependencies",
                before - retained.len(),
                before
            );
        }
        self.deps = retained;
        stable
    }
}

impl<'a> IntoIterator for &'a DependencySet {
    type Item = &'a ColumnDependency;
    type IntoIter = std::collections::btree_set::Iter<'a, ColumnDependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.deps.iter()
    }
}

impl Display for DependencySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, dep) in self.deps.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{dep}")?;
        }
        Ok(())
    }
}
