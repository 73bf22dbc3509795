//! A minimal in-memory tabular dataset, the input carrier for the analysis.
//!
//! Cells are stored column-major as strings; the engine only ever compares
//! cells for equality, so a richer value model is unnecessary.
use std::collections::HashSet;

use rand::seq::index::sample as index_sample;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("column {0:?} appears more than once")]
    DuplicateColumn(String),
    #[error("column {name:?} has {got} rows, expected {expected}")]
    RaggedColumn {
        name: String,
        got: usize,
        expected: usize,
    },
    #[error("row {row} has {got} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        got: usize,
        expected: usize,
    },
}

/// A table of named string columns of equal length.
#[derive(Debug, Default, Clone)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from `(name, cells)` pairs, verifying that names are
    /// unique and all columns have the same length.
    pub fn from_columns<N: Into<String>>(
        columns: Vec<(N, Vec<String>)>,
    ) -> Result<Self, TableError> {
        let mut this = Self::default();
        let mut expected = None;
        for (name, cells) in columns {
            let name = name.into();
            if this.names.contains(&name) {
                return Err(TableError::DuplicateColumn(name));
            }
            let expected = *expected.get_or_insert(cells.len());
            if cells.len() != expected {
                return Err(TableError::RaggedColumn {
                    name,
                    got: cells.len(),
                    expected,
                });
            }
            this.names.push(name);
            this.columns.push(cells);
        }
        Ok(this)
    }

    /// Build a table from row tuples
    pub fn from_rows<N: Into<String>, C: Into<String>>(
        names: Vec<N>,
        rows: Vec<Vec<C>>,
    ) -> Result<Self, TableError> {
        let names: Vec<String> = names.into_iter().map(|n| n.into()).collect();
        for name in names.iter() {
            if names.iter().filter(|n| *n == name).count() > 1 {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }
        let mut columns: Vec<Vec<String>> = names.iter().map(|_| Vec::new()).collect();
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != names.len() {
                return Err(TableError::RaggedRow {
                    row: i,
                    got: row.len(),
                    expected: names.len(),
                });
            }
            for (col, cell) in columns.iter_mut().zip(row) {
                col.push(cell.into());
            }
        }
        Ok(Self { names, columns })
    }

    /// The number of rows
    pub fn len(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|s| s.as_str())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.column_index(name).map(|i| self.columns[i].as_slice())
    }

    pub(crate) fn cell(&self, row: usize, column: usize) -> &str {
        &self.columns[column][row]
    }

    /// Whether every cell of `name` is distinct. Returns `None` when the
    /// column does not exist.
    pub fn is_unique(&self, name: &str) -> Option<bool> {
        let cells = self.column(name)?;
        let mut seen = HashSet::with_capacity(cells.len());
        Some(cells.iter().all(|c| seen.insert(c.as_str())))
    }

    /// Draw `n` rows at random without replacement. Returns the whole table
    /// when it has `n` rows or fewer.
    pub fn sample<R: Rng>(&self, n: usize, rng: &mut R) -> Table {
        if self.len() <= n {
            return self.clone();
        }
        let picked = index_sample(rng, self.len(), n);
        let columns = self
            .columns
            .iter()
            .map(|col| picked.iter().map(|i| col[i].clone()).collect())
            .collect();
        Table {
            names: self.names.clone(),
            columns,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn zip_table() -> Table {
        Table::from_rows(
            vec!["id", "zip", "city"],
            vec![
                vec!["1", "20740", "College Park"],
                vec!["2", "20740", "College Park"],
                vec!["3", "21201", "Baltimore"],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_construction() {
        let t = zip_table();
        assert_eq!(t.len(), 3);
        assert_eq!(t.column_index("zip"), Some(1));
        assert_eq!(t.cell(2, 2), "Baltimore");
        assert_eq!(t.is_unique("id"), Some(true));
        assert_eq!(t.is_unique("zip"), Some(false));
        assert_eq!(t.is_unique("missing"), None);
    }

    #[test]
    fn test_checked_construction() {
        let err = Table::from_rows(vec!["a", "a"], Vec::<Vec<String>>::new()).unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn(_)));

        let err = Table::from_columns(vec![
            ("a", vec!["1".to_string()]),
            ("b", vec!["1".to_string(), "2".to_string()]),
        ])
        .unwrap_err();
        assert!(matches!(err, TableError::RaggedColumn { .. }));

        let err = Table::from_rows(vec!["a", "b"], vec![vec!["1"]]).unwrap_err();
        assert!(matches!(err, TableError::RaggedRow { .. }));
    }

    #[test]
    fn test_sample() {
        let t = zip_table();
        let mut rng = StdRng::seed_from_u64(42);
        let s = t.sample(2, &mut rng);
        assert_eq!(s.len(), 2);
        assert_eq!(s.names, t.names);

        let s = t.sample(10, &mut rng);
        assert_eq!(s.len(), 3);
    }
}
