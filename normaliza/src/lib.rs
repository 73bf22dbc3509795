//! Automatic functional-dependency discovery and 3NF-style normalization of
//! flat tables: sample a table, infer which column subsets determine which
//! columns, reduce the dependency graph to a hierarchy, and emit one
//! candidate sub-table per surviving determinant group.
pub mod columns;
pub mod dep_graph;
pub mod deps;
pub mod normalize;
pub mod row_set;
pub mod table;

pub use columns::ColumnSet;
pub use dep_graph::{DependencyTree, TreeStage};
pub use deps::{ColumnDependency, DependencySet};
pub use normalize::{normalize, NormalizationGroup, NormalizeConfig, NormalizeError};
pub use row_set::{RowSet, RowSetManager};
pub use table::{Table, TableError};
