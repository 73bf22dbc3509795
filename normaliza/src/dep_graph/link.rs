use std::fmt::Display;
use std::hash::Hash;

use identity_hash::IdentityHashable;

use crate::columns::ColumnSet;

use super::node::NodeKey;

/// A stable arena index for a [`DependencyLink`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LinkKey(pub(crate) usize);

impl LinkKey {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl Hash for LinkKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_usize(self.0);
    }
}

impl IdentityHashable for LinkKey {}

impl Display for LinkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A directed edge from a determinant-owning node to a dependent-owning node,
/// recording the subset pair that justified it. Held by both endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyLink {
    pub key: LinkKey,
    pub source: NodeKey,
    pub target: NodeKey,
    pub determinant: ColumnSet,
    pub dependent: ColumnSet,
}

impl DependencyLink {
    pub fn new(
        key: LinkKey,
        source: NodeKey,
        target: NodeKey,
        determinant: ColumnSet,
        dependent: ColumnSet,
    ) -> Self {
        Self {
            key,
            source,
            target,
            determinant,
            dependent,
        }
    }

    /// A link may never connect a node to itself, nor carry an edge whose
    /// determinant and dependent subsets coincide
    pub fn is_well_formed(source: NodeKey, target: NodeKey, determinant: &ColumnSet, dependent: &ColumnSet) -> bool {
        source != target && determinant != dependent
    }
}

impl Display for DependencyLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.determinant, self.dependent)
    }
}
