use std::collections::BTreeSet;
use std::fmt::Display;
use std::hash::Hash;

use identity_hash::IdentityHashable;

use crate::columns::ColumnSet;

use super::link::LinkKey;

/// A stable arena index for a [`DependencyNode`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeKey(pub(crate) usize);

impl NodeKey {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl Hash for NodeKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_usize(self.0);
    }
}

impl IdentityHashable for NodeKey {}

pub type BuildIdentityHasherNodeKey = identity_hash::BuildIdentityHasher<NodeKey>;

impl Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A node owning one or more column subsets that have been proven mutually
/// equivalent by squashing, plus the links connecting it to its parents and
/// children. Link order is insertion order; tie-breaking depends on it.
#[derive(Debug, Clone)]
pub struct DependencyNode {
    pub key: NodeKey,
    subsets: BTreeSet<ColumnSet>,
    pub(crate) parents: Vec<LinkKey>,
    pub(crate) children: Vec<LinkKey>,
}

impl DependencyNode {
    pub fn new(key: NodeKey, subset: ColumnSet) -> Self {
        let mut subsets = BTreeSet::new();
        subsets.insert(subset);
        Self {
            key,
            subsets,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn owns(&self, subset: &ColumnSet) -> bool {
        self.subsets.contains(subset)
    }

    pub fn subsets(&self) -> impl Iterator<Item = &ColumnSet> {
        self.subsets.iter()
    }

    pub fn subset_count(&self) -> usize {
        self.subsets.len()
    }

    pub(crate) fn claim(&mut self, subset: ColumnSet) {
        self.subsets.insert(subset);
    }

    pub(crate) fn take_subsets(&mut self) -> BTreeSet<ColumnSet> {
        std::mem::take(&mut self.subsets)
    }

    /// The union of every column name in every owned subset
    pub fn columns(&self) -> ColumnSet {
        let mut all = ColumnSet::new();
        for subset in self.subsets.iter() {
            all.merge(subset);
        }
        all
    }

    pub fn parent_links(&self) -> &[LinkKey] {
        &self.parents
    }

    pub fn child_links(&self) -> &[LinkKey] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl PartialEq for DependencyNode {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for DependencyNode {}

impl Hash for DependencyNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl Display for DependencyNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[", self.key)?;
        for (i, subset) in self.subsets.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{subset}")?;
        }
        write!(f, "]")
    }
}
