//! The mutable dependency graph: an arena of determinant-group nodes joined
//! by determinant/dependent links, with the squash, single-parent and
//! subsumption passes that reduce it to a normalization hierarchy.
mod graph;
mod link;
mod node;

pub use graph::{DependencyTree, TreeStage};
pub use link::{DependencyLink, LinkKey};
pub use node::{DependencyNode, NodeKey};
