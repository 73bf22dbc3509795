use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Display;

use crate::columns::ColumnSet;
use crate::deps::DependencySet;
use crate::normalize::NormalizationGroup;

use super::link::{DependencyLink, LinkKey};
use super::node::{BuildIdentityHasherNodeKey, DependencyNode, NodeKey};

/// How far along the simplification pipeline a [`DependencyTree`] is. Passes
/// are idempotent: re-running one the tree has already been through is a
/// no-op.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TreeStage {
    #[default]
    Unbuilt,
    Built,
    Collapsed,
    SingleParent,
    Subsumed,
}

type NodeKeySet = HashSet<NodeKey, BuildIdentityHasherNodeKey>;

/// A mutable, initially multi-parent dependency graph over determinant
/// groups, reduced in stages to a single-rooted, single-parent hierarchy of
/// normalization candidates.
///
/// Nodes and links live in arenas addressed by stable indices; a squashed
/// node leaves a tombstoned slot behind, so no traversal can dereference it
/// again.
#[derive(Debug, Default)]
pub struct DependencyTree {
    nodes: Vec<Option<DependencyNode>>,
    links: Vec<Option<DependencyLink>>,
    stage: TreeStage,
}

impl DependencyTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> TreeStage {
        self.stage
    }

    pub fn node(&self, key: NodeKey) -> Option<&DependencyNode> {
        self.nodes.get(key.0).and_then(|slot| slot.as_ref())
    }

    pub fn link(&self, key: LinkKey) -> Option<&DependencyLink> {
        self.links.get(key.0).and_then(|slot| slot.as_ref())
    }

    pub fn is_valid(&self, key: NodeKey) -> bool {
        self.node(key).is_some()
    }

    fn valid_nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.nodes.iter().filter_map(|slot| slot.as_ref())
    }

    /// The number of live (non-tombstoned) nodes
    pub fn node_count(&self) -> usize {
        self.valid_nodes().count()
    }

    pub fn link_count(&self) -> usize {
        self.links.iter().filter(|slot| slot.is_some()).count()
    }

    /// The live nodes with no parent link, in creation order. After
    /// [`collapse_roots`](Self::collapse_roots) there is at most one.
    pub fn roots(&self) -> Vec<NodeKey> {
        self.valid_nodes()
            .filter(|n| n.is_root())
            .map(|n| n.key)
            .collect()
    }

    pub fn create_node(&mut self, subset: ColumnSet) -> NodeKey {
        let key = NodeKey(self.nodes.len());
        self.nodes.push(Some(DependencyNode::new(key, subset)));
        key
    }

    /// Locate the live node owning `subset`, if any
    pub fn find(&self, subset: &ColumnSet) -> Option<NodeKey> {
        self.valid_nodes().find(|n| n.owns(subset)).map(|n| n.key)
    }

    fn find_or_create(&mut self, subset: &ColumnSet) -> NodeKey {
        match self.find(subset) {
            Some(key) => key,
            None => self.create_node(subset.clone()),
        }
    }

    /// How many live nodes claim `subset`; anything above 1 is a
    /// construction defect that [`validate`](Self::validate) also reports
    pub fn get_count(&self, subset: &ColumnSet) -> usize {
        self.valid_nodes().filter(|n| n.owns(subset)).count()
    }

    /// Connect `source -> target`, recording the justifying subsets. Returns
    /// `None` without touching the graph when the link would be ill-formed
    /// (self-loop, identical subsets, tombstoned endpoint); returns the
    /// existing key when an identical edge is already present.
    pub fn add_link(
        &mut self,
        source: NodeKey,
        target: NodeKey,
        determinant: ColumnSet,
        dependent: ColumnSet,
    ) -> Option<LinkKey> {
        if !DependencyLink::is_well_formed(source, target, &determinant, &dependent) {
            return None;
        }
        if !self.is_valid(source) || !self.is_valid(target) {
            return None;
        }
        if let Some(node) = self.node(source) {
            for lk in node.child_links() {
                if let Some(link) = self.link(*lk) {
                    if link.target == target
                        && link.determinant == determinant
                        && link.dependent == dependent
                    {
                        return Some(link.key);
                    }
                }
            }
        }
        let key = LinkKey(self.links.len());
        self.links.push(Some(DependencyLink::new(
            key,
            source,
            target,
            determinant,
            dependent,
        )));
        if let Some(node) = self.nodes[source.0].as_mut() {
            node.children.push(key);
        }
        if let Some(node) = self.nodes[target.0].as_mut() {
            node.parents.push(key);
        }
        Some(key)
    }

    /// Detach a link from both endpoints and tombstone its slot. With
    /// `force` the removal is unconditional; without it the link is required
    /// to be present.
    pub fn remove_link(&mut self, key: LinkKey, force: bool) {
        let Some(link) = self.links.get_mut(key.0).and_then(|slot| slot.take()) else {
            debug_assert!(force, "removed absent link {key}");
            return;
        };
        if let Some(node) = self.nodes[link.source.0].as_mut() {
            node.children.retain(|k| *k != key);
        }
        if let Some(node) = self.nodes[link.target.0].as_mut() {
            node.parents.retain(|k| *k != key);
        }
    }

    fn parent_keys(&self, key: NodeKey) -> Vec<NodeKey> {
        self.node(key)
            .map(|n| {
                n.parent_links()
                    .iter()
                    .filter_map(|lk| self.link(*lk))
                    .map(|l| l.source)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn child_keys(&self, key: NodeKey) -> Vec<NodeKey> {
        self.node(key)
            .map(|n| {
                n.child_links()
                    .iter()
                    .filter_map(|lk| self.link(*lk))
                    .map(|l| l.target)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether `ancestor` can reach `node` walking child-to-parent
    pub fn is_ancestor_of(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut visited = NodeKeySet::default();
        let mut queue: VecDeque<NodeKey> = self.parent_keys(node).into();
        while let Some(k) = queue.pop_front() {
            if k == ancestor {
                return true;
            }
            if visited.insert(k) {
                queue.extend(self.parent_keys(k));
            }
        }
        false
    }

    /// Whether `needle` is reachable from `node` walking parent-to-child
    pub fn has_descendant(&self, node: NodeKey, needle: NodeKey) -> bool {
        let mut visited = NodeKeySet::default();
        let mut queue: VecDeque<NodeKey> = self.child_keys(node).into();
        while let Some(k) = queue.pop_front() {
            if k == needle {
                return true;
            }
            if visited.insert(k) {
                queue.extend(self.child_keys(k));
            }
        }
        false
    }

    /// Merge `source` into `target`: re-home or cycle-collapse the incoming
    /// links, re-create the outgoing links from `target`, move the
    /// equivalence class over, and tombstone the source slot. Squashing a
    /// node into itself is a no-op.
    pub fn squash(&mut self, source: NodeKey, target: NodeKey) {
        if source == target || !self.is_valid(source) || !self.is_valid(target) {
            return;
        }
        let mut pending = vec![source];
        while let Some(current) = pending.pop() {
            if current == target || !self.is_valid(current) {
                continue;
            }
            let parent_links = self
                .node(current)
                .map(|n| n.parent_links().to_vec())
                .unwrap_or_default();
            for lk in parent_links {
                let Some(link) = self.link(lk).cloned() else {
                    continue;
                };
                self.remove_link(lk, true);
                let parent = link.source;
                if parent == target || !self.is_valid(parent) {
                    continue;
                }
                if self.is_ancestor_of(target, parent) {
                    // the parent already sits below the target, so merging
                    // `current` closes a cycle through it: collapse it too
                    pending.push(parent);
                } else {
                    self.add_link(parent, target, link.determinant, link.dependent);
                }
            }
            let child_links = self
                .node(current)
                .map(|n| n.child_links().to_vec())
                .unwrap_or_default();
            for lk in child_links {
                let Some(link) = self.link(lk).cloned() else {
                    continue;
                };
                self.remove_link(lk, true);
                if link.target == target || !self.is_valid(link.target) {
                    continue;
                }
                if self.is_ancestor_of(link.target, target) {
                    // mutual reachability with the target: equivalent
                    pending.push(link.target);
                } else {
                    self.add_link(target, link.target, link.determinant, link.dependent);
                }
            }
            let subsets = self.nodes[current.0]
                .as_mut()
                .map(|n| n.take_subsets())
                .unwrap_or_default();
            self.nodes[current.0] = None;
            if let Some(node) = self.nodes[target.0].as_mut() {
                for subset in subsets {
                    node.claim(subset);
                }
            }
        }
    }

    /// Assemble the graph from a discovered dependency set. Dependencies
    /// whose endpoints already share a node are skipped; dependencies that
    /// would close a cycle squash the two nodes together instead of linking.
    pub fn build(&mut self, deps: &DependencySet) {
        if self.stage >= TreeStage::Built {
            return;
        }
        for dep in deps.iter() {
            let lhs = self.find_or_create(dep.determinant());
            let rhs = self.find_or_create(dep.dependent());
            if lhs == rhs {
                continue;
            }
            if self.is_ancestor_of(rhs, lhs) || self.has_descendant(rhs, lhs) {
                // a path rhs ~> lhs already exists; adding lhs -> rhs would
                // close a cycle, so the two groups are equivalent
                self.squash(lhs, rhs);
            } else {
                self.add_link(lhs, rhs, dep.determinant().clone(), dep.dependent().clone());
            }
        }
        self.stage = TreeStage::Built;
        tracing::debug!(
            "built dependency tree: {} nodes, {} links, {} roots",
            self.node_count(),
            self.link_count(),
            self.roots().len()
        );
        debug_assert!(self.validate(), "dependency tree invalid after build");
    }

    /// Squash every root but the first into it, leaving one entry point
    pub fn collapse_roots(&mut self) {
        if self.stage >= TreeStage::Collapsed {
            return;
        }
        let roots = self.roots();
        if let Some((main, rest)) = roots.split_first() {
            for root in rest {
                self.squash(*root, *main);
            }
        }
        self.stage = TreeStage::Collapsed;
        debug_assert!(self.validate(), "dependency tree invalid after collapse");
    }

    /// Longest path from a root for every live node slot, computed without
    /// recursion. Roots sit at depth 1.
    fn depths(&self) -> Vec<usize> {
        const UNSET: usize = usize::MAX;
        let mut depth = vec![UNSET; self.nodes.len()];
        let mut on_stack = vec![false; self.nodes.len()];
        for start in 0..self.nodes.len() {
            if self.nodes[start].is_none() || depth[start] != UNSET {
                continue;
            }
            let mut stack = vec![start];
            while let Some(&slot) = stack.last() {
                if depth[slot] != UNSET {
                    stack.pop();
                    continue;
                }
                on_stack[slot] = true;
                let parents: Vec<usize> = self
                    .parent_keys(NodeKey(slot))
                    .into_iter()
                    .map(|k| k.0)
                    .collect();
                let pending: Vec<usize> = parents
                    .iter()
                    .copied()
                    .filter(|p| depth[*p] == UNSET && !on_stack[*p])
                    .collect();
                if pending.is_empty() {
                    depth[slot] = 1 + parents
                        .iter()
                        .map(|p| depth[*p])
                        .filter(|d| *d != UNSET)
                        .max()
                        .unwrap_or(0);
                    on_stack[slot] = false;
                    stack.pop();
                } else {
                    stack.extend(pending);
                }
            }
        }
        depth
    }

    /// Reduce every node to a single parent, keeping the link whose parent
    /// sits deepest from the root; ties keep the earliest link. The pruned
    /// shorter paths are not reinserted elsewhere.
    pub fn make_single_parent(&mut self) {
        if self.stage >= TreeStage::SingleParent {
            return;
        }
        let depths = self.depths();
        for slot in 0..self.nodes.len() {
            let parents = match self.nodes[slot].as_ref() {
                Some(node) if node.parent_links().len() > 1 => node.parent_links().to_vec(),
                _ => continue,
            };
            let mut keep: Option<(LinkKey, usize)> = None;
            for lk in parents.iter() {
                let Some(link) = self.link(*lk) else { continue };
                let d = depths[link.source.0];
                match keep {
                    Some((_, best)) if d <= best => {}
                    _ => keep = Some((*lk, d)),
                }
            }
            for lk in parents {
                if keep.map(|(k, _)| k) != Some(lk) {
                    self.remove_link(lk, false);
                }
            }
        }
        self.stage = TreeStage::SingleParent;
        debug_assert!(self.validate(), "dependency tree invalid after single-parent pass");
    }

    fn parent_of(&self, key: NodeKey) -> Option<NodeKey> {
        self.node(key)?
            .parent_links()
            .first()
            .and_then(|lk| self.link(*lk))
            .map(|l| l.source)
    }

    /// Fold any node whose columns are entirely covered by an ancestor's
    /// columns back into that ancestor; a covered node does not warrant a
    /// table of its own. Applied deepest-first until nothing changes.
    pub fn subsumes_children(&mut self) {
        if self.stage >= TreeStage::Subsumed {
            return;
        }
        let rounds = self.node_count() + 1;
        for _ in 0..rounds {
            let mut changed = false;
            let depths = self.depths();
            let mut order: Vec<usize> = (0..self.nodes.len())
                .filter(|slot| self.nodes[*slot].is_some())
                .collect();
            order.sort_by_key(|slot| std::cmp::Reverse(depths[*slot]));
            for slot in order {
                let Some(node) = self.nodes[slot].as_ref() else {
                    continue;
                };
                let key = node.key;
                let columns = node.columns();
                let mut seen = NodeKeySet::default();
                let mut ancestor = self.parent_of(key);
                while let Some(a) = ancestor {
                    if !seen.insert(a) {
                        break;
                    }
                    let Some(above) = self.node(a) else { break };
                    if above.columns().is_superset(&columns) {
                        tracing::debug!("subsuming {key} into covering ancestor {a}");
                        self.squash(key, a);
                        changed = true;
                        break;
                    }
                    ancestor = self.parent_of(a);
                }
            }
            if !changed {
                break;
            }
        }
        self.stage = TreeStage::Subsumed;
        debug_assert!(self.validate(), "dependency tree invalid after subsumption");
    }

    /// The key a node's sub-table would use: the designated key subset if
    /// this node owns it, otherwise its smallest owned subset
    fn canonical_key(&self, node: &DependencyNode, preferred: Option<&ColumnSet>) -> ColumnSet {
        if let Some(preferred) = preferred {
            if node.owns(preferred) {
                return preferred.clone();
            }
        }
        node.subsets()
            .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
            .cloned()
            .unwrap_or_default()
    }

    /// Emit one normalization group per node that still has children, in
    /// depth-first order from the root. A leaf child folds all of its
    /// columns into the parent group; an internal child contributes only its
    /// key columns, which become the foreign key to its own group.
    pub fn normalization_groups(
        &self,
        preferred_key: Option<&ColumnSet>,
    ) -> Vec<NormalizationGroup> {
        let mut groups = Vec::new();
        let mut visited = NodeKeySet::default();
        let mut stack: Vec<(NodeKey, Option<ColumnSet>)> = self
            .roots()
            .into_iter()
            .rev()
            .map(|k| (k, None))
            .collect();
        while let Some((key, parent_key)) = stack.pop() {
            if !visited.insert(key) {
                continue;
            }
            let Some(node) = self.node(key) else { continue };
            if node.is_leaf() {
                continue;
            }
            let group_key = self.canonical_key(node, preferred_key);
            let mut columns: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
            for subset in node.subsets() {
                if *subset != group_key {
                    columns.extend(subset.iter().map(String::from));
                }
            }
            let mut internal_children = Vec::new();
            for lk in node.child_links() {
                let Some(link) = self.link(*lk) else { continue };
                let Some(child) = self.node(link.target) else {
                    continue;
                };
                if child.is_leaf() {
                    columns.extend(child.columns().iter().map(String::from));
                } else {
                    columns.extend(
                        self.canonical_key(child, preferred_key)
                            .iter()
                            .map(String::from),
                    );
                    internal_children.push(child.key);
                }
            }
            for name in group_key.iter() {
                columns.remove(name);
            }
            groups.push(NormalizationGroup::new(
                group_key.clone(),
                columns.into_iter().collect(),
                parent_key,
            ));
            for child in internal_children.into_iter().rev() {
                stack.push((child, Some(group_key.clone())));
            }
        }
        groups
    }

    /// Pure structural check over the arena: arena indices agree with node
    /// and link keys, both endpoints of every live link are live and hold
    /// it, the justifying subsets are owned by the endpoints, and no column
    /// subset is claimed by two nodes. A `false` here is a building-logic
    /// defect.
    pub fn validate(&self) -> bool {
        let mut claims: HashMap<&ColumnSet, NodeKey> = HashMap::new();
        for (slot, entry) in self.nodes.iter().enumerate() {
            let Some(node) = entry.as_ref() else { continue };
            if node.key.0 != slot {
                tracing::error!("node {} stored in slot {slot}", node.key);
                return false;
            }
            if node.subset_count() == 0 {
                tracing::error!("live node {} owns no column subsets", node.key);
                return false;
            }
            for subset in node.subsets() {
                if let Some(prev) = claims.insert(subset, node.key) {
                    if prev != node.key {
                        tracing::error!("{subset} claimed by both {prev} and {}", node.key);
                        return false;
                    }
                }
            }
            for lk in node.child_links() {
                match self.link(*lk) {
                    Some(link) if link.source == node.key => {}
                    _ => {
                        tracing::error!("node {} holds stray child link {lk}", node.key);
                        return false;
                    }
                }
            }
            for lk in node.parent_links() {
                match self.link(*lk) {
                    Some(link) if link.target == node.key => {}
                    _ => {
                        tracing::error!("node {} holds stray parent link {lk}", node.key);
                        return false;
                    }
                }
            }
        }
        for (slot, entry) in self.links.iter().enumerate() {
            let Some(link) = entry.as_ref() else { continue };
            if link.key.0 != slot {
                tracing::error!("link {} stored in slot {slot}", link.key);
                return false;
            }
            if link.source == link.target || link.determinant == link.dependent {
                tracing::error!("degenerate link {link} between {} and {}", link.source, link.target);
                return false;
            }
            let (Some(source), Some(target)) = (self.node(link.source), self.node(link.target))
            else {
                tracing::error!("link {} references a tombstoned node", link.key);
                return false;
            };
            if !source.child_links().contains(&link.key)
                || !target.parent_links().contains(&link.key)
            {
                tracing::error!("link {} not held by both endpoints", link.key);
                return false;
            }
            if !source.owns(&link.determinant) || !target.owns(&link.dependent) {
                tracing::error!("link {link} references subsets its endpoints do not own");
                return false;
            }
        }
        true
    }
}

impl Display for DependencyTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut visited = NodeKeySet::default();
        let mut stack: Vec<(NodeKey, usize)> =
            self.roots().into_iter().rev().map(|k| (k, 0)).collect();
        while let Some((key, indent)) = stack.pop() {
            let Some(node) = self.node(key) else { continue };
            writeln!(f, "{:indent$}{node}", "", indent = indent * 2)?;
            if !visited.insert(key) {
                continue;
            }
            for child in self.child_keys(key).into_iter().rev() {
                stack.push((child, indent + 1));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::deps::ColumnDependency;

    fn cnset(names: &[&str]) -> ColumnSet {
        names.iter().copied().collect()
    }

    fn deps_of(pairs: &[(&[&str], &[&str])]) -> DependencySet {
        let mut deps = DependencySet::new(true);
        for (lhs, rhs) in pairs {
            deps.insert(ColumnDependency::new(cnset(lhs), cnset(rhs)));
        }
        deps
    }

    #[test]
    fn test_build_chain() {
        let deps = deps_of(&[
            (&["id"], &["zip"]),
            (&["id"], &["city"]),
            (&["id"], &["state"]),
            (&["zip"], &["city"]),
            (&["zip"], &["state"]),
        ]);
        let mut tree = DependencyTree::new();
        tree.build(&deps);
        assert!(tree.validate());
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.roots().len(), 1);
        assert_eq!(tree.get_count(&cnset(&["city"])), 1);

        // city keeps both determinants until the single-parent pass
        let city = tree.find(&cnset(&["city"])).unwrap();
        assert_eq!(tree.node(city).unwrap().parent_links().len(), 2);

        tree.collapse_roots();
        tree.make_single_parent();
        for node in tree.valid_nodes() {
            if !node.is_root() {
                assert_eq!(node.parent_links().len(), 1, "{node} has multiple parents");
            }
        }
        // the deeper determinant (zip) wins over the shorter path from id
        let city = tree.find(&cnset(&["city"])).unwrap();
        let parent = tree.parent_of(city).unwrap();
        assert!(tree.node(parent).unwrap().owns(&cnset(&["zip"])));
        assert!(tree.validate());
    }

    #[test]
    fn test_cycle_collapse() {
        let deps = deps_of(&[(&["a"], &["b"]), (&["b"], &["a"])]);
        let mut tree = DependencyTree::new();
        tree.build(&deps);
        assert!(tree.validate());
        assert_eq!(tree.node_count(), 1);
        let a = tree.find(&cnset(&["a"])).unwrap();
        let b = tree.find(&cnset(&["b"])).unwrap();
        assert_eq!(a, b);
        assert_eq!(tree.link_count(), 0);
    }

    #[test]
    fn test_three_cycle_collapse() {
        let mut tree = DependencyTree::new();
        let a = tree.create_node(cnset(&["a"]));
        let b = tree.create_node(cnset(&["b"]));
        let c = tree.create_node(cnset(&["c"]));
        tree.add_link(a, b, cnset(&["a"]), cnset(&["b"]));
        tree.add_link(b, c, cnset(&["b"]), cnset(&["c"]));
        // discovering c -> a closes the cycle
        tree.squash(c, a);
        assert!(tree.validate());
        assert_eq!(tree.node_count(), 1);
        assert!(tree.node(a).unwrap().owns(&cnset(&["b"])));
        assert!(tree.node(a).unwrap().owns(&cnset(&["c"])));
    }

    #[test]
    fn test_self_squash_is_noop() {
        let mut tree = DependencyTree::new();
        let a = tree.create_node(cnset(&["a"]));
        let b = tree.create_node(cnset(&["b"]));
        tree.add_link(a, b, cnset(&["a"]), cnset(&["b"]));
        tree.squash(a, a);
        assert!(tree.is_valid(a));
        assert_eq!(tree.node_count(), 2);
        assert_eq!(tree.link_count(), 1);
        assert!(tree.validate());
    }

    #[test]
    fn test_no_dangling_links_after_squash() {
        let deps = deps_of(&[
            (&["a"], &["b"]),
            (&["a"], &["c"]),
            (&["b"], &["c"]),
            (&["c"], &["b"]),
            (&["b"], &["d"]),
        ]);
        let mut tree = DependencyTree::new();
        tree.build(&deps);
        assert!(tree.validate());
        for node in tree.valid_nodes() {
            for lk in node.child_links().iter().chain(node.parent_links()) {
                let link = tree.link(*lk).unwrap();
                assert!(tree.is_valid(link.source));
                assert!(tree.is_valid(link.target));
            }
        }
    }

    #[test]
    fn test_collapse_roots_unifies_forest() {
        let deps = deps_of(&[(&["a"], &["b"]), (&["c"], &["d"])]);
        let mut tree = DependencyTree::new();
        tree.build(&deps);
        assert_eq!(tree.roots().len(), 2);
        tree.collapse_roots();
        assert_eq!(tree.roots().len(), 1);
        assert!(tree.validate());
        let root = tree.roots()[0];
        assert!(tree.node(root).unwrap().owns(&cnset(&["a"])));
        assert!(tree.node(root).unwrap().owns(&cnset(&["c"])));
    }

    #[test]
    fn test_subsumed_child_folds_into_ancestor() {
        let mut tree = DependencyTree::new();
        let root = tree.create_node(cnset(&["zip", "city"]));
        let mid = tree.create_node(cnset(&["zip"]));
        let leaf = tree.create_node(cnset(&["city"]));
        tree.add_link(root, mid, cnset(&["zip", "city"]), cnset(&["zip"]));
        tree.add_link(mid, leaf, cnset(&["zip"]), cnset(&["city"]));
        tree.subsumes_children();
        assert!(tree.validate());
        // both descendants are covered by the root's columns
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.get_count(&cnset(&["city"])), 1);
        assert!(tree.node(root).unwrap().owns(&cnset(&["zip"])));
    }

    #[test]
    fn test_groups_from_chain() {
        let deps = deps_of(&[
            (&["id"], &["zip"]),
            (&["id"], &["city"]),
            (&["id"], &["state"]),
            (&["zip"], &["city"]),
            (&["zip"], &["state"]),
        ]);
        let mut tree = DependencyTree::new();
        tree.build(&deps);
        tree.collapse_roots();
        tree.make_single_parent();
        tree.subsumes_children();
        let key = cnset(&["id"]);
        let groups = tree.normalization_groups(Some(&key));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, cnset(&["id"]));
        assert_eq!(groups[0].columns, vec!["zip".to_string()]);
        assert!(groups[0].parent_key.is_none());
        assert_eq!(groups[1].key, cnset(&["zip"]));
        assert_eq!(
            groups[1].columns,
            vec!["city".to_string(), "state".to_string()]
        );
        assert_eq!(groups[1].parent_key.as_ref(), Some(&cnset(&["id"])));
    }

    #[test]
    fn test_display_renders_hierarchy() {
        let deps = deps_of(&[(&["a"], &["b"])]);
        let mut tree = DependencyTree::new();
        tree.build(&deps);
        let rendered = tree.to_string();
        assert!(rendered.contains("(a)"));
        assert!(rendered.contains("  "));
    }
}
