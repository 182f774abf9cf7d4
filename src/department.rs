//! Department tree
//!
//! Builds a rooted forest from the flat department list, materializing each
//! node's level and full name path once so later scope and filter checks
//! never walk the tree again.

use std::collections::{HashMap, HashSet};

use crate::entity::department::{DepartmentRecord, DepartmentTree};

/// One department in the forest
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepartmentNode {
    pub id: i64,
    pub name: String,
    /// Parent as used in the forest. `None` for roots, including nodes whose
    /// backend parent does not exist.
    pub parent_id: Option<i64>,
    pub abbreviation: Option<String>,
    /// Depth, 0 for roots
    pub level: usize,
    /// Ancestor names from the root down to and including this node
    pub full_path: Vec<String>,
    /// Ancestor ids from the root down to and including this node
    pub id_path: Vec<i64>,
    /// Direct children in input order
    pub children: Vec<i64>,
}

impl DepartmentNode {
    /// True if `ancestor` is this node or one of its ancestors
    pub fn is_within(&self, ancestor: i64) -> bool {
        self.id_path.contains(&ancestor)
    }

    /// Path joined for display, e.g. `Cục/Phòng Kế hoạch`
    pub fn path_label(&self) -> String {
        self.full_path.join("/")
    }
}

/// Department forest. Nodes are stored in pre-order (each root followed by its
/// subtree), which is also the display order.
#[derive(Clone, Debug, Default)]
pub struct DepartmentForest {
    nodes: Vec<DepartmentNode>,
    index: HashMap<i64, usize>,
    roots: Vec<i64>,
}

impl DepartmentForest {
    /// Build the forest from flat records.
    ///
    /// Duplicate ids: the last record wins. A parent reference to a missing
    /// department (or to itself) makes the node a root. A parent cycle is
    /// broken at its first member in input order, which becomes a root.
    pub fn build(records: impl IntoIterator<Item = DepartmentRecord>) -> Self {
        let mut order: Vec<i64> = Vec::new();
        let mut by_id: HashMap<i64, DepartmentRecord> = HashMap::new();
        for record in records {
            let id = record.id;
            if by_id.insert(id, record).is_none() {
                order.push(id);
            } else {
                tracing::warn!("Duplicate department id {}, keeping the last record", id);
            }
        }

        let parent_of = |id: i64| -> Option<i64> {
            by_id[&id]
                .parent_id
                .filter(|p| *p != id && by_id.contains_key(p))
        };

        let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
        let mut roots: Vec<i64> = Vec::new();
        for &id in &order {
            match parent_of(id) {
                Some(parent) => children.entry(parent).or_default().push(id),
                None => {
                    if let Some(p) = by_id[&id].parent_id {
                        if p != id && !by_id.contains_key(&p) {
                            tracing::debug!("Department {} has dangling parent {}, treating as root", id, p);
                        }
                    }
                    roots.push(id);
                }
            }
        }

        let mut forest = Self {
            nodes: Vec::with_capacity(order.len()),
            index: HashMap::with_capacity(order.len()),
            roots: Vec::new(),
        };
        let mut visited: HashSet<i64> = HashSet::with_capacity(order.len());

        for root in roots {
            forest.walk(root, &by_id, &children, &mut visited);
        }

        // Anything still unvisited sits on a parent cycle
        for &id in &order {
            if !visited.contains(&id) {
                tracing::warn!("Department {} is on a parent cycle, detaching it as a root", id);
                forest.walk(id, &by_id, &children, &mut visited);
            }
        }

        forest
    }

    /// Depth-first pre-order walk from `root`, appending nodes
    fn walk(
        &mut self,
        root: i64,
        by_id: &HashMap<i64, DepartmentRecord>,
        children: &HashMap<i64, Vec<i64>>,
        visited: &mut HashSet<i64>,
    ) {
        self.roots.push(root);
        let mut stack: Vec<(i64, Option<usize>)> = vec![(root, None)];

        while let Some((id, parent_idx)) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let record = &by_id[&id];
            let (level, mut full_path, mut id_path, parent_id) = match parent_idx {
                Some(idx) => {
                    let parent = &self.nodes[idx];
                    (
                        parent.level + 1,
                        parent.full_path.clone(),
                        parent.id_path.clone(),
                        Some(parent.id),
                    )
                }
                None => (0, Vec::new(), Vec::new(), None),
            };
            full_path.push(record.name.clone());
            id_path.push(id);

            let idx = self.nodes.len();
            if let Some(p) = parent_idx {
                self.nodes[p].children.push(id);
            }
            self.nodes.push(DepartmentNode {
                id,
                name: record.name.clone(),
                parent_id,
                abbreviation: record.abbreviation.clone(),
                level,
                full_path,
                id_path,
                children: Vec::new(),
            });
            self.index.insert(id, idx);

            if let Some(kids) = children.get(&id) {
                // reversed so the first child is popped first
                for &child in kids.iter().rev() {
                    if !visited.contains(&child) {
                        stack.push((child, Some(idx)));
                    }
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&DepartmentNode> {
        self.index.get(&id).map(|&idx| &self.nodes[idx])
    }

    pub fn contains(&self, id: i64) -> bool {
        self.index.contains_key(&id)
    }

    /// All nodes in pre-order
    pub fn iter(&self) -> impl Iterator<Item = &DepartmentNode> {
        self.nodes.iter()
    }

    /// All department ids in pre-order
    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    pub fn roots(&self) -> impl Iterator<Item = &DepartmentNode> {
        self.roots.iter().filter_map(move |id| self.get(*id))
    }

    /// Direct children of `id`
    pub fn children(&self, id: i64) -> impl Iterator<Item = &DepartmentNode> {
        self.get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(move |child| self.get(*child))
    }

    /// Ids of all descendants of `id`, excluding `id` itself
    pub fn descendant_ids(&self, id: i64) -> Vec<i64> {
        let Some(&start) = self.index.get(&id) else {
            return Vec::new();
        };
        // Pre-order keeps a subtree contiguous right after its root
        let level = self.nodes[start].level;
        self.nodes[start + 1..]
            .iter()
            .take_while(|n| n.level > level)
            .map(|n| n.id)
            .collect()
    }

    /// First department with exactly this name (case-sensitive), in pre-order
    pub fn find_by_name(&self, name: &str) -> Option<&DepartmentNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Nested representation for display / JSON output
    pub fn to_tree(&self) -> Vec<DepartmentTree> {
        self.roots.iter().filter_map(|id| self.subtree(*id)).collect()
    }

    fn subtree(&self, id: i64) -> Option<DepartmentTree> {
        let node = self.get(id)?;
        Some(DepartmentTree {
            id: node.id,
            name: node.name.clone(),
            level: node.level,
            parent_id: node.parent_id,
            full_path: node.full_path.clone(),
            children: node
                .children
                .iter()
                .filter_map(|c| self.subtree(*c))
                .collect(),
        })
    }
}

/// Expanded/collapsed state of tree rows. UI-only, kept separate from the
/// forest so a reload does not lose it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<i64>,
}

impl ExpansionState {
    /// Everything collapsed
    pub fn new() -> Self {
        Self::default()
    }

    /// Every department with children expanded
    pub fn fully_expanded(forest: &DepartmentForest) -> Self {
        let mut state = Self::new();
        state.expand_all(forest);
        state
    }

    pub fn is_expanded(&self, id: i64) -> bool {
        self.expanded.contains(&id)
    }

    pub fn expand(&mut self, id: i64) {
        self.expanded.insert(id);
    }

    pub fn collapse(&mut self, id: i64) {
        self.expanded.remove(&id);
    }

    pub fn toggle(&mut self, id: i64) {
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
    }

    pub fn expand_all(&mut self, forest: &DepartmentForest) {
        self.expanded
            .extend(forest.iter().filter(|n| !n.children.is_empty()).map(|n| n.id));
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Drop ids that no longer exist after a forest reload
    pub fn retain_existing(&mut self, forest: &DepartmentForest) {
        self.expanded.retain(|id| forest.contains(*id));
    }

    /// Rows to render: roots, plus children of expanded rows whose ancestors
    /// are all expanded too
    pub fn visible_rows<'f>(&self, forest: &'f DepartmentForest) -> Vec<&'f DepartmentNode> {
        forest
            .iter()
            .filter(|n| {
                n.id_path[..n.id_path.len() - 1]
                    .iter()
                    .all(|ancestor| self.is_expanded(*ancestor))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: i64, name: &str, parent: Option<i64>) -> DepartmentRecord {
        DepartmentRecord::new(id, name, parent)
    }

    fn sample() -> DepartmentForest {
        DepartmentForest::build(vec![
            rec(1, "Cục", None),
            rec(2, "Phòng Kế hoạch", Some(1)),
            rec(3, "Ban Tác chiến", Some(2)),
            rec(4, "Phòng Hậu cần", Some(1)),
            rec(5, "Văn phòng", None),
        ])
    }

    #[test]
    fn test_levels_and_paths() {
        let forest = sample();
        assert_eq!(forest.len(), 5);

        let c = forest.get(3).unwrap();
        assert_eq!(c.level, 2);
        assert_eq!(c.full_path, vec!["Cục", "Phòng Kế hoạch", "Ban Tác chiến"]);
        assert_eq!(c.id_path, vec![1, 2, 3]);
        assert_eq!(c.path_label(), "Cục/Phòng Kế hoạch/Ban Tác chiến");

        let root = forest.get(5).unwrap();
        assert_eq!(root.level, 0);
        assert_eq!(root.full_path, vec!["Văn phòng"]);
    }

    #[test]
    fn test_full_path_extends_parent() {
        let forest = sample();
        for node in forest.iter() {
            match node.parent_id {
                Some(p) => {
                    let parent = forest.get(p).unwrap();
                    let mut expected = parent.full_path.clone();
                    expected.push(node.name.clone());
                    assert_eq!(node.full_path, expected);
                    assert_eq!(node.level, parent.level + 1);
                }
                None => assert_eq!(node.full_path, vec![node.name.clone()]),
            }
        }
    }

    #[test]
    fn test_pre_order_and_children() {
        let forest = sample();
        let ids: Vec<i64> = forest.ids().collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        let kids: Vec<i64> = forest.children(1).map(|n| n.id).collect();
        assert_eq!(kids, vec![2, 4]);
        let roots: Vec<i64> = forest.roots().map(|n| n.id).collect();
        assert_eq!(roots, vec![1, 5]);
    }

    #[test]
    fn test_descendants() {
        let forest = sample();
        assert_eq!(forest.descendant_ids(1), vec![2, 3, 4]);
        assert_eq!(forest.descendant_ids(2), vec![3]);
        assert!(forest.descendant_ids(3).is_empty());
        assert!(forest.descendant_ids(99).is_empty());
    }

    #[test]
    fn test_children_listed_before_parent() {
        let forest = DepartmentForest::build(vec![
            rec(3, "Ban", Some(2)),
            rec(2, "Phòng", Some(1)),
            rec(1, "Cục", None),
        ]);
        assert_eq!(forest.get(3).unwrap().full_path, vec!["Cục", "Phòng", "Ban"]);
        assert_eq!(forest.descendant_ids(1), vec![2, 3]);
    }

    #[test]
    fn test_dangling_parent_becomes_root() {
        let forest = DepartmentForest::build(vec![rec(1, "Cục", None), rec(7, "Trạm", Some(42))]);
        let node = forest.get(7).unwrap();
        assert_eq!(node.parent_id, None);
        assert_eq!(node.level, 0);
        assert_eq!(forest.roots().count(), 2);
    }

    #[test]
    fn test_duplicate_id_last_write_wins() {
        let forest = DepartmentForest::build(vec![
            rec(1, "Cục", None),
            rec(2, "Tên cũ", Some(1)),
            rec(2, "Tên mới", Some(1)),
        ]);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest.get(2).unwrap().name, "Tên mới");
    }

    #[test]
    fn test_cycle_is_detached() {
        let forest = DepartmentForest::build(vec![
            rec(1, "A", Some(2)),
            rec(2, "B", Some(1)),
            rec(3, "C", Some(3)),
        ]);
        assert_eq!(forest.len(), 3);
        assert_eq!(forest.get(1).unwrap().level, 0);
        assert_eq!(forest.get(2).unwrap().full_path, vec!["A", "B"]);
        assert_eq!(forest.get(3).unwrap().parent_id, None);
    }

    #[test]
    fn test_find_by_name() {
        let forest = sample();
        assert_eq!(forest.find_by_name("Phòng Hậu cần").map(|n| n.id), Some(4));
        assert!(forest.find_by_name("phòng hậu cần").is_none());
    }

    #[test]
    fn test_to_tree() {
        let tree = sample().to_tree();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[0].children[0].id, 3);
    }

    #[test]
    fn test_expansion_visible_rows() {
        let forest = sample();
        let mut state = ExpansionState::new();
        let rows: Vec<i64> = state.visible_rows(&forest).iter().map(|n| n.id).collect();
        assert_eq!(rows, vec![1, 5]);

        state.toggle(1);
        let rows: Vec<i64> = state.visible_rows(&forest).iter().map(|n| n.id).collect();
        assert_eq!(rows, vec![1, 2, 4, 5]);

        let full = ExpansionState::fully_expanded(&forest);
        assert_eq!(full.visible_rows(&forest).len(), 5);
        assert!(!full.is_expanded(3));

        state.toggle(1);
        assert!(!state.is_expanded(1));
    }

    #[test]
    fn test_expansion_retain_existing() {
        let mut state = ExpansionState::new();
        state.expand(1);
        state.expand(99);
        state.retain_existing(&sample());
        assert!(state.is_expanded(1));
        assert!(!state.is_expanded(99));
    }
}
