//! Parent/child index over stored blocks.

#![allow(dead_code)] // Traversal API for topic assembly; only exercised by tests so far

use std::collections::{HashMap, HashSet};

use crate::db::entities::block;

/// Adjacency index built from flat block rows.
///
/// Blocks only carry a parent id; this index adds the reverse direction.
/// A block whose parent is not among the rows (or is itself) counts as a
/// root. Roots are ordered by serial number, children by id.
#[derive(Debug, Default)]
pub struct BlockForest {
    roots: Vec<i32>,
    children: HashMap<i32, Vec<i32>>,
    parents: HashMap<i32, i32>,
}

impl BlockForest {
    pub fn build(blocks: &[block::Model]) -> Self {
        let known: HashSet<i32> = blocks.iter().map(|b| b.id).collect();

        let mut sorted: Vec<&block::Model> = blocks.iter().collect();
        sorted.sort_by_key(|b| b.id);

        let mut roots: Vec<&block::Model> = Vec::new();
        let mut forest = Self::default();

        for b in sorted {
            match b.parent_id {
                Some(parent) if parent != b.id && known.contains(&parent) => {
                    forest.children.entry(parent).or_default().push(b.id);
                    forest.parents.insert(b.id, parent);
                }
                _ => roots.push(b),
            }
        }

        roots.sort_by_key(|b| (b.serial_num, b.id));
        forest.roots = roots.into_iter().map(|b| b.id).collect();
        forest
    }

    pub fn roots(&self) -> &[i32] {
        &self.roots
    }

    pub fn children(&self, id: i32) -> &[i32] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent(&self, id: i32) -> Option<i32> {
        self.parents.get(&id).copied()
    }

    /// Pre-order walk below `id`, excluding `id` itself.
    ///
    /// Parent links are not checked for cycles on write, so each block is
    /// yielded at most once.
    pub fn descendants(&self, id: i32) -> Vec<i32> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut stack: Vec<i32> = self.children(id).iter().rev().copied().collect();

        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i32, parent_id: Option<i32>, serial_num: i32) -> block::Model {
        block::Model {
            id,
            repo_id: None,
            file: format!("file{}.rs", id),
            line_nums: "1-1".to_string(),
            code: String::new(),
            text: String::new(),
            focus: None,
            parent_id,
            serial_num,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_roots_and_children() {
        let forest = BlockForest::build(&[
            row(3, Some(1), 0),
            row(1, None, 0),
            row(2, None, 2),
            row(4, Some(1), 0),
            row(5, Some(3), 0),
        ]);

        assert_eq!(forest.roots(), &[1, 2]);
        assert_eq!(forest.children(1), &[3, 4]);
        assert!(forest.children(2).is_empty());
        assert_eq!(forest.parent(5), Some(3));
        assert_eq!(forest.parent(1), None);
        assert_eq!(forest.descendants(1), vec![3, 5, 4]);
    }

    #[test]
    fn test_roots_follow_serial_order() {
        let forest = BlockForest::build(&[row(1, None, 9), row(2, None, 3), row(3, None, 0)]);
        assert_eq!(forest.roots(), &[3, 2, 1]);
    }

    #[test]
    fn test_unknown_parent_is_root() {
        let forest = BlockForest::build(&[row(1, Some(42), 0), row(2, Some(2), 0)]);
        assert_eq!(forest.roots(), &[1, 2]);
        assert_eq!(forest.parent(1), None);
    }

    #[test]
    fn test_cycle_terminates() {
        let forest = BlockForest::build(&[row(1, Some(2), 0), row(2, Some(1), 0), row(3, Some(1), 0)]);
        assert!(forest.roots().is_empty());
        assert_eq!(forest.descendants(1), vec![2, 3]);
    }
}
