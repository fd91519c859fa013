//! In-memory view of the category hierarchy.

use crate::entities::commerce::CategoryModel;
use std::collections::{HashMap, HashSet};

/// Categories indexed by id with children ordered by title.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    nodes: HashMap<i32, CategoryModel>,
    children: HashMap<i32, Vec<i32>>,
    roots: Vec<i32>,
}

impl CategoryTree {
    /// Builds the tree. A category whose parent is missing is treated as a root.
    pub fn new(categories: Vec<CategoryModel>) -> Self {
        let nodes: HashMap<i32, CategoryModel> =
            categories.into_iter().map(|c| (c.id, c)).collect();

        let mut children: HashMap<i32, Vec<i32>> = HashMap::new();
        let mut roots = Vec::new();
        for node in nodes.values() {
            match node.parent_id.filter(|p| nodes.contains_key(p) && *p != node.id) {
                Some(parent) => children.entry(parent).or_default().push(node.id),
                None => roots.push(node.id),
            }
        }

        let by_title = |ids: &mut Vec<i32>| {
            ids.sort_by(|a, b| {
                let (ca, cb) = (&nodes[a], &nodes[b]);
                ca.title.cmp(&cb.title).then(ca.id.cmp(&cb.id))
            })
        };
        by_title(&mut roots);
        for ids in children.values_mut() {
            by_title(ids);
        }

        Self {
            nodes,
            children,
            roots,
        }
    }

    pub fn get(&self, id: i32) -> Option<&CategoryModel> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: i32) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn roots(&self) -> &[i32] {
        &self.roots
    }

    pub fn children(&self, id: i32) -> &[i32] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `id` followed by every transitive child, depth first. Unknown ids
    /// yield an empty list.
    pub fn descendants(&self, id: i32) -> Vec<i32> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            out.push(current);
            // reversed so the walk visits siblings in title order
            stack.extend(self.children(current).iter().rev());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cat(id: i32, title: &str, parent: Option<i32>) -> CategoryModel {
        CategoryModel {
            id,
            title: title.to_string(),
            slug: title.to_lowercase(),
            parent_id: parent,
        }
    }

    fn sample() -> CategoryTree {
        CategoryTree::new(vec![
            cat(1, "Electronics", None),
            cat(2, "Laptops", Some(1)),
            cat(3, "Gaming laptops", Some(2)),
            cat(4, "Accessories", Some(1)),
            cat(5, "Books", None),
        ])
    }

    #[test]
    fn descendants_include_self_and_nested_children() {
        let tree = sample();
        assert_eq!(tree.descendants(1), vec![1, 4, 2, 3]);
        assert_eq!(tree.descendants(2), vec![2, 3]);
        assert_eq!(tree.descendants(5), vec![5]);
        assert!(tree.descendants(99).is_empty());
    }

    #[test]
    fn siblings_are_ordered_by_title() {
        let tree = sample();
        assert_eq!(tree.roots(), &[5, 1]);
        assert_eq!(tree.children(1), &[4, 2]);
    }

    #[test]
    fn cycles_do_not_hang() {
        let tree = CategoryTree::new(vec![cat(1, "A", Some(2)), cat(2, "B", Some(1))]);
        // neither has a root path, so both stay unreachable from roots
        assert!(tree.roots().is_empty());
        assert_eq!(tree.descendants(1), vec![1, 2]);
    }

    #[test]
    fn missing_parent_makes_a_root() {
        let tree = CategoryTree::new(vec![cat(7, "Orphan", Some(42))]);
        assert_eq!(tree.roots(), &[7]);
    }

    proptest! {
        #[test]
        fn every_descendant_has_the_start_as_ancestor(parents in prop::collection::vec(any::<prop::sample::Index>(), 1..40)) {
            // node i's parent is drawn from nodes 0..i, node 0 is a root
            let cats: Vec<CategoryModel> = parents
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let parent = if i == 0 { None } else { Some(p.index(i) as i32) };
                    cat(i as i32, &format!("c{i}"), parent)
                })
                .collect();
            let tree = CategoryTree::new(cats.clone());

            prop_assert_eq!(tree.descendants(0).len(), cats.len());
            for start in 0..cats.len() as i32 {
                for d in tree.descendants(start) {
                    let mut cursor = Some(d);
                    let mut found = false;
                    while let Some(c) = cursor {
                        if c == start { found = true; break; }
                        cursor = tree.get(c).and_then(|m| m.parent_id);
                    }
                    prop_assert!(found);
                }
            }
        }
    }
}
