// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Grouped result storage.
//!
//! A [`ResultContainer`] keeps the flat list of results for one query and a
//! tree built from them according to a [`Grouping`]. Tree nodes live in an
//! append-only arena so a [`NodeId`] stays valid while further results stream
//! in; only [`ResultContainer::clear`] and regrouping invalidate ids.

use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
};

use crate::model::{Artwork, GroupBy, Grouping, ResultId, SearchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Section heading above top-level containers.
    Divider,
    Container(GroupBy),
    /// Index into the container's results.
    Track(usize),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub text: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub depth: usize,
    pub art: Option<Artwork>,
    pub loading_art: bool,
    section: String,
    sort_key: String,
}

impl Node {
    pub fn is_divider(&self) -> bool {
        matches!(self.kind, NodeKind::Divider)
    }

    fn order(&self, other: &Node) -> Ordering {
        let rank = |n: &Node| if n.is_divider() { 0 } else { 1 };
        self.section
            .cmp(&other.section)
            .then_with(|| rank(self).cmp(&rank(other)))
            .then_with(|| self.sort_key.cmp(&other.sort_key))
    }
}

/// A node as it appears in the flattened, display-ordered tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub node: NodeId,
    pub depth: usize,
}

#[derive(Debug)]
pub struct ResultContainer {
    grouping: Grouping,
    results: Vec<SearchResult>,
    seen: HashSet<ResultId>,
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    containers: HashMap<(Option<NodeId>, String), NodeId>,
    dividers: HashMap<String, NodeId>,
}

impl ResultContainer {
    pub fn new(grouping: Grouping) -> Self {
        Self {
            grouping,
            results: Vec::new(),
            seen: HashSet::new(),
            nodes: Vec::new(),
            roots: Vec::new(),
            containers: HashMap::new(),
            dividers: HashMap::new(),
        }
    }

    pub fn grouping(&self) -> Grouping {
        self.grouping
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Removes all results and nodes.
    pub fn clear(&mut self) {
        self.results.clear();
        self.seen.clear();
        self.clear_tree();
    }

    /// Adds results, ignoring ids already present.
    pub fn add_results(&mut self, results: impl IntoIterator<Item = SearchResult>) {
        for result in results {
            if !self.seen.insert(result.id) {
                continue;
            }
            self.results.push(result);
            self.insert_into_tree(self.results.len() - 1);
        }
    }

    /// Rebuilds the tree with a new grouping, keeping every result.
    pub fn set_grouping(&mut self, grouping: Grouping) {
        self.grouping = grouping;
        self.clear_tree();
        for index in 0..self.results.len() {
            self.insert_into_tree(index);
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// The result a track node refers to.
    pub fn result(&self, id: NodeId) -> Option<&SearchResult> {
        match self.node(id)?.kind {
            NodeKind::Track(index) => self.results.get(index),
            _ => None,
        }
    }

    /// All nodes in display order, depth first.
    pub fn rows(&self) -> Vec<Row> {
        let mut rows = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            rows.push(Row {
                node: id,
                depth: node.depth,
            });
            stack.extend(node.children.iter().rev().copied());
        }
        rows
    }

    /// First track beneath `id`, following first children.
    pub fn first_leaf(&self, id: NodeId) -> Option<&SearchResult> {
        let mut current = self.node(id)?;
        let mut current_id = id;
        while let Some(&child) = current.children.first() {
            current_id = child;
            current = &self.nodes[child.0];
        }
        self.result(current_id)
    }

    /// Every track beneath the given nodes in display order, without
    /// duplicates.
    pub fn child_results(&self, ids: &[NodeId]) -> Vec<SearchResult> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for &id in ids {
            let mut stack = vec![id];
            while let Some(current) = stack.pop() {
                let Some(node) = self.node(current) else {
                    continue;
                };
                if let NodeKind::Track(index) = node.kind {
                    let result = &self.results[index];
                    if seen.insert(result.id) {
                        out.push(result.clone());
                    }
                }
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn clear_tree(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.containers.clear();
        self.dividers.clear();
    }

    fn insert_into_tree(&mut self, index: usize) {
        let levels: Vec<GroupBy> = self.grouping.levels().collect();
        let mut parent: Option<NodeId> = None;

        for (depth, group_by) in levels.into_iter().enumerate() {
            let result = &self.results[index];
            let Some(text) = group_by.container_text(result) else {
                continue;
            };
            let key = (parent, text.to_lowercase());
            if let Some(&existing) = self.containers.get(&key) {
                parent = Some(existing);
                continue;
            }

            let sort_key = group_by.sort_key(result, &text);
            let divider = match parent {
                None => group_by.divider(result, &text),
                Some(_) => None,
            };
            let section = divider.clone().unwrap_or_default();
            if let Some(divider) = divider {
                self.ensure_divider(divider);
            }

            let id = self.push_node(Node {
                kind: NodeKind::Container(group_by),
                text,
                parent,
                children: Vec::new(),
                depth,
                art: None,
                loading_art: false,
                section,
                sort_key,
            });
            self.containers.insert(key, id);
            parent = Some(id);
        }

        let result = &self.results[index];
        let depth = parent.map_or(0, |p| self.nodes[p.0].depth + 1);
        let sort_key = format!(
            "{:04}{}",
            result.track_number.unwrap_or(0),
            result.title.to_lowercase()
        );
        let text = result.title.clone();
        self.push_node(Node {
            kind: NodeKind::Track(index),
            text,
            parent,
            children: Vec::new(),
            depth,
            art: None,
            loading_art: false,
            section: String::new(),
            sort_key,
        });
    }

    fn ensure_divider(&mut self, text: String) {
        if self.dividers.contains_key(&text) {
            return;
        }
        let id = self.push_node(Node {
            kind: NodeKind::Divider,
            text: text.clone(),
            parent: None,
            children: Vec::new(),
            depth: 0,
            art: None,
            loading_art: false,
            section: text.clone(),
            sort_key: String::new(),
        });
        self.dividers.insert(text, id);
    }

    /// Appends a node to the arena and links it into its parent in order.
    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = node.parent;
        self.nodes.push(node);

        let nodes = &self.nodes;
        let siblings = match parent {
            Some(p) => &self.nodes[p.0].children,
            None => &self.roots,
        };
        let pos = siblings.partition_point(|s| nodes[s.0].order(&nodes[id.0]) != Ordering::Greater);

        match parent {
            Some(p) => self.nodes[p.0].children.insert(pos, id),
            None => self.roots.insert(pos, id),
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_result;

    fn texts(container: &ResultContainer) -> Vec<String> {
        container
            .rows()
            .iter()
            .map(|row| {
                let node = container.node(row.node).unwrap();
                format!("{}{}", "  ".repeat(row.depth), node.text)
            })
            .collect()
    }

    #[test]
    fn groups_by_artist_and_album_with_dividers() {
        let mut container = ResultContainer::new(Grouping::default());
        container.add_results(vec![
            test_result(1, "Coltrane", "Blue Train", "Moment's Notice"),
            test_result(2, "Brubeck", "Time Out", "Take Five"),
            test_result(3, "Coltrane", "Blue Train", "Blue Train"),
            test_result(4, "Coltrane", "Giant Steps", "Naima"),
        ]);

        assert_eq!(
            texts(&container),
            vec![
                "B",
                "Brubeck",
                "  Time Out",
                "    Take Five",
                "C",
                "Coltrane",
                "  Blue Train",
                "    Blue Train",
                "    Moment's Notice",
                "  Giant Steps",
                "    Naima",
            ]
        );
    }

    #[test]
    fn duplicate_ids_are_ignored() {
        let mut container = ResultContainer::new(Grouping::default());
        container.add_results(vec![test_result(1, "A", "B", "C")]);
        container.add_results(vec![test_result(1, "A", "B", "C")]);
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn track_numbers_order_tracks() {
        let mut first = test_result(1, "A", "Album", "Zebra");
        first.track_number = Some(1);
        let mut second = test_result(2, "A", "Album", "Aardvark");
        second.track_number = Some(2);

        let mut container = ResultContainer::new(Grouping::new(
            GroupBy::Album,
            GroupBy::None,
            GroupBy::None,
        ));
        container.add_results(vec![second, first]);

        assert_eq!(texts(&container), vec!["A", "Album", "  Zebra", "  Aardvark"]);
    }

    #[test]
    fn regrouping_keeps_results() {
        let mut container = ResultContainer::new(Grouping::default());
        container.add_results(vec![
            test_result(1, "A", "X", "one"),
            test_result(2, "B", "Y", "two"),
        ]);

        container.set_grouping(Grouping::new(GroupBy::None, GroupBy::None, GroupBy::None));
        assert_eq!(container.len(), 2);
        assert_eq!(texts(&container), vec!["one", "two"]);
    }

    #[test]
    fn child_results_follow_display_order() {
        let mut container = ResultContainer::new(Grouping::default());
        container.add_results(vec![
            test_result(1, "A", "X", "b"),
            test_result(2, "A", "X", "a"),
            test_result(3, "B", "Y", "c"),
        ]);

        let rows = container.rows();
        let artist_a = rows[1].node;
        let titles: Vec<String> = container
            .child_results(&[artist_a, artist_a])
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["a", "b"]);

        assert_eq!(container.first_leaf(artist_a).map(|r| r.id), Some(ResultId(2)));
    }

    #[test]
    fn clear_empties_tree() {
        let mut container = ResultContainer::new(Grouping::default());
        container.add_results(vec![test_result(1, "A", "X", "one")]);
        container.clear();
        assert!(container.is_empty());
        assert!(container.rows().is_empty());

        container.add_results(vec![test_result(1, "A", "X", "one")]);
        assert_eq!(container.len(), 1);
    }
}
