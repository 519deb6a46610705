//! Construction-history traversal.
//!
//! An element's history is the tree of the elements it was built from.
//! Only the first two parents of each element are followed: those are the
//! defining constituents of a binary construction, while later parents are
//! back-links added by intersection discovery and merges. Walks stop at
//! elements classed `given` and at nodes already visited, so shared
//! history appears once.

use crate::model::{GeoKind, Model, NodeId};
use crate::model_error::ModelError;
use std::collections::HashSet;
use std::fmt::Write;

/// One node of a construction-history tree.
#[derive(Clone, Debug, PartialEq)]
pub struct AncestorTree {
    pub node: NodeId,
    pub id: String,
    pub kind: GeoKind,
    /// Expanded defining parents; empty at `given` elements, at leaves,
    /// and where a shared ancestor was already expanded elsewhere.
    pub parents: Vec<AncestorTree>,
}

impl AncestorTree {
    /// Every distinct element ID in the tree, preorder.
    pub fn ids(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.collect_ids(&mut out, &mut seen);
        out
    }

    fn collect_ids(&self, out: &mut Vec<String>, seen: &mut HashSet<NodeId>) {
        if seen.insert(self.node) {
            out.push(self.id.clone());
        }
        for p in &self.parents {
            p.collect_ids(out, seen);
        }
    }

    /// Graphviz DOT rendering of the history, one edge per defining-parent
    /// link, shapes by kind.
    pub fn to_dot(&self) -> String {
        let mut nodes = String::new();
        let mut edges = String::new();
        let mut seen = HashSet::new();
        self.write_dot(&mut nodes, &mut edges, &mut seen);
        format!("digraph ancestors {{\n{nodes}{edges}}}\n")
    }

    fn write_dot(&self, nodes: &mut String, edges: &mut String, seen: &mut HashSet<NodeId>) {
        if seen.insert(self.node) {
            let shape = match self.kind {
                GeoKind::Point => "point",
                GeoKind::Line | GeoKind::Segment => "rectangle",
                GeoKind::Circle | GeoKind::Wedge => "ellipse",
                _ => "box",
            };
            let _ = writeln!(
                nodes,
                "    \"{}\" [shape={shape}, label=\"{}\"];",
                dot_escape(&self.id),
                dot_escape(&self.id)
            );
        }
        for p in &self.parents {
            let _ = writeln!(
                edges,
                "    \"{}\" -> \"{}\";",
                dot_escape(&self.id),
                dot_escape(&p.id)
            );
            p.write_dot(nodes, edges, seen);
        }
    }
}

fn dot_escape(id: &str) -> String {
    id.replace('\\', "\\\\").replace('"', "\\\"")
}

impl Model {
    /// History tree of `node`. Shared ancestors are expanded once; repeat
    /// visits become leaves.
    pub fn ancestors(&self, node: NodeId) -> Result<AncestorTree, ModelError> {
        self.try_entry(node)?;
        let mut visited = HashSet::new();
        visited.insert(node);
        Ok(self.ancestors_walk(node, &mut visited))
    }

    /// Distinct labels in the history of `node`, preorder.
    pub fn ancestor_ids(&self, node: NodeId) -> Result<Vec<String>, ModelError> {
        Ok(self.ancestors(node)?.ids())
    }

    fn ancestors_walk(&self, node: NodeId, visited: &mut HashSet<NodeId>) -> AncestorTree {
        // parent handles always resolve: deletion scrubs dangling links
        let entry = self.entry(node).expect("live ancestor");
        let mut tree = AncestorTree {
            node,
            id: entry.element.id.clone(),
            kind: entry.value.kind(),
            parents: Vec::new(),
        };
        if entry.element.has_class("given") {
            return tree;
        }
        for &p in entry.element.parents().iter().take(2) {
            if visited.insert(p) {
                tree.parents.push(self.ancestors_walk(p, visited));
            } else {
                let seen = self.entry(p).expect("live ancestor");
                tree.parents.push(AncestorTree {
                    node: p,
                    id: seen.element.id.clone(),
                    kind: seen.value.kind(),
                    parents: Vec::new(),
                });
            }
        }
        tree
    }
}
