//! Dependent search and cascading removal.
//!
//! Deleting an element also removes everything constructed from it, with
//! one guard: only elements inserted at or after the target's slot are
//! eligible, so earlier elements that merely acquired a back-link to the
//! target during intersection discovery survive. Surviving elements are
//! scrubbed of links to the removed set, keeping every stored handle live.

use crate::model::{Model, NodeId};
use log::{info, warn};
use std::collections::BTreeSet;

/// An element addressed by handle or by ID.
#[derive(Copy, Clone, Debug)]
pub enum ElementRef<'a> {
    Node(NodeId),
    Id(&'a str),
}

impl From<NodeId> for ElementRef<'_> {
    fn from(node: NodeId) -> Self {
        ElementRef::Node(node)
    }
}

impl<'a> From<&'a str> for ElementRef<'a> {
    fn from(id: &'a str) -> Self {
        ElementRef::Id(id)
    }
}

impl Model {
    fn resolve_ref(&self, r: ElementRef<'_>) -> Option<NodeId> {
        match r {
            ElementRef::Node(node) => {
                if self.entry(node).is_some() {
                    Some(node)
                } else {
                    warn!("no element at slot {node}");
                    None
                }
            }
            ElementRef::Id(id) => {
                let found = self.node_by_id(id);
                if found.is_none() {
                    warn!("no element with id `{id}`");
                }
                found
            }
        }
    }

    /// Transitive closure of elements listing the target among their
    /// parents. Missing targets yield an empty set and a logged warning.
    pub fn dependents<'a>(&self, target: impl Into<ElementRef<'a>>) -> BTreeSet<NodeId> {
        let mut acc = BTreeSet::new();
        if let Some(node) = self.resolve_ref(target.into()) {
            self.collect_dependents(node, &mut acc);
        }
        acc
    }

    fn collect_dependents(&self, parent: NodeId, acc: &mut BTreeSet<NodeId>) {
        let direct: Vec<NodeId> = self
            .iter()
            .filter(|(_, e)| e.element.parents().contains(&parent))
            .map(|(n, _)| n)
            .collect();
        for n in direct {
            if acc.insert(n) {
                self.collect_dependents(n, acc);
            }
        }
    }

    /// Removes an element and, cascading, every dependent inserted at or
    /// after it. Returns the removed handles in insertion order; empty when
    /// the target does not resolve.
    pub fn delete_element<'a>(&mut self, target: impl Into<ElementRef<'a>>) -> Vec<NodeId> {
        let Some(node) = self.resolve_ref(target.into()) else {
            return Vec::new();
        };
        let mut doomed = self.dependents(node);
        doomed.insert(node);
        // back-linked elders stay
        doomed.retain(|n| n.index() >= node.index());
        for &n in &doomed {
            self.slots[n.index()] = None;
            self.live -= 1;
        }
        for slot in &mut self.slots {
            if let Some(entry) = slot {
                for &gone in &doomed {
                    entry.element.remove_parent(gone);
                }
                if let Some(r) = entry.element.pt_radius
                    && doomed.contains(&r)
                {
                    entry.element.pt_radius = None;
                }
            }
        }
        info!("deleted {} element(s)", doomed.len());
        doomed.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::algebra::Expr;
    use crate::model::{Model, Props};

    fn num(n: i64) -> Expr {
        Expr::from_int(n)
    }

    #[test]
    fn dependents_are_transitive() {
        let mut m = Model::new("t");
        let a = m.set_point(num(0), num(0), Props::new().given());
        let b = m.set_point(num(1), num(0), Props::new().given());
        let circle = m.construct_circle(a, b, Props::new()).unwrap();
        let line = m.construct_line(a, b, Props::new()).unwrap();
        let opposite = m.new_points()[0];
        let deps = m.dependents(a);
        assert!(deps.contains(&circle));
        assert!(deps.contains(&line));
        assert!(deps.contains(&opposite));
    }

    #[test]
    fn delete_cascades_forward_only() {
        let mut m = Model::new("t");
        let a = m.set_point(num(0), num(0), Props::new().given());
        let b = m.set_point(num(1), num(0), Props::new().given());
        let circle = m.construct_circle(a, b, Props::new()).unwrap();
        let line = m.construct_line(a, b, Props::new()).unwrap();
        let opposite = m.new_points()[0];
        // the circle is a dependent of the line only through back-links;
        // it was inserted earlier, so deleting the line spares it
        let removed = m.delete_element(line);
        assert_eq!(removed, vec![line, opposite]);
        assert!(m.entry(circle).is_some());
        assert!(m.entry(line).is_none());
        assert!(m.entry(opposite).is_none());
        // surviving elements no longer reference the removed set
        assert!(!m.element(circle).unwrap().parents().contains(&line));
        assert!(!m.element(b).unwrap().parents().contains(&line));
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn deleting_a_given_point_empties_its_cone() {
        let mut m = Model::new("t");
        let a = m.set_point(num(0), num(0), Props::new().given());
        let b = m.set_point(num(1), num(0), Props::new().given());
        m.construct_circle(a, b, Props::new()).unwrap();
        m.construct_circle(b, a, Props::new()).unwrap();
        assert_eq!(m.len(), 6);
        let removed = m.delete_element(a);
        // everything except b descends from a
        assert_eq!(removed.len(), 5);
        assert_eq!(m.len(), 1);
        assert!(m.element(b).unwrap().parents().is_empty());
    }

    #[test]
    fn missing_target_is_a_warning_not_an_error() {
        let mut m = Model::new("t");
        m.set_point(num(0), num(0), Props::new());
        assert!(m.dependents("Z").is_empty());
        assert!(m.delete_element("Z").is_empty());
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn handles_stay_stable_across_deletion() {
        let mut m = Model::new("t");
        let a = m.set_point(num(0), num(0), Props::new().given());
        let b = m.set_point(num(1), num(0), Props::new().given());
        let c = m.set_point(num(2), num(0), Props::new().given());
        m.delete_element(b);
        assert_eq!(m.point_coords(a).unwrap(), (num(0), num(0)));
        assert_eq!(m.point_coords(c).unwrap(), (num(2), num(0)));
        // a new element lands in a fresh slot, not the tombstone
        let d = m.set_point(num(3), num(0), Props::new());
        assert!(d.index() > c.index());
    }
}
