//! `NodeId` handles, the closed geometric value variant, and the `Element`
//! metadata envelope.
//!
//! The model owns every entity in one arena; everything else — line
//! endpoints, circle centers, parent links, section/wedge/polygon/chain
//! constituents, radius points — is a [`NodeId`] handle into that arena,
//! never a duplicated value. A handle stays valid for the lifetime of its
//! element: deletion tombstones the slot instead of shifting its neighbors.

use crate::algebra::Expr;
use crate::model::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag over the closed set of geometric kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeoKind {
    Point,
    Line,
    Circle,
    Segment,
    Polygon,
    Section,
    Wedge,
    Chain,
    Polynomial,
}

impl GeoKind {
    /// Kind name for diagnostics and contract errors.
    pub const fn name(self) -> &'static str {
        match self {
            GeoKind::Point => "Point",
            GeoKind::Line => "Line",
            GeoKind::Circle => "Circle",
            GeoKind::Segment => "Segment",
            GeoKind::Polygon => "Polygon",
            GeoKind::Section => "Section",
            GeoKind::Wedge => "Wedge",
            GeoKind::Chain => "Chain",
            GeoKind::Polynomial => "Polynomial",
        }
    }

    /// Lines and circles are the kinds eligible for intersection search.
    pub const fn is_struct(self) -> bool {
        matches!(self, GeoKind::Line | GeoKind::Circle)
    }
}

impl fmt::Display for GeoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A geometric value: primitive or composite. Identity is by value; the
/// model keeps exactly one node per distinct value.
#[derive(Clone, Debug, PartialEq)]
pub enum GeoValue {
    /// Exact coordinates.
    Point { x: Expr, y: Expr },
    /// Infinite line through two distinct points.
    Line { a: NodeId, b: NodeId },
    /// Circle centered at `center` through the radius point recorded in the
    /// envelope; the value itself keeps only the squared radius.
    Circle { center: NodeId, r_sq: Expr },
    /// Finite segment between two points.
    Segment { a: NodeId, b: NodeId },
    /// Closed polygon over three or more vertices.
    Polygon { vertices: Vec<NodeId> },
    /// Three collinear points splitting a segment in two.
    Section { points: [NodeId; 3] },
    /// Circular sector: center, radius point, sweep start, sweep end.
    Wedge { points: [NodeId; 4] },
    /// Ordered run of connected sections.
    Chain { sections: Vec<NodeId> },
    /// Polynomial in x, coefficients highest degree first.
    Polynomial { coeffs: Vec<Expr> },
}

impl GeoValue {
    pub fn kind(&self) -> GeoKind {
        match self {
            GeoValue::Point { .. } => GeoKind::Point,
            GeoValue::Line { .. } => GeoKind::Line,
            GeoValue::Circle { .. } => GeoKind::Circle,
            GeoValue::Segment { .. } => GeoKind::Segment,
            GeoValue::Polygon { .. } => GeoKind::Polygon,
            GeoValue::Section { .. } => GeoKind::Section,
            GeoValue::Wedge { .. } => GeoKind::Wedge,
            GeoValue::Chain { .. } => GeoKind::Chain,
            GeoValue::Polynomial { .. } => GeoKind::Polynomial,
        }
    }
}

/// Optional attributes for a construction call.
#[derive(Clone, Debug, Default)]
pub struct Props {
    /// Explicit ID; derived from the constituents when absent.
    pub id: Option<String>,
    /// Style classes, unioned into the canonical node on duplicates.
    pub classes: Vec<String>,
    /// Guides are excluded from intersection search and the `structs` view.
    pub guide: bool,
}

impl Props {
    pub fn new() -> Self {
        Props::default()
    }

    /// Adds one style class.
    pub fn class(mut self, name: &str) -> Self {
        self.classes.push(name.to_owned());
        self
    }

    /// Marks the elements of seed constructions; ancestor walks stop here.
    pub fn given(self) -> Self {
        self.class("given")
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_owned());
        self
    }

    pub fn guide(mut self) -> Self {
        self.guide = true;
        self
    }
}

/// Metadata envelope attached to every node of the model.
///
/// `classes` and `parents` are insertion-ordered sets: merge operations
/// union new contributions in without disturbing the order already
/// recorded, which keeps ancestor walks and reports deterministic.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// Stable label used in reports, persistence, and lookups.
    pub id: String,
    classes: Vec<String>,
    parents: Vec<NodeId>,
    /// Guides never take part in intersection discovery.
    pub guide: bool,
    /// For circles and wedges: the point that defined the radius. The
    /// circle value stores only the squared radius, which would otherwise
    /// lose the defining point.
    pub pt_radius: Option<NodeId>,
}

impl Element {
    pub fn new(id: String, classes: Vec<String>, parents: Vec<NodeId>, guide: bool) -> Self {
        let mut el = Element {
            id,
            classes: Vec::new(),
            parents: Vec::new(),
            guide,
            pt_radius: None,
        };
        for c in classes {
            el.add_class(&c);
        }
        for p in parents {
            el.add_parent(p);
        }
        el
    }

    pub fn with_pt_radius(mut self, pt: NodeId) -> Self {
        self.pt_radius = Some(pt);
        self
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c == name)
    }

    /// Unions one class in, keeping first-seen order.
    pub fn add_class(&mut self, name: &str) {
        if !self.has_class(name) {
            self.classes.push(name.to_owned());
        }
    }

    /// Unions one parent link in, keeping first-seen order.
    pub fn add_parent(&mut self, parent: NodeId) {
        if !self.parents.contains(&parent) {
            self.parents.push(parent);
        }
    }

    pub(crate) fn remove_parent(&mut self, parent: NodeId) {
        self.parents.retain(|p| *p != parent);
    }
}

/// One arena slot: the geometric value plus its envelope.
#[derive(Clone, Debug)]
pub struct Entry {
    pub value: GeoValue,
    pub element: Element,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_union_keeps_order() {
        let mut el = Element::new("A".into(), vec!["given".into()], vec![], false);
        el.add_class("red");
        el.add_class("given");
        assert_eq!(el.classes(), ["given", "red"]);
    }

    #[test]
    fn parents_union_keeps_order() {
        let mut el = Element::new("x".into(), vec![], vec![NodeId::new(2)], false);
        el.add_parent(NodeId::new(1));
        el.add_parent(NodeId::new(2));
        assert_eq!(el.parents(), [NodeId::new(2), NodeId::new(1)]);
    }

    #[test]
    fn struct_kinds() {
        assert!(GeoKind::Line.is_struct());
        assert!(GeoKind::Circle.is_struct());
        assert!(!GeoKind::Point.is_struct());
        assert!(!GeoKind::Segment.is_struct());
    }
}
