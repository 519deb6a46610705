//! The construction model: an insertion-ordered arena of geometric
//! elements with value-level deduplication.
//!
//! A [`Model`] grows through construction operations ([`Model::set_point`],
//! [`Model::construct_line`], [`Model::construct_circle`], ...). Each
//! operation first checks whether an equal value is already present; if so
//! it merges the new metadata into the canonical node and returns the
//! existing handle, so one value is one node, always. Adding a structural
//! element (a non-guide line or circle) triggers exhaustive intersection
//! discovery against every structural element already in the model, which
//! registers the intersection points through the same deduplicating path.
//!
//! Elements never move: deletion leaves a tombstone in the slot, so a
//! [`NodeId`] held by a parent list or a composite stays valid and slot
//! index order is insertion order.

pub mod ancestors;
pub mod chains;
pub mod delete;
pub mod element;
pub mod helpers;
pub mod intersect;
pub mod polynomials;
pub mod sections;
pub mod serialize;
pub mod wedges;

pub use ancestors::AncestorTree;
pub use delete::ElementRef;
pub use element::{Element, Entry, GeoKind, GeoValue, Props};
pub use serialize::load_model;

use crate::algebra::Expr;
use crate::geometry::{CircleEq, Coords, LineEq, StructForm, compare_points};
use crate::model_error::ModelError;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to one element of a model.
///
/// Handles are slot indices and compare in insertion order. They are only
/// meaningful for the model that issued them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct NodeId(u32);

static_assertions::assert_eq_size!(NodeId, u32);

impl NodeId {
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A construction in progress.
#[derive(Clone, Debug, Default)]
pub struct Model {
    name: String,
    slots: Vec<Option<Entry>>,
    live: usize,
    /// Next index in the point label sequence A, B, ..., Z, AA, AB, ...
    label_cursor: usize,
    last_point_id: String,
    poly_count: usize,
    /// Points registered by the most recent structural construction.
    new_points: Vec<NodeId>,
}

impl Model {
    pub fn new(name: &str) -> Self {
        Model {
            name: name.to_owned(),
            ..Model::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_owned();
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Entry)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|e| (NodeId(i as u32), e)))
    }

    pub fn entry(&self, node: NodeId) -> Option<&Entry> {
        self.slots.get(node.index()).and_then(|s| s.as_ref())
    }

    pub(crate) fn try_entry(&self, node: NodeId) -> Result<&Entry, ModelError> {
        self.entry(node).ok_or(ModelError::NotAMember(node))
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.entry(node).map(|e| &e.element)
    }

    pub fn value(&self, node: NodeId) -> Option<&GeoValue> {
        self.entry(node).map(|e| &e.value)
    }

    pub(crate) fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.slots
            .get_mut(node.index())
            .and_then(|s| s.as_mut())
            .map(|e| &mut e.element)
    }

    /// Finds the element carrying `id`; labels are unique across live
    /// elements.
    pub fn node_by_id(&self, id: &str) -> Option<NodeId> {
        self.iter()
            .find(|(_, entry)| entry.element.id == id)
            .map(|(n, _)| n)
    }

    pub(crate) fn resolve_id(&self, id: &str) -> Result<NodeId, ModelError> {
        self.node_by_id(id)
            .ok_or_else(|| ModelError::UnknownId(id.to_owned()))
    }

    // ---------------------------------------------------------------------
    // views

    fn kind_view(&self, kind: GeoKind) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, e)| e.value.kind() == kind)
            .map(|(n, _)| n)
            .collect()
    }

    /// All points, in insertion order.
    pub fn points(&self) -> Vec<NodeId> {
        self.kind_view(GeoKind::Point)
    }

    /// All points ordered by float position, left to right then bottom to
    /// top.
    pub fn points_sorted(&self) -> Vec<NodeId> {
        let mut pts: Vec<(NodeId, Coords)> = self
            .iter()
            .filter_map(|(n, e)| match &e.value {
                GeoValue::Point { x, y } => Some((n, (x.clone(), y.clone()))),
                _ => None,
            })
            .collect();
        pts.sort_by(|a, b| compare_points(&a.1, &b.1));
        pts.into_iter().map(|(n, _)| n).collect()
    }

    pub fn lines(&self) -> Vec<NodeId> {
        self.kind_view(GeoKind::Line)
    }

    pub fn circles(&self) -> Vec<NodeId> {
        self.kind_view(GeoKind::Circle)
    }

    /// Non-guide lines and circles, the candidates for intersection search.
    pub fn structs(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, e)| e.value.kind().is_struct() && !e.element.guide)
            .map(|(n, _)| n)
            .collect()
    }

    /// Points registered by the most recent `construct_line` or
    /// `construct_circle` call, in discovery order.
    pub fn new_points(&self) -> &[NodeId] {
        &self.new_points
    }

    // ---------------------------------------------------------------------
    // resolution

    /// Exact coordinates of a point node.
    pub fn point_coords(&self, node: NodeId) -> Result<Coords, ModelError> {
        match &self.try_entry(node)?.value {
            GeoValue::Point { x, y } => Ok((x.clone(), y.clone())),
            other => Err(ModelError::TypeContract {
                expected: "Point",
                found: other.kind().name(),
            }),
        }
    }

    /// Normalized equation of a line or segment node.
    pub fn line_eq(&self, node: NodeId) -> Result<LineEq, ModelError> {
        match &self.try_entry(node)?.value {
            GeoValue::Line { a, b } | GeoValue::Segment { a, b } => {
                let pa = self.point_coords(*a)?;
                let pb = self.point_coords(*b)?;
                LineEq::through(&pa, &pb)
                    .ok_or(ModelError::Degenerate("line endpoints coincide"))
            }
            other => Err(ModelError::TypeContract {
                expected: "Line",
                found: other.kind().name(),
            }),
        }
    }

    /// Center and squared radius of a circle node.
    pub fn circle_eq(&self, node: NodeId) -> Result<CircleEq, ModelError> {
        match &self.try_entry(node)?.value {
            GeoValue::Circle { center, r_sq } => {
                let (cx, cy) = self.point_coords(*center)?;
                Ok(CircleEq {
                    cx,
                    cy,
                    r_sq: r_sq.clone(),
                })
            }
            other => Err(ModelError::TypeContract {
                expected: "Circle",
                found: other.kind().name(),
            }),
        }
    }

    /// Resolved analytic form of a structural node.
    pub fn struct_form(&self, node: NodeId) -> Result<StructForm, ModelError> {
        match self.try_entry(node)?.value.kind() {
            GeoKind::Line => Ok(StructForm::Line(self.line_eq(node)?)),
            GeoKind::Circle => Ok(StructForm::Circle(self.circle_eq(node)?)),
            other => Err(ModelError::TypeContract {
                expected: "Line or Circle",
                found: other.name(),
            }),
        }
    }

    // ---------------------------------------------------------------------
    // labels

    /// Encodes a label index bijectively over the uppercase alphabet:
    /// 0 -> "A", 25 -> "Z", 26 -> "AA", 27 -> "AB", ...
    pub(crate) fn encode_label(mut index: usize) -> String {
        let mut out = Vec::new();
        loop {
            out.push(b'A' + (index % 26) as u8);
            index /= 26;
            if index == 0 {
                break;
            }
            index -= 1;
        }
        out.reverse();
        String::from_utf8(out).expect("ASCII uppercase")
    }

    /// Inverse of [`Model::encode_label`]; `None` for anything outside the
    /// sequence.
    pub(crate) fn decode_label(label: &str) -> Option<usize> {
        if label.is_empty() || !label.bytes().all(|b| b.is_ascii_uppercase()) {
            return None;
        }
        let mut index = 0usize;
        for b in label.bytes() {
            index = index * 26 + (b - b'A') as usize + 1;
        }
        Some(index - 1)
    }

    fn next_point_label(&mut self) -> String {
        let label = Model::encode_label(self.label_cursor);
        self.label_cursor += 1;
        label
    }

    /// Label of the most recently labeled point.
    pub fn last_point_id(&self) -> &str {
        &self.last_point_id
    }

    // ---------------------------------------------------------------------
    // insertion

    pub(crate) fn insert_entry(&mut self, value: GeoValue, element: Element) -> NodeId {
        let node = NodeId(self.slots.len() as u32);
        self.slots.push(Some(Entry { value, element }));
        self.live += 1;
        node
    }

    /// Inserts a fully formed entry without deduplication or intersection
    /// search. Used by deserialization, where the document already encodes
    /// the closed state.
    pub(crate) fn push_raw(&mut self, value: GeoValue, element: Element) -> NodeId {
        self.insert_entry(value, element)
    }

    fn find_point(&self, x: &Expr, y: &Expr) -> Option<NodeId> {
        self.iter()
            .find(|(_, e)| matches!(&e.value, GeoValue::Point { x: px, y: py } if px == x && py == y))
            .map(|(n, _)| n)
    }

    /// Adds a free point, or merges into the existing node at the same
    /// exact coordinates. Freshly inserted points are recorded in
    /// [`Model::new_points`].
    pub fn set_point(&mut self, x: Expr, y: Expr, props: Props) -> NodeId {
        self.register_point(x, y, Vec::new(), props)
    }

    pub(crate) fn register_point(
        &mut self,
        x: Expr,
        y: Expr,
        parents: Vec<NodeId>,
        props: Props,
    ) -> NodeId {
        if let Some(existing) = self.find_point(&x, &y) {
            let el = self.element_mut(existing).expect("live point");
            for p in parents {
                el.add_parent(p);
            }
            for c in &props.classes {
                el.add_class(c);
            }
            return existing;
        }
        let label = match props.id {
            Some(id) => id,
            None => self.next_point_label(),
        };
        self.last_point_id = label.clone();
        info!("point {label} = ({x}, {y})");
        let element = Element::new(label, props.classes, parents, props.guide);
        let node = self.insert_entry(GeoValue::Point { x, y }, element);
        self.new_points.push(node);
        node
    }

    fn expect_point(&self, node: NodeId) -> Result<Coords, ModelError> {
        self.point_coords(node)
    }

    // ---------------------------------------------------------------------
    // structural constructions

    /// Constructs the line through two existing points, then discovers
    /// every intersection it makes with the structural elements already
    /// present. Returns the canonical node when an equal line exists.
    pub fn construct_line(
        &mut self,
        a: NodeId,
        b: NodeId,
        props: Props,
    ) -> Result<NodeId, ModelError> {
        self.new_points.clear();
        let pa = self.expect_point(a)?;
        let pb = self.expect_point(b)?;
        let eq = LineEq::through(&pa, &pb)
            .ok_or(ModelError::Degenerate("line requires two distinct points"))?;
        for existing in self.lines() {
            if self.line_eq(existing)? == eq {
                let el = self.element_mut(existing).expect("live line");
                el.add_parent(a);
                el.add_parent(b);
                for c in &props.classes {
                    el.add_class(c);
                }
                info!("line {} merged: {eq}", self.try_entry(existing)?.element.id);
                return Ok(existing);
            }
        }
        let id = match props.id {
            Some(id) => id,
            None => format!(
                "- {} {} -",
                self.try_entry(a)?.element.id,
                self.try_entry(b)?.element.id
            ),
        };
        info!("line {id}: {eq}");
        let element = Element::new(id, props.classes, vec![a, b], props.guide);
        let node = self.insert_entry(GeoValue::Line { a, b }, element);
        self.find_all_intersections(node)?;
        Ok(node)
    }

    /// Constructs the circle centered at `center` through `radius_pt`, then
    /// discovers its intersections. Returns the canonical node when an
    /// equal circle exists.
    pub fn construct_circle(
        &mut self,
        center: NodeId,
        radius_pt: NodeId,
        props: Props,
    ) -> Result<NodeId, ModelError> {
        self.new_points.clear();
        let pc = self.expect_point(center)?;
        let pr = self.expect_point(radius_pt)?;
        let eq = CircleEq::through(&pc, &pr)
            .ok_or(ModelError::Degenerate("circle requires a nonzero radius"))?;
        for existing in self.circles() {
            if self.circle_eq(existing)? == eq {
                let el = self.element_mut(existing).expect("live circle");
                el.add_parent(center);
                el.add_parent(radius_pt);
                for c in &props.classes {
                    el.add_class(c);
                }
                info!(
                    "circle {} merged: {eq}",
                    self.try_entry(existing)?.element.id
                );
                return Ok(existing);
            }
        }
        let id = match props.id {
            Some(id) => id,
            None => format!(
                "( {} {} )",
                self.try_entry(center)?.element.id,
                self.try_entry(radius_pt)?.element.id
            ),
        };
        info!("circle {id}: {eq}");
        let element = Element::new(id, props.classes, vec![center, radius_pt], props.guide)
            .with_pt_radius(radius_pt);
        let node = self.insert_entry(
            GeoValue::Circle {
                center,
                r_sq: eq.r_sq,
            },
            element,
        );
        self.find_all_intersections(node)?;
        Ok(node)
    }

    /// [`Model::construct_line`] addressed by element IDs.
    pub fn construct_line_by_ids(
        &mut self,
        a: &str,
        b: &str,
        props: Props,
    ) -> Result<NodeId, ModelError> {
        let na = self.resolve_id(a)?;
        let nb = self.resolve_id(b)?;
        self.construct_line(na, nb, props)
    }

    /// [`Model::construct_circle`] addressed by element IDs.
    pub fn construct_circle_by_ids(
        &mut self,
        center: &str,
        radius_pt: &str,
        props: Props,
    ) -> Result<NodeId, ModelError> {
        let nc = self.resolve_id(center)?;
        let nr = self.resolve_id(radius_pt)?;
        self.construct_circle(nc, nr, props)
    }

    // ---------------------------------------------------------------------
    // figures

    /// Adds a segment between two existing points. Segments are figures:
    /// deduplicated by unordered endpoint pair, never intersected.
    pub fn set_segment(
        &mut self,
        a: NodeId,
        b: NodeId,
        props: Props,
    ) -> Result<NodeId, ModelError> {
        self.expect_point(a)?;
        self.expect_point(b)?;
        if a == b {
            return Err(ModelError::Degenerate("segment endpoints coincide"));
        }
        let found = self.iter().find_map(|(node, entry)| match entry.value {
            GeoValue::Segment { a: ea, b: eb } if (ea, eb) == (a, b) || (ea, eb) == (b, a) => {
                Some(node)
            }
            _ => None,
        });
        if let Some(found) = found {
            let el = self.element_mut(found).expect("live segment");
            for c in &props.classes {
                el.add_class(c);
            }
            return Ok(found);
        }
        let id = match props.id {
            Some(id) => id,
            None => format!(
                "| {} {} |",
                self.try_entry(a)?.element.id,
                self.try_entry(b)?.element.id
            ),
        };
        let element = Element::new(id, props.classes, vec![a, b], props.guide);
        Ok(self.insert_entry(GeoValue::Segment { a, b }, element))
    }

    /// Adds a polygon over three or more existing points.
    pub fn set_polygon(
        &mut self,
        vertices: &[NodeId],
        props: Props,
    ) -> Result<NodeId, ModelError> {
        if vertices.len() < 3 {
            return Err(ModelError::Degenerate("polygon needs at least 3 vertices"));
        }
        for &v in vertices {
            self.expect_point(v)?;
        }
        let found = self.iter().find_map(|(node, entry)| match &entry.value {
            GeoValue::Polygon { vertices: ev } if ev.as_slice() == vertices => Some(node),
            _ => None,
        });
        if let Some(found) = found {
            let el = self.element_mut(found).expect("live polygon");
            for c in &props.classes {
                el.add_class(c);
            }
            return Ok(found);
        }
        let id = match props.id {
            Some(id) => id,
            None => {
                let names: Vec<&str> = vertices
                    .iter()
                    .map(|v| self.try_entry(*v).map(|e| e.element.id.as_str()))
                    .collect::<Result<_, _>>()?;
                format!("< {} >", names.join(" "))
            }
        };
        let element = Element::new(id, props.classes, vertices.to_vec(), props.guide);
        Ok(self.insert_entry(
            GeoValue::Polygon {
                vertices: vertices.to_vec(),
            },
            element,
        ))
    }

    // ---------------------------------------------------------------------
    // extent

    /// Bounding box of all points and circles as `[[x_min, x_max],
    /// [y_min, y_max]]` in float coordinates.
    pub fn limits(&self) -> Result<[[f64; 2]; 2], ModelError> {
        if self.is_empty() {
            return Err(ModelError::EmptyModel);
        }
        let mut x = (f64::INFINITY, f64::NEG_INFINITY);
        let mut y = (f64::INFINITY, f64::NEG_INFINITY);
        let mut cover = |px: f64, py: f64| {
            x.0 = x.0.min(px);
            x.1 = x.1.max(px);
            y.0 = y.0.min(py);
            y.1 = y.1.max(py);
        };
        let mut seen = false;
        for (node, entry) in self.iter() {
            match &entry.value {
                GeoValue::Point { x: px, y: py } => {
                    cover(px.to_f64(), py.to_f64());
                    seen = true;
                }
                GeoValue::Circle { .. } => {
                    let eq = self.circle_eq(node)?;
                    let r = eq.radius_f64();
                    cover(eq.cx.to_f64() - r, eq.cy.to_f64() - r);
                    cover(eq.cx.to_f64() + r, eq.cy.to_f64() + r);
                    seen = true;
                }
                _ => {}
            }
        }
        if !seen {
            return Err(ModelError::EmptyModel);
        }
        Ok([[x.0, x.1], [y.0, y.1]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: i64) -> Expr {
        Expr::from_int(n)
    }

    fn seed() -> (Model, NodeId, NodeId) {
        let mut m = Model::new("test");
        let a = m.set_point(num(0), num(0), Props::new().given());
        let b = m.set_point(num(1), num(0), Props::new().given());
        (m, a, b)
    }

    #[test]
    fn labels_follow_bijective_base26() {
        assert_eq!(Model::encode_label(0), "A");
        assert_eq!(Model::encode_label(25), "Z");
        assert_eq!(Model::encode_label(26), "AA");
        assert_eq!(Model::encode_label(27), "AB");
        assert_eq!(Model::encode_label(26 + 26 * 26), "AAA");
        for i in [0, 1, 25, 26, 51, 700, 1000] {
            assert_eq!(Model::decode_label(&Model::encode_label(i)), Some(i));
        }
        assert_eq!(Model::decode_label(""), None);
        assert_eq!(Model::decode_label("a1"), None);
    }

    #[test]
    fn points_deduplicate_by_exact_value() {
        let (mut m, a, _) = seed();
        let again = m.set_point(num(0), num(0), Props::new().class("red"));
        assert_eq!(again, a);
        assert_eq!(m.points().len(), 2);
        let el = m.element(a).unwrap();
        assert!(el.has_class("given"));
        assert!(el.has_class("red"));
        // the merged call minted no label
        assert_eq!(m.element(a).unwrap().id, "A");
        assert_eq!(m.last_point_id(), "B");
    }

    #[test]
    fn line_ids_and_dedup() {
        let (mut m, a, b) = seed();
        let l = m.construct_line(a, b, Props::new()).unwrap();
        assert_eq!(m.element(l).unwrap().id, "- A B -");
        // same carrier from a different point pair merges
        let c = m.set_point(num(2), num(0), Props::new());
        let l2 = m.construct_line(a, c, Props::new()).unwrap();
        assert_eq!(l2, l);
        assert!(m.element(l).unwrap().parents().contains(&c));
        assert_eq!(m.lines().len(), 1);
    }

    #[test]
    fn degenerate_constructions_are_rejected() {
        let (mut m, a, _) = seed();
        assert!(matches!(
            m.construct_line(a, a, Props::new()),
            Err(ModelError::Degenerate(_))
        ));
        assert!(matches!(
            m.construct_circle(a, a, Props::new()),
            Err(ModelError::Degenerate(_))
        ));
    }

    #[test]
    fn type_contract_is_enforced() {
        let (mut m, a, b) = seed();
        let l = m.construct_line(a, b, Props::new()).unwrap();
        assert!(matches!(
            m.construct_line(l, b, Props::new()),
            Err(ModelError::TypeContract { .. })
        ));
        assert!(matches!(
            m.point_coords(l),
            Err(ModelError::TypeContract {
                expected: "Point",
                ..
            })
        ));
    }

    #[test]
    fn guide_structs_are_excluded_from_struct_view() {
        let (mut m, a, b) = seed();
        let g = m.construct_line(a, b, Props::new().guide()).unwrap();
        assert!(m.structs().is_empty());
        assert!(m.lines().contains(&g));
    }

    #[test]
    fn segments_and_polygons_deduplicate() {
        let (mut m, a, b) = seed();
        let c = m.set_point(num(0), num(1), Props::new());
        let s = m.set_segment(a, b, Props::new()).unwrap();
        assert_eq!(m.set_segment(b, a, Props::new()).unwrap(), s);
        assert_eq!(m.element(s).unwrap().id, "| A B |");
        let p = m.set_polygon(&[a, b, c], Props::new()).unwrap();
        assert_eq!(m.set_polygon(&[a, b, c], Props::new()).unwrap(), p);
        assert_eq!(m.element(p).unwrap().id, "< A B C >");
        assert!(m.set_polygon(&[a, b], Props::new()).is_err());
    }

    #[test]
    fn limits_cover_circle_extent() {
        let (mut m, a, b) = seed();
        m.construct_circle(a, b, Props::new()).unwrap();
        let [[x0, x1], [y0, y1]] = m.limits().unwrap();
        assert_eq!((x0, x1), (-1.0, 1.0));
        assert_eq!((y0, y1), (-1.0, 1.0));
        assert!(Model::new("empty").limits().is_err());
    }

    #[test]
    fn by_id_lookup_and_resolution() {
        let (mut m, a, b) = seed();
        assert_eq!(m.node_by_id("A"), Some(a));
        let l = m.construct_line_by_ids("A", "B", Props::new()).unwrap();
        assert_eq!(m.line_eq(l).unwrap(), m.line_eq(l).unwrap());
        assert!(matches!(
            m.construct_circle_by_ids("A", "Q", Props::new()),
            Err(ModelError::UnknownId(_))
        ));
        let _ = b;
    }
}
