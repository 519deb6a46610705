//! Sections: three collinear points dividing a segment in two parts.
//!
//! The interesting question about a section is the ratio of its two parts.
//! Working with squared lengths keeps everything inside the exact scalar
//! field: with `s` the ratio of the squared lengths, the section is golden
//! exactly when `s² − 3s + 1 = 0`, which is the squared-length image of
//! the defining relation `φ² = φ + 1`.

use crate::algebra::Expr;
use crate::geometry::distance_sq;
use crate::model::{Element, GeoValue, Model, NodeId, Props};
use crate::model_error::ModelError;
use log::debug;

impl Model {
    /// Registers a section over three distinct collinear points, in order
    /// along their carrier.
    pub fn set_section(
        &mut self,
        points: [NodeId; 3],
        props: Props,
    ) -> Result<NodeId, ModelError> {
        let coords = [
            self.point_coords(points[0])?,
            self.point_coords(points[1])?,
            self.point_coords(points[2])?,
        ];
        if coords[0] == coords[1] || coords[1] == coords[2] || coords[0] == coords[2] {
            return Err(ModelError::Degenerate("section points must be distinct"));
        }
        let carrier = crate::geometry::LineEq::through(&coords[0], &coords[2])
            .ok_or(ModelError::Degenerate("section points must be distinct"))?;
        if !carrier.residual(&coords[1]).is_zero() {
            return Err(ModelError::Degenerate("section points must be collinear"));
        }
        let found = self.iter().find_map(|(node, entry)| match &entry.value {
            GeoValue::Section { points: ep } if *ep == points => Some(node),
            _ => None,
        });
        if let Some(found) = found {
            let el = self.element_mut(found).expect("live section");
            for c in &props.classes {
                el.add_class(c);
            }
            return Ok(found);
        }
        let id = match props.id {
            Some(id) => id,
            None => format!(
                "/ {} {} {} /",
                self.try_entry(points[0])?.element.id,
                self.try_entry(points[1])?.element.id,
                self.try_entry(points[2])?.element.id
            ),
        };
        let element = Element::new(id, props.classes, points.to_vec(), props.guide);
        let node = self.insert_entry(GeoValue::Section { points }, element);
        debug!(
            "section {}: ratio {:.6}",
            self.try_entry(node)?.element.id,
            self.section_ratio_f64(node)?
        );
        Ok(node)
    }

    /// [`Model::set_section`] addressed by element IDs.
    pub fn set_section_by_ids(
        &mut self,
        a: &str,
        b: &str,
        c: &str,
        props: Props,
    ) -> Result<NodeId, ModelError> {
        let points = [self.resolve_id(a)?, self.resolve_id(b)?, self.resolve_id(c)?];
        self.set_section(points, props)
    }

    fn section_points(&self, node: NodeId) -> Result<[NodeId; 3], ModelError> {
        match &self.try_entry(node)?.value {
            GeoValue::Section { points } => Ok(*points),
            other => Err(ModelError::TypeContract {
                expected: "Section",
                found: other.kind().name(),
            }),
        }
    }

    /// Squared lengths of the two parts, exactly.
    pub fn section_lengths_sq(&self, node: NodeId) -> Result<[Expr; 2], ModelError> {
        let [a, b, c] = self.section_points(node)?;
        let pa = self.point_coords(a)?;
        let pb = self.point_coords(b)?;
        let pc = self.point_coords(c)?;
        Ok([distance_sq(&pa, &pb), distance_sq(&pb, &pc)])
    }

    /// Exact lengths of the two parts; fails when a length does not lie in
    /// the scalar field.
    pub fn section_lengths(&self, node: NodeId) -> Result<[Expr; 2], ModelError> {
        let [d1, d2] = self.section_lengths_sq(node)?;
        Ok([d1.sqrt()?, d2.sqrt()?])
    }

    /// Float lengths of the two parts.
    pub fn section_lengths_f64(&self, node: NodeId) -> Result<[f64; 2], ModelError> {
        let [d1, d2] = self.section_lengths_sq(node)?;
        Ok([d1.to_f64().sqrt(), d2.to_f64().sqrt()])
    }

    /// Float ratio of the longer part to the shorter.
    pub fn section_ratio_f64(&self, node: NodeId) -> Result<f64, ModelError> {
        let [d1, d2] = self.section_lengths_f64(node)?;
        Ok(if d1 >= d2 { d1 / d2 } else { d2 / d1 })
    }

    /// Float length of the shorter part.
    pub fn section_min_length_f64(&self, node: NodeId) -> Result<f64, ModelError> {
        let [d1, d2] = self.section_lengths_f64(node)?;
        Ok(d1.min(d2))
    }

    /// Float length of the longer part.
    pub fn section_max_length_f64(&self, node: NodeId) -> Result<f64, ModelError> {
        let [d1, d2] = self.section_lengths_f64(node)?;
        Ok(d1.max(d2))
    }

    /// Exact test for the golden ratio between the two parts.
    pub fn is_golden(&self, node: NodeId) -> Result<bool, ModelError> {
        let [d1, d2] = self.section_lengths_sq(node)?;
        let mut s = d1.checked_div(&d2)?;
        if (&s - &Expr::one()).sign() < 0 {
            s = s.recip()?;
        }
        let poly = &(&(&s * &s) - &(&Expr::from_int(3) * &s)) + &Expr::one();
        Ok(poly.is_zero())
    }
}
