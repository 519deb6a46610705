//! Wedges: circular sectors cut from a circle by two rays.
//!
//! A wedge is defined by four points: the center, the radius point fixing
//! the circle, and the two sweep points fixing the rays. The sector angle
//! and the measures derived from it (area, arc length, perimeter) are
//! float quantities; the arc endpoints themselves stay exact when the
//! required square roots lie in the scalar field.

use crate::algebra::Expr;
use crate::geometry::{CircleEq, Coords, distance_sq};
use crate::model::{Element, GeoValue, Model, NodeId, Props};
use crate::model_error::ModelError;
use std::f64::consts::TAU;

impl Model {
    /// Registers a wedge: the sector of the circle centered at `center`
    /// through `radius_pt`, swept from the ray toward `sweep_start` to the
    /// ray toward `sweep_end`.
    pub fn set_wedge(
        &mut self,
        center: NodeId,
        radius_pt: NodeId,
        sweep_start: NodeId,
        sweep_end: NodeId,
        props: Props,
    ) -> Result<NodeId, ModelError> {
        let pc = self.point_coords(center)?;
        let pr = self.point_coords(radius_pt)?;
        let circle = CircleEq::through(&pc, &pr)
            .ok_or(ModelError::Degenerate("wedge requires a nonzero radius"))?;
        for sweep in [sweep_start, sweep_end] {
            let ps = self.point_coords(sweep)?;
            if ps == pc {
                return Err(ModelError::Degenerate(
                    "sweep point coincides with the wedge center",
                ));
            }
            // arc endpoints must be constructible before the wedge exists
            scale_to_circle(&pc, &ps, &circle.r_sq)?;
        }
        let points = [center, radius_pt, sweep_start, sweep_end];
        let found = self.iter().find_map(|(node, entry)| match &entry.value {
            GeoValue::Wedge { points: ep } if *ep == points => Some(node),
            _ => None,
        });
        if let Some(found) = found {
            let el = self.element_mut(found).expect("live wedge");
            for c in &props.classes {
                el.add_class(c);
            }
            return Ok(found);
        }
        let id = match props.id {
            Some(id) => id,
            None => format!(
                "( {} {} )< {} {} {} >",
                self.try_entry(center)?.element.id,
                self.try_entry(radius_pt)?.element.id,
                self.try_entry(sweep_start)?.element.id,
                self.try_entry(center)?.element.id,
                self.try_entry(sweep_end)?.element.id
            ),
        };
        // every defining point is a parent; deleting any of them cascades
        // through the wedge
        let element = Element::new(
            id,
            props.classes,
            vec![center, radius_pt, sweep_start, sweep_end],
            props.guide,
        )
        .with_pt_radius(radius_pt);
        Ok(self.insert_entry(GeoValue::Wedge { points }, element))
    }

    fn wedge_points(&self, node: NodeId) -> Result<[NodeId; 4], ModelError> {
        match &self.try_entry(node)?.value {
            GeoValue::Wedge { points } => Ok(*points),
            other => Err(ModelError::TypeContract {
                expected: "Wedge",
                found: other.kind().name(),
            }),
        }
    }

    /// The wedge's full circle.
    pub fn wedge_circle(&self, node: NodeId) -> Result<CircleEq, ModelError> {
        let [center, radius_pt, ..] = self.wedge_points(node)?;
        let pc = self.point_coords(center)?;
        let pr = self.point_coords(radius_pt)?;
        CircleEq::through(&pc, &pr)
            .ok_or(ModelError::Degenerate("wedge requires a nonzero radius"))
    }

    /// Sector angle in radians, the minor angle between the two rays,
    /// in `[0, π]`.
    pub fn wedge_radians(&self, node: NodeId) -> Result<f64, ModelError> {
        let [center, _, start, end] = self.wedge_points(node)?;
        let pc = self.point_coords(center)?;
        let ps = self.point_coords(start)?;
        let pe = self.point_coords(end)?;
        let a0 = ray_angle(&pc, &ps);
        let a1 = ray_angle(&pc, &pe);
        let mut sweep = a1 - a0;
        while sweep > std::f64::consts::PI {
            sweep -= TAU;
        }
        while sweep < -std::f64::consts::PI {
            sweep += TAU;
        }
        Ok(sweep.abs())
    }

    /// Sector angle in degrees.
    pub fn wedge_degrees(&self, node: NodeId) -> Result<f64, ModelError> {
        Ok(self.wedge_radians(node)?.to_degrees())
    }

    /// Fraction of the full circle the sector covers, in `[0, 1/2]`.
    pub fn wedge_ratio(&self, node: NodeId) -> Result<f64, ModelError> {
        Ok(self.wedge_radians(node)? / TAU)
    }

    /// Sector area.
    pub fn wedge_area(&self, node: NodeId) -> Result<f64, ModelError> {
        let c = self.wedge_circle(node)?;
        Ok(self.wedge_radians(node)? * c.r_sq.to_f64() / 2.0)
    }

    /// Arc length along the circle between the two rays.
    pub fn wedge_arc_length(&self, node: NodeId) -> Result<f64, ModelError> {
        let c = self.wedge_circle(node)?;
        Ok(self.wedge_radians(node)? * c.radius_f64())
    }

    /// Two radii plus the arc.
    pub fn wedge_perimeter(&self, node: NodeId) -> Result<f64, ModelError> {
        let c = self.wedge_circle(node)?;
        Ok(self.wedge_arc_length(node)? + 2.0 * c.radius_f64())
    }

    /// Exact points where the two rays cross the wedge's circle; fails
    /// when scaling a sweep direction to the radius leaves the scalar
    /// field.
    pub fn wedge_arc_endpoints(&self, node: NodeId) -> Result<[Coords; 2], ModelError> {
        let [center, _, start, end] = self.wedge_points(node)?;
        let circle = self.wedge_circle(node)?;
        let pc = self.point_coords(center)?;
        let ps = self.point_coords(start)?;
        let pe = self.point_coords(end)?;
        Ok([
            scale_to_circle(&pc, &ps, &circle.r_sq)?,
            scale_to_circle(&pc, &pe, &circle.r_sq)?,
        ])
    }
}

fn ray_angle(center: &Coords, toward: &Coords) -> f64 {
    let dx = (&toward.0 - &center.0).to_f64();
    let dy = (&toward.1 - &center.1).to_f64();
    dy.atan2(dx)
}

/// Projects `toward` onto the circle of squared radius `r_sq` around
/// `center`, along the ray from the center.
fn scale_to_circle(center: &Coords, toward: &Coords, r_sq: &Expr) -> Result<Coords, ModelError> {
    let d_sq = distance_sq(center, toward);
    // sweep points are checked distinct from the center at construction
    let t = r_sq.checked_div(&d_sq)?.sqrt()?;
    Ok((
        &center.0 + &(&t * &(&toward.0 - &center.0)),
        &center.1 + &(&t * &(&toward.1 - &center.1)),
    ))
}
