//! Canned constructions layered over the primitive operations.
//!
//! These wrap the common opening moves of a compass-and-straightedge
//! session: seeding the two given points that fix the unit, raising the
//! equilateral poles of a point pair over guide circles, and the
//! perpendicular bisector and midpoint built from those poles. The guide
//! circles never enter intersection discovery, so each helper adds only
//! the elements it names.

use crate::algebra::Expr;
use crate::geometry::{LineEq, StructForm, intersect::intersect, sort_points};
use crate::model::{Model, NodeId, Props};
use crate::model_error::ModelError;

impl Model {
    /// Seeds the given points `(-1/2, 0)` and `(1/2, 0)`, centering the
    /// unit on the origin.
    pub fn set_given_start_points(&mut self) -> (NodeId, NodeId) {
        let a = self.set_point(Expr::rational(-1, 2), Expr::zero(), Props::new().given());
        let b = self.set_point(Expr::rational(1, 2), Expr::zero(), Props::new().given());
        (a, b)
    }

    /// Seeds the given points `(0, 0)` and `(1, 0)`.
    pub fn set_given_start_points_zero(&mut self) -> (NodeId, NodeId) {
        let a = self.set_point(Expr::zero(), Expr::zero(), Props::new().given());
        let b = self.set_point(Expr::one(), Expr::zero(), Props::new().given());
        (a, b)
    }

    /// Registers the two poles of the vesica over `a` and `b`: the
    /// crossings of the circle around each point through the other. The
    /// circles enter the model as guides, so the poles are the only points
    /// added; they are returned bottom pole first.
    pub fn set_equilateral_poles(
        &mut self,
        a: NodeId,
        b: NodeId,
    ) -> Result<[NodeId; 2], ModelError> {
        let c1 = self.construct_circle(a, b, Props::new().guide())?;
        let c2 = self.construct_circle(b, a, Props::new().guide())?;
        let mut crossings = intersect(&self.struct_form(c1)?, &self.struct_form(c2)?)?;
        sort_points(&mut crossings);
        let mut poles = Vec::with_capacity(2);
        for (x, y) in crossings {
            let pt = self.register_point(x, y, vec![c1, c2], Props::new());
            self.element_mut(c1).expect("live circle").add_parent(pt);
            self.element_mut(c2).expect("live circle").add_parent(pt);
            poles.push(pt);
        }
        match poles[..] {
            [p1, p2] => Ok([p1, p2]),
            // equal-radius circles on distinct centers always cross twice
            _ => Err(ModelError::Degenerate("pole circles must cross twice")),
        }
    }

    /// Constructs the perpendicular bisector of `a` and `b` through their
    /// equilateral poles, classed `bisector`. The pole circles stay
    /// guides; the bisector itself is structural and discovers
    /// intersections as usual.
    pub fn construct_perpendicular_bisector(
        &mut self,
        a: NodeId,
        b: NodeId,
        props: Props,
    ) -> Result<NodeId, ModelError> {
        let [p1, p2] = self.set_equilateral_poles(a, b)?;
        self.construct_line(p1, p2, props.class("bisector"))
    }

    /// Registers the midpoint of `a` and `b`: the crossing of their
    /// perpendicular bisector with the carrier line through the two
    /// points. The bisector enters the model as a guide.
    pub fn set_midpoint(
        &mut self,
        a: NodeId,
        b: NodeId,
        props: Props,
    ) -> Result<NodeId, ModelError> {
        let bisector = self.construct_perpendicular_bisector(a, b, Props::new().guide())?;
        let pa = self.point_coords(a)?;
        let pb = self.point_coords(b)?;
        let carrier = LineEq::through(&pa, &pb)
            .ok_or(ModelError::Degenerate("midpoint requires two distinct points"))?;
        let mut crossings = intersect(
            &StructForm::Line(self.line_eq(bisector)?),
            &StructForm::Line(carrier),
        )?;
        match crossings.pop() {
            Some((x, y)) if crossings.is_empty() => {
                Ok(self.register_point(x, y, vec![bisector], props))
            }
            _ => Err(ModelError::Degenerate("bisector misses the carrier")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_points_fix_the_unit() {
        let mut m = Model::new("t");
        let (a, b) = m.set_given_start_points();
        assert_eq!(
            m.point_coords(a).unwrap(),
            (Expr::rational(-1, 2), Expr::zero())
        );
        assert_eq!(
            m.point_coords(b).unwrap(),
            (Expr::rational(1, 2), Expr::zero())
        );
        assert!(m.element(a).unwrap().has_class("given"));

        let mut z = Model::new("z");
        let (o, u) = z.set_given_start_points_zero();
        assert_eq!(z.point_coords(o).unwrap(), (Expr::zero(), Expr::zero()));
        assert_eq!(z.point_coords(u).unwrap(), (Expr::one(), Expr::zero()));
    }

    #[test]
    fn equilateral_poles_ride_guide_circles() {
        let mut m = Model::new("t");
        let (a, b) = m.set_given_start_points_zero();
        let [p1, p2] = m.set_equilateral_poles(a, b).unwrap();
        assert_eq!(
            m.point_coords(p1).unwrap(),
            (Expr::rational(1, 2), -&Expr::surd(1, 2, 3))
        );
        assert_eq!(
            m.point_coords(p2).unwrap(),
            (Expr::rational(1, 2), Expr::surd(1, 2, 3))
        );
        // the circles are guides: no structural elements, no extra points
        assert!(m.structs().is_empty());
        assert_eq!(m.points().len(), 4);
        assert_eq!(m.element(p1).unwrap().parents().len(), 2);
    }

    #[test]
    fn perpendicular_bisector_is_vertical() {
        let mut m = Model::new("t");
        let (a, b) = m.set_given_start_points_zero();
        let l = m
            .construct_perpendicular_bisector(a, b, Props::new())
            .unwrap();
        assert!(m.element(l).unwrap().has_class("bisector"));
        // x = 1/2
        let eq = m.line_eq(l).unwrap();
        assert_eq!(eq.a, Expr::one());
        assert!(eq.b.is_zero());
        assert_eq!(eq.c, Expr::rational(-1, 2));
    }

    #[test]
    fn midpoint_lands_between_the_points() {
        let mut m = Model::new("t");
        let a = m.set_point(Expr::zero(), Expr::zero(), Props::new().given());
        let b = m.set_point(Expr::from_int(4), Expr::from_int(2), Props::new().given());
        let mid = m.set_midpoint(a, b, Props::new()).unwrap();
        assert_eq!(
            m.point_coords(mid).unwrap(),
            (Expr::from_int(2), Expr::one())
        );
        // the midpoint descends from the seeds through the guide scaffold
        let removed = m.delete_element(a);
        assert!(removed.contains(&mid));
    }
}
