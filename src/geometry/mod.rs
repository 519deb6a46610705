//! Exact analytic forms for the structural elements of a construction.
//!
//! The model core stores lines and circles by the handles of their defining
//! points; this module holds the resolved, value-level forms derived from
//! those points. Forms are *normalized* so that the identity test
//! "simplified difference of the defining equations is exactly zero"
//! becomes structural equality:
//! - [`LineEq`] fixes the leading coefficient of `a·x + b·y + c = 0` to 1.
//! - [`CircleEq`] keeps center plus *squared* radius; the expanded circle
//!   equation is monic in `x²`, so equal center and `r²` means equal
//!   equations. Working with `r²` also means constructing a circle never
//!   takes a square root.
//!
//! Intersection workers receive read-only [`StructForm`] values and return
//! plain coordinate pairs; nothing here touches the model.

pub mod intersect;

use crate::algebra::{AlgebraError, Expr};
use std::cmp::Ordering;
use std::fmt;

/// Exact coordinates of a point value.
pub type Coords = (Expr, Expr);

/// A line in normalized general form `a·x + b·y + c = 0`.
///
/// Invariant: `a == 1`, or `a == 0` and `b == 1` (horizontal).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LineEq {
    pub a: Expr,
    pub b: Expr,
    pub c: Expr,
}

impl LineEq {
    /// Normalizes raw coefficients; `None` when `a` and `b` are both zero.
    pub fn normalized(a: Expr, b: Expr, c: Expr) -> Option<LineEq> {
        let lead = if !a.is_zero() {
            &a
        } else if !b.is_zero() {
            &b
        } else {
            return None;
        };
        let inv = lead.recip().ok()?;
        Some(LineEq {
            a: &a * &inv,
            b: &b * &inv,
            c: &c * &inv,
        })
    }

    /// The line through two distinct points; `None` when they coincide.
    pub fn through(p1: &Coords, p2: &Coords) -> Option<LineEq> {
        let dx = &p2.0 - &p1.0;
        let dy = &p2.1 - &p1.1;
        // normal (dy, -dx); offset fixes the line through p1
        let c = &(&dx * &p1.1) - &(&dy * &p1.0);
        LineEq::normalized(dy, -&dx, c)
    }

    /// Signed residual of a point against the equation; zero iff incident.
    pub fn residual(&self, p: &Coords) -> Expr {
        &(&(&self.a * &p.0) + &(&self.b * &p.1)) + &self.c
    }
}

impl fmt::Display for LineEq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (coeff, var) in [(&self.a, "x"), (&self.b, "y")] {
            if coeff.is_zero() {
                continue;
            }
            write_signed_term(f, coeff, Some(var), &mut first)?;
        }
        if !self.c.is_zero() {
            write_signed_term(f, &self.c, None, &mut first)?;
        }
        if first {
            f.write_str("0")?;
        }
        f.write_str(" = 0")
    }
}

/// A circle as center plus squared radius.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CircleEq {
    pub cx: Expr,
    pub cy: Expr,
    pub r_sq: Expr,
}

impl CircleEq {
    /// The circle centered at `center` through `radius_pt`; `None` when the
    /// two points coincide (zero radius).
    pub fn through(center: &Coords, radius_pt: &Coords) -> Option<CircleEq> {
        let r_sq = distance_sq(center, radius_pt);
        if r_sq.is_zero() {
            return None;
        }
        Some(CircleEq {
            cx: center.0.clone(),
            cy: center.1.clone(),
            r_sq,
        })
    }

    /// Floating radius, for bounds and reporting.
    pub fn radius_f64(&self) -> f64 {
        self.r_sq.to_f64().sqrt()
    }
}

impl fmt::Display for CircleEq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (center, var) in [(&self.cx, "x"), (&self.cy, "y")] {
            if center.is_zero() {
                write!(f, "{var}^2")?;
            } else if center.sign() < 0 {
                write!(f, "({var} + {})^2", -center)?;
            } else {
                write!(f, "({var} - {center})^2")?;
            }
            if var == "x" {
                f.write_str(" + ")?;
            }
        }
        write!(f, " = {}", self.r_sq)
    }
}

/// The read-only value handed to intersection workers.
#[derive(Clone, Debug, PartialEq)]
pub enum StructForm {
    Line(LineEq),
    Circle(CircleEq),
}

/// Squared Euclidean distance between two exact points.
pub fn distance_sq(p: &Coords, q: &Coords) -> Expr {
    let dx = &q.0 - &p.0;
    let dy = &q.1 - &p.1;
    &(&dx * &dx) + &(&dy * &dy)
}

/// Rational-trigonometry spread of two lines, from their coefficients:
/// `(a₁b₂ − a₂b₁)² / ((a₁² + b₁²)(a₂² + b₂²))`. 0 for parallel lines,
/// 1 for perpendicular ones.
pub fn spread(l1: &LineEq, l2: &LineEq) -> Result<Expr, AlgebraError> {
    let cross = &(&l1.a * &l2.b) - &(&l1.b * &l2.a);
    let n1 = &(&l1.a * &l1.a) + &(&l1.b * &l1.b);
    let n2 = &(&l2.a * &l2.a) + &(&l2.b * &l2.b);
    (&cross * &cross).checked_div(&(&n1 * &n2))
}

/// Float ordering of points by (x, y); ties resolved by `total_cmp`.
pub fn compare_points(p: &Coords, q: &Coords) -> Ordering {
    match p.0.to_f64().total_cmp(&q.0.to_f64()) {
        Ordering::Equal => p.1.to_f64().total_cmp(&q.1.to_f64()),
        ord => ord,
    }
}

/// Sorts points left-to-right, bottom-to-top, by float position.
pub fn sort_points(pts: &mut [Coords]) {
    pts.sort_by(compare_points);
}

fn write_signed_term(
    f: &mut fmt::Formatter<'_>,
    coeff: &Expr,
    var: Option<&str>,
    first: &mut bool,
) -> fmt::Result {
    let negative = coeff.sign() < 0;
    let mag = if negative { -coeff } else { coeff.clone() };
    if *first {
        *first = false;
        if negative {
            f.write_str("-")?;
        }
    } else if negative {
        f.write_str(" - ")?;
    } else {
        f.write_str(" + ")?;
    }
    match var {
        Some(v) => {
            if mag == Expr::one() {
                f.write_str(v)
            } else if mag.is_rational() {
                write!(f, "{mag}*{v}")
            } else {
                write!(f, "({mag})*{v}")
            }
        }
        None => write!(f, "{mag}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: i64, y: i64) -> Coords {
        (Expr::from_int(x), Expr::from_int(y))
    }

    #[test]
    fn line_through_normalizes() {
        // Through (0,0) and (2,2): x - y = 0
        let l = LineEq::through(&pt(0, 0), &pt(2, 2)).unwrap();
        assert_eq!(l.a, Expr::one());
        assert_eq!(l.b, Expr::from_int(-1));
        assert!(l.c.is_zero());
        // Same line from other points compares equal
        let l2 = LineEq::through(&pt(-3, -3), &pt(5, 5)).unwrap();
        assert_eq!(l, l2);
    }

    #[test]
    fn coincident_points_make_no_line() {
        assert!(LineEq::through(&pt(1, 1), &pt(1, 1)).is_none());
    }

    #[test]
    fn horizontal_line_leads_with_y() {
        let l = LineEq::through(&pt(0, 2), &pt(5, 2)).unwrap();
        assert!(l.a.is_zero());
        assert_eq!(l.b, Expr::one());
        assert_eq!(l.c, Expr::from_int(-2));
    }

    #[test]
    fn residual_detects_incidence() {
        let l = LineEq::through(&pt(0, 0), &pt(1, 2)).unwrap();
        assert!(l.residual(&pt(2, 4)).is_zero());
        assert!(!l.residual(&pt(2, 5)).is_zero());
    }

    #[test]
    fn circle_keeps_squared_radius() {
        let c = CircleEq::through(&pt(0, 0), &pt(1, 2)).unwrap();
        assert_eq!(c.r_sq, Expr::from_int(5));
        assert!((c.radius_f64() - 5f64.sqrt()).abs() < 1e-12);
        assert!(CircleEq::through(&pt(3, 3), &pt(3, 3)).is_none());
    }

    #[test]
    fn spread_of_perpendicular_lines_is_one() {
        let l1 = LineEq::through(&pt(0, 0), &pt(1, 0)).unwrap();
        let l2 = LineEq::through(&pt(0, 0), &pt(0, 1)).unwrap();
        assert_eq!(spread(&l1, &l2).unwrap(), Expr::one());
        assert!(spread(&l1, &l1).unwrap().is_zero());
    }

    #[test]
    fn display_forms() {
        let l = LineEq::through(&pt(0, 0), &pt(1, 2)).unwrap();
        assert_eq!(l.to_string(), "x - 1/2*y = 0");
        let c = CircleEq::through(&pt(1, 0), &pt(0, 0)).unwrap();
        assert_eq!(c.to_string(), "(x - 1)^2 + y^2 = 1");
    }

    #[test]
    fn point_sorting_is_positional() {
        let mut pts = vec![pt(1, 0), pt(0, 1), pt(0, 0)];
        sort_points(&mut pts);
        assert_eq!(pts, vec![pt(0, 0), pt(0, 1), pt(1, 0)]);
    }
}
