//! Exact pairwise intersection of structural forms.
//!
//! Each test is a pure function from two read-only forms to a list of
//! coordinate pairs, so the discovery engine can fan tests out to a worker
//! pool and apply results serially. Discriminant signs are decided with the
//! exact zero test first, so tangency yields exactly one point.

use super::{Coords, LineEq, StructForm};
use crate::algebra::{AlgebraError, Expr};
use crate::geometry::CircleEq;

/// Intersects two structural forms. Coincident structs never reach this
/// point (deduplication keeps one canonical node per equation), so parallel
/// and concentric pairs simply yield nothing.
pub fn intersect(a: &StructForm, b: &StructForm) -> Result<Vec<Coords>, AlgebraError> {
    match (a, b) {
        (StructForm::Line(l1), StructForm::Line(l2)) => Ok(line_line(l1, l2)),
        (StructForm::Line(l), StructForm::Circle(c)) => line_circle(l, c),
        (StructForm::Circle(c), StructForm::Line(l)) => line_circle(l, c),
        (StructForm::Circle(c1), StructForm::Circle(c2)) => circle_circle(c1, c2),
    }
}

fn line_line(l1: &LineEq, l2: &LineEq) -> Vec<Coords> {
    let det = &(&l1.a * &l2.b) - &(&l2.a * &l1.b);
    if det.is_zero() {
        return Vec::new();
    }
    let det_inv = det.recip().expect("nonzero determinant");
    let x = &(&(&l2.c * &l1.b) - &(&l1.c * &l2.b)) * &det_inv;
    let y = &(&(&l1.c * &l2.a) - &(&l2.c * &l1.a)) * &det_inv;
    vec![(x, y)]
}

fn line_circle(l: &LineEq, c: &CircleEq) -> Result<Vec<Coords>, AlgebraError> {
    if l.b.is_zero() {
        // vertical: a == 1, so x = -c
        let x0 = -&l.c;
        let dx = &x0 - &c.cx;
        let disc = &c.r_sq - &(&dx * &dx);
        return Ok(match disc.sign() {
            -1 => Vec::new(),
            0 => vec![(x0, c.cy.clone())],
            _ => {
                let s = disc.sqrt()?;
                vec![(x0.clone(), &c.cy + &s), (x0, &c.cy - &s)]
            }
        });
    }
    // slope form y = m·x + k
    let b_inv = l.b.recip().expect("non-vertical line");
    let m = -&(&l.a * &b_inv);
    let k = -&(&l.c * &b_inv);
    let k_cy = &k - &c.cy;
    let two = Expr::from_int(2);
    let qa = &Expr::one() + &(&m * &m);
    let qb = &(&two * &(&m * &k_cy)) - &(&two * &c.cx);
    let qc = &(&(&c.cx * &c.cx) + &(&k_cy * &k_cy)) - &c.r_sq;
    let disc = &(&qb * &qb) - &(&(&Expr::from_int(4) * &qa) * &qc);
    let half_inv = (&two * &qa).recip().expect("qa >= 1");
    Ok(match disc.sign() {
        -1 => Vec::new(),
        0 => {
            let x = &(-&qb) * &half_inv;
            let y = &(&m * &x) + &k;
            vec![(x, y)]
        }
        _ => {
            let s = disc.sqrt()?;
            let x1 = &(&(-&qb) + &s) * &half_inv;
            let x2 = &(&(-&qb) - &s) * &half_inv;
            let y1 = &(&m * &x1) + &k;
            let y2 = &(&m * &x2) + &k;
            vec![(x1, y1), (x2, y2)]
        }
    })
}

fn circle_circle(c1: &CircleEq, c2: &CircleEq) -> Result<Vec<Coords>, AlgebraError> {
    // Subtracting the two monic equations leaves the radical line.
    let two = Expr::from_int(2);
    let a = &two * &(&c2.cx - &c1.cx);
    let b = &two * &(&c2.cy - &c1.cy);
    let c = &(&(&(&c1.cx * &c1.cx) + &(&c1.cy * &c1.cy)) - &c1.r_sq)
        - &(&(&(&c2.cx * &c2.cx) + &(&c2.cy * &c2.cy)) - &c2.r_sq);
    match LineEq::normalized(a, b, c) {
        Some(radical) => line_circle(&radical, c1),
        // concentric circles share no point
        None => Ok(Vec::new()),
    }
}
