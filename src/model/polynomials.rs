//! Polynomial elements and their intersections.
//!
//! Polynomials live in the model alongside the compass-and-straightedge
//! elements but stay out of automatic discovery; their intersections are
//! computed on demand. Roots are solved exactly up to degree two, which is
//! as far as the quadratic scalar field reaches.

use crate::algebra::Expr;
use crate::geometry::Coords;
use crate::model::{Element, GeoValue, Model, NodeId, Props};
use crate::model_error::ModelError;

impl Model {
    /// Adds a polynomial in `x`, coefficients highest degree first.
    /// Default IDs run `Poly1`, `Poly2`, ...
    pub fn add_poly(&mut self, coeffs: Vec<Expr>, props: Props) -> Result<NodeId, ModelError> {
        if coeffs.is_empty() {
            return Err(ModelError::Degenerate("polynomial needs coefficients"));
        }
        let found = self.iter().find_map(|(node, entry)| match &entry.value {
            GeoValue::Polynomial { coeffs: ec } if *ec == coeffs => Some(node),
            _ => None,
        });
        if let Some(found) = found {
            let el = self.element_mut(found).expect("live polynomial");
            for c in &props.classes {
                el.add_class(c);
            }
            return Ok(found);
        }
        let id = match props.id {
            Some(id) => id,
            None => {
                self.poly_count += 1;
                format!("Poly{}", self.poly_count)
            }
        };
        let element = Element::new(id, props.classes, Vec::new(), props.guide);
        Ok(self.insert_entry(GeoValue::Polynomial { coeffs }, element))
    }

    fn poly_coeffs(&self, node: NodeId) -> Result<Vec<Expr>, ModelError> {
        match &self.try_entry(node)?.value {
            GeoValue::Polynomial { coeffs } => Ok(coeffs.clone()),
            other => Err(ModelError::TypeContract {
                expected: "Polynomial",
                found: other.kind().name(),
            }),
        }
    }

    /// Degree after stripping leading zero coefficients; the zero
    /// polynomial reports degree 0.
    pub fn poly_degree(&self, node: NodeId) -> Result<usize, ModelError> {
        let coeffs = self.poly_coeffs(node)?;
        Ok(trim_leading_zeros(&coeffs).len().saturating_sub(1))
    }

    /// Exact evaluation at `x`, by Horner's rule.
    pub fn poly_eval(&self, node: NodeId, x: &Expr) -> Result<Expr, ModelError> {
        let coeffs = self.poly_coeffs(node)?;
        Ok(eval(&coeffs, x))
    }

    /// Exact intersections of a polynomial with another polynomial or a
    /// line, as points on the first polynomial's graph. Differences of
    /// degree above two are refused.
    pub fn poly_intersection(
        &self,
        node: NodeId,
        other: NodeId,
    ) -> Result<Vec<Coords>, ModelError> {
        let coeffs = self.poly_coeffs(node)?;
        let entry = self.try_entry(other)?;
        let diff = match &entry.value {
            GeoValue::Polynomial { coeffs: oc } => sub_aligned(&coeffs, oc),
            GeoValue::Line { .. } => {
                let eq = self.line_eq(other)?;
                if eq.b.is_zero() {
                    // vertical line: one sample at x = -c
                    let x = -&eq.c;
                    let y = eval(&coeffs, &x);
                    return Ok(vec![(x, y)]);
                }
                // y = -(a*x + c) / b
                let b_inv = eq.b.recip()?;
                let m = -&(&eq.a * &b_inv);
                let k = -&(&eq.c * &b_inv);
                sub_aligned(&coeffs, &[m, k])
            }
            other_value => {
                return Err(ModelError::TypeContract {
                    expected: "Polynomial or Line",
                    found: other_value.kind().name(),
                });
            }
        };
        let mut out = Vec::new();
        for x in solve(&diff)? {
            let y = eval(&coeffs, &x);
            out.push((x, y));
        }
        Ok(out)
    }
}

fn eval(coeffs: &[Expr], x: &Expr) -> Expr {
    let mut acc = Expr::zero();
    for c in coeffs {
        acc = &(&acc * x) + c;
    }
    acc
}

fn trim_leading_zeros(coeffs: &[Expr]) -> &[Expr] {
    let first = coeffs.iter().position(|c| !c.is_zero());
    match first {
        Some(i) => &coeffs[i..],
        None => &coeffs[coeffs.len().saturating_sub(1)..],
    }
}

fn sub_aligned(a: &[Expr], b: &[Expr]) -> Vec<Expr> {
    let n = a.len().max(b.len());
    let term = |s: &[Expr], i: usize| -> Expr {
        let pad = n - s.len();
        if i < pad {
            Expr::zero()
        } else {
            s[i - pad].clone()
        }
    };
    (0..n).map(|i| &term(a, i) - &term(b, i)).collect()
}

/// Exact real roots, ascending by float value. Degree 0 has none; degrees
/// above 2 are out of reach.
fn solve(coeffs: &[Expr]) -> Result<Vec<Expr>, ModelError> {
    let coeffs = trim_leading_zeros(coeffs);
    match coeffs.len() {
        0 | 1 => Ok(Vec::new()),
        2 => {
            let root = (-&coeffs[1]).checked_div(&coeffs[0])?;
            Ok(vec![root])
        }
        3 => {
            let (a, b, c) = (&coeffs[0], &coeffs[1], &coeffs[2]);
            let disc = &(b * b) - &(&(&Expr::from_int(4) * a) * c);
            let half_inv = (&Expr::from_int(2) * a).recip()?;
            match disc.sign() {
                -1 => Ok(Vec::new()),
                0 => Ok(vec![&(-b) * &half_inv]),
                _ => {
                    let s = disc.sqrt()?;
                    let mut roots = vec![
                        &(&(-b) - &s) * &half_inv,
                        &(&(-b) + &s) * &half_inv,
                    ];
                    roots.sort_by(|p, q| p.to_f64().total_cmp(&q.to_f64()));
                    Ok(roots)
                }
            }
        }
        n => Err(ModelError::UnsupportedDegree(n - 1)),
    }
}
