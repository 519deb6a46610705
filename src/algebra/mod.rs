//! Exact scalar arithmetic for the construction engine.
//!
//! The model core never does numerics itself; it delegates to this layer,
//! which implements the multiquadratic field ℚ[√p₁, …, √pₖ]: finite sums of
//! rational multiples of square roots of squarefree integers. That field is
//! closed under the four ring operations and covers every coordinate a
//! compass-and-straightedge construction over rational seed points can
//! produce, as long as each square root taken along the way denests. Roots
//! that leave the field surface as [`AlgebraError::NotRepresentable`] rather
//! than being approximated.

pub mod expr;
pub mod parse;

pub use expr::{AlgebraError, Expr};
pub use parse::{ParseError, parse_expr_str};
