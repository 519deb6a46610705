//! # euclid-model
//!
//! euclid-model is an incremental engine for classical compass-and-
//! straightedge constructions. A [`model::Model`] grows one operation at a
//! time: place points, draw the line through two points, draw the circle
//! centered at one point through another. Every coordinate is an exact
//! scalar in the quadratic surd field, so equality is decidable and two
//! constructions of the same object always converge on one canonical
//! element.
//!
//! ## Features
//! - Exact arithmetic over nested square-root extensions of the rationals,
//!   with denesting, division, and a decidable zero test
//! - Value-level deduplication: one point per coordinate pair, one line or
//!   circle per normalized equation, with metadata merged on collision
//! - Automatic intersection discovery, fanned out over a rayon worker pool
//!   whenever a structural element is added
//! - Construction-history traversal (ancestors, dependents) with Graphviz
//!   export, and cascading deletion that spares back-linked elders
//! - Lossless JSON persistence: exact scalars round-trip through a textual
//!   constructor grammar, rebuilt by a two-pass loader
//! - Composite figures over the base elements: sections (with an exact
//!   golden-ratio test), wedges, chains, and low-degree polynomials
//!
//! ## Usage
//!
//! ```
//! use euclid_model::prelude::*;
//!
//! let mut m = Model::new("vesica");
//! let a = m.set_point(Expr::zero(), Expr::zero(), Props::new().given());
//! let b = m.set_point(Expr::one(), Expr::zero(), Props::new().given());
//! m.construct_circle(a, b, Props::new())?;
//! m.construct_circle(b, a, Props::new())?;
//! // the two circles meet at (1/2, ±√3/2), discovered automatically
//! assert_eq!(m.new_points().len(), 2);
//! # Ok::<(), euclid_model::ModelError>(())
//! ```

pub mod algebra;
pub mod geometry;
pub mod model;
pub mod model_error;
pub mod report;

pub use model_error::ModelError;

/// A convenient prelude to import the most-used types:
pub mod prelude {
    pub use crate::algebra::{AlgebraError, Expr};
    pub use crate::geometry::{CircleEq, Coords, LineEq, StructForm};
    pub use crate::model::{
        AncestorTree, Element, ElementRef, GeoKind, GeoValue, Model, NodeId, Props, load_model,
    };
    pub use crate::model_error::ModelError;
    pub use crate::report::{ExportRecord, Summary};
}
