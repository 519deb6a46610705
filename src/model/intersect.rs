//! Exhaustive intersection discovery for newly added structural elements.
//!
//! Whenever a non-guide line or circle lands in the model, it is tested
//! against every structural element already present. The pairwise tests
//! are pure and independent, so they fan out over a rayon worker pool;
//! registration happens afterwards on the calling thread, in candidate
//! insertion order, so discovered labels are deterministic.

use crate::geometry::{StructForm, intersect::intersect};
use crate::model::{Model, NodeId, Props};
use crate::model_error::ModelError;
use log::debug;
use rayon::prelude::*;

impl Model {
    /// Intersects `node` with every other structural element and registers
    /// each meeting point, linking it to both parents. No-op for guides.
    pub(crate) fn find_all_intersections(&mut self, node: NodeId) -> Result<(), ModelError> {
        if self.try_entry(node)?.element.guide {
            return Ok(());
        }
        let new_form = self.struct_form(node)?;
        let candidates: Vec<(NodeId, StructForm)> = self
            .structs()
            .into_iter()
            .filter(|&n| n != node)
            .map(|n| Ok((n, self.struct_form(n)?)))
            .collect::<Result<_, ModelError>>()?;
        let results: Vec<_> = candidates
            .par_iter()
            .map(|(n, form)| (*n, intersect(form, &new_form)))
            .collect();
        for (prev, outcome) in results {
            let points = outcome?;
            debug!(
                "{} x {}: {} point(s)",
                self.try_entry(prev)?.element.id,
                self.try_entry(node)?.element.id,
                points.len()
            );
            for (x, y) in points {
                let pt = self.register_point(x, y, vec![prev, node], Props::new());
                // intersection points are both children and back-links
                if let Some(el) = self.element_mut(prev) {
                    el.add_parent(pt);
                }
                if let Some(el) = self.element_mut(node) {
                    el.add_parent(pt);
                }
            }
        }
        Ok(())
    }
}
