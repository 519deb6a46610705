//! Tabular export of a model for reports and downstream tooling.
//!
//! Each element flattens to one [`ExportRecord`] carrying its identity,
//! lineage, exact quantities as canonical scalar text, and float
//! approximations. [`Summary`] is the one-line census.

use crate::model::{GeoKind, GeoValue, Model};
use crate::model_error::ModelError;
use serde::Serialize;
use std::collections::BTreeMap;

/// One element, flattened.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRecord {
    pub id: String,
    pub kind: GeoKind,
    pub classes: Vec<String>,
    pub parents: Vec<String>,
    pub guide: bool,
    /// Exact quantities in canonical scalar text, keyed by name.
    pub exact: BTreeMap<String, String>,
    /// Float approximations, keyed by name.
    pub approx: BTreeMap<String, f64>,
}

/// Census of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub name: String,
    pub elements: usize,
    pub points: usize,
    pub lines: usize,
    pub circles: usize,
}

impl Model {
    pub fn summary(&self) -> Summary {
        Summary {
            name: self.name().to_owned(),
            elements: self.len(),
            points: self.points().len(),
            lines: self.lines().len(),
            circles: self.circles().len(),
        }
    }

    /// Flattens every live element, in insertion order.
    pub fn export_records(&self) -> Result<Vec<ExportRecord>, ModelError> {
        self.iter()
            .map(|(node, entry)| {
                let mut exact = BTreeMap::new();
                let mut approx = BTreeMap::new();
                match &entry.value {
                    GeoValue::Point { x, y } => {
                        exact.insert("x".to_owned(), x.to_string());
                        exact.insert("y".to_owned(), y.to_string());
                        approx.insert("x".to_owned(), x.to_f64());
                        approx.insert("y".to_owned(), y.to_f64());
                    }
                    GeoValue::Line { .. } => {
                        let eq = self.line_eq(node)?;
                        exact.insert("equation".to_owned(), eq.to_string());
                    }
                    GeoValue::Circle { .. } => {
                        let eq = self.circle_eq(node)?;
                        exact.insert("equation".to_owned(), eq.to_string());
                        approx.insert("cx".to_owned(), eq.cx.to_f64());
                        approx.insert("cy".to_owned(), eq.cy.to_f64());
                        approx.insert("r".to_owned(), eq.radius_f64());
                    }
                    GeoValue::Segment { a, b } => {
                        let pa = self.point_coords(*a)?;
                        let pb = self.point_coords(*b)?;
                        let d_sq = crate::geometry::distance_sq(&pa, &pb);
                        exact.insert("length_sq".to_owned(), d_sq.to_string());
                        approx.insert("length".to_owned(), d_sq.to_f64().sqrt());
                    }
                    GeoValue::Section { .. } => {
                        let [d1, d2] = self.section_lengths_f64(node)?;
                        approx.insert("length_1".to_owned(), d1);
                        approx.insert("length_2".to_owned(), d2);
                        approx.insert("ratio".to_owned(), self.section_ratio_f64(node)?);
                    }
                    GeoValue::Wedge { .. } => {
                        approx.insert("radians".to_owned(), self.wedge_radians(node)?);
                        approx.insert("degrees".to_owned(), self.wedge_degrees(node)?);
                        approx.insert("area".to_owned(), self.wedge_area(node)?);
                    }
                    GeoValue::Polynomial { coeffs } => {
                        let rendered: Vec<String> =
                            coeffs.iter().map(|c| c.to_string()).collect();
                        exact.insert("coefficients".to_owned(), rendered.join(", "));
                    }
                    GeoValue::Polygon { .. } | GeoValue::Chain { .. } => {}
                }
                Ok(ExportRecord {
                    id: entry.element.id.clone(),
                    kind: entry.value.kind(),
                    classes: entry.element.classes().to_vec(),
                    parents: entry
                        .element
                        .parents()
                        .iter()
                        .map(|&p| Ok(self.try_entry(p)?.element.id.clone()))
                        .collect::<Result<_, ModelError>>()?,
                    guide: entry.element.guide,
                    exact,
                    approx,
                })
            })
            .collect()
    }
}
