//! Chains: ordered runs of sections sharing endpoints.
//!
//! A chain strings sections together and asks questions about the run of
//! segment lengths along it: the flow (how length changes step to step),
//! the number of symmetry axes in that flow, and whether the distinct
//! lengths line up as consecutive sums the way a fibonacci cascade does.

use crate::model::{Element, GeoValue, Model, NodeId, Props};
use crate::model_error::ModelError;
use itertools::Itertools;

/// Two float lengths within this tolerance count as the same length.
const LENGTH_EPS: f64 = 1e-9;

impl Model {
    /// Registers a chain over one or more sections, in order.
    pub fn set_chain(
        &mut self,
        sections: Vec<NodeId>,
        props: Props,
    ) -> Result<NodeId, ModelError> {
        if sections.is_empty() {
            return Err(ModelError::Degenerate("chain requires at least one section"));
        }
        for &s in &sections {
            let entry = self.try_entry(s)?;
            if !matches!(entry.value, GeoValue::Section { .. }) {
                return Err(ModelError::TypeContract {
                    expected: "Section",
                    found: entry.value.kind().name(),
                });
            }
        }
        let found = self.iter().find_map(|(node, entry)| match &entry.value {
            GeoValue::Chain { sections: es } if *es == sections => Some(node),
            _ => None,
        });
        if let Some(found) = found {
            let el = self.element_mut(found).expect("live chain");
            for c in &props.classes {
                el.add_class(c);
            }
            return Ok(found);
        }
        let id = match props.id {
            Some(id) => id,
            None => {
                let names: Vec<&str> = sections
                    .iter()
                    .map(|&s| self.try_entry(s).map(|e| e.element.id.as_str()))
                    .collect::<Result<_, _>>()?;
                format!("~ {} ~", names.join(" "))
            }
        };
        let element = Element::new(id, props.classes, sections.clone(), props.guide);
        Ok(self.insert_entry(GeoValue::Chain { sections }, element))
    }

    fn chain_sections(&self, node: NodeId) -> Result<Vec<NodeId>, ModelError> {
        match &self.try_entry(node)?.value {
            GeoValue::Chain { sections } => Ok(sections.clone()),
            other => Err(ModelError::TypeContract {
                expected: "Chain",
                found: other.kind().name(),
            }),
        }
    }

    /// The distinct points along the chain, in encounter order.
    pub fn chain_points(&self, node: NodeId) -> Result<Vec<NodeId>, ModelError> {
        let mut out = Vec::new();
        for s in self.chain_sections(node)? {
            let GeoValue::Section { points } = self.try_entry(s)?.value else {
                unreachable!("chains hold sections only");
            };
            for p in points {
                if !out.contains(&p) {
                    out.push(p);
                }
            }
        }
        Ok(out)
    }

    /// The distinct segments along the chain, as endpoint pairs in
    /// encounter order.
    pub fn chain_segments(&self, node: NodeId) -> Result<Vec<(NodeId, NodeId)>, ModelError> {
        let mut out: Vec<(NodeId, NodeId)> = Vec::new();
        for s in self.chain_sections(node)? {
            let GeoValue::Section { points } = self.try_entry(s)?.value else {
                unreachable!("chains hold sections only");
            };
            for pair in [(points[0], points[1]), (points[1], points[2])] {
                let dup = out
                    .iter()
                    .any(|&(a, b)| (a, b) == pair || (b, a) == pair);
                if !dup {
                    out.push(pair);
                }
            }
        }
        Ok(out)
    }

    /// Float lengths of the chain's segments, in order.
    pub fn chain_lengths_f64(&self, node: NodeId) -> Result<Vec<f64>, ModelError> {
        self.chain_segments(node)?
            .into_iter()
            .map(|(a, b)| {
                let pa = self.point_coords(a)?;
                let pb = self.point_coords(b)?;
                Ok(crate::geometry::distance_sq(&pa, &pb).to_f64().sqrt())
            })
            .collect()
    }

    /// Flow string: one symbol per adjacent pair of segments, `<` when the
    /// length grows, `>` when it shrinks, `=` when it stays.
    pub fn chain_flow(&self, node: NodeId) -> Result<String, ModelError> {
        Ok(self
            .chain_lengths_f64(node)?
            .iter()
            .tuple_windows()
            .map(|(a, b)| {
                if (a - b).abs() < LENGTH_EPS {
                    '='
                } else if a < b {
                    '<'
                } else {
                    '>'
                }
            })
            .collect())
    }

    /// Number of local extrema in the flow, counting each direction
    /// reversal as one axis of symmetry.
    pub fn chain_symmetry_count(&self, node: NodeId) -> Result<usize, ModelError> {
        let flow = self.chain_flow(node)?;
        Ok(flow
            .chars()
            .filter(|c| *c != '=')
            .tuple_windows()
            .filter(|(a, b)| a != b)
            .count())
    }

    /// Maps the chain's distinct segment lengths, ascending, to symbolic
    /// fibonacci sums: `a`, `b`, `a+b`, `a+2*b`, `2*a+3*b`, ...
    pub fn chain_fibonacci_labels(&self, node: NodeId) -> Result<Vec<String>, ModelError> {
        let mut lengths = self.chain_lengths_f64(node)?;
        lengths.sort_by(f64::total_cmp);
        lengths.dedup_by(|a, b| (*a - *b).abs() < LENGTH_EPS);
        // coefficient pairs over the basis (a, b)
        let mut terms: Vec<(u64, u64)> = vec![(1, 0), (0, 1)];
        while terms.len() < lengths.len() {
            let [x, y] = [terms[terms.len() - 2], terms[terms.len() - 1]];
            terms.push((x.0 + y.0, x.1 + y.1));
        }
        Ok(terms
            .into_iter()
            .take(lengths.len())
            .map(|(ca, cb)| render_sum(ca, cb))
            .collect())
    }
}

fn render_sum(ca: u64, cb: u64) -> String {
    let mut parts = Vec::new();
    for (coeff, var) in [(ca, "a"), (cb, "b")] {
        match coeff {
            0 => {}
            1 => parts.push(var.to_owned()),
            n => parts.push(format!("{n}*{var}")),
        }
    }
    parts.join("+")
}
