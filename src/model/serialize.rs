//! Lossless persistence of a model as a JSON document.
//!
//! Each element becomes one record: its ID, kind-revealing constructor
//! expression (`Point(...)`, `Line(Point(...), Point(...))`, ...), classes,
//! parent IDs, and flags. Scalars are printed in the exact textual grammar
//! of [`crate::algebra::parse`], so nothing is rounded.
//!
//! Loading runs in two passes. The first parses every value and indexes
//! records by ID and points by exact coordinates; the second materializes
//! entries in document order, resolving constituent references through
//! those indexes. Records enter the arena verbatim, without deduplication
//! or intersection discovery, so a round trip reproduces the model slot
//! for slot.

use crate::algebra::Expr;
use crate::algebra::parse::{ParseError, Parser, Token};
use crate::geometry::Coords;
use crate::model::{Element, GeoValue, Model, NodeId};
use crate::model_error::ModelError;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Persisted form of a whole model.
#[derive(Debug, Serialize, Deserialize)]
struct ModelDoc {
    name: String,
    #[serde(default)]
    last_point_id: String,
    elements: Vec<ElementRecord>,
}

/// Persisted form of one element.
#[derive(Debug, Serialize, Deserialize)]
struct ElementRecord {
    id: String,
    value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    parents: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    guide: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pt_radius: Option<String>,
}

impl Model {
    /// Serializes the model to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ModelError> {
        let elements = self
            .iter()
            .map(|(node, entry)| {
                Ok(ElementRecord {
                    id: entry.element.id.clone(),
                    value: self.render_value(node)?,
                    classes: entry.element.classes().to_vec(),
                    parents: entry
                        .element
                        .parents()
                        .iter()
                        .map(|&p| Ok(self.try_entry(p)?.element.id.clone()))
                        .collect::<Result<_, ModelError>>()?,
                    guide: entry.element.guide,
                    pt_radius: entry
                        .element
                        .pt_radius
                        .map(|p| Ok::<_, ModelError>(self.try_entry(p)?.element.id.clone()))
                        .transpose()?,
                })
            })
            .collect::<Result<Vec<_>, ModelError>>()?;
        let doc = ModelDoc {
            name: self.name().to_owned(),
            last_point_id: self.last_point_id().to_owned(),
            elements,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Writes the model to `path` as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let json = self.to_json()?;
        fs::write(path.as_ref(), json)?;
        info!("saved {} element(s) to {}", self.len(), path.as_ref().display());
        Ok(())
    }

    /// Constructor-expression rendering of one element's value.
    pub fn render_value(&self, node: NodeId) -> Result<String, ModelError> {
        let entry = self.try_entry(node)?;
        let mut out = String::new();
        match &entry.value {
            GeoValue::Point { x, y } => {
                write!(out, "Point({x}, {y})").ok();
            }
            GeoValue::Line { a, b } => {
                write!(
                    out,
                    "Line({}, {})",
                    self.render_point(*a)?,
                    self.render_point(*b)?
                )
                .ok();
            }
            GeoValue::Segment { a, b } => {
                write!(
                    out,
                    "Segment({}, {})",
                    self.render_point(*a)?,
                    self.render_point(*b)?
                )
                .ok();
            }
            GeoValue::Circle { center, r_sq } => {
                write!(out, "Circle({}, {r_sq})", self.render_point(*center)?).ok();
            }
            GeoValue::Polygon { vertices } => {
                out.push_str("Polygon(");
                for (i, &v) in vertices.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&self.render_point(v)?);
                }
                out.push(')');
            }
            GeoValue::Section { points } => {
                write!(
                    out,
                    "Section({}, {}, {})",
                    self.render_point(points[0])?,
                    self.render_point(points[1])?,
                    self.render_point(points[2])?
                )
                .ok();
            }
            GeoValue::Wedge { points } => {
                write!(
                    out,
                    "Wedge({}, {}, {}, {})",
                    self.render_point(points[0])?,
                    self.render_point(points[1])?,
                    self.render_point(points[2])?,
                    self.render_point(points[3])?
                )
                .ok();
            }
            GeoValue::Chain { sections } => {
                out.push_str("Chain(");
                for (i, &s) in sections.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&self.render_value(s)?);
                }
                out.push(')');
            }
            GeoValue::Polynomial { coeffs } => {
                out.push_str("Polynomial(");
                for (i, c) in coeffs.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write!(out, "{c}").ok();
                }
                out.push(')');
            }
        }
        Ok(out)
    }

    fn render_point(&self, node: NodeId) -> Result<String, ModelError> {
        let (x, y) = self.point_coords(node)?;
        Ok(format!("Point({x}, {y})"))
    }

    /// Rebuilds a model from its JSON form.
    pub fn from_json(src: &str) -> Result<Model, ModelError> {
        let doc: ModelDoc = serde_json::from_str(src)?;
        let mut model = Model::new(&doc.name);

        // pass 1: parse values, index labels, points, and sections
        let mut parsed = Vec::with_capacity(doc.elements.len());
        let mut by_label: HashMap<&str, NodeId> = HashMap::new();
        for (i, rec) in doc.elements.iter().enumerate() {
            let value = parse_value(&rec.value).map_err(|e| ModelError::MalformedValue {
                expr: rec.value.clone(),
                reason: e.to_string(),
            })?;
            if by_label.insert(&rec.id, NodeId::new(i as u32)).is_some() {
                return Err(ModelError::MalformedValue {
                    expr: rec.id.clone(),
                    reason: "duplicate element id".into(),
                });
            }
            parsed.push(value);
        }
        let mut by_coords: HashMap<&Coords, NodeId> = HashMap::new();
        let mut by_section: HashMap<&[Coords; 3], NodeId> = HashMap::new();
        for (i, value) in parsed.iter().enumerate() {
            match value {
                ParsedValue::Point(c) => {
                    by_coords.entry(c).or_insert(NodeId::new(i as u32));
                }
                ParsedValue::Section(pts) => {
                    by_section.entry(pts).or_insert(NodeId::new(i as u32));
                }
                _ => {}
            }
        }

        // pass 2: materialize in document order
        for (rec, value) in doc.elements.iter().zip(&parsed) {
            let pt = |c: &Coords| -> Result<NodeId, ModelError> {
                by_coords.get(c).copied().ok_or_else(|| unresolved(rec, &format!("Point({}, {})", c.0, c.1)))
            };
            let geo = match value {
                ParsedValue::Point(c) => GeoValue::Point {
                    x: c.0.clone(),
                    y: c.1.clone(),
                },
                ParsedValue::Line(ends) => GeoValue::Line {
                    a: pt(&ends[0])?,
                    b: pt(&ends[1])?,
                },
                ParsedValue::Segment(ends) => GeoValue::Segment {
                    a: pt(&ends[0])?,
                    b: pt(&ends[1])?,
                },
                ParsedValue::Circle { center, r_sq } => GeoValue::Circle {
                    center: pt(center)?,
                    r_sq: r_sq.clone(),
                },
                ParsedValue::Polygon(vs) => GeoValue::Polygon {
                    vertices: vs.iter().map(&pt).collect::<Result<_, _>>()?,
                },
                ParsedValue::Section(pts) => GeoValue::Section {
                    points: [pt(&pts[0])?, pt(&pts[1])?, pt(&pts[2])?],
                },
                ParsedValue::Wedge(pts) => GeoValue::Wedge {
                    points: [pt(&pts[0])?, pt(&pts[1])?, pt(&pts[2])?, pt(&pts[3])?],
                },
                ParsedValue::Chain(sections) => GeoValue::Chain {
                    sections: sections
                        .iter()
                        .map(|pts| {
                            by_section
                                .get(pts)
                                .copied()
                                .ok_or_else(|| unresolved(rec, "constituent section"))
                        })
                        .collect::<Result<_, _>>()?,
                },
                ParsedValue::Polynomial(coeffs) => GeoValue::Polynomial {
                    coeffs: coeffs.clone(),
                },
            };
            let parents = rec
                .parents
                .iter()
                .map(|p| {
                    by_label
                        .get(p.as_str())
                        .copied()
                        .ok_or_else(|| unresolved(rec, p))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let pt_radius = rec
                .pt_radius
                .as_deref()
                .map(|p| {
                    by_label
                        .get(p)
                        .copied()
                        .ok_or_else(|| unresolved(rec, p))
                })
                .transpose()?;
            let mut element = Element::new(rec.id.clone(), rec.classes.clone(), parents, rec.guide);
            element.pt_radius = pt_radius;
            model.push_raw(geo, element);
        }

        model.restore_counters(&doc);
        info!("loaded {} element(s) into `{}`", model.len(), model.name());
        Ok(model)
    }

    fn restore_counters(&mut self, doc: &ModelDoc) {
        self.last_point_id = doc.last_point_id.clone();
        self.label_cursor = if doc.last_point_id.is_empty() {
            0
        } else {
            match Model::decode_label(&doc.last_point_id) {
                Some(i) => i + 1,
                None => {
                    warn!(
                        "last point id `{}` is outside the label sequence",
                        doc.last_point_id
                    );
                    0
                }
            }
        };
        self.poly_count = doc
            .elements
            .iter()
            .filter_map(|r| r.id.strip_prefix("Poly").and_then(|n| n.parse::<usize>().ok()))
            .max()
            .unwrap_or(0);
    }
}

fn unresolved(rec: &ElementRecord, reference: &str) -> ModelError {
    ModelError::UnresolvedReference {
        id: rec.id.clone(),
        reference: reference.to_owned(),
    }
}

/// Loads a model from a JSON file.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Model, ModelError> {
    let src = fs::read_to_string(path)?;
    Model::from_json(&src)
}

/// Structure of one parsed constructor expression, with constituents still
/// as raw coordinates.
#[derive(Debug, Clone, PartialEq)]
enum ParsedValue {
    Point(Coords),
    Line([Coords; 2]),
    Segment([Coords; 2]),
    Circle { center: Coords, r_sq: Expr },
    Polygon(Vec<Coords>),
    Section([Coords; 3]),
    Wedge([Coords; 4]),
    Chain(Vec<[Coords; 3]>),
    Polynomial(Vec<Expr>),
}

fn parse_value(src: &str) -> Result<ParsedValue, ParseError> {
    let mut p = Parser::new(src)?;
    let v = parse_constructor(&mut p)?;
    p.finish()?;
    Ok(v)
}

fn parse_constructor(p: &mut Parser) -> Result<ParsedValue, ParseError> {
    let head = p.expect_ident()?;
    p.expect(Token::LParen)?;
    let v = match head.as_str() {
        "Point" => ParsedValue::Point(parse_point_args(p)?),
        "Line" => {
            let a = parse_point(p)?;
            p.expect(Token::Comma)?;
            let b = parse_point(p)?;
            ParsedValue::Line([a, b])
        }
        "Segment" => {
            let a = parse_point(p)?;
            p.expect(Token::Comma)?;
            let b = parse_point(p)?;
            ParsedValue::Segment([a, b])
        }
        "Circle" => {
            let center = parse_point(p)?;
            p.expect(Token::Comma)?;
            let r_sq = p.parse_expr()?;
            ParsedValue::Circle { center, r_sq }
        }
        "Polygon" => {
            let mut vs = vec![parse_point(p)?];
            while p.eat(&Token::Comma) {
                vs.push(parse_point(p)?);
            }
            ParsedValue::Polygon(vs)
        }
        "Section" => {
            let a = parse_point(p)?;
            p.expect(Token::Comma)?;
            let b = parse_point(p)?;
            p.expect(Token::Comma)?;
            let c = parse_point(p)?;
            ParsedValue::Section([a, b, c])
        }
        "Wedge" => {
            let a = parse_point(p)?;
            p.expect(Token::Comma)?;
            let b = parse_point(p)?;
            p.expect(Token::Comma)?;
            let c = parse_point(p)?;
            p.expect(Token::Comma)?;
            let d = parse_point(p)?;
            ParsedValue::Wedge([a, b, c, d])
        }
        "Chain" => {
            let mut sections = vec![parse_section(p)?];
            while p.eat(&Token::Comma) {
                sections.push(parse_section(p)?);
            }
            ParsedValue::Chain(sections)
        }
        "Polynomial" => {
            let mut coeffs = vec![p.parse_expr()?];
            while p.eat(&Token::Comma) {
                coeffs.push(p.parse_expr()?);
            }
            ParsedValue::Polynomial(coeffs)
        }
        other => return Err(ParseError(format!("unknown constructor `{other}`"))),
    };
    p.expect(Token::RParen)?;
    Ok(v)
}

fn parse_section(p: &mut Parser) -> Result<[Coords; 3], ParseError> {
    let head = p.expect_ident()?;
    if head != "Section" {
        return Err(ParseError(format!("expected `Section`, found `{head}`")));
    }
    p.expect(Token::LParen)?;
    let a = parse_point(p)?;
    p.expect(Token::Comma)?;
    let b = parse_point(p)?;
    p.expect(Token::Comma)?;
    let c = parse_point(p)?;
    p.expect(Token::RParen)?;
    Ok([a, b, c])
}

fn parse_point(p: &mut Parser) -> Result<Coords, ParseError> {
    let head = p.expect_ident()?;
    if head != "Point" {
        return Err(ParseError(format!("expected `Point`, found `{head}`")));
    }
    p.expect(Token::LParen)?;
    let c = parse_point_args(p)?;
    p.expect(Token::RParen)?;
    Ok(c)
}

fn parse_point_args(p: &mut Parser) -> Result<Coords, ParseError> {
    let x = p.parse_expr()?;
    p.expect(Token::Comma)?;
    let y = p.parse_expr()?;
    Ok((x, y))
}
