//! End-to-end walkthrough of the vesica piscis, the opening construction
//! of Euclid I.1: two unit circles through each other's centers, the
//! baseline, and the equilateral triangle they determine.

use euclid_model::prelude::*;

fn num(n: i64) -> Expr {
    Expr::from_int(n)
}

fn build() -> (Model, NodeId, NodeId) {
    let mut m = Model::new("vesica piscis");
    let a = m.set_point(num(0), num(0), Props::new().given());
    let b = m.set_point(num(1), num(0), Props::new().given());
    m.construct_circle(a, b, Props::new()).unwrap();
    m.construct_circle(b, a, Props::new()).unwrap();
    m.construct_line(a, b, Props::new()).unwrap();
    (m, a, b)
}

#[test]
fn labels_run_alphabetically_in_discovery_order() {
    let (m, ..) = build();
    let labels: Vec<String> = m
        .points()
        .into_iter()
        .map(|p| m.element(p).unwrap().id.clone())
        .collect();
    assert_eq!(labels, ["A", "B", "C", "D", "E", "F"]);
    assert_eq!(m.last_point_id(), "F");
}

#[test]
fn the_lens_points_are_exact() {
    let (m, ..) = build();
    let top = m.node_by_id("C").unwrap();
    let bottom = m.node_by_id("D").unwrap();
    assert_eq!(
        m.point_coords(top).unwrap(),
        (Expr::rational(1, 2), Expr::surd(1, 2, 3))
    );
    assert_eq!(
        m.point_coords(bottom).unwrap(),
        (Expr::rational(1, 2), Expr::surd(-1, 2, 3))
    );
}

#[test]
fn the_triangle_is_equilateral() {
    let (mut m, a, b) = build();
    let top = m.node_by_id("C").unwrap();
    let tri = m.set_polygon(&[a, b, top], Props::new()).unwrap();
    assert_eq!(m.element(tri).unwrap().id, "< A B C >");
    for (p, q) in [(a, b), (b, top), (top, a)] {
        let pp = m.point_coords(p).unwrap();
        let qq = m.point_coords(q).unwrap();
        assert_eq!(euclid_model::geometry::distance_sq(&pp, &qq), num(1));
    }
}

#[test]
fn baseline_extends_the_point_set() {
    let (m, ..) = build();
    // the baseline picks up the circles' far crossings
    let e = m.node_by_id("E").unwrap();
    let f = m.node_by_id("F").unwrap();
    assert_eq!(m.point_coords(e).unwrap(), (num(-1), num(0)));
    assert_eq!(m.point_coords(f).unwrap(), (num(2), num(0)));
    assert_eq!(m.new_points(), [e, f]);
}

#[test]
fn summary_and_limits() {
    let (m, ..) = build();
    assert_eq!(
        m.summary(),
        Summary {
            name: "vesica piscis".to_owned(),
            elements: 9,
            points: 6,
            lines: 1,
            circles: 2,
        }
    );
    assert_eq!(m.limits().unwrap(), [[-1.0, 2.0], [-1.0, 1.0]]);
}

#[test]
fn lens_point_history_reaches_both_circles() {
    let (m, ..) = build();
    let top = m.node_by_id("C").unwrap();
    let tree = m.ancestors(top).unwrap();
    assert_eq!(tree.parents.len(), 2);
    let ids = tree.ids();
    assert!(ids.contains(&"( A B )".to_owned()));
    assert!(ids.contains(&"( B A )".to_owned()));
    let dot = tree.to_dot();
    assert!(dot.contains("\"C\" -> \"( A B )\";"));
    assert!(dot.contains("\"( A B )\" -> \"A\";"));
}

#[test]
fn redrawing_the_construction_adds_nothing() {
    let (mut m, a, b) = build();
    let before = m.len();
    m.construct_circle(a, b, Props::new()).unwrap();
    m.construct_line(a, b, Props::new()).unwrap();
    assert_eq!(m.len(), before);
    assert!(m.new_points().is_empty());
}
