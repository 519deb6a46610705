//! Round-trip persistence over a model exercising every element kind.

use euclid_model::prelude::*;

fn num(n: i64) -> Expr {
    Expr::from_int(n)
}

fn rich_model() -> Model {
    let mut m = Model::new("everything");
    let a = m.set_point(num(0), num(0), Props::new().given());
    let b = m.set_point(num(1), num(0), Props::new().given());
    m.construct_circle(a, b, Props::new().class("set1")).unwrap();
    m.construct_circle(b, a, Props::new()).unwrap();
    m.construct_line(a, b, Props::new().guide()).unwrap();
    m.set_segment(a, b, Props::new().class("highlight")).unwrap();
    let top = m.node_by_id("C").unwrap();
    m.set_polygon(&[a, b, top], Props::new()).unwrap();

    let g = m.set_point(
        &Expr::surd(1, 2, 5) - &Expr::rational(1, 2),
        num(0),
        Props::new(),
    );
    let far = m.set_point(num(2), num(0), Props::new());
    let s1 = m.set_section([a, g, b], Props::new()).unwrap();
    let s2 = m.set_section([g, b, far], Props::new()).unwrap();
    m.set_chain(vec![s1, s2], Props::new()).unwrap();
    m.set_wedge(a, b, b, top, Props::new()).unwrap();
    m.add_poly(vec![num(1), num(-1), num(-1)], Props::new())
        .unwrap();
    m
}

#[test]
fn every_kind_round_trips_slot_for_slot() {
    let m = rich_model();
    let back = Model::from_json(&m.to_json().unwrap()).unwrap();
    assert_eq!(back.len(), m.len());
    assert_eq!(back.summary(), m.summary());
    for (node, entry) in m.iter() {
        let other = back.entry(node).expect("slot preserved");
        assert_eq!(other.element.id, entry.element.id, "id at slot {node}");
        assert_eq!(other.element.classes(), entry.element.classes());
        assert_eq!(other.element.parents(), entry.element.parents());
        assert_eq!(other.element.guide, entry.element.guide);
        assert_eq!(other.element.pt_radius, entry.element.pt_radius);
        assert_eq!(other.value, entry.value, "value at slot {node}");
    }
}

#[test]
fn loaded_models_keep_working() {
    let m = rich_model();
    let mut back = Model::from_json(&m.to_json().unwrap()).unwrap();
    // derived queries run against restored handles
    let s1 = back.node_by_id("/ A E B /").unwrap();
    assert!(back.is_golden(s1).unwrap());
    // the label sequence resumes past the highest minted label
    let fresh = back.set_point(num(9), num(9), Props::new());
    let fresh_id = back.element(fresh).unwrap().id.clone();
    assert!(m.node_by_id(&fresh_id).is_none());
    // and construction still deduplicates against restored values
    let a = back.node_by_id("A").unwrap();
    let b = back.node_by_id("B").unwrap();
    let before = back.len();
    back.construct_circle(a, b, Props::new()).unwrap();
    assert_eq!(back.len(), before);
}

#[test]
fn files_round_trip_through_disk() {
    let m = rich_model();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("everything.json");
    m.save(&path).unwrap();
    let back = load_model(&path).unwrap();
    assert_eq!(back.summary(), m.summary());
    assert_eq!(back.to_json().unwrap(), m.to_json().unwrap());
}

#[test]
fn documents_survive_deletion_before_saving() {
    let mut m = rich_model();
    m.delete_element("Poly1");
    let back = Model::from_json(&m.to_json().unwrap()).unwrap();
    assert_eq!(back.len(), m.len());
    assert!(back.node_by_id("Poly1").is_none());
}
