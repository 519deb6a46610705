//! The classical golden-section construction: erect half a unit at one
//! end of a segment, cut the hypotenuse by that half, and swing the
//! remainder back onto the segment. The cut point lands at (√5 − 1)/2 and
//! divides the segment in the golden ratio, detected exactly.

use euclid_model::prelude::*;

fn num(n: i64) -> Expr {
    Expr::from_int(n)
}

#[test]
fn compass_construction_of_the_golden_cut() {
    let mut m = Model::new("golden section");
    let a = m.set_point(num(0), num(0), Props::new().given());
    let b = m.set_point(num(1), num(0), Props::new().given());
    let d = m.set_point(num(1), Expr::rational(1, 2), Props::new().given());

    // the circle of radius 1/2 about D, and the hypotenuse A-D through it
    m.construct_circle(d, b, Props::new()).unwrap();
    m.construct_line(a, d, Props::new()).unwrap();
    // near crossing E at distance (sqrt(5) - 1)/2 from A
    let e_x = &num(1) - &Expr::surd(1, 5, 5);
    let e_y = &Expr::rational(1, 2) - &Expr::surd(1, 10, 5);
    let e = m.set_point(e_x, e_y, Props::new());
    assert!(m.element(e).unwrap().parents().len() >= 2);

    // swing A-E down onto the baseline
    m.construct_circle(a, e, Props::new()).unwrap();
    m.construct_line(a, b, Props::new()).unwrap();
    let cut_x = &Expr::surd(1, 2, 5) - &Expr::rational(1, 2);
    let g = m.set_point(cut_x.clone(), num(0), Props::new());
    assert_eq!(m.point_coords(g).unwrap(), (cut_x, num(0)));

    let s = m.set_section([a, g, b], Props::new()).unwrap();
    assert!(m.is_golden(s).unwrap());
    assert!((m.section_ratio_f64(s).unwrap() - 1.618033988749895).abs() < 1e-12);
}

#[test]
fn chains_over_the_cut_report_flow_and_fibonacci_structure() {
    let mut m = Model::new("golden chain");
    let cut = &Expr::surd(1, 2, 5) - &Expr::rational(1, 2);
    let a = m.set_point(num(0), num(0), Props::new().given());
    let g = m.set_point(cut, num(0), Props::new().given());
    let b = m.set_point(num(1), num(0), Props::new().given());
    let tail = m.set_point(num(2), num(0), Props::new().given());

    let s1 = m.set_section([a, g, b], Props::new()).unwrap();
    let s2 = m.set_section([g, b, tail], Props::new()).unwrap();
    let chain = m.set_chain(vec![s1, s2], Props::new()).unwrap();

    assert_eq!(m.chain_points(chain).unwrap(), vec![a, g, b, tail]);
    // lengths 0.618..., 0.381..., 1.0: shrink then grow
    assert_eq!(m.chain_flow(chain).unwrap(), "><");
    assert_eq!(m.chain_symmetry_count(chain).unwrap(), 1);
    assert_eq!(
        m.chain_fibonacci_labels(chain).unwrap(),
        vec!["a", "b", "a+b"]
    );
}

#[test]
fn wedge_measures_on_the_unit_circle() {
    let mut m = Model::new("wedge");
    let o = m.set_point(num(0), num(0), Props::new().given());
    let r = m.set_point(num(1), num(0), Props::new().given());
    m.construct_circle(o, r, Props::new()).unwrap();
    let up = m.set_point(num(0), num(1), Props::new());
    let w = m.set_wedge(o, r, r, up, Props::new()).unwrap();
    assert!((m.wedge_degrees(w).unwrap() - 90.0).abs() < 1e-9);
    assert!((m.wedge_ratio(w).unwrap() - 0.25).abs() < 1e-12);
    let [start, end] = m.wedge_arc_endpoints(w).unwrap();
    assert_eq!(start, (num(1), num(0)));
    assert_eq!(end, (num(0), num(1)));
}
