//! Property-based checks of the exact scalar field.

use euclid_model::prelude::*;
use proptest::prelude::*;

fn arb_expr() -> impl Strategy<Value = Expr> {
    prop::collection::vec(
        (
            -12i64..=12,
            1i64..=6,
            prop::sample::select(vec![1u64, 2, 3, 5, 6, 7, 10]),
        ),
        0..3,
    )
    .prop_map(|terms| {
        terms
            .into_iter()
            .fold(Expr::zero(), |acc, (num, den, rad)| {
                &acc + &Expr::surd(num, den, rad)
            })
    })
}

proptest! {
    #[test]
    fn addition_commutes_and_associates(a in arb_expr(), b in arb_expr(), c in arb_expr()) {
        prop_assert_eq!(&a + &b, &b + &a);
        prop_assert_eq!(&(&a + &b) + &c, &a + &(&b + &c));
    }

    #[test]
    fn multiplication_distributes(a in arb_expr(), b in arb_expr(), c in arb_expr()) {
        prop_assert_eq!(&a * &(&b + &c), &(&a * &b) + &(&a * &c));
    }

    #[test]
    fn subtraction_inverts_addition(a in arb_expr(), b in arb_expr()) {
        prop_assert_eq!(&(&a + &b) - &b, a);
    }

    #[test]
    fn reciprocal_inverts_multiplication(a in arb_expr()) {
        prop_assume!(!a.is_zero());
        let inv = a.recip().unwrap();
        prop_assert_eq!(&a * &inv, Expr::one());
    }

    #[test]
    fn division_round_trips(a in arb_expr(), b in arb_expr()) {
        prop_assume!(!b.is_zero());
        let q = a.checked_div(&b).unwrap();
        prop_assert_eq!(&q * &b, a);
    }

    #[test]
    fn squares_admit_exact_roots(a in arb_expr()) {
        let sq = &a * &a;
        let root = sq.sqrt().unwrap();
        // the principal root is the magnitude of a
        let expected = if a.sign() < 0 { -&a } else { a };
        prop_assert_eq!(root, expected);
    }

    #[test]
    fn sign_agrees_with_float_evaluation(a in arb_expr()) {
        let approx = a.to_f64();
        match a.sign() {
            0 => prop_assert!(approx.abs() < 1e-9),
            s => {
                prop_assume!(approx.abs() > 1e-9);
                prop_assert_eq!(s > 0, approx > 0.0);
            }
        }
    }

    #[test]
    fn display_parses_back_to_the_same_value(a in arb_expr()) {
        let parsed = euclid_model::algebra::parse_expr_str(&a.to_string()).unwrap();
        prop_assert_eq!(parsed, a);
    }
}
