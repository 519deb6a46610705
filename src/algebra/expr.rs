//! `Expr`: exact quadratic-surd numbers.
//!
//! An `Expr` is a normalized finite sum `Σ qᵢ·√rᵢ` with rational
//! coefficients `qᵢ` and distinct squarefree positive integer radicands
//! `rᵢ` (radicand 1 holds the rational part). Normalization is canonical:
//! zero coefficients are dropped and every radicand is reduced to its
//! squarefree core, so structural equality *is* exact value equality and
//! `Expr` can serve directly as a deduplication key.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use thiserror::Error;

/// Errors from exact arithmetic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AlgebraError {
    /// Division or inversion of an exact zero.
    #[error("division by zero")]
    DivisionByZero,
    /// Square root of a negative value.
    #[error("square root of negative value `{0}`")]
    NegativeSqrt(String),
    /// The square root exists but does not denest into the surd field.
    #[error("square root does not denest: `{0}`")]
    NotRepresentable(String),
}

/// Small primes for trial division; covers every radicand realistic
/// constructions produce before falling back to incremental division.
static SMALL_PRIMES: Lazy<Vec<u64>> = Lazy::new(|| {
    let mut sieve = vec![true; 1000];
    let mut primes = Vec::new();
    for p in 2..sieve.len() {
        if sieve[p] {
            primes.push(p as u64);
            let mut q = p * p;
            while q < sieve.len() {
                sieve[q] = false;
                q += p;
            }
        }
    }
    primes
});

/// An exact number in the multiquadratic surd field.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Expr {
    /// squarefree radicand → rational coefficient; radicand 1 is the
    /// rational part. Invariant: no zero coefficients, radicands squarefree.
    terms: BTreeMap<BigUint, BigRational>,
}

impl Expr {
    /// The additive identity.
    pub fn zero() -> Self {
        Expr::default()
    }

    /// The multiplicative identity.
    pub fn one() -> Self {
        Expr::from_int(1)
    }

    /// An exact integer.
    pub fn from_int(n: i64) -> Self {
        Expr::from_big(BigRational::from(BigInt::from(n)))
    }

    /// An exact rational `num/den`.
    ///
    /// # Panics
    /// Panics if `den == 0`; use [`Expr::checked_div`] for fallible division.
    pub fn rational(num: i64, den: i64) -> Self {
        assert!(den != 0, "rational denominator must be non-zero");
        Expr::from_big(BigRational::new(BigInt::from(num), BigInt::from(den)))
    }

    /// Wraps a `BigRational` as a pure rational value.
    pub fn from_big(q: BigRational) -> Self {
        let mut e = Expr::default();
        e.insert_term(BigUint::one(), q);
        e
    }

    /// `coeff·√radicand`, normalized (the radicand is reduced squarefree).
    pub fn surd(coeff_num: i64, coeff_den: i64, radicand: u64) -> Self {
        assert!(coeff_den != 0, "surd coefficient denominator must be non-zero");
        let c = BigRational::new(BigInt::from(coeff_num), BigInt::from(coeff_den));
        Expr::surd_big(c, BigUint::from(radicand))
    }

    fn surd_big(coeff: BigRational, radicand: BigUint) -> Self {
        let (outer, inner) = squarefree_split(&radicand);
        let mut e = Expr::default();
        e.insert_term(inner, coeff * BigRational::from(BigInt::from(outer)));
        e
    }

    /// `√p` for a squarefree radicand already in reduced form.
    fn sqrt_of(radicand: BigUint) -> Self {
        let mut e = Expr::default();
        e.insert_term(radicand, BigRational::one());
        e
    }

    fn insert_term(&mut self, radicand: BigUint, coeff: BigRational) {
        if coeff.is_zero() {
            return;
        }
        use std::collections::btree_map::Entry;
        match self.terms.entry(radicand) {
            Entry::Vacant(v) => {
                v.insert(coeff);
            }
            Entry::Occupied(mut o) => {
                *o.get_mut() += coeff;
                if o.get().is_zero() {
                    o.remove();
                }
            }
        }
    }

    /// Exact zero test.
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// True when the value has no surd part.
    pub fn is_rational(&self) -> bool {
        self.terms.len() <= 1 && self.terms.keys().all(|r| r.is_one())
    }

    /// The value as a rational, if it has no surd part.
    pub fn as_rational(&self) -> Option<BigRational> {
        if self.is_zero() {
            return Some(BigRational::zero());
        }
        if self.is_rational() {
            self.terms.values().next().cloned()
        } else {
            None
        }
    }

    /// Floating approximation.
    pub fn to_f64(&self) -> f64 {
        self.terms
            .iter()
            .map(|(r, c)| {
                let rad = r.to_f64().unwrap_or(f64::INFINITY);
                c.to_f64().unwrap_or(f64::NAN) * rad.sqrt()
            })
            .sum()
    }

    /// Sign of the value: -1, 0, or +1.
    ///
    /// Zero is decided exactly. A value whose coefficients all share one sign
    /// is decided exactly as well (every `√r` is positive). Mixed-sign sums
    /// fall back to the floating approximation after exact zero has been
    /// excluded; that is correct as long as the value's magnitude exceeds
    /// the rounding error of the f64 term sum, roughly `1e-15` times the
    /// largest term. Values closer to zero than that bound would need sign
    /// determination by repeated conjugate squaring, which this type does
    /// not implement.
    pub fn sign(&self) -> i8 {
        if self.is_zero() {
            return 0;
        }
        let mut pos = false;
        let mut neg = false;
        for c in self.terms.values() {
            if c.is_negative() {
                neg = true;
            } else {
                pos = true;
            }
        }
        match (pos, neg) {
            (true, false) => 1,
            (false, true) => -1,
            _ => {
                if self.to_f64() >= 0.0 {
                    1
                } else {
                    -1
                }
            }
        }
    }

    /// Exact multiplicative inverse.
    ///
    /// Rationals invert directly. Otherwise the value is split as
    /// `u + √p·v` over some prime `p` occurring in a radicand; multiplying
    /// by the conjugate `u − √p·v` eliminates `p`, and the rationalized
    /// denominator `u² − p·v²` is inverted recursively. Each step removes
    /// one prime, so the recursion terminates.
    pub fn recip(&self) -> Result<Expr, AlgebraError> {
        if self.is_zero() {
            return Err(AlgebraError::DivisionByZero);
        }
        if let Some(q) = self.as_rational() {
            return Ok(Expr::from_big(BigRational::one() / q));
        }
        let p = self
            .terms
            .keys()
            .find(|r| !r.is_one())
            .map(|r| smallest_prime_factor(r))
            .expect("non-rational value has a surd radicand");
        let mut u = Expr::default();
        let mut v = Expr::default();
        for (r, c) in &self.terms {
            if (r % &p).is_zero() {
                v.insert_term(r / &p, c.clone());
            } else {
                u.insert_term(r.clone(), c.clone());
            }
        }
        let p_rat = Expr::from_big(BigRational::from(BigInt::from(p.clone())));
        let denom = &(&u * &u) - &(&p_rat * &(&v * &v));
        let denom_inv = denom.recip()?;
        Ok(&(&u - &(&Expr::sqrt_of(p) * &v)) * &denom_inv)
    }

    /// Exact division.
    pub fn checked_div(&self, rhs: &Expr) -> Result<Expr, AlgebraError> {
        Ok(self * &rhs.recip()?)
    }

    /// Exact square root with radical denesting.
    ///
    /// Handles rationals (`√(p/q)` reduced to `c·√m`) and single-surd sums
    /// `a + b·√r` whose classical denesting applies, i.e. when `a² − b²r`
    /// is the square of a rational. Anything else is reported as
    /// [`AlgebraError::NotRepresentable`]; the caller decides whether that
    /// aborts a construction.
    pub fn sqrt(&self) -> Result<Expr, AlgebraError> {
        match self.sign() {
            0 => return Ok(Expr::zero()),
            -1 => return Err(AlgebraError::NegativeSqrt(self.to_string())),
            _ => {}
        }
        if let Some(q) = self.as_rational() {
            let (coeff, radicand) = sqrt_rational(&q);
            return Ok(Expr::surd_big(coeff, radicand));
        }
        // a + b·√r: denest when d = √(a² − b²·r) is rational, giving
        // √x = √((a+d)/2) + sign(b)·√((a−d)/2).
        if self.terms.len() == 2 {
            if let Some(a) = self.terms.get(&BigUint::one()) {
                let (r, b) = self
                    .terms
                    .iter()
                    .find(|(r, _)| !r.is_one())
                    .expect("two terms, one rational");
                let d2 = a * a - b * b * BigRational::from(BigInt::from(r.clone()));
                if !d2.is_negative() {
                    let (d, rem) = sqrt_rational(&d2);
                    if rem.is_one() {
                        let half = BigRational::new(BigInt::one(), BigInt::from(2));
                        let s1 = (a + &d) * &half;
                        let s2 = (a - &d) * &half;
                        let (c1, m1) = sqrt_rational(&s1);
                        let (c2, m2) = sqrt_rational(&s2);
                        let second = if b.is_negative() { -c2 } else { c2 };
                        return Ok(&Expr::surd_big(c1, m1) + &Expr::surd_big(second, m2));
                    }
                }
            }
        }
        Err(AlgebraError::NotRepresentable(self.to_string()))
    }
}

/// `√q` for a non-negative rational, as `(coefficient, squarefree radicand)`.
fn sqrt_rational(q: &BigRational) -> (BigRational, BigUint) {
    debug_assert!(!q.is_negative());
    if q.is_zero() {
        return (BigRational::zero(), BigUint::one());
    }
    let num = q.numer().magnitude().clone();
    let den = q.denom().magnitude().clone();
    // √(n/d) = √(n·d)/d
    let (outer, inner) = squarefree_split(&(&num * &den));
    let coeff = BigRational::new(BigInt::from(outer), BigInt::from(den));
    (coeff, inner)
}

/// Splits `n` as `outer² · inner` with `inner` squarefree.
fn squarefree_split(n: &BigUint) -> (BigUint, BigUint) {
    let mut n = n.clone();
    let mut outer = BigUint::one();
    let mut inner = BigUint::one();
    let strip = |d: &BigUint, n: &mut BigUint, outer: &mut BigUint, inner: &mut BigUint| {
        if (&*n % d).is_zero() {
            let mut e = 0u32;
            while (&*n % d).is_zero() {
                *n /= d;
                e += 1;
            }
            *outer *= d.pow(e / 2);
            if e % 2 == 1 {
                *inner *= d;
            }
        }
    };
    for p in SMALL_PRIMES.iter() {
        let d = BigUint::from(*p);
        if &d * &d > n {
            break;
        }
        strip(&d, &mut n, &mut outer, &mut inner);
    }
    let mut d = BigUint::from(*SMALL_PRIMES.last().expect("prime table non-empty") + 2);
    while &d * &d <= n {
        strip(&d, &mut n, &mut outer, &mut inner);
        d += BigUint::from(2u32);
    }
    if !n.is_one() {
        inner *= n;
    }
    (outer, inner)
}

/// Smallest prime factor of a squarefree radicand.
fn smallest_prime_factor(n: &BigUint) -> BigUint {
    for p in SMALL_PRIMES.iter() {
        let d = BigUint::from(*p);
        if (n % &d).is_zero() {
            return d;
        }
        if &d * &d > *n {
            break;
        }
    }
    let mut d = BigUint::from(*SMALL_PRIMES.last().expect("prime table non-empty") + 2);
    while &d * &d <= *n {
        if (n % &d).is_zero() {
            return d;
        }
        d += BigUint::from(2u32);
    }
    n.clone()
}

// -----------------------------------------------------------------------------
// Ring operations
// -----------------------------------------------------------------------------

impl Add for &Expr {
    type Output = Expr;
    fn add(self, rhs: &Expr) -> Expr {
        let mut out = self.clone();
        for (r, c) in &rhs.terms {
            out.insert_term(r.clone(), c.clone());
        }
        out
    }
}

impl Sub for &Expr {
    type Output = Expr;
    fn sub(self, rhs: &Expr) -> Expr {
        let mut out = self.clone();
        for (r, c) in &rhs.terms {
            out.insert_term(r.clone(), -c.clone());
        }
        out
    }
}

impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        let mut out = Expr::default();
        for (r, c) in &self.terms {
            out.insert_term(r.clone(), -c.clone());
        }
        out
    }
}

impl Mul for &Expr {
    type Output = Expr;
    fn mul(self, rhs: &Expr) -> Expr {
        let mut out = Expr::default();
        for (r1, c1) in &self.terms {
            for (r2, c2) in &rhs.terms {
                // √r1·√r2 = g·√(r1·r2/g²) with g = gcd(r1, r2); the product
                // of two squarefree radicands stays squarefree after the
                // shared factor is pulled out front.
                let g = r1.gcd(r2);
                let radicand = (r1 / &g) * (r2 / &g);
                let coeff = c1 * c2 * BigRational::from(BigInt::from(g));
                out.insert_term(radicand, coeff);
            }
        }
        out
    }
}

impl Div for &Expr {
    type Output = Expr;
    /// # Panics
    /// Panics on division by zero; library code uses [`Expr::checked_div`].
    fn div(self, rhs: &Expr) -> Expr {
        self.checked_div(rhs)
            .expect("division by zero; use checked_div")
    }
}

macro_rules! forward_owned_binop {
    ($trait:ident, $method:ident) => {
        impl $trait for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                $trait::$method(&self, &rhs)
            }
        }
    };
}
forward_owned_binop!(Add, add);
forward_owned_binop!(Sub, sub);
forward_owned_binop!(Mul, mul);
forward_owned_binop!(Div, div);

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        -&self
    }
}

// -----------------------------------------------------------------------------
// Formatting
// -----------------------------------------------------------------------------

impl fmt::Display for Expr {
    /// Canonical text form, e.g. `1/2 + 3/2*sqrt(5)`. Round-trips through
    /// [`crate::algebra::parse_expr_str`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return f.write_str("0");
        }
        for (i, (r, c)) in self.terms.iter().enumerate() {
            let negative = c.is_negative();
            if i == 0 {
                if negative {
                    f.write_str("-")?;
                }
            } else if negative {
                f.write_str(" - ")?;
            } else {
                f.write_str(" + ")?;
            }
            let mag = c.abs();
            if r.is_one() {
                write!(f, "{mag}")?;
            } else if mag.is_one() {
                write!(f, "sqrt({r})")?;
            } else {
                write!(f, "{mag}*sqrt({r})")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqrt_int(n: u64) -> Expr {
        Expr::surd(1, 1, n)
    }

    #[test]
    fn radicands_reduce_squarefree() {
        // √12 = 2√3
        assert_eq!(sqrt_int(12), &Expr::from_int(2) * &sqrt_int(3));
        // √49 = 7
        assert_eq!(sqrt_int(49), Expr::from_int(7));
    }

    #[test]
    fn zero_terms_drop_out() {
        let x = &sqrt_int(2) - &sqrt_int(2);
        assert!(x.is_zero());
        assert_eq!(x, Expr::zero());
    }

    #[test]
    fn product_of_surds() {
        // √2·√3 = √6
        assert_eq!(&sqrt_int(2) * &sqrt_int(3), sqrt_int(6));
        // √6·√10 = 2√15
        assert_eq!(
            &sqrt_int(6) * &sqrt_int(10),
            &Expr::from_int(2) * &sqrt_int(15)
        );
        // (√2)² = 2
        assert_eq!(&sqrt_int(2) * &sqrt_int(2), Expr::from_int(2));
    }

    #[test]
    fn recip_of_surd_sum() {
        // 1/(1+√2) = √2 − 1
        let x = &Expr::one() + &sqrt_int(2);
        let inv = x.recip().unwrap();
        assert_eq!(inv, &sqrt_int(2) - &Expr::one());
        assert_eq!(&x * &inv, Expr::one());
    }

    #[test]
    fn recip_of_multi_surd_sum() {
        let x = &(&Expr::one() + &sqrt_int(2)) + &sqrt_int(3);
        let inv = x.recip().unwrap();
        assert_eq!(&x * &inv, Expr::one());
    }

    #[test]
    fn recip_of_zero_fails() {
        assert_eq!(Expr::zero().recip(), Err(AlgebraError::DivisionByZero));
    }

    #[test]
    fn sqrt_of_rational() {
        // √(3/4) = √3/2
        assert_eq!(Expr::rational(3, 4).sqrt().unwrap(), Expr::surd(1, 2, 3));
        // √(9/4) = 3/2
        assert_eq!(Expr::rational(9, 4).sqrt().unwrap(), Expr::rational(3, 2));
    }

    #[test]
    fn sqrt_denests() {
        // √(3 + 2√2) = 1 + √2
        let x = &Expr::from_int(3) + &(&Expr::from_int(2) * &sqrt_int(2));
        assert_eq!(x.sqrt().unwrap(), &Expr::one() + &sqrt_int(2));
        // √(3 − 2√2) = √2 − 1
        let y = &Expr::from_int(3) - &(&Expr::from_int(2) * &sqrt_int(2));
        assert_eq!(y.sqrt().unwrap(), &sqrt_int(2) - &Expr::one());
    }

    #[test]
    fn sqrt_that_does_not_denest_is_reported() {
        let x = &Expr::one() + &sqrt_int(2);
        assert!(matches!(x.sqrt(), Err(AlgebraError::NotRepresentable(_))));
    }

    #[test]
    fn sqrt_of_negative_is_reported() {
        assert!(matches!(
            Expr::from_int(-1).sqrt(),
            Err(AlgebraError::NegativeSqrt(_))
        ));
    }

    #[test]
    fn sign_and_eval() {
        let phi = &Expr::rational(1, 2) + &Expr::surd(1, 2, 5);
        assert_eq!(phi.sign(), 1);
        assert!((phi.to_f64() - 1.618_033_988_749_895).abs() < 1e-12);
        let x = &Expr::one() - &sqrt_int(2);
        assert_eq!(x.sign(), -1);
    }

    #[test]
    fn display_canonical() {
        let x = &Expr::rational(1, 2) + &Expr::surd(-3, 2, 5);
        assert_eq!(x.to_string(), "1/2 - 3/2*sqrt(5)");
        assert_eq!(Expr::zero().to_string(), "0");
        assert_eq!(sqrt_int(2).to_string(), "sqrt(2)");
        assert_eq!((-&sqrt_int(2)).to_string(), "-sqrt(2)");
    }

    #[test]
    fn squarefree_split_strips_squares() {
        let (outer, inner) = squarefree_split(&BigUint::from(360u32));
        // 360 = 6² · 10
        assert_eq!(outer, BigUint::from(6u32));
        assert_eq!(inner, BigUint::from(10u32));
    }
}
