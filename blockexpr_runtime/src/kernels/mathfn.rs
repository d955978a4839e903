//! Math-library kernels (spec.md §4.5): transcendental, rounding, and
//! combinatorial builtins.
//!
//! Grounded on the teacher's `intrinsics.rs` scalar wrappers, generalized
//! from one `f64` at a time to a whole `Buffer`. Non-float, non-complex
//! operands take the "cold path" spec.md §4.5 describes: widen every
//! element to `f64`, apply the function, narrow back to the node's own
//! dtype (which, per `stamp_call_dtype`'s generic fallback, is the child's
//! own dtype rather than always `F64`).

use crate::complex::{Complex32, Complex64};
use crate::kernels::convert::{buffer_to_f64, narrow_from_f64};
use crate::value::Buffer;

/// Apply a real-valued scalar function to every element, float buffers
/// computed natively and everything else via the f64 cold path.
pub fn unary_real(buf: &Buffer, f: impl Fn(f64) -> f64) -> Buffer {
    match buf {
        Buffer::F32(v) => Buffer::F32(v.iter().map(|&x| f(x as f64) as f32).collect()),
        Buffer::F64(v) => Buffer::F64(v.iter().map(|&x| f(x)).collect()),
        Buffer::C64(v) => Buffer::C64(
            v.iter()
                .map(|c| Complex32::new(f(c.re as f64) as f32, f(c.im as f64) as f32))
                .collect(),
        ),
        Buffer::C128(v) => Buffer::C128(v.iter().map(|c| Complex64::new(f(c.re), f(c.im))).collect()),
        other => {
            let reals = buffer_to_f64(other);
            let mapped: Vec<f64> = reals.iter().map(|&x| f(x)).collect();
            narrow_from_f64(&mapped, other.dtype())
        }
    }
}

fn binary_real(lhs: &Buffer, rhs: &Buffer, f: impl Fn(f64, f64) -> f64) -> Buffer {
    match (lhs, rhs) {
        (Buffer::F32(a), Buffer::F32(b)) => {
            Buffer::F32(a.iter().zip(b).map(|(&x, &y)| f(x as f64, y as f64) as f32).collect())
        }
        (Buffer::F64(a), Buffer::F64(b)) => Buffer::F64(a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect()),
        _ => {
            let a = buffer_to_f64(lhs);
            let b = buffer_to_f64(rhs);
            let mapped: Vec<f64> = a.iter().zip(b.iter()).map(|(&x, &y)| f(x, y)).collect();
            narrow_from_f64(&mapped, lhs.dtype())
        }
    }
}

macro_rules! unary_math_fn {
    ($name:ident, $f:expr) => {
        pub fn $name(buf: &Buffer) -> Buffer {
            unary_real(buf, $f)
        }
    };
}

unary_math_fn!(sin, f64::sin);
unary_math_fn!(cos, f64::cos);
unary_math_fn!(tan, f64::tan);
unary_math_fn!(asin, f64::asin);
unary_math_fn!(acos, f64::acos);
unary_math_fn!(atan, f64::atan);
unary_math_fn!(sinh, f64::sinh);
unary_math_fn!(cosh, f64::cosh);
unary_math_fn!(tanh, f64::tanh);
unary_math_fn!(asinh, f64::asinh);
unary_math_fn!(acosh, f64::acosh);
unary_math_fn!(atanh, f64::atanh);
unary_math_fn!(exp2, f64::exp2);
unary_math_fn!(expm1, f64::exp_m1);
unary_math_fn!(log2, f64::log2);
unary_math_fn!(log10, f64::log10);
unary_math_fn!(log1p, f64::ln_1p);
unary_math_fn!(cbrt, f64::cbrt);
unary_math_fn!(floor, f64::floor);
unary_math_fn!(ceil, f64::ceil);
unary_math_fn!(round, f64::round);
unary_math_fn!(trunc, f64::trunc);
unary_math_fn!(rint, f64::round);
unary_math_fn!(sinpi, |x: f64| (x * std::f64::consts::PI).sin());
unary_math_fn!(cospi, |x: f64| (x * std::f64::consts::PI).cos());

pub fn exp10(buf: &Buffer) -> Buffer {
    unary_real(buf, |x| 10f64.powf(x))
}

/// `fabs` is the builtin name for absolute value; it shares [`abs`]'s
/// complex-to-real-modulus behavior.
pub fn fabs(buf: &Buffer) -> Buffer {
    abs(buf)
}

pub fn sign(buf: &Buffer) -> Buffer {
    unary_real(buf, |x| if x > 0.0 { 1.0 } else if x < 0.0 { -1.0 } else { 0.0 })
}

pub fn recip(buf: &Buffer) -> Buffer {
    unary_real(buf, |x| 1.0 / x)
}

/// Absolute value; complex buffers return the real-valued modulus rather
/// than routing through `unary_real`'s component-wise fallback (spec.md
/// §4.6 calls this out explicitly: "abs of a complex operand produces a
/// real-valued magnitude, not a complex result").
pub fn abs(buf: &Buffer) -> Buffer {
    match buf {
        Buffer::C64(v) => Buffer::F32(v.iter().map(|c| c.abs()).collect()),
        Buffer::C128(v) => Buffer::F64(v.iter().map(|c| c.abs()).collect()),
        Buffer::I8(v) => Buffer::I8(v.iter().map(|x| x.wrapping_abs()).collect()),
        Buffer::I16(v) => Buffer::I16(v.iter().map(|x| x.wrapping_abs()).collect()),
        Buffer::I32(v) => Buffer::I32(v.iter().map(|x| x.wrapping_abs()).collect()),
        Buffer::I64(v) => Buffer::I64(v.iter().map(|x| x.wrapping_abs()).collect()),
        Buffer::U8(v) => Buffer::U8(v.clone()),
        Buffer::U16(v) => Buffer::U16(v.clone()),
        Buffer::U32(v) => Buffer::U32(v.clone()),
        Buffer::U64(v) => Buffer::U64(v.clone()),
        Buffer::F32(v) => Buffer::F32(v.iter().map(|x| x.abs()).collect()),
        Buffer::F64(v) => Buffer::F64(v.iter().map(|x| x.abs()).collect()),
        Buffer::Bool(v) => Buffer::Bool(v.clone()),
        Buffer::Str(_) => unreachable!("abs is never stamped onto a Str operand"),
    }
}

/// `ln`/`exp`/`log` keep clean polar-form definitions over complex inputs,
/// so they get their own dispatch rather than routing through the
/// component-wise `unary_real` fallback.
pub fn exp(buf: &Buffer) -> Buffer {
    match buf {
        Buffer::C64(v) => Buffer::C64(
            v.iter()
                .map(|c| {
                    let mag = (c.re as f64).exp();
                    Complex32::new((mag * (c.im as f64).cos()) as f32, (mag * (c.im as f64).sin()) as f32)
                })
                .collect(),
        ),
        Buffer::C128(v) => Buffer::C128(
            v.iter()
                .map(|c| {
                    let mag = c.re.exp();
                    Complex64::new(mag * c.im.cos(), mag * c.im.sin())
                })
                .collect(),
        ),
        other => unary_real(other, f64::exp),
    }
}

pub fn ln(buf: &Buffer) -> Buffer {
    match buf {
        Buffer::C64(v) => Buffer::C64(
            v.iter()
                .map(|c| {
                    let c64: Complex64 = (*c).into();
                    let out = Complex64::new(c64.abs().ln(), c64.im.atan2(c64.re));
                    out.into()
                })
                .collect(),
        ),
        Buffer::C128(v) => Buffer::C128(
            v.iter()
                .map(|c| Complex64::new(c.abs().ln(), c.im.atan2(c.re)))
                .collect(),
        ),
        other => unary_real(other, f64::ln),
    }
}

pub fn log(buf: &Buffer) -> Buffer {
    ln(buf)
}

/// Two-argument math-library builtins (spec.md §3.2's arity-2 transcendental
/// family): both operands share a common dtype after promotion, so the
/// real-valued path is always exercised.
pub fn atan2(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    binary_real(lhs, rhs, f64::atan2)
}
pub fn copysign(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    binary_real(lhs, rhs, f64::copysign)
}
pub fn fdim(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    binary_real(lhs, rhs, |x, y| if x > y { x - y } else { 0.0 })
}
pub fn fmax(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    binary_real(lhs, rhs, f64::max)
}
pub fn fmin(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    binary_real(lhs, rhs, f64::min)
}
pub fn fmod(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    binary_real(lhs, rhs, |x, y| x % y)
}
pub fn hypot(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    binary_real(lhs, rhs, f64::hypot)
}
pub fn ldexp(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    binary_real(lhs, rhs, |x, y| x * 2f64.powi(y as i32))
}
pub fn remainder(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    binary_real(lhs, rhs, |x, y| x - y * (x / y).round())
}
pub fn nextafter(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    binary_real(lhs, rhs, next_after_f64)
}

fn next_after_f64(x: f64, to: f64) -> f64 {
    if x == to || x.is_nan() || to.is_nan() {
        return to;
    }
    if x == 0.0 {
        return if to > 0.0 { f64::MIN_POSITIVE } else { -f64::MIN_POSITIVE };
    }
    let bits = x.to_bits() as i64;
    let next_bits = if (x < to) == (x > 0.0) { bits + 1 } else { bits - 1 };
    f64::from_bits(next_bits as u64)
}

/// `log(exp(a) + exp(b))` computed without intermediate overflow.
pub fn logaddexp(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    binary_real(lhs, rhs, |x, y| {
        let m = x.max(y);
        if m == f64::NEG_INFINITY {
            m
        } else {
            m + ((x - m).exp() + (y - m).exp()).ln()
        }
    })
}

pub fn fma(a: &Buffer, b: &Buffer, c: &Buffer) -> Buffer {
    let ab = binary_real(a, b, |x, y| x * y);
    let abf = buffer_to_f64(&ab);
    let cf = buffer_to_f64(c);
    let out: Vec<f64> = abf.iter().zip(cf.iter()).map(|(&x, &y)| x + y).collect();
    narrow_from_f64(&out, a.dtype())
}

/// Abramowitz & Stegun 7.1.26, |error| < 1.5e-7; no special-math crate in
/// the retrieval pack, so this is a hand-written rational approximation.
fn erf_scalar(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;
    let t = 1.0 / (1.0 + p * x);
    let poly = ((((a5 * t + a4) * t + a3) * t + a2) * t + a1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

pub fn erf(buf: &Buffer) -> Buffer {
    unary_real(buf, erf_scalar)
}

pub fn erfc(buf: &Buffer) -> Buffer {
    unary_real(buf, |x| 1.0 - erf_scalar(x))
}

/// Lanczos approximation (g=7, n=9 coefficients), the usual hand-rolled
/// substitute when no special-math crate is available.
const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEF: [f64; 9] = [
    0.99999999999980993,
    676.5203681218851,
    -1259.1392167224028,
    771.32342877765313,
    -176.61502916214059,
    12.507343278686905,
    -0.13857109526572012,
    9.9843695780195716e-6,
    1.5056327351493116e-7,
];

fn lgamma_scalar(x: f64) -> f64 {
    if x < 0.5 {
        let pi = std::f64::consts::PI;
        (pi / (pi * x).sin()).ln() - lgamma_scalar(1.0 - x)
    } else {
        let x = x - 1.0;
        let mut a = LANCZOS_COEF[0];
        let t = x + LANCZOS_G + 0.5;
        for (i, &c) in LANCZOS_COEF.iter().enumerate().skip(1) {
            a += c / (x + i as f64);
        }
        0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + a.ln()
    }
}

fn tgamma_scalar(x: f64) -> f64 {
    if x < 0.5 {
        std::f64::consts::PI / ((std::f64::consts::PI * x).sin() * tgamma_scalar(1.0 - x))
    } else {
        lgamma_scalar(x).exp()
    }
}

pub fn lgamma(buf: &Buffer) -> Buffer {
    unary_real(buf, lgamma_scalar)
}

pub fn tgamma(buf: &Buffer) -> Buffer {
    unary_real(buf, tgamma_scalar)
}

fn fac_scalar(n: i64) -> i64 {
    if n < 0 {
        0
    } else {
        (1..=n).fold(1i64, |acc, k| acc.wrapping_mul(k))
    }
}

fn ncr_scalar(n: i64, r: i64) -> i64 {
    if r < 0 || r > n || n < 0 {
        return 0;
    }
    let r = r.min(n - r);
    let mut acc = 1i64;
    for k in 0..r {
        acc = acc.wrapping_mul(n - k) / (k + 1);
    }
    acc
}

fn npr_scalar(n: i64, r: i64) -> i64 {
    if r < 0 || r > n || n < 0 {
        return 0;
    }
    (0..r).fold(1i64, |acc, k| acc.wrapping_mul(n - k))
}

/// `fac`/`ncr`/`npr` reduce their argument(s) to `I64` regardless of input
/// dtype (spec.md §4.3's combinatorial output-dtype rule).
pub fn fac(buf: &Buffer) -> Buffer {
    let ints = buffer_to_i64(buf);
    Buffer::I64(ints.iter().map(|&n| fac_scalar(n)).collect())
}

pub fn ncr(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    let a = buffer_to_i64(lhs);
    let b = buffer_to_i64(rhs);
    Buffer::I64(a.iter().zip(b.iter()).map(|(&n, &r)| ncr_scalar(n, r)).collect())
}

pub fn npr(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    let a = buffer_to_i64(lhs);
    let b = buffer_to_i64(rhs);
    Buffer::I64(a.iter().zip(b.iter()).map(|(&n, &r)| npr_scalar(n, r)).collect())
}

fn buffer_to_i64(buf: &Buffer) -> Vec<i64> {
    buffer_to_f64(buf).iter().map(|&x| x as i64).collect()
}

/// Complex component selectors (spec.md §4.3: `real`/`imag` on a non-complex
/// operand pass the value through / yield zero respectively; `conj` on a
/// non-complex operand is the identity).
pub fn real(buf: &Buffer) -> Buffer {
    match buf {
        Buffer::C64(v) => Buffer::F32(v.iter().map(|c| c.re).collect()),
        Buffer::C128(v) => Buffer::F64(v.iter().map(|c| c.re).collect()),
        other => other.clone(),
    }
}

pub fn imag(buf: &Buffer) -> Buffer {
    match buf {
        Buffer::C64(v) => Buffer::F32(v.iter().map(|c| c.im).collect()),
        Buffer::C128(v) => Buffer::F64(v.iter().map(|c| c.im).collect()),
        other => Buffer::zeroed(other.dtype(), other.len()),
    }
}

pub fn conj(buf: &Buffer) -> Buffer {
    match buf {
        Buffer::C64(v) => Buffer::C64(v.iter().map(|c| c.conj()).collect()),
        Buffer::C128(v) => Buffer::C128(v.iter().map(|c| c.conj()).collect()),
        other => other.clone(),
    }
}

pub fn isfinite(buf: &Buffer) -> Buffer {
    Buffer::Bool(buffer_to_f64(buf).iter().map(|x| x.is_finite()).collect())
}

pub fn isnan(buf: &Buffer) -> Buffer {
    Buffer::Bool(buffer_to_f64(buf).iter().map(|x| x.is_nan()).collect())
}

pub fn isinf(buf: &Buffer) -> Buffer {
    Buffer::Bool(buffer_to_f64(buf).iter().map(|x| x.is_infinite()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sin_float() {
        let a = Buffer::F64(vec![0.0]);
        assert!(matches!(sin(&a), Buffer::F64(v) if (v[0] - 0.0).abs() < 1e-12));
    }

    #[test]
    fn test_cold_path_preserves_dtype() {
        let a = Buffer::I32(vec![4]);
        if let Buffer::I32(v) = sign(&a) {
            assert_eq!(v, vec![1]);
        } else {
            panic!("sign must narrow back to the child dtype");
        }
    }

    #[test]
    fn test_abs_complex_yields_real_modulus() {
        let a = Buffer::C128(vec![Complex64::new(3.0, 4.0)]);
        assert!(matches!(abs(&a), Buffer::F64(v) if (v[0] - 5.0).abs() < 1e-12));
    }

    #[test]
    fn test_exp_ln_roundtrip_complex() {
        let a = Buffer::C128(vec![Complex64::new(1.0, 0.5)]);
        if let Buffer::C128(v) = ln(&exp(&a)) {
            assert!((v[0].re - 1.0).abs() < 1e-9);
            assert!((v[0].im - 0.5).abs() < 1e-9);
        } else {
            panic!("wrong variant");
        }
    }

    #[test]
    fn test_fac_ncr_npr() {
        let n = Buffer::I32(vec![5]);
        let r = Buffer::I32(vec![2]);
        assert!(matches!(fac(&n), Buffer::I64(v) if v == vec![120]));
        assert!(matches!(ncr(&n, &r), Buffer::I64(v) if v == vec![10]));
        assert!(matches!(npr(&n, &r), Buffer::I64(v) if v == vec![20]));
    }

    #[test]
    fn test_erf_known_values() {
        let a = Buffer::F64(vec![0.0]);
        assert!(matches!(erf(&a), Buffer::F64(v) if v[0].abs() < 1e-9));
    }

    #[test]
    fn test_tgamma_integer_matches_factorial() {
        let a = Buffer::F64(vec![5.0]);
        assert!(matches!(tgamma(&a), Buffer::F64(v) if (v[0] - 24.0).abs() < 1e-6));
    }

    #[test]
    fn test_real_imag_conj() {
        let a = Buffer::C64(vec![Complex32::new(1.0, 2.0)]);
        assert!(matches!(real(&a), Buffer::F32(v) if v == vec![1.0]));
        assert!(matches!(imag(&a), Buffer::F32(v) if v == vec![2.0]));
        if let Buffer::C64(v) = conj(&a) {
            assert_eq!(v[0], Complex32::new(1.0, -2.0));
        } else {
            panic!("wrong variant");
        }
    }

    #[test]
    fn test_real_imag_on_non_complex() {
        let a = Buffer::I32(vec![7]);
        assert!(matches!(real(&a), Buffer::I32(v) if v == vec![7]));
        assert!(matches!(imag(&a), Buffer::I32(v) if v == vec![0]));
    }
}
