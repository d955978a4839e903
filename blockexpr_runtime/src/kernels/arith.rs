//! Elementwise arithmetic kernels (spec.md §4.5): add/sub/mul/div/mod/pow,
//! negate, and the scalar-right-operand fast paths.
//!
//! Generic-over-dtype helper functions parameterized by the element type,
//! per spec.md §9's preferred shape over macro-generated per-dtype kernels;
//! the enclosing `match` on `Buffer` variant is the one place dtype-specific
//! dispatch is unavoidable in a closed, non-generic `Buffer` enum.

use crate::complex::{Complex32, Complex64};
use crate::value::Buffer;

fn elementwise<T: Copy>(a: &[T], b: &[T], f: impl Fn(T, T) -> T) -> Vec<T> {
    a.iter().zip(b.iter()).map(|(&x, &y)| f(x, y)).collect()
}

fn elementwise_scalar<T: Copy>(a: &[T], scalar: T, f: impl Fn(T, T) -> T) -> Vec<T> {
    a.iter().map(|&x| f(x, scalar)).collect()
}

fn elementwise_unary<T: Copy>(a: &[T], f: impl Fn(T) -> T) -> Vec<T> {
    a.iter().map(|&x| f(x)).collect()
}

/// `true`/`false` arithmetic (spec.md has no explicit rule for two `Bool`
/// operands reaching `+`/`-`/`*`/`/`/`%`/`**`, which the promotion lattice
/// nonetheless permits via same-type passthrough). Decision, recorded in
/// DESIGN.md: treat `Bool` as GF(2) — addition and subtraction are XOR,
/// multiplication is AND.
mod bool_arith {
    pub fn add(a: bool, b: bool) -> bool {
        a ^ b
    }
    pub fn sub(a: bool, b: bool) -> bool {
        a ^ b
    }
    pub fn mul(a: bool, b: bool) -> bool {
        a && b
    }
    /// `true / false` is the only defined quotient (`1/1`); `x / false` is
    /// integer division by zero, which spec.md §9 documents as zero.
    pub fn div(a: bool, b: bool) -> bool {
        if !b {
            false
        } else {
            a
        }
    }
    pub fn rem(a: bool, b: bool) -> bool {
        if !b {
            false
        } else {
            a ^ a // 0, any value mod 1 is 0 in GF(2)
        }
    }
    pub fn pow(a: bool, b: bool) -> bool {
        if b {
            a
        } else {
            true
        }
    }
}

macro_rules! int_div {
    ($a:expr, $b:expr) => {
        if $b == 0 {
            0
        } else {
            $a.wrapping_div($b)
        }
    };
}

macro_rules! int_rem {
    ($a:expr, $b:expr) => {
        if $b == 0 {
            0
        } else {
            $a.wrapping_rem($b)
        }
    };
}

/// `z**w` via the principal branch, `exp(w * ln(z))`.
fn complex_pow(z: Complex64, w: Complex64) -> Complex64 {
    if z.re == 0.0 && z.im == 0.0 {
        return Complex64::new(0.0, 0.0);
    }
    let ln_r = z.abs().ln();
    let theta = z.im.atan2(z.re);
    let exp_re = w.re * ln_r - w.im * theta;
    let exp_im = w.re * theta + w.im * ln_r;
    let mag = exp_re.exp();
    Complex64::new(mag * exp_im.cos(), mag * exp_im.sin())
}

fn complex_sqrt(z: Complex64) -> Complex64 {
    let r = z.abs();
    let theta = z.im.atan2(z.re);
    let sqrt_r = r.sqrt();
    Complex64::new(sqrt_r * (theta / 2.0).cos(), sqrt_r * (theta / 2.0).sin())
}

pub fn add(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    match (lhs, rhs) {
        (Buffer::Bool(a), Buffer::Bool(b)) => Buffer::Bool(elementwise(a, b, bool_arith::add)),
        (Buffer::I8(a), Buffer::I8(b)) => Buffer::I8(elementwise(a, b, i8::wrapping_add)),
        (Buffer::I16(a), Buffer::I16(b)) => Buffer::I16(elementwise(a, b, i16::wrapping_add)),
        (Buffer::I32(a), Buffer::I32(b)) => Buffer::I32(elementwise(a, b, i32::wrapping_add)),
        (Buffer::I64(a), Buffer::I64(b)) => Buffer::I64(elementwise(a, b, i64::wrapping_add)),
        (Buffer::U8(a), Buffer::U8(b)) => Buffer::U8(elementwise(a, b, u8::wrapping_add)),
        (Buffer::U16(a), Buffer::U16(b)) => Buffer::U16(elementwise(a, b, u16::wrapping_add)),
        (Buffer::U32(a), Buffer::U32(b)) => Buffer::U32(elementwise(a, b, u32::wrapping_add)),
        (Buffer::U64(a), Buffer::U64(b)) => Buffer::U64(elementwise(a, b, u64::wrapping_add)),
        (Buffer::F32(a), Buffer::F32(b)) => Buffer::F32(elementwise(a, b, |x, y| x + y)),
        (Buffer::F64(a), Buffer::F64(b)) => Buffer::F64(elementwise(a, b, |x, y| x + y)),
        (Buffer::C64(a), Buffer::C64(b)) => Buffer::C64(elementwise(a, b, |x, y| x + y)),
        (Buffer::C128(a), Buffer::C128(b)) => Buffer::C128(elementwise(a, b, |x, y| x + y)),
        _ => unreachable!("dispatch guarantees matching, non-Str operand dtypes"),
    }
}

pub fn sub(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    match (lhs, rhs) {
        (Buffer::Bool(a), Buffer::Bool(b)) => Buffer::Bool(elementwise(a, b, bool_arith::sub)),
        (Buffer::I8(a), Buffer::I8(b)) => Buffer::I8(elementwise(a, b, i8::wrapping_sub)),
        (Buffer::I16(a), Buffer::I16(b)) => Buffer::I16(elementwise(a, b, i16::wrapping_sub)),
        (Buffer::I32(a), Buffer::I32(b)) => Buffer::I32(elementwise(a, b, i32::wrapping_sub)),
        (Buffer::I64(a), Buffer::I64(b)) => Buffer::I64(elementwise(a, b, i64::wrapping_sub)),
        (Buffer::U8(a), Buffer::U8(b)) => Buffer::U8(elementwise(a, b, u8::wrapping_sub)),
        (Buffer::U16(a), Buffer::U16(b)) => Buffer::U16(elementwise(a, b, u16::wrapping_sub)),
        (Buffer::U32(a), Buffer::U32(b)) => Buffer::U32(elementwise(a, b, u32::wrapping_sub)),
        (Buffer::U64(a), Buffer::U64(b)) => Buffer::U64(elementwise(a, b, u64::wrapping_sub)),
        (Buffer::F32(a), Buffer::F32(b)) => Buffer::F32(elementwise(a, b, |x, y| x - y)),
        (Buffer::F64(a), Buffer::F64(b)) => Buffer::F64(elementwise(a, b, |x, y| x - y)),
        (Buffer::C64(a), Buffer::C64(b)) => Buffer::C64(elementwise(a, b, |x, y| x - y)),
        (Buffer::C128(a), Buffer::C128(b)) => Buffer::C128(elementwise(a, b, |x, y| x - y)),
        _ => unreachable!("dispatch guarantees matching, non-Str operand dtypes"),
    }
}

pub fn mul(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    match (lhs, rhs) {
        (Buffer::Bool(a), Buffer::Bool(b)) => Buffer::Bool(elementwise(a, b, bool_arith::mul)),
        (Buffer::I8(a), Buffer::I8(b)) => Buffer::I8(elementwise(a, b, i8::wrapping_mul)),
        (Buffer::I16(a), Buffer::I16(b)) => Buffer::I16(elementwise(a, b, i16::wrapping_mul)),
        (Buffer::I32(a), Buffer::I32(b)) => Buffer::I32(elementwise(a, b, i32::wrapping_mul)),
        (Buffer::I64(a), Buffer::I64(b)) => Buffer::I64(elementwise(a, b, i64::wrapping_mul)),
        (Buffer::U8(a), Buffer::U8(b)) => Buffer::U8(elementwise(a, b, u8::wrapping_mul)),
        (Buffer::U16(a), Buffer::U16(b)) => Buffer::U16(elementwise(a, b, u16::wrapping_mul)),
        (Buffer::U32(a), Buffer::U32(b)) => Buffer::U32(elementwise(a, b, u32::wrapping_mul)),
        (Buffer::U64(a), Buffer::U64(b)) => Buffer::U64(elementwise(a, b, u64::wrapping_mul)),
        (Buffer::F32(a), Buffer::F32(b)) => Buffer::F32(elementwise(a, b, |x, y| x * y)),
        (Buffer::F64(a), Buffer::F64(b)) => Buffer::F64(elementwise(a, b, |x, y| x * y)),
        (Buffer::C64(a), Buffer::C64(b)) => Buffer::C64(elementwise(a, b, |x, y| x * y)),
        (Buffer::C128(a), Buffer::C128(b)) => Buffer::C128(elementwise(a, b, |x, y| x * y)),
        _ => unreachable!("dispatch guarantees matching, non-Str operand dtypes"),
    }
}

/// Integer division by zero yields zero per element (spec.md §9, "preserve
/// it because user expressions depend on it"); float division follows
/// IEEE 754 (±∞/NaN, never a trap).
pub fn div(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    match (lhs, rhs) {
        (Buffer::Bool(a), Buffer::Bool(b)) => Buffer::Bool(elementwise(a, b, bool_arith::div)),
        (Buffer::I8(a), Buffer::I8(b)) => Buffer::I8(elementwise(a, b, |x, y| int_div!(x, y))),
        (Buffer::I16(a), Buffer::I16(b)) => Buffer::I16(elementwise(a, b, |x, y| int_div!(x, y))),
        (Buffer::I32(a), Buffer::I32(b)) => Buffer::I32(elementwise(a, b, |x, y| int_div!(x, y))),
        (Buffer::I64(a), Buffer::I64(b)) => Buffer::I64(elementwise(a, b, |x, y| int_div!(x, y))),
        (Buffer::U8(a), Buffer::U8(b)) => Buffer::U8(elementwise(a, b, |x, y| int_div!(x, y))),
        (Buffer::U16(a), Buffer::U16(b)) => Buffer::U16(elementwise(a, b, |x, y| int_div!(x, y))),
        (Buffer::U32(a), Buffer::U32(b)) => Buffer::U32(elementwise(a, b, |x, y| int_div!(x, y))),
        (Buffer::U64(a), Buffer::U64(b)) => Buffer::U64(elementwise(a, b, |x, y| int_div!(x, y))),
        (Buffer::F32(a), Buffer::F32(b)) => Buffer::F32(elementwise(a, b, |x, y| x / y)),
        (Buffer::F64(a), Buffer::F64(b)) => Buffer::F64(elementwise(a, b, |x, y| x / y)),
        (Buffer::C64(a), Buffer::C64(b)) => Buffer::C64(elementwise(a, b, |x, y| x / y)),
        (Buffer::C128(a), Buffer::C128(b)) => Buffer::C128(elementwise(a, b, |x, y| x / y)),
        _ => unreachable!("dispatch guarantees matching, non-Str operand dtypes"),
    }
}

pub fn rem(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    match (lhs, rhs) {
        (Buffer::Bool(a), Buffer::Bool(b)) => Buffer::Bool(elementwise(a, b, bool_arith::rem)),
        (Buffer::I8(a), Buffer::I8(b)) => Buffer::I8(elementwise(a, b, |x, y| int_rem!(x, y))),
        (Buffer::I16(a), Buffer::I16(b)) => Buffer::I16(elementwise(a, b, |x, y| int_rem!(x, y))),
        (Buffer::I32(a), Buffer::I32(b)) => Buffer::I32(elementwise(a, b, |x, y| int_rem!(x, y))),
        (Buffer::I64(a), Buffer::I64(b)) => Buffer::I64(elementwise(a, b, |x, y| int_rem!(x, y))),
        (Buffer::U8(a), Buffer::U8(b)) => Buffer::U8(elementwise(a, b, |x, y| int_rem!(x, y))),
        (Buffer::U16(a), Buffer::U16(b)) => Buffer::U16(elementwise(a, b, |x, y| int_rem!(x, y))),
        (Buffer::U32(a), Buffer::U32(b)) => Buffer::U32(elementwise(a, b, |x, y| int_rem!(x, y))),
        (Buffer::U64(a), Buffer::U64(b)) => Buffer::U64(elementwise(a, b, |x, y| int_rem!(x, y))),
        (Buffer::F32(a), Buffer::F32(b)) => Buffer::F32(elementwise(a, b, |x, y| x % y)),
        (Buffer::F64(a), Buffer::F64(b)) => Buffer::F64(elementwise(a, b, |x, y| x % y)),
        _ => unreachable!("mod is never stamped onto complex operands, see grammar::binary_node"),
    }
}

pub fn pow(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    match (lhs, rhs) {
        (Buffer::Bool(a), Buffer::Bool(b)) => Buffer::Bool(elementwise(a, b, bool_arith::pow)),
        (Buffer::I8(a), Buffer::I8(b)) => Buffer::I8(elementwise(a, b, |x, y| x.wrapping_pow(y.max(0) as u32))),
        (Buffer::I16(a), Buffer::I16(b)) => Buffer::I16(elementwise(a, b, |x, y| x.wrapping_pow(y.max(0) as u32))),
        (Buffer::I32(a), Buffer::I32(b)) => Buffer::I32(elementwise(a, b, |x, y| x.wrapping_pow(y.max(0) as u32))),
        (Buffer::I64(a), Buffer::I64(b)) => Buffer::I64(elementwise(a, b, |x, y| x.wrapping_pow(y.max(0) as u32))),
        (Buffer::U8(a), Buffer::U8(b)) => Buffer::U8(elementwise(a, b, |x, y| x.wrapping_pow(y as u32))),
        (Buffer::U16(a), Buffer::U16(b)) => Buffer::U16(elementwise(a, b, |x, y| x.wrapping_pow(y as u32))),
        (Buffer::U32(a), Buffer::U32(b)) => Buffer::U32(elementwise(a, b, |x, y| x.wrapping_pow(y as u32))),
        (Buffer::U64(a), Buffer::U64(b)) => Buffer::U64(elementwise(a, b, |x, y| x.wrapping_pow(y as u32))),
        (Buffer::F32(a), Buffer::F32(b)) => Buffer::F32(elementwise(a, b, |x, y| x.powf(y))),
        (Buffer::F64(a), Buffer::F64(b)) => Buffer::F64(elementwise(a, b, |x, y| x.powf(y))),
        (Buffer::C64(a), Buffer::C64(b)) => Buffer::C64(elementwise(a, b, |x, y| {
            complex_pow(x.into(), y.into()).into()
        })),
        (Buffer::C128(a), Buffer::C128(b)) => Buffer::C128(elementwise(a, b, complex_pow)),
        _ => unreachable!("dispatch guarantees matching, non-Str operand dtypes"),
    }
}

/// `x * x` / `(x * x) * x` fast paths feed straight through `mul`; this
/// entry exists for the scalar-right-operand optimization spec.md §4.5
/// lists separately (`add/mul/pow with a scalar right operand`) — used by
/// the dispatcher when the right child of a binary node is a `Constant`,
/// avoiding materializing a whole constant-filled buffer.
pub fn add_scalar(lhs: &Buffer, scalar: f64) -> Buffer {
    match lhs {
        Buffer::Bool(a) => Buffer::Bool(elementwise_scalar(a, scalar != 0.0, bool_arith::add)),
        Buffer::I8(a) => Buffer::I8(elementwise_scalar(a, scalar as i8, i8::wrapping_add)),
        Buffer::I16(a) => Buffer::I16(elementwise_scalar(a, scalar as i16, i16::wrapping_add)),
        Buffer::I32(a) => Buffer::I32(elementwise_scalar(a, scalar as i32, i32::wrapping_add)),
        Buffer::I64(a) => Buffer::I64(elementwise_scalar(a, scalar as i64, i64::wrapping_add)),
        Buffer::U8(a) => Buffer::U8(elementwise_scalar(a, scalar as u8, u8::wrapping_add)),
        Buffer::U16(a) => Buffer::U16(elementwise_scalar(a, scalar as u16, u16::wrapping_add)),
        Buffer::U32(a) => Buffer::U32(elementwise_scalar(a, scalar as u32, u32::wrapping_add)),
        Buffer::U64(a) => Buffer::U64(elementwise_scalar(a, scalar as u64, u64::wrapping_add)),
        Buffer::F32(a) => Buffer::F32(elementwise_scalar(a, scalar as f32, |x, y| x + y)),
        Buffer::F64(a) => Buffer::F64(elementwise_scalar(a, scalar, |x, y| x + y)),
        Buffer::C64(a) => {
            let s = Complex32::from(scalar as f32);
            Buffer::C64(elementwise_scalar(a, s, |x, y| x + y))
        }
        Buffer::C128(a) => {
            let s = Complex64::from(scalar);
            Buffer::C128(elementwise_scalar(a, s, |x, y| x + y))
        }
        Buffer::Str(_) => unreachable!("string operands never reach arithmetic kernels"),
    }
}

pub fn mul_scalar(lhs: &Buffer, scalar: f64) -> Buffer {
    match lhs {
        Buffer::Bool(a) => Buffer::Bool(elementwise_scalar(a, scalar != 0.0, bool_arith::mul)),
        Buffer::I8(a) => Buffer::I8(elementwise_scalar(a, scalar as i8, i8::wrapping_mul)),
        Buffer::I16(a) => Buffer::I16(elementwise_scalar(a, scalar as i16, i16::wrapping_mul)),
        Buffer::I32(a) => Buffer::I32(elementwise_scalar(a, scalar as i32, i32::wrapping_mul)),
        Buffer::I64(a) => Buffer::I64(elementwise_scalar(a, scalar as i64, i64::wrapping_mul)),
        Buffer::U8(a) => Buffer::U8(elementwise_scalar(a, scalar as u8, u8::wrapping_mul)),
        Buffer::U16(a) => Buffer::U16(elementwise_scalar(a, scalar as u16, u16::wrapping_mul)),
        Buffer::U32(a) => Buffer::U32(elementwise_scalar(a, scalar as u32, u32::wrapping_mul)),
        Buffer::U64(a) => Buffer::U64(elementwise_scalar(a, scalar as u64, u64::wrapping_mul)),
        Buffer::F32(a) => Buffer::F32(elementwise_scalar(a, scalar as f32, |x, y| x * y)),
        Buffer::F64(a) => Buffer::F64(elementwise_scalar(a, scalar, |x, y| x * y)),
        Buffer::C64(a) => {
            let s = Complex32::from(scalar as f32);
            Buffer::C64(elementwise_scalar(a, s, |x, y| x * y))
        }
        Buffer::C128(a) => {
            let s = Complex64::from(scalar);
            Buffer::C128(elementwise_scalar(a, s, |x, y| x * y))
        }
        Buffer::Str(_) => unreachable!("string operands never reach arithmetic kernels"),
    }
}

pub fn pow_scalar(lhs: &Buffer, scalar: f64) -> Buffer {
    match lhs {
        Buffer::F32(a) => Buffer::F32(elementwise_scalar(a, scalar as f32, |x, y| x.powf(y))),
        Buffer::F64(a) => Buffer::F64(elementwise_scalar(a, scalar, |x, y| x.powf(y))),
        Buffer::C64(a) => {
            let s = Complex64::from(scalar);
            Buffer::C64(elementwise_scalar(a, s, |x, y| complex_pow(x.into(), y).into()))
        }
        Buffer::C128(a) => {
            let s = Complex64::from(scalar);
            Buffer::C128(elementwise_scalar(a, s, complex_pow))
        }
        other => pow(other, &crate::kernels::convert::narrow_from_f64(&vec![scalar; other.len()], other.dtype())),
    }
}

pub fn neg(buf: &Buffer) -> Buffer {
    match buf {
        Buffer::Bool(a) => Buffer::Bool(elementwise_unary(a, |x| x)), // -false == false, -true == true in GF(2)
        Buffer::I8(a) => Buffer::I8(elementwise_unary(a, i8::wrapping_neg)),
        Buffer::I16(a) => Buffer::I16(elementwise_unary(a, i16::wrapping_neg)),
        Buffer::I32(a) => Buffer::I32(elementwise_unary(a, i32::wrapping_neg)),
        Buffer::I64(a) => Buffer::I64(elementwise_unary(a, i64::wrapping_neg)),
        Buffer::U8(a) => Buffer::U8(elementwise_unary(a, u8::wrapping_neg)),
        Buffer::U16(a) => Buffer::U16(elementwise_unary(a, u16::wrapping_neg)),
        Buffer::U32(a) => Buffer::U32(elementwise_unary(a, u32::wrapping_neg)),
        Buffer::U64(a) => Buffer::U64(elementwise_unary(a, u64::wrapping_neg)),
        Buffer::F32(a) => Buffer::F32(elementwise_unary(a, |x| -x)),
        Buffer::F64(a) => Buffer::F64(elementwise_unary(a, |x| -x)),
        Buffer::C64(a) => Buffer::C64(elementwise_unary(a, |x| -x)),
        Buffer::C128(a) => Buffer::C128(elementwise_unary(a, |x| -x)),
        Buffer::Str(_) => unreachable!("string operands never reach arithmetic kernels"),
    }
}

pub fn pos(buf: &Buffer) -> Buffer {
    buf.clone()
}

pub fn sqrt(buf: &Buffer) -> Buffer {
    match buf {
        Buffer::F32(a) => Buffer::F32(elementwise_unary(a, f32::sqrt)),
        Buffer::F64(a) => Buffer::F64(elementwise_unary(a, f64::sqrt)),
        Buffer::C64(a) => Buffer::C64(elementwise_unary(a, |x| complex_sqrt(x.into()).into())),
        Buffer::C128(a) => Buffer::C128(elementwise_unary(a, complex_sqrt)),
        other => {
            let reals = crate::kernels::convert::buffer_to_f64(other);
            let sqrted: Vec<f64> = reals.iter().map(|x| x.sqrt()).collect();
            crate::kernels::convert::narrow_from_f64(&sqrted, other.dtype())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_add_wraps() {
        let a = Buffer::I8(vec![120]);
        let b = Buffer::I8(vec![10]);
        if let Buffer::I8(v) = add(&a, &b) {
            assert_eq!(v[0], 120i8.wrapping_add(10));
        } else {
            panic!("wrong variant");
        }
    }

    #[test]
    fn test_integer_div_by_zero_is_zero() {
        let a = Buffer::I32(vec![5, -5]);
        let b = Buffer::I32(vec![0, 0]);
        if let Buffer::I32(v) = div(&a, &b) {
            assert_eq!(v, vec![0, 0]);
        } else {
            panic!("wrong variant");
        }
    }

    #[test]
    fn test_float_div_by_zero_is_inf() {
        let a = Buffer::F64(vec![1.0, -1.0]);
        let b = Buffer::F64(vec![0.0, 0.0]);
        if let Buffer::F64(v) = div(&a, &b) {
            assert!(v[0].is_infinite() && v[0] > 0.0);
            assert!(v[1].is_infinite() && v[1] < 0.0);
        } else {
            panic!("wrong variant");
        }
    }

    #[test]
    fn test_complex_pow_matches_square() {
        let a = Buffer::C64(vec![Complex32::new(2.0, 0.0)]);
        let b = Buffer::C64(vec![Complex32::new(2.0, 0.0)]);
        if let Buffer::C64(v) = pow(&a, &b) {
            assert!((v[0].re - 4.0).abs() < 1e-4);
            assert!(v[0].im.abs() < 1e-4);
        } else {
            panic!("wrong variant");
        }
    }

    #[test]
    fn test_neg_and_pos() {
        let a = Buffer::I32(vec![3, -4]);
        if let Buffer::I32(v) = neg(&a) {
            assert_eq!(v, vec![-3, 4]);
        } else {
            panic!("wrong variant");
        }
        if let Buffer::I32(v) = pos(&a) {
            assert_eq!(v, vec![3, -4]);
        } else {
            panic!("wrong variant");
        }
    }

    #[test]
    fn test_sqrt_float() {
        let a = Buffer::F64(vec![4.0, 9.0]);
        if let Buffer::F64(v) = sqrt(&a) {
            assert_eq!(v, vec![2.0, 3.0]);
        } else {
            panic!("wrong variant");
        }
    }

    #[test]
    fn test_bool_arith_is_gf2() {
        let a = Buffer::Bool(vec![true, true, false]);
        let b = Buffer::Bool(vec![true, false, false]);
        if let Buffer::Bool(v) = add(&a, &b) {
            assert_eq!(v, vec![false, true, false]);
        } else {
            panic!("wrong variant");
        }
    }
}
