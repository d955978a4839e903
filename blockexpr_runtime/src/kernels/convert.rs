//! The pairwise dtype conversion kernel (spec.md §4.5/§4.6): widen or
//! narrow a buffer of one concrete dtype into another.
//!
//! Grounded on the teacher's `convert.rs` `to_i64`/`to_f64`/`promote_numeric`
//! family, generalized from converting one dynamic scalar `Value` to
//! converting a whole buffer at once, and from a fallible (`RuntimeResult`)
//! conversion to an infallible `as`-cast one: spec.md §4.3 only ever widens
//! along the promotion lattice, so every conversion this engine performs is
//! representable (never an "inexact"/"overflow" source-language error).

use blockexpr_parser::dtype::Dtype;

use crate::complex::{Complex32, Complex64};
use crate::value::Buffer;

/// Every real (non-complex, non-string) element of `buf`, widened to `f64`.
pub fn buffer_to_f64(buf: &Buffer) -> Vec<f64> {
    match buf {
        Buffer::Bool(v) => v.iter().map(|&x| if x { 1.0 } else { 0.0 }).collect(),
        Buffer::I8(v) => v.iter().map(|&x| x as f64).collect(),
        Buffer::I16(v) => v.iter().map(|&x| x as f64).collect(),
        Buffer::I32(v) => v.iter().map(|&x| x as f64).collect(),
        Buffer::I64(v) => v.iter().map(|&x| x as f64).collect(),
        Buffer::U8(v) => v.iter().map(|&x| x as f64).collect(),
        Buffer::U16(v) => v.iter().map(|&x| x as f64).collect(),
        Buffer::U32(v) => v.iter().map(|&x| x as f64).collect(),
        Buffer::U64(v) => v.iter().map(|&x| x as f64).collect(),
        Buffer::F32(v) => v.iter().map(|&x| x as f64).collect(),
        Buffer::F64(v) => v.clone(),
        Buffer::C64(v) => v.iter().map(|c| c.re as f64).collect(),
        Buffer::C128(v) => v.iter().map(|c| c.re).collect(),
        Buffer::Str(_) => unreachable!("string buffers never feed numeric conversion"),
    }
}

/// Every element of `buf` as a `Complex64`, real values getting a zero
/// imaginary part.
pub fn buffer_to_complex64(buf: &Buffer) -> Vec<Complex64> {
    match buf {
        Buffer::C64(v) => v.iter().map(|&c| c.into()).collect(),
        Buffer::C128(v) => v.clone(),
        _ => buffer_to_f64(buf).into_iter().map(Complex64::from).collect(),
    }
}

/// Narrow a slice of `f64` values into a fresh buffer of `target` (a
/// non-complex, non-`Str` dtype).
pub fn narrow_from_f64(values: &[f64], target: Dtype) -> Buffer {
    use Dtype::*;
    match target {
        Bool => Buffer::Bool(values.iter().map(|&x| x != 0.0).collect()),
        I8 => Buffer::I8(values.iter().map(|&x| x as i8).collect()),
        I16 => Buffer::I16(values.iter().map(|&x| x as i16).collect()),
        I32 => Buffer::I32(values.iter().map(|&x| x as i32).collect()),
        I64 => Buffer::I64(values.iter().map(|&x| x as i64).collect()),
        U8 => Buffer::U8(values.iter().map(|&x| x as u8).collect()),
        U16 => Buffer::U16(values.iter().map(|&x| x as u16).collect()),
        U32 => Buffer::U32(values.iter().map(|&x| x as u32).collect()),
        U64 => Buffer::U64(values.iter().map(|&x| x as u64).collect()),
        F32 => Buffer::F32(values.iter().map(|&x| x as f32).collect()),
        F64 => Buffer::F64(values.to_vec()),
        C64 => Buffer::C64(values.iter().map(|&x| Complex32::from(x as f32)).collect()),
        C128 => Buffer::C128(values.iter().map(|&x| Complex64::from(x)).collect()),
        Str => unreachable!("string is never a conversion target, see validate"),
    }
}

fn complex_to_complex(buf: &Buffer, target: Dtype) -> Buffer {
    match (buf, target) {
        (Buffer::C64(v), Dtype::C128) => Buffer::C128(v.iter().map(|&c| c.into()).collect()),
        (Buffer::C128(v), Dtype::C64) => Buffer::C64(v.iter().map(|&c| c.into()).collect()),
        _ => unreachable!("complex_to_complex called on a non-complex pair"),
    }
}

/// Convert `src` to `target`, the general pairwise conversion kernel used
/// by `Convert` nodes and by the dispatcher when a child's native dtype
/// differs from the dtype its parent requires.
pub fn convert_buffer(src: &Buffer, target: Dtype) -> Buffer {
    if src.dtype() == target {
        return src.clone();
    }

    match target {
        Dtype::C64 | Dtype::C128 if src.dtype().is_complex() => complex_to_complex(src, target),
        Dtype::C64 | Dtype::C128 => {
            let reals = buffer_to_f64(src);
            narrow_from_f64(&reals, target)
        }
        Dtype::Str => unreachable!("string is never a conversion target, see validate"),
        _ if src.dtype().is_complex() => {
            // Defensive: the promotion lattice never narrows complex to
            // real in practice, but take the real component rather than
            // panic if it ever does.
            let reals: Vec<f64> = buffer_to_complex64(src).iter().map(|c| c.re).collect();
            narrow_from_f64(&reals, target)
        }
        _ => {
            let reals = buffer_to_f64(src);
            narrow_from_f64(&reals, target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen_i32_to_f64() {
        let src = Buffer::I32(vec![1, 2, 3]);
        let out = convert_buffer(&src, Dtype::F64);
        assert!(matches!(out, Buffer::F64(ref v) if v == &[1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_widen_real_to_complex() {
        let src = Buffer::F32(vec![1.0, 2.0]);
        let out = convert_buffer(&src, Dtype::C64);
        if let Buffer::C64(v) = out {
            assert_eq!(v, vec![Complex32::new(1.0, 0.0), Complex32::new(2.0, 0.0)]);
        } else {
            panic!("wrong variant");
        }
    }

    #[test]
    fn test_complex_widen() {
        let src = Buffer::C64(vec![Complex32::new(1.0, 2.0)]);
        let out = convert_buffer(&src, Dtype::C128);
        assert!(matches!(out, Buffer::C128(ref v) if v[0] == Complex64::new(1.0, 2.0)));
    }

    #[test]
    fn test_same_dtype_is_cheap_clone() {
        let src = Buffer::I64(vec![5]);
        let out = convert_buffer(&src, Dtype::I64);
        assert!(matches!(out, Buffer::I64(ref v) if v == &[5]));
    }

    #[test]
    fn test_narrow_to_bool() {
        let src = Buffer::F64(vec![0.0, 1.5, -2.0]);
        let out = convert_buffer(&src, Dtype::Bool);
        assert!(matches!(out, Buffer::Bool(ref v) if v == &[false, true, true]));
    }
}
