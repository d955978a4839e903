//! The six comparison kernels (spec.md §4.3/§4.5): operands share a common
//! dtype after promotion, output is always `Bool`.

use crate::value::{Buffer, StrBuffer};

fn compare<T: PartialOrd>(a: &[T], b: &[T], f: impl Fn(&T, &T) -> bool) -> Vec<bool> {
    a.iter().zip(b.iter()).map(|(x, y)| f(x, y)).collect()
}

macro_rules! comparison_fn {
    ($name:ident, $op:tt) => {
        pub fn $name(lhs: &Buffer, rhs: &Buffer) -> Buffer {
            let out = match (lhs, rhs) {
                (Buffer::Bool(a), Buffer::Bool(b)) => compare(a, b, |x, y| x $op y),
                (Buffer::I8(a), Buffer::I8(b)) => compare(a, b, |x, y| x $op y),
                (Buffer::I16(a), Buffer::I16(b)) => compare(a, b, |x, y| x $op y),
                (Buffer::I32(a), Buffer::I32(b)) => compare(a, b, |x, y| x $op y),
                (Buffer::I64(a), Buffer::I64(b)) => compare(a, b, |x, y| x $op y),
                (Buffer::U8(a), Buffer::U8(b)) => compare(a, b, |x, y| x $op y),
                (Buffer::U16(a), Buffer::U16(b)) => compare(a, b, |x, y| x $op y),
                (Buffer::U32(a), Buffer::U32(b)) => compare(a, b, |x, y| x $op y),
                (Buffer::U64(a), Buffer::U64(b)) => compare(a, b, |x, y| x $op y),
                (Buffer::F32(a), Buffer::F32(b)) => compare(a, b, |x, y| x $op y),
                (Buffer::F64(a), Buffer::F64(b)) => compare(a, b, |x, y| x $op y),
                (Buffer::Str(a), Buffer::Str(b)) => string_compare(a, b, |x, y| x $op y),
                _ => unreachable!("dispatch guarantees matching, orderable operand dtypes"),
            };
            Buffer::Bool(out)
        }
    };
}

/// Lexicographic code-point comparison (spec.md §4.6, "string lexicographic
/// comparison" for `<`/`<=`/`>`/`>=`/`==`/`!=`).
fn string_compare(a: &StrBuffer, b: &StrBuffer, f: impl Fn(&[char], &[char]) -> bool) -> Vec<bool> {
    (0..a.len()).map(|i| f(a.slot(i), b.slot(i))).collect()
}

comparison_fn!(lt, <);
comparison_fn!(le, <=);
comparison_fn!(gt, >);
comparison_fn!(ge, >=);

/// Equality/inequality also cover complex operands (no natural order, but
/// `PartialEq` is defined).
pub fn eq(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    let out = match (lhs, rhs) {
        (Buffer::Bool(a), Buffer::Bool(b)) => compare(a, b, |x, y| x == y),
        (Buffer::I8(a), Buffer::I8(b)) => compare(a, b, |x, y| x == y),
        (Buffer::I16(a), Buffer::I16(b)) => compare(a, b, |x, y| x == y),
        (Buffer::I32(a), Buffer::I32(b)) => compare(a, b, |x, y| x == y),
        (Buffer::I64(a), Buffer::I64(b)) => compare(a, b, |x, y| x == y),
        (Buffer::U8(a), Buffer::U8(b)) => compare(a, b, |x, y| x == y),
        (Buffer::U16(a), Buffer::U16(b)) => compare(a, b, |x, y| x == y),
        (Buffer::U32(a), Buffer::U32(b)) => compare(a, b, |x, y| x == y),
        (Buffer::U64(a), Buffer::U64(b)) => compare(a, b, |x, y| x == y),
        (Buffer::F32(a), Buffer::F32(b)) => compare(a, b, |x, y| x == y),
        (Buffer::F64(a), Buffer::F64(b)) => compare(a, b, |x, y| x == y),
        (Buffer::C64(a), Buffer::C64(b)) => compare(a, b, |x, y| x == y),
        (Buffer::C128(a), Buffer::C128(b)) => compare(a, b, |x, y| x == y),
        (Buffer::Str(a), Buffer::Str(b)) => string_compare(a, b, |x, y| x == y),
        _ => unreachable!("dispatch guarantees matching operand dtypes"),
    };
    Buffer::Bool(out)
}

pub fn ne(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    match eq(lhs, rhs) {
        Buffer::Bool(v) => Buffer::Bool(v.into_iter().map(|x| !x).collect()),
        _ => unreachable!("eq always returns Bool"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_lt() {
        let a = Buffer::I32(vec![1, 5, 3]);
        let b = Buffer::I32(vec![2, 5, 1]);
        assert!(matches!(lt(&a, &b), Buffer::Bool(v) if v == vec![true, false, false]));
    }

    #[test]
    fn test_string_equality() {
        let a = StrBuffer { item_size: 8, slots: vec![vec!['h', 'i', '\0', '\0'], vec!['n', 'o', '\0', '\0']] };
        let b = StrBuffer { item_size: 8, slots: vec![vec!['h', 'i', '\0', '\0'], vec!['y', 'o', '\0', '\0']] };
        assert!(matches!(eq(&Buffer::Str(a), &Buffer::Str(b)), Buffer::Bool(v) if v == vec![true, false]));
    }

    #[test]
    fn test_ne_is_complement_of_eq() {
        let a = Buffer::F64(vec![1.0, f64::NAN]);
        let b = Buffer::F64(vec![1.0, f64::NAN]);
        assert!(matches!(eq(&a, &b), Buffer::Bool(v) if v == vec![true, false]));
        assert!(matches!(ne(&a, &b), Buffer::Bool(v) if v == vec![false, true]));
    }

    #[test]
    fn test_complex_equality() {
        use crate::complex::Complex64;
        let a = Buffer::C128(vec![Complex64::new(1.0, 2.0)]);
        let b = Buffer::C128(vec![Complex64::new(1.0, 2.0)]);
        assert!(matches!(eq(&a, &b), Buffer::Bool(v) if v == vec![true]));
    }
}
