//! String relation kernels (spec.md §4.5/§8): `startswith`/`endswith`/
//! `contains`, operating on the trimmed (NUL-stopped) code points of each
//! slot.

use crate::value::{Buffer, StrBuffer};

fn starts_with(haystack: &[char], needle: &[char]) -> bool {
    needle.len() <= haystack.len() && haystack[..needle.len()] == *needle
}

fn ends_with(haystack: &[char], needle: &[char]) -> bool {
    needle.len() <= haystack.len() && haystack[haystack.len() - needle.len()..] == *needle
}

/// Naive substring search over code points; buffers here are short fixed
/// slots, not unbounded text, so quadratic-worst-case search is acceptable.
fn contains(haystack: &[char], needle: &[char]) -> bool {
    if needle.is_empty() {
        return true;
    }
    if needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn relate(a: &StrBuffer, b: &StrBuffer, f: impl Fn(&[char], &[char]) -> bool) -> Buffer {
    let out: Vec<bool> = (0..a.len()).map(|i| f(a.slot(i), b.slot(i))).collect();
    Buffer::Bool(out)
}

pub fn startswith(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    match (lhs, rhs) {
        (Buffer::Str(a), Buffer::Str(b)) => relate(a, b, starts_with),
        _ => unreachable!("startswith is only ever stamped onto Str operands"),
    }
}

pub fn endswith(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    match (lhs, rhs) {
        (Buffer::Str(a), Buffer::Str(b)) => relate(a, b, ends_with),
        _ => unreachable!("endswith is only ever stamped onto Str operands"),
    }
}

pub fn contains_op(lhs: &Buffer, rhs: &Buffer) -> Buffer {
    match (lhs, rhs) {
        (Buffer::Str(a), Buffer::Str(b)) => relate(a, b, contains),
        _ => unreachable!("contains is only ever stamped onto Str operands"),
    }
}
