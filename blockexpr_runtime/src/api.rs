//! Public entry points (spec.md §6.1/§6.2/§6.3): `compile`, `evaluate`, and
//! a handful of diagnostic helpers.

use std::sync::Arc;

use blockexpr_parser::builtins::OpKind;
use blockexpr_parser::dtype::Dtype;
use blockexpr_parser::{Expr, SymbolDecl};

use crate::compiled::{CompiledExpr, VariableSlot};
use crate::diag::trace;
use crate::error::{CompileResult, EvalError, EvalResult};
use crate::eval::dispatch::eval_node;
use crate::params::EvalParams;
use crate::value::{Buffer, StrBuffer};
use crate::workspace::Workspace;

/// One caller-declared variable: its name, dtype, per-item byte width, and
/// an opaque `bound` identity (spec.md §6.1 — typically the address the
/// caller's own variable lives at, used only to key declaration order
/// across separate `compile`/`evaluate` calls).
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: String,
    pub dtype: Dtype,
    pub item_size: usize,
    pub bound: usize,
}

/// Parse, optimize, validate, and wrap `source` into a [`CompiledExpr`]
/// ready for repeated, possibly concurrent, [`evaluate`] calls.
pub fn compile(source: &str, symbols: &[VarDecl], target_dtype: Option<Dtype>) -> CompileResult<CompiledExpr> {
    let parser_symbols: Vec<SymbolDecl> = symbols
        .iter()
        .map(|s| SymbolDecl { name: s.name.clone(), dtype: s.dtype, item_size: s.item_size })
        .collect();

    let root = blockexpr_parser::compile(source, &parser_symbols, target_dtype)?;

    let slots: Vec<VariableSlot> = symbols
        .iter()
        .map(|s| VariableSlot { name: Arc::from(s.name.as_str()), dtype: s.dtype, item_size: s.item_size, bound: s.bound })
        .collect();

    Ok(CompiledExpr::new(root, slots)?)
}

/// Evaluate `expr` over one block of `block_nitems` items.
///
/// # Safety
///
/// Every `vars[i]` must point to at least `block_nitems * item_size` bytes
/// of readable memory for the i-th declared variable (in `bound`-sorted
/// order, spec.md §6.2), and `output` must point to at least
/// `block_nitems * size_of(expr.dtype())` bytes of writable memory. A null
/// entry in `vars`, a null `output`, or `expr.dtype() == Str` all return
/// `ErrInvalidArg` without touching memory.
pub unsafe fn evaluate(
    expr: &CompiledExpr,
    vars: &[*const u8],
    output: *mut u8,
    block_nitems: i32,
    params: &EvalParams,
) -> EvalResult<()> {
    if output.is_null() || expr.dtype() == Dtype::Str || block_nitems < 0 {
        return Err(EvalError::ErrInvalidArg);
    }
    let declared = expr.variables();
    if vars.len() != declared.len() {
        return Err(EvalError::ErrVarMismatch { expected: declared.len(), found: vars.len() });
    }
    if declared.len() > params.max_vars {
        return Err(EvalError::ErrTooManyVars { found: declared.len(), max: params.max_vars });
    }
    if vars.iter().any(|p| p.is_null()) {
        return Err(EvalError::ErrInvalidArg);
    }

    let block_nitems = block_nitems as usize;
    trace!("evaluate: dtype={:?} block_nitems={block_nitems}", expr.dtype());

    let mut names = Vec::with_capacity(declared.len());
    let mut buffers = Vec::with_capacity(declared.len());
    for (slot, &ptr) in declared.iter().zip(vars.iter()) {
        names.push(slot.name.clone());
        buffers.push(unsafe { read_buffer(ptr, slot.dtype, slot.item_size, block_nitems) });
    }
    let ws = Workspace::new(names, buffers, block_nitems);

    let sub_block_nitems = if expr.allows_sub_blocking() { params.sub_block_nitems() } else { block_nitems.max(1) };

    let mut out_buf = Buffer::zeroed(expr.dtype(), block_nitems);
    if block_nitems == 0 {
        // Still run once over an empty block so reductions see an empty
        // child and produce their documented empty identities.
        let sub_ws = ws.sub_block(0, 0);
        let computed = eval_node(expr.root(), &sub_ws);
        write_into(&mut out_buf, 0, &computed);
    } else {
        let mut offset = 0;
        while offset < block_nitems {
            let len = sub_block_nitems.min(block_nitems - offset);
            let sub_ws = ws.sub_block(offset, len);
            let computed = eval_node(expr.root(), &sub_ws);
            write_into(&mut out_buf, offset, &computed);
            offset += len;
        }
    }

    unsafe { write_buffer(output, &out_buf) };
    Ok(())
}

/// Read `nitems` elements of `dtype` starting at `ptr`, producing an owned
/// [`Buffer`] (spec.md §6.2's raw-pointer contract made safe at this single
/// boundary).
unsafe fn read_buffer(ptr: *const u8, dtype: Dtype, item_size: usize, nitems: usize) -> Buffer {
    macro_rules! read_as {
        ($t:ty, $variant:ident) => {{
            let typed = ptr as *const $t;
            let slice = unsafe { std::slice::from_raw_parts(typed, nitems) };
            Buffer::$variant(slice.to_vec())
        }};
    }
    match dtype {
        Dtype::Bool => read_as!(bool, Bool),
        Dtype::I8 => read_as!(i8, I8),
        Dtype::I16 => read_as!(i16, I16),
        Dtype::I32 => read_as!(i32, I32),
        Dtype::I64 => read_as!(i64, I64),
        Dtype::U8 => read_as!(u8, U8),
        Dtype::U16 => read_as!(u16, U16),
        Dtype::U32 => read_as!(u32, U32),
        Dtype::U64 => read_as!(u64, U64),
        Dtype::F32 => read_as!(f32, F32),
        Dtype::F64 => read_as!(f64, F64),
        Dtype::C64 => read_as!(crate::complex::Complex32, C64),
        Dtype::C128 => read_as!(crate::complex::Complex64, C128),
        Dtype::Str => {
            let chars_per_slot = item_size / 4;
            let slot_stride = item_size;
            let mut slots = Vec::with_capacity(nitems);
            for i in 0..nitems {
                let slot_ptr = unsafe { ptr.add(i * slot_stride) } as *const u32;
                let raw = unsafe { std::slice::from_raw_parts(slot_ptr, chars_per_slot) };
                let chars: Vec<char> = raw.iter().map(|&c| char::from_u32(c).unwrap_or('\0')).collect();
                slots.push(chars);
            }
            Buffer::Str(StrBuffer { item_size, slots })
        }
    }
}

fn write_into(out: &mut Buffer, offset: usize, computed: &Buffer) {
    macro_rules! splice {
        ($dst:expr, $src:expr) => {
            $dst[offset..offset + $src.len()].copy_from_slice($src)
        };
    }
    match (out, computed) {
        (Buffer::Bool(d), Buffer::Bool(s)) => splice!(d, s),
        (Buffer::I8(d), Buffer::I8(s)) => splice!(d, s),
        (Buffer::I16(d), Buffer::I16(s)) => splice!(d, s),
        (Buffer::I32(d), Buffer::I32(s)) => splice!(d, s),
        (Buffer::I64(d), Buffer::I64(s)) => splice!(d, s),
        (Buffer::U8(d), Buffer::U8(s)) => splice!(d, s),
        (Buffer::U16(d), Buffer::U16(s)) => splice!(d, s),
        (Buffer::U32(d), Buffer::U32(s)) => splice!(d, s),
        (Buffer::U64(d), Buffer::U64(s)) => splice!(d, s),
        (Buffer::F32(d), Buffer::F32(s)) => splice!(d, s),
        (Buffer::F64(d), Buffer::F64(s)) => splice!(d, s),
        (Buffer::C64(d), Buffer::C64(s)) => splice!(d, s),
        (Buffer::C128(d), Buffer::C128(s)) => splice!(d, s),
        (Buffer::Str(_), _) => unreachable!("Str can never be a compiled expression's output dtype"),
        _ => unreachable!("computed sub-block dtype must equal the root's dtype"),
    }
}

/// # Safety
/// `output` must point to at least `buf.len() * size_of(buf.dtype())` bytes
/// of writable memory.
unsafe fn write_buffer(output: *mut u8, buf: &Buffer) {
    macro_rules! write_as {
        ($v:expr) => {{
            let bytes = std::mem::size_of_val($v.as_slice());
            unsafe { std::ptr::copy_nonoverlapping($v.as_ptr() as *const u8, output, bytes) };
        }};
    }
    match buf {
        Buffer::Bool(v) => write_as!(v),
        Buffer::I8(v) => write_as!(v),
        Buffer::I16(v) => write_as!(v),
        Buffer::I32(v) => write_as!(v),
        Buffer::I64(v) => write_as!(v),
        Buffer::U8(v) => write_as!(v),
        Buffer::U16(v) => write_as!(v),
        Buffer::U32(v) => write_as!(v),
        Buffer::U64(v) => write_as!(v),
        Buffer::F32(v) => write_as!(v),
        Buffer::F64(v) => write_as!(v),
        Buffer::C64(v) => write_as!(v),
        Buffer::C128(v) => write_as!(v),
        Buffer::Str(_) => unreachable!("Str can never be a compiled expression's output dtype"),
    }
}

/// The dtype `expr`'s root node evaluates to (spec.md §6.3).
pub fn result_dtype(expr: &CompiledExpr) -> Dtype {
    expr.dtype()
}

/// Whether `name` names one of the builtin functions (spec.md §6.3).
pub fn is_builtin_function_name(name: &str) -> bool {
    blockexpr_parser::builtins::is_builtin_function_name(name)
}

/// If `expr`'s root is a comparison (`<`, `>`, `<=`, `>=`, `==`, `!=`),
/// the comparison's [`OpKind`]; `None` otherwise (spec.md §6.3).
pub fn comparison_kind(expr: &CompiledExpr) -> Option<OpKind> {
    match expr.root().as_ref() {
        Expr::Call { op, .. } if op.is_comparison() => Some(*op),
        _ => None,
    }
}

/// If `expr`'s root is a reduction (`sum`, `mean`, …), the reduction's
/// [`OpKind`]; `None` otherwise (spec.md §6.3).
pub fn reduction_kind(expr: &CompiledExpr) -> Option<OpKind> {
    match expr.root().as_ref() {
        Expr::Reduction { op, .. } => Some(*op),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, dtype: Dtype, item_size: usize, bound: usize) -> VarDecl {
        VarDecl { name: name.to_string(), dtype, item_size, bound }
    }

    #[test]
    fn test_compile_and_evaluate_arithmetic() {
        let symbols = [var("a", Dtype::F32, 4, 1), var("b", Dtype::F32, 4, 2), var("c", Dtype::F32, 4, 3)];
        let compiled = compile("a*b+c", &symbols, None).unwrap();
        assert_eq!(result_dtype(&compiled), Dtype::F32);

        let a: [f32; 3] = [1.0, 2.0, 3.0];
        let b: [f32; 3] = [10.0, 10.0, 10.0];
        let c: [f32; 3] = [1.0, 1.0, 1.0];
        let mut out = [0.0f32; 3];

        unsafe {
            let vars = [a.as_ptr() as *const u8, b.as_ptr() as *const u8, c.as_ptr() as *const u8];
            evaluate(&compiled, &vars, out.as_mut_ptr() as *mut u8, 3, &EvalParams::default()).unwrap();
        }
        assert_eq!(out, [11.0, 21.0, 31.0]);
    }

    #[test]
    fn test_evaluate_rejects_var_count_mismatch() {
        let symbols = [var("a", Dtype::F64, 8, 1)];
        let compiled = compile("a", &symbols, None).unwrap();
        let a = [1.0f64];
        unsafe {
            let vars: [*const u8; 0] = [];
            let mut out = [0.0f64];
            let result = evaluate(&compiled, &vars, out.as_mut_ptr() as *mut u8, 1, &EvalParams::default());
            assert!(matches!(result, Err(EvalError::ErrVarMismatch { expected: 1, found: 0 })));
        }
        let _ = a;
    }

    #[test]
    fn test_evaluate_rejects_null_output() {
        let symbols = [var("a", Dtype::F64, 8, 1)];
        let compiled = compile("a", &symbols, None).unwrap();
        let a = [1.0f64];
        unsafe {
            let vars = [a.as_ptr() as *const u8];
            let result = evaluate(&compiled, &vars, std::ptr::null_mut(), 1, &EvalParams::default());
            assert!(matches!(result, Err(EvalError::ErrInvalidArg)));
        }
    }

    #[test]
    fn test_sum_reduction_end_to_end() {
        let symbols = [var("a", Dtype::F64, 8, 1)];
        let compiled = compile("sum(a)", &symbols, None).unwrap();
        assert_eq!(reduction_kind(&compiled), Some(OpKind::Sum));

        let a: [f64; 4] = [1.0, f64::NAN, 3.0, 4.0];
        let mut out = [0.0f64; 4];
        unsafe {
            let vars = [a.as_ptr() as *const u8];
            evaluate(&compiled, &vars, out.as_mut_ptr() as *mut u8, 4, &EvalParams::default()).unwrap();
        }
        assert!(out.iter().all(|x| x.is_nan()));
    }

    #[test]
    fn test_where_ternary_end_to_end() {
        let symbols = [var("a", Dtype::I32, 4, 1)];
        let compiled = compile("where(a>0, a, -a)", &symbols, None).unwrap();
        let a: [i32; 4] = [5, -3, 0, -7];
        let mut out = [0i32; 4];
        unsafe {
            let vars = [a.as_ptr() as *const u8];
            evaluate(&compiled, &vars, out.as_mut_ptr() as *mut u8, 4, &EvalParams::default()).unwrap();
        }
        assert_eq!(out, [5, 3, 0, 7]);
    }

    #[test]
    fn test_string_equality_end_to_end() {
        let symbols = [var("s", Dtype::Str, 16, 1), var("t", Dtype::Str, 16, 2)];
        let compiled = compile("s == t", &symbols, None).unwrap();

        fn slot(word: &str) -> [u32; 4] {
            let mut out = [0u32; 4];
            for (i, c) in word.chars().enumerate() {
                out[i] = c as u32;
            }
            out
        }

        let s = [slot("hi"), slot("no")];
        let t = [slot("hi"), slot("yo")];
        let mut out = [0u8; 2];
        unsafe {
            let vars = [s.as_ptr() as *const u8, t.as_ptr() as *const u8];
            evaluate(&compiled, &vars, out.as_mut_ptr(), 2, &EvalParams::default()).unwrap();
        }
        assert_eq!(out, [1, 0]);
    }
}
