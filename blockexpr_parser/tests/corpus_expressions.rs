//! End-to-end coverage of the public `compile` surface across dtypes and
//! grammar features, complementing the per-module unit tests.

use blockexpr_parser::dtype::Dtype;
use blockexpr_parser::{compile, Expr, ParseError, SymbolDecl};

fn decl(name: &str, dtype: Dtype, item_size: usize) -> SymbolDecl {
    SymbolDecl { name: name.to_string(), dtype, item_size }
}

fn assert_dtype(source: &str, symbols: &[SymbolDecl], expected: Dtype) {
    let tree = compile(source, symbols, None).unwrap_or_else(|e| panic!("{source}: {e:?}"));
    assert_eq!(tree.dtype(), expected, "{source}");
}

// =============================================================================
// Arithmetic promotion
// =============================================================================

#[test]
fn test_integer_widths_promote_to_widest() {
    let symbols = [decl("a", Dtype::I8, 1), decl("b", Dtype::I32, 4)];
    assert_dtype("a + b", &symbols, Dtype::I32);
}

#[test]
fn test_mixed_signedness_promotes_to_float() {
    let symbols = [decl("a", Dtype::U32, 4), decl("b", Dtype::I32, 4)];
    assert_dtype("a + b", &symbols, Dtype::I32);
}

#[test]
fn test_int_and_float_promotes_to_float() {
    let symbols = [decl("a", Dtype::I32, 4), decl("b", Dtype::F64, 8)];
    assert_dtype("a + b", &symbols, Dtype::F64);
}

#[test]
fn test_complex_absorbs_real_operand() {
    let symbols = [decl("a", Dtype::C64, 8), decl("b", Dtype::F32, 4)];
    assert_dtype("a * b", &symbols, Dtype::C64);
}

// =============================================================================
// Comparisons and logical operators always yield Bool
// =============================================================================

#[test]
fn test_comparison_yields_bool_regardless_of_operand_dtype() {
    let symbols = [decl("a", Dtype::F64, 8), decl("b", Dtype::F64, 8)];
    assert_dtype("a < b", &symbols, Dtype::Bool);
    assert_dtype("a == b", &symbols, Dtype::Bool);
}

#[test]
fn test_logical_and_or_require_bool_operands() {
    let symbols = [decl("p", Dtype::Bool, 1), decl("q", Dtype::Bool, 1)];
    assert_dtype("p and q", &symbols, Dtype::Bool);
    assert_dtype("p or q", &symbols, Dtype::Bool);
}

// =============================================================================
// Shifts keep the left operand's dtype
// =============================================================================

#[test]
fn test_shift_keeps_left_operand_dtype() {
    let symbols = [decl("a", Dtype::U16, 2), decl("n", Dtype::I32, 4)];
    assert_dtype("a << n", &symbols, Dtype::U16);
}

// =============================================================================
// Reductions
// =============================================================================

#[test]
fn test_sum_preserves_widened_integer_accumulator_dtype() {
    let symbols = [decl("a", Dtype::I32, 4)];
    let tree = compile("sum(a)", &symbols, None).unwrap();
    assert!(matches!(tree.as_ref(), Expr::Reduction { .. }));
}

#[test]
fn test_any_all_require_bool_child() {
    let symbols = [decl("mask", Dtype::Bool, 1)];
    assert_dtype("all(mask)", &symbols, Dtype::Bool);
    assert_dtype("any(mask)", &symbols, Dtype::Bool);
}

// =============================================================================
// Strings
// =============================================================================

#[test]
fn test_string_relations_yield_bool() {
    let symbols = [decl("s", Dtype::Str, 16), decl("t", Dtype::Str, 16)];
    assert_dtype("s == t", &symbols, Dtype::Bool);
    assert_dtype("startswith(s, t)", &symbols, Dtype::Bool);
}

#[test]
fn test_string_arithmetic_is_rejected() {
    let symbols = [decl("s", Dtype::Str, 16), decl("t", Dtype::Str, 16)];
    let result = compile("s + t", &symbols, None);
    assert!(result.is_err());
}

// =============================================================================
// where()
// =============================================================================

#[test]
fn test_where_promotes_branches_and_keeps_bool_condition() {
    let symbols = [decl("cond", Dtype::Bool, 1), decl("a", Dtype::I32, 4), decl("b", Dtype::F64, 8)];
    assert_dtype("where(cond, a, b)", &symbols, Dtype::F64);
}

#[test]
fn test_where_rejects_non_bool_condition() {
    let symbols = [decl("a", Dtype::I32, 4), decl("b", Dtype::I32, 4), decl("c", Dtype::I32, 4)];
    let result = compile("where(a, b, c)", &symbols, None);
    assert!(result.is_err());
}

// =============================================================================
// Target dtype coercion
// =============================================================================

#[test]
fn test_explicit_target_dtype_wraps_with_convert() {
    let symbols = [decl("a", Dtype::I32, 4)];
    let tree = compile("a + 1", &symbols, Some(Dtype::F64)).unwrap();
    assert_eq!(tree.dtype(), Dtype::F64);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unknown_identifier_reports_name() {
    let result = compile("totally_unknown", &[], None);
    match result {
        Err(ParseError::UnknownIdentifier { name, .. }) => assert_eq!(name, "totally_unknown"),
        other => panic!("expected UnknownIdentifier, got {other:?}"),
    }
}

#[test]
fn test_wrong_arity_is_rejected() {
    let symbols = [decl("a", Dtype::F64, 8)];
    let result = compile("sin(a, a)", &symbols, None);
    assert!(matches!(result, Err(ParseError::WrongArity { .. })));
}

#[test]
fn test_mismatched_parenthesis_is_rejected() {
    let symbols = [decl("a", Dtype::F64, 8)];
    let result = compile("(a + 1", &symbols, None);
    assert!(result.is_err());
}
