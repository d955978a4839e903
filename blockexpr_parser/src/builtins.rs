//! The builtin symbol table (spec.md §3.3): a lexically sorted,
//! binary-searchable table mapping names to {operator identity, arity,
//! pure flag}.
//!
//! Operator identity is a tagged `OpKind` variant rather than a function
//! pointer (see spec.md §9 DESIGN NOTES) — dispatch is a table lookup in
//! `blockexpr_runtime`, not a call through an address.

/// Tagged identity of every operator/function the engine understands,
/// parser-side and operand-arity pair together with the builtin table.
/// Binary operators built directly by the grammar (`+`, `<`, `and`, …)
/// share this enum with named builtin functions (`sin`, `where`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    // ---- arithmetic (built by the grammar, arity 2) ----
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,

    // ---- comparisons (arity 2, result dtype Bool) ----
    Lt,
    Gt,
    LtEq,
    GtEq,
    Eq,
    NotEq,

    // ---- logical (arity 2 except Not) ----
    And,
    Or,
    Not,

    // ---- bitwise (arity 2 except BitNot) ----
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    Shl,
    Shr,

    // ---- unary sign ----
    Neg,
    Pos,

    // ---- transcendental / rounding (arity 1 unless noted) ----
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2, // arity 2
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Exp,
    Expm1,
    Exp2,
    Exp10,
    Log,
    Ln,
    Log10,
    Log1p,
    Log2,
    Sqrt,
    Cbrt,
    Ceil,
    Floor,
    Trunc,
    Round,
    Rint,
    Erf,
    Erfc,
    Tgamma,
    Lgamma,
    Sinpi,
    Cospi,
    Fabs,
    Copysign, // arity 2
    Fdim,     // arity 2
    Fmax,     // arity 2
    Fmin,     // arity 2
    Fmod,     // arity 2
    Hypot,    // arity 2
    Ldexp,    // arity 2
    Nextafter, // arity 2
    Remainder, // arity 2
    Fma,       // arity 3

    // ---- combinatorial ----
    Fac,        // arity 1
    Ncr,        // arity 2
    Npr,        // arity 2
    Logaddexp,  // arity 2

    // ---- complex selectors (arity 1) ----
    Real,
    Imag,
    Conj,

    // ---- string relations (arity 2, result dtype Bool) ----
    StartsWith,
    EndsWith,
    Contains,

    // ---- reductions (arity 1) ----
    Sum,
    Mean,
    Prod,
    Min,
    Max,
    Any,
    All,

    // ---- ternary ----
    Where, // arity 3

    // ---- nullary constants ----
    Pi,
    E,

    // ---- node-kind-only identity, never looked up by name ----
    /// Marks a `Convert` node (spec.md §9: a distinct variant rather than
    /// a Function1 node with a null function pointer).
    Convert,
}

impl OpKind {
    /// Whether this operator is a reduction (spec.md §4.7).
    pub fn is_reduction(self) -> bool {
        matches!(
            self,
            OpKind::Sum | OpKind::Mean | OpKind::Prod | OpKind::Min | OpKind::Max | OpKind::Any | OpKind::All
        )
    }

    /// Whether this operator is a comparison (result dtype always Bool).
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            OpKind::Lt | OpKind::Gt | OpKind::LtEq | OpKind::GtEq | OpKind::Eq | OpKind::NotEq
        )
    }

    /// Whether this operator is a logical combinator (result dtype always Bool).
    pub fn is_logical(self) -> bool {
        matches!(self, OpKind::And | OpKind::Or | OpKind::Not)
    }

    /// Whether this operator is one of the three string-relation functions.
    pub fn is_string_relation(self) -> bool {
        matches!(self, OpKind::StartsWith | OpKind::EndsWith | OpKind::Contains)
    }

    /// Whether this operator may ever accept a string operand (comparisons
    /// and the three string-relation functions — spec.md §3.2).
    pub fn accepts_string_operand(self) -> bool {
        matches!(self, OpKind::Eq | OpKind::NotEq) || self.is_string_relation()
    }

    /// Whether this operator is a shift (result dtype is the left
    /// operand's dtype, not the common type — spec.md §4.3).
    pub fn is_shift(self) -> bool {
        matches!(self, OpKind::Shl | OpKind::Shr)
    }
}

/// One entry in the builtin symbol table.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinEntry {
    pub name: &'static str,
    pub op: OpKind,
    pub arity: usize,
    pub pure: bool,
}

/// The builtin table, sorted lexically by name so `lookup_builtin` can
/// binary search it (spec.md §3.3: "lookup is O(log N) binary search").
///
/// Keep this array sorted — `debug_assert!` in tests checks it.
const BUILTINS: &[BuiltinEntry] = &[
    entry("acos", OpKind::Acos, 1),
    entry("acosh", OpKind::Acosh, 1),
    entry("all", OpKind::All, 1),
    entry("any", OpKind::Any, 1),
    entry("asin", OpKind::Asin, 1),
    entry("asinh", OpKind::Asinh, 1),
    entry("atan", OpKind::Atan, 1),
    entry("atan2", OpKind::Atan2, 2),
    entry("atanh", OpKind::Atanh, 1),
    entry("cbrt", OpKind::Cbrt, 1),
    entry("ceil", OpKind::Ceil, 1),
    entry("conj", OpKind::Conj, 1),
    entry("contains", OpKind::Contains, 2),
    entry("copysign", OpKind::Copysign, 2),
    entry("cos", OpKind::Cos, 1),
    entry("cosh", OpKind::Cosh, 1),
    entry("cospi", OpKind::Cospi, 1),
    entry("e", OpKind::E, 0),
    entry("endswith", OpKind::EndsWith, 2),
    entry("erf", OpKind::Erf, 1),
    entry("erfc", OpKind::Erfc, 1),
    entry("exp", OpKind::Exp, 1),
    entry("exp10", OpKind::Exp10, 1),
    entry("exp2", OpKind::Exp2, 1),
    entry("expm1", OpKind::Expm1, 1),
    entry("fabs", OpKind::Fabs, 1),
    entry("fac", OpKind::Fac, 1),
    entry("fdim", OpKind::Fdim, 2),
    entry("floor", OpKind::Floor, 1),
    entry("fma", OpKind::Fma, 3),
    entry("fmax", OpKind::Fmax, 2),
    entry("fmin", OpKind::Fmin, 2),
    entry("fmod", OpKind::Fmod, 2),
    entry("hypot", OpKind::Hypot, 2),
    entry("imag", OpKind::Imag, 1),
    entry("ldexp", OpKind::Ldexp, 2),
    entry("lgamma", OpKind::Lgamma, 1),
    entry("ln", OpKind::Ln, 1),
    entry("log", OpKind::Log, 1),
    entry("log10", OpKind::Log10, 1),
    entry("log1p", OpKind::Log1p, 1),
    entry("log2", OpKind::Log2, 1),
    entry("logaddexp", OpKind::Logaddexp, 2),
    entry("max", OpKind::Max, 1),
    entry("mean", OpKind::Mean, 1),
    entry("min", OpKind::Min, 1),
    entry("ncr", OpKind::Ncr, 2),
    entry("nextafter", OpKind::Nextafter, 2),
    entry("npr", OpKind::Npr, 2),
    entry("pi", OpKind::Pi, 0),
    entry("prod", OpKind::Prod, 1),
    entry("real", OpKind::Real, 1),
    entry("remainder", OpKind::Remainder, 2),
    entry("rint", OpKind::Rint, 1),
    entry("round", OpKind::Round, 1),
    entry("sin", OpKind::Sin, 1),
    entry("sinh", OpKind::Sinh, 1),
    entry("sinpi", OpKind::Sinpi, 1),
    entry("sqrt", OpKind::Sqrt, 1),
    entry("startswith", OpKind::StartsWith, 2),
    entry("sum", OpKind::Sum, 1),
    entry("tan", OpKind::Tan, 1),
    entry("tanh", OpKind::Tanh, 1),
    entry("tgamma", OpKind::Tgamma, 1),
    entry("trunc", OpKind::Trunc, 1),
    entry("where", OpKind::Where, 3),
];

const fn entry(name: &'static str, op: OpKind, arity: usize) -> BuiltinEntry {
    // Every builtin is pure; none carry side effects (only user-registered
    // closures, outside this table's scope, may be impure).
    BuiltinEntry { name, op, arity, pure: true }
}

/// Look up a name in the builtin table by binary search.
pub fn lookup_builtin(name: &str) -> Option<&'static BuiltinEntry> {
    BUILTINS
        .binary_search_by(|e| e.name.cmp(name))
        .ok()
        .map(|i| &BUILTINS[i])
}

/// Whether `name` names a builtin function (spec.md §6.3
/// `is_builtin_function_name`).
pub fn is_builtin_function_name(name: &str) -> bool {
    lookup_builtin(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        for pair in BUILTINS.windows(2) {
            assert!(
                pair[0].name < pair[1].name,
                "builtin table out of order: {} >= {}",
                pair[0].name,
                pair[1].name
            );
        }
    }

    #[test]
    fn test_lookup_known_names() {
        assert_eq!(lookup_builtin("sin").unwrap().op, OpKind::Sin);
        assert_eq!(lookup_builtin("atan2").unwrap().arity, 2);
        assert_eq!(lookup_builtin("where").unwrap().arity, 3);
        assert_eq!(lookup_builtin("pi").unwrap().arity, 0);
    }

    #[test]
    fn test_lookup_unknown_name() {
        assert!(lookup_builtin("frobnicate").is_none());
    }

    #[test]
    fn test_case_sensitive() {
        assert!(lookup_builtin("Sin").is_none());
        assert!(lookup_builtin("PI").is_none());
    }

    #[test]
    fn test_is_builtin_function_name() {
        assert!(is_builtin_function_name("sum"));
        assert!(!is_builtin_function_name("not_a_function"));
    }
}
