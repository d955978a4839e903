//! Ambient evaluation configuration (spec.md §6.2's `EvalParams`).

use serde::{Deserialize, Serialize};

use crate::compiled::{MAX_VARS, SUB_BLOCK_NITEMS};

/// Tunables threaded through `evaluate` calls. `Default` matches the
/// compile-time constants spec.md documents; callers only need to build
/// one of these when overriding sub-blocking or the variable-count limit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EvalParams {
    /// Sub-block size in items; `None` uses the built-in default
    /// ([`SUB_BLOCK_NITEMS`]). Ignored when the compiled plan disallows
    /// sub-blocking (it contains a reduction).
    pub sub_block_nitems: Option<usize>,
    /// Override for [`MAX_VARS`]; mainly useful in tests exercising the
    /// `ErrTooManyVars` path with a smaller limit.
    pub max_vars: usize,
}

impl Default for EvalParams {
    fn default() -> EvalParams {
        EvalParams { sub_block_nitems: None, max_vars: MAX_VARS }
    }
}

impl EvalParams {
    pub fn sub_block_nitems(&self) -> usize {
        self.sub_block_nitems.unwrap_or(SUB_BLOCK_NITEMS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_builtin_constants() {
        let params = EvalParams::default();
        assert_eq!(params.sub_block_nitems(), SUB_BLOCK_NITEMS);
        assert_eq!(params.max_vars, MAX_VARS);
    }
}
