//! `Workspace`: the mutable, per-call scratch state the spec's original
//! "clone the expression" design would have owned implicitly (spec.md §5,
//! see [`crate::compiled`]'s module doc for the split rationale).
//!
//! A `Workspace` borrows nothing from its `CompiledExpr`'s `Arc<Expr>` tree
//! (the tree is read-only), so the same compiled plan can back any number
//! of concurrently-running workspaces. All the unsafe raw-pointer reads
//! spec.md §6.2 describes are localized to [`crate::api::evaluate`]; by the
//! time a `Workspace` exists, every variable has already been copied into
//! a safe, owned [`crate::value::Buffer`].

use std::sync::Arc;

use blockexpr_parser::dtype::Dtype;

use crate::value::Buffer;

/// Per-call input buffers and output scratch, indexed by the same
/// declaration order as [`crate::compiled::CompiledExpr::variables`] and
/// keyed by name for the dispatcher's `Variable` lookups (spec.md §4.6
/// step 3: "copy the variable's own buffer through, or convert it").
pub struct Workspace {
    pub(crate) names: Vec<Arc<str>>,
    pub(crate) vars: Vec<Buffer>,
    pub(crate) block_nitems: usize,
}

impl Workspace {
    pub fn new(names: Vec<Arc<str>>, vars: Vec<Buffer>, block_nitems: usize) -> Workspace {
        Workspace { names, vars, block_nitems }
    }

    /// Build a sub-workspace covering `[offset, offset+len)` of every
    /// variable, for sub-block chunked evaluation (spec.md §5). Each
    /// variable pointer in the caller's raw slice already accounts for
    /// `offset * item_size`; here the buffers have already been
    /// materialized, so sub-blocking instead slices the owned `Vec`s.
    pub fn sub_block(&self, offset: usize, len: usize) -> Workspace {
        let vars = self.vars.iter().map(|b| slice_buffer(b, offset, len)).collect();
        Workspace { names: self.names.clone(), vars, block_nitems: len }
    }

    pub fn variable(&self, index: usize) -> &Buffer {
        &self.vars[index]
    }

    /// Look up a variable's buffer by the name carried on an `Expr::Variable`
    /// node. `MAX_VARS` (64) keeps a linear scan cheap.
    pub fn variable_by_name(&self, name: &str) -> &Buffer {
        let idx = self
            .names
            .iter()
            .position(|n| n.as_ref() == name)
            .unwrap_or_else(|| panic!("variable '{name}' not bound in this workspace"));
        &self.vars[idx]
    }
}

fn slice_buffer(buf: &Buffer, offset: usize, len: usize) -> Buffer {
    macro_rules! slice_vec {
        ($v:expr) => {
            $v[offset..offset + len].to_vec()
        };
    }
    match buf {
        Buffer::Bool(v) => Buffer::Bool(slice_vec!(v)),
        Buffer::I8(v) => Buffer::I8(slice_vec!(v)),
        Buffer::I16(v) => Buffer::I16(slice_vec!(v)),
        Buffer::I32(v) => Buffer::I32(slice_vec!(v)),
        Buffer::I64(v) => Buffer::I64(slice_vec!(v)),
        Buffer::U8(v) => Buffer::U8(slice_vec!(v)),
        Buffer::U16(v) => Buffer::U16(slice_vec!(v)),
        Buffer::U32(v) => Buffer::U32(slice_vec!(v)),
        Buffer::U64(v) => Buffer::U64(slice_vec!(v)),
        Buffer::F32(v) => Buffer::F32(slice_vec!(v)),
        Buffer::F64(v) => Buffer::F64(slice_vec!(v)),
        Buffer::C64(v) => Buffer::C64(slice_vec!(v)),
        Buffer::C128(v) => Buffer::C128(slice_vec!(v)),
        Buffer::Str(s) => Buffer::Str(crate::value::StrBuffer {
            item_size: s.item_size,
            slots: s.slots[offset..offset + len].to_vec(),
        }),
    }
}

/// Allocate the zeroed output buffer a finished evaluation will be
/// written into.
pub fn alloc_output(dtype: Dtype, nitems: usize) -> Buffer {
    Buffer::zeroed(dtype, nitems)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_block_slices_every_variable() {
        let ws = Workspace::new(vec![Arc::from("a")], vec![Buffer::I32(vec![1, 2, 3, 4, 5, 6])], 6);
        let sub = ws.sub_block(2, 3);
        assert!(matches!(sub.variable(0), Buffer::I32(v) if v == &vec![3, 4, 5]));
        assert_eq!(sub.block_nitems, 3);
    }

    #[test]
    fn test_variable_by_name() {
        let ws = Workspace::new(
            vec![Arc::from("a"), Arc::from("b")],
            vec![Buffer::I32(vec![1]), Buffer::I32(vec![2])],
            1,
        );
        assert!(matches!(ws.variable_by_name("b"), Buffer::I32(v) if v == &vec![2]));
    }
}
