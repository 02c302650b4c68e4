//! Patches: ordered lists of path-addressed operations.

pub mod apply;
pub mod types;

use std::ops::Add;

use dynamic_value::{DynamicOptic, DynamicValue, SchemaResult};
use serde::{Deserialize, Serialize};

pub use apply::{apply_op, apply_operation, apply_ops};
pub use types::{MapOp, Operation, PatchMode, PatchOp, PrimitiveOp, SeqOp, StringOp};

/// An ordered, serializable edit description.
///
/// Ops are applied in order; each sees the value left by the previous one.
/// Concatenation is associative and [`Patch::empty`] is its identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    ops: Vec<PatchOp>,
}

impl Patch {
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn from_ops(ops: Vec<PatchOp>) -> Self {
        Self { ops }
    }

    pub fn single(path: DynamicOptic, operation: Operation) -> Self {
        Self::from_ops(vec![PatchOp::new(path, operation)])
    }

    /// A patch that replaces the value at `path`.
    pub fn set(path: DynamicOptic, value: DynamicValue) -> Self {
        Self::single(path, Operation::Set(value))
    }

    /// The patch that turns `old` into `new`.
    pub fn diff(old: &DynamicValue, new: &DynamicValue) -> Self {
        crate::diff::diff_values(old, new)
    }

    #[inline]
    pub fn ops(&self) -> &[PatchOp] {
        &self.ops
    }

    #[inline]
    pub fn into_ops(self) -> Vec<PatchOp> {
        self.ops
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// `self` followed by `other`.
    pub fn then(mut self, other: Patch) -> Self {
        self.ops.extend(other.ops);
        self
    }

    pub fn apply(&self, value: &DynamicValue, mode: PatchMode) -> SchemaResult<DynamicValue> {
        apply_ops(value, &self.ops, mode)
    }
}

impl Add for Patch {
    type Output = Patch;

    fn add(self, rhs: Patch) -> Patch {
        self.then(rhs)
    }
}

impl FromIterator<PatchOp> for Patch {
    fn from_iter<I: IntoIterator<Item = PatchOp>>(iter: I) -> Self {
        Self::from_ops(iter.into_iter().collect())
    }
}
