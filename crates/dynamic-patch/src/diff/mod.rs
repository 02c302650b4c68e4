//! Diffing: LCS edit scripts for strings and sequences, key diffs for maps,
//! and whole-value diffs producing a [`Patch`](crate::Patch).

pub mod lcs;
mod map;
mod seq;
mod str;
mod value;

pub use lcs::{align, longest_common_subsequence, Run};
pub use map::diff_maps;
pub use seq::diff_sequences;
pub use str::diff_strings;
pub use value::diff_values;
