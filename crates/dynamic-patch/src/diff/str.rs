//! Character-level string diff.

use super::lcs::{edit_steps, Step};
use crate::patch::StringOp;

/// The edit script turning `old` into `new`.
///
/// Indices count chars and refer to the string as left by the previous op,
/// so applying the ops in order to `old` yields `new`. Contiguous inserts and
/// deletes are batched into one op each.
///
/// ```
/// use dynamic_patch::diff::diff_strings;
/// use dynamic_patch::StringOp;
///
/// assert_eq!(
///     diff_strings("abc", "axc"),
///     vec![
///         StringOp::Delete { index: 1, length: 1 },
///         StringOp::Insert { index: 1, text: "x".into() },
///     ]
/// );
/// ```
pub fn diff_strings(old: &str, new: &str) -> Vec<StringOp> {
    if old == new {
        return Vec::new();
    }
    let a: Vec<char> = old.chars().collect();
    let b: Vec<char> = new.chars().collect();

    let mut ops: Vec<StringOp> = Vec::new();
    // Position in the partially edited string; `j` walks `new`.
    let (mut pos, mut j) = (0usize, 0usize);
    for step in edit_steps(&a, &b) {
        match step {
            Step::Keep => {
                pos += 1;
                j += 1;
            }
            Step::Insert => {
                let c = b[j];
                j += 1;
                match ops.last_mut() {
                    Some(StringOp::Insert { index, text })
                        if *index + text.chars().count() == pos =>
                    {
                        text.push(c)
                    }
                    _ => ops.push(StringOp::Insert {
                        index: pos,
                        text: c.to_string(),
                    }),
                }
                pos += 1;
            }
            Step::Delete => match ops.last_mut() {
                Some(StringOp::Delete { index, length }) if *index == pos => *length += 1,
                _ => ops.push(StringOp::Delete { index: pos, length: 1 }),
            },
        }
    }
    ops
}
