//! Element-level sequence diff.

use dynamic_value::DynamicValue;

use super::lcs::{edit_steps, Step};
use crate::patch::SeqOp;

/// The edit script turning `old` into `new`.
///
/// Same shape as [`diff_strings`](super::diff_strings): indices refer to the
/// running sequence and contiguous runs are batched. Equal inputs give no
/// ops; an empty side short-circuits to a single `Append` or `Delete`.
pub fn diff_sequences(old: &[DynamicValue], new: &[DynamicValue]) -> Vec<SeqOp> {
    if old == new {
        return Vec::new();
    }
    if old.is_empty() {
        return vec![SeqOp::Append { values: new.to_vec() }];
    }
    if new.is_empty() {
        return vec![SeqOp::Delete {
            index: 0,
            count: old.len(),
        }];
    }

    let mut ops: Vec<SeqOp> = Vec::new();
    let (mut pos, mut j) = (0usize, 0usize);
    for step in edit_steps(old, new) {
        match step {
            Step::Keep => {
                pos += 1;
                j += 1;
            }
            Step::Insert => {
                let item = new[j].clone();
                j += 1;
                match ops.last_mut() {
                    Some(SeqOp::Insert { index, values }) if *index + values.len() == pos => {
                        values.push(item)
                    }
                    _ => ops.push(SeqOp::Insert {
                        index: pos,
                        values: vec![item],
                    }),
                }
                pos += 1;
            }
            Step::Delete => match ops.last_mut() {
                Some(SeqOp::Delete { index, count }) if *index == pos => *count += 1,
                _ => ops.push(SeqOp::Delete { index: pos, count: 1 }),
            },
        }
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(xs: &[i32]) -> Vec<DynamicValue> {
        xs.iter().copied().map(DynamicValue::int).collect()
    }

    #[test]
    fn degenerate_cases_short_circuit() {
        assert!(diff_sequences(&ints(&[1, 2]), &ints(&[1, 2])).is_empty());
        assert_eq!(
            diff_sequences(&[], &ints(&[1])),
            vec![SeqOp::Append { values: ints(&[1]) }]
        );
        assert_eq!(
            diff_sequences(&ints(&[1, 2]), &[]),
            vec![SeqOp::Delete { index: 0, count: 2 }]
        );
    }

    #[test]
    fn middle_replacement() {
        assert_eq!(
            diff_sequences(&ints(&[1, 2, 3]), &ints(&[1, 3, 4])),
            vec![
                SeqOp::Delete { index: 1, count: 1 },
                SeqOp::Insert {
                    index: 2,
                    values: ints(&[4])
                },
            ]
        );
    }
}
