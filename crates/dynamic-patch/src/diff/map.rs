//! Key-level map diff.
//!
//! Not LCS based: keys are matched structurally. Keys only in `old` are
//! removed, keys only in `new` are added, keys in both with different values
//! are replaced through `Modify(key, Set(value))`.

use dynamic_value::DynamicValue;

use crate::patch::{MapOp, Operation};

/// The edit script turning `old` into `new`.
///
/// Removals come first in `old` order, followed by modifications and
/// additions in `new` order.
pub fn diff_maps(
    old: &[(DynamicValue, DynamicValue)],
    new: &[(DynamicValue, DynamicValue)],
) -> Vec<MapOp> {
    let lookup = |entries: &[(DynamicValue, DynamicValue)], key: &DynamicValue| {
        entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    };

    let removed = old
        .iter()
        .filter(|(k, _)| lookup(new, k).is_none())
        .map(|(k, _)| MapOp::Remove { key: k.clone() });

    let changed = new.iter().filter_map(|(k, v)| match lookup(old, k) {
        None => Some(MapOp::Add {
            key: k.clone(),
            value: v.clone(),
        }),
        Some(prev) if prev != *v => Some(MapOp::Modify {
            key: k.clone(),
            op: Operation::Set(v.clone()),
        }),
        Some(_) => None,
    });

    removed.chain(changed).collect()
}
