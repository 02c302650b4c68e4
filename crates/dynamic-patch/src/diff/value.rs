//! Whole-value diff.
//!
//! Walks both values together, accumulating a [`PatchOp`] at the deepest
//! path where they start to differ. Records with the same field names (in the
//! same order) are diffed field by field; any other record change replaces the
//! record. Variants are never reconciled structurally: a changed variant is
//! replaced wholesale.

use dynamic_value::{DynamicOptic, DynamicValue, PrimitiveValue};

use super::{diff_maps, diff_sequences, diff_strings};
use crate::patch::{
    apply_operation, MapOp, Operation, Patch, PatchMode, PatchOp, PrimitiveOp,
};

/// The patch that turns `old` into `new` when applied in `Strict` mode.
pub fn diff_values(old: &DynamicValue, new: &DynamicValue) -> Patch {
    let mut ops = Vec::new();
    diff_at(&DynamicOptic::root(), old, new, &mut ops);
    Patch::from_ops(ops)
}

fn diff_at(path: &DynamicOptic, old: &DynamicValue, new: &DynamicValue, out: &mut Vec<PatchOp>) {
    if old == new {
        return;
    }
    let operation = match (old, new) {
        (DynamicValue::Record(a), DynamicValue::Record(b)) => {
            if a.iter().map(|(n, _)| n).eq(b.iter().map(|(n, _)| n)) {
                for ((name, va), (_, vb)) in a.iter().zip(b) {
                    diff_at(&path.clone().field(name.clone()), va, vb, out);
                }
                return;
            }
            Operation::Set(new.clone())
        }
        (
            DynamicValue::Primitive(PrimitiveValue::String(a)),
            DynamicValue::Primitive(PrimitiveValue::String(b)),
        ) => Operation::StringEdit(diff_strings(a, b)),
        (DynamicValue::Primitive(a), DynamicValue::Primitive(b)) => {
            match PrimitiveOp::between(a, b) {
                Some(delta) => Operation::PrimitiveDelta(delta),
                None => Operation::Set(new.clone()),
            }
        }
        (DynamicValue::Sequence(a), DynamicValue::Sequence(b)) => {
            Operation::SequenceEdit(diff_sequences(a, b))
        }
        (DynamicValue::Map(a), DynamicValue::Map(b)) => {
            map_operation(old, new, diff_maps(a, b))
        }
        _ => Operation::Set(new.clone()),
    };
    out.push(PatchOp::new(path.clone(), operation));
}

/// Map edits ignore entry order and `Add` appends, so fall back to `Set`
/// unless the edit reproduces `new` exactly.
fn map_operation(old: &DynamicValue, new: &DynamicValue, ops: Vec<MapOp>) -> Operation {
    if ops.is_empty() {
        return Operation::Set(new.clone());
    }
    let edit = Operation::MapEdit(ops);
    match apply_operation(old, &edit, PatchMode::Strict) {
        Ok(ref reached) if reached == new => edit,
        _ => Operation::Set(new.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(k: &str, v: i32) -> (DynamicValue, DynamicValue) {
        (DynamicValue::string(k), DynamicValue::int(v))
    }

    #[test]
    fn nested_field_change_is_addressed() {
        let user = |age| {
            DynamicValue::record([
                ("age", DynamicValue::int(age)),
                ("name", DynamicValue::string("Bo")),
            ])
        };
        let old = DynamicValue::record([("user", user(30))]);
        let new = DynamicValue::record([("user", user(31))]);
        let patch = diff_values(&old, &new);
        assert_eq!(
            patch.ops(),
            &[PatchOp::new(
                DynamicOptic::root().field("user").field("age"),
                Operation::PrimitiveDelta(PrimitiveOp::IntDelta(1)),
            )]
        );
        assert_eq!(patch.apply(&old, PatchMode::Strict), Ok(new));
    }

    #[test]
    fn reshaped_record_is_replaced() {
        let old = DynamicValue::record([("a", DynamicValue::int(1))]);
        let new = DynamicValue::record([("b", DynamicValue::int(1))]);
        assert_eq!(
            diff_values(&old, &new).ops(),
            &[PatchOp::new(DynamicOptic::root(), Operation::Set(new))]
        );
    }

    #[test]
    fn variants_are_replaced_wholesale() {
        let old = DynamicValue::some(DynamicValue::int(1));
        let new = DynamicValue::some(DynamicValue::int(2));
        assert_eq!(
            diff_values(&old, &new).ops(),
            &[PatchOp::new(DynamicOptic::root(), Operation::Set(new))]
        );
    }

    #[test]
    fn floats_are_set() {
        let patch = diff_values(&DynamicValue::double(0.1), &DynamicValue::double(0.3));
        assert_eq!(patch.ops()[0].operation, Operation::Set(DynamicValue::double(0.3)));
    }

    #[test]
    fn equal_values_give_empty_patch() {
        let v = DynamicValue::sequence([DynamicValue::int(1)]);
        assert!(diff_values(&v, &v).is_empty());
    }

    #[test]
    fn map_add_before_existing_entry_is_set() {
        let old = DynamicValue::map([entry("b", 0)]);
        let new = DynamicValue::map([entry("a", 0), entry("b", 0)]);
        let patch = diff_values(&old, &new);
        let replace = PatchOp::new(DynamicOptic::root(), Operation::Set(new.clone()));
        assert_eq!(patch.ops(), &[replace]);
        assert_eq!(patch.apply(&old, PatchMode::Strict), Ok(new));
    }

    #[test]
    fn map_reorder_is_set() {
        let old = DynamicValue::map([entry("a", 0), entry("b", 1)]);
        let new = DynamicValue::map([entry("b", 1), entry("a", 0)]);
        let patch = diff_values(&old, &new);
        let replace = PatchOp::new(DynamicOptic::root(), Operation::Set(new.clone()));
        assert_eq!(patch.ops(), &[replace]);
        assert_eq!(patch.apply(&old, PatchMode::Strict), Ok(new));
    }

    #[test]
    fn map_edit_kept_when_order_survives() {
        let old = DynamicValue::map([entry("a", 0), entry("b", 1)]);
        let new = DynamicValue::map([entry("a", 0), entry("b", 2), entry("c", 3)]);
        let patch = diff_values(&old, &new);
        assert!(matches!(patch.ops()[0].operation, Operation::MapEdit(_)));
        assert_eq!(patch.apply(&old, PatchMode::Strict), Ok(new));
    }
}
