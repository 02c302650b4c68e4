//! Merging two values under a [`MergeStrategy`].

use std::fmt;
use std::sync::Arc;

use crate::optic::DynamicOptic;
use crate::value::DynamicValue;

type RecursePredicate = dyn Fn(&DynamicOptic, &DynamicValue, &DynamicValue) -> bool + Send + Sync;
type LeafCombiner =
    dyn Fn(&DynamicOptic, &DynamicValue, &DynamicValue) -> DynamicValue + Send + Sync;

/// How two values are combined.
#[derive(Clone, Default)]
pub enum MergeStrategy {
    /// Recurse into records, sequences, maps and same-case variants; the right
    /// value wins at leaves and on kind mismatch.
    #[default]
    Auto,
    /// No recursion; the right value wins.
    Replace,
    /// No recursion; the left value wins.
    KeepLeft,
    /// Merge record fields and map entries at the root only; children are
    /// taken from the right value without recursing.
    Shallow,
    /// Like `Auto`, but sequences are concatenated instead of merged by index.
    Concat,
    /// Caller-supplied recursion predicate and leaf combiner.
    Custom {
        recurse: Arc<RecursePredicate>,
        combine: Arc<LeafCombiner>,
    },
}

impl MergeStrategy {
    pub fn custom<R, C>(recurse: R, combine: C) -> Self
    where
        R: Fn(&DynamicOptic, &DynamicValue, &DynamicValue) -> bool + Send + Sync + 'static,
        C: Fn(&DynamicOptic, &DynamicValue, &DynamicValue) -> DynamicValue + Send + Sync + 'static,
    {
        MergeStrategy::Custom {
            recurse: Arc::new(recurse),
            combine: Arc::new(combine),
        }
    }
}

impl fmt::Debug for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeStrategy::Auto => f.write_str("Auto"),
            MergeStrategy::Replace => f.write_str("Replace"),
            MergeStrategy::KeepLeft => f.write_str("KeepLeft"),
            MergeStrategy::Shallow => f.write_str("Shallow"),
            MergeStrategy::Concat => f.write_str("Concat"),
            MergeStrategy::Custom { .. } => f.write_str("Custom"),
        }
    }
}

impl DynamicValue {
    /// Merge `other` into `self` (left = `self`, right = `other`).
    pub fn merge(&self, other: &DynamicValue, strategy: &MergeStrategy) -> DynamicValue {
        merge_at(&DynamicOptic::root(), self, other, strategy)
    }
}

fn merge_at(
    path: &DynamicOptic,
    left: &DynamicValue,
    right: &DynamicValue,
    strategy: &MergeStrategy,
) -> DynamicValue {
    match strategy {
        MergeStrategy::Replace => right.clone(),
        MergeStrategy::KeepLeft => left.clone(),
        MergeStrategy::Shallow => {
            if path.is_root() {
                merge_containers(path, left, right, &MergeStrategy::Replace, false)
            } else {
                right.clone()
            }
        }
        MergeStrategy::Auto => merge_containers(path, left, right, strategy, false),
        MergeStrategy::Concat => merge_containers(path, left, right, strategy, true),
        MergeStrategy::Custom { recurse, combine } => {
            if same_container_kind(left, right) && recurse(path, left, right) {
                merge_containers(path, left, right, strategy, false)
            } else {
                combine(path, left, right)
            }
        }
    }
}

fn same_container_kind(left: &DynamicValue, right: &DynamicValue) -> bool {
    match (left, right) {
        (DynamicValue::Record(_), DynamicValue::Record(_))
        | (DynamicValue::Sequence(_), DynamicValue::Sequence(_))
        | (DynamicValue::Map(_), DynamicValue::Map(_)) => true,
        (DynamicValue::Variant(l, _), DynamicValue::Variant(r, _)) => l == r,
        _ => false,
    }
}

/// One level of structural merge; `child` decides how children combine.
fn merge_containers(
    path: &DynamicOptic,
    left: &DynamicValue,
    right: &DynamicValue,
    child: &MergeStrategy,
    concat_sequences: bool,
) -> DynamicValue {
    match (left, right) {
        (DynamicValue::Record(l), DynamicValue::Record(r)) => {
            let mut fields = l.clone();
            for (name, rv) in r {
                match fields.iter_mut().find(|(n, _)| n == name) {
                    Some((_, lv)) => {
                        *lv = merge_at(&path.clone().field(name.clone()), lv, rv, child)
                    }
                    None => fields.push((name.clone(), rv.clone())),
                }
            }
            DynamicValue::Record(fields)
        }
        (DynamicValue::Sequence(l), DynamicValue::Sequence(r)) if concat_sequences => {
            DynamicValue::Sequence(l.iter().chain(r.iter()).cloned().collect())
        }
        (DynamicValue::Sequence(l), DynamicValue::Sequence(r)) => {
            let len = l.len().max(r.len());
            let items = (0..len)
                .map(|i| match (l.get(i), r.get(i)) {
                    (Some(lv), Some(rv)) => merge_at(&path.clone().at(i), lv, rv, child),
                    (Some(v), None) | (None, Some(v)) => v.clone(),
                    (None, None) => DynamicValue::Null,
                })
                .collect();
            DynamicValue::Sequence(items)
        }
        (DynamicValue::Map(l), DynamicValue::Map(r)) => {
            let mut entries = l.clone();
            for (key, rv) in r {
                match entries.iter_mut().find(|(k, _)| k == key) {
                    Some((_, lv)) => {
                        *lv = merge_at(&path.clone().at_key(key.clone()), lv, rv, child)
                    }
                    None => entries.push((key.clone(), rv.clone())),
                }
            }
            DynamicValue::Map(entries)
        }
        (DynamicValue::Variant(lc, lv), DynamicValue::Variant(rc, rv)) if lc == rc => {
            let merged = merge_at(&path.clone().case(lc.clone()), lv, rv, child);
            DynamicValue::variant(lc.clone(), merged)
        }
        _ => right.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrimitiveValue;

    fn rec(fields: &[(&str, DynamicValue)]) -> DynamicValue {
        DynamicValue::record(fields.iter().cloned())
    }

    #[test]
    fn auto_merges_records_recursively() {
        let left = rec(&[("a", rec(&[("x", DynamicValue::int(1))])), ("b", DynamicValue::int(2))]);
        let right = rec(&[("a", rec(&[("y", DynamicValue::int(3))])), ("c", DynamicValue::int(4))]);
        let merged = left.merge(&right, &MergeStrategy::Auto);
        assert_eq!(
            merged,
            rec(&[
                ("a", rec(&[("x", DynamicValue::int(1)), ("y", DynamicValue::int(3))])),
                ("b", DynamicValue::int(2)),
                ("c", DynamicValue::int(4)),
            ])
        );
    }

    #[test]
    fn replace_and_keep_left() {
        let l = DynamicValue::int(1);
        let r = DynamicValue::int(2);
        assert_eq!(l.merge(&r, &MergeStrategy::Replace), r);
        assert_eq!(l.merge(&r, &MergeStrategy::KeepLeft), l);
    }

    #[test]
    fn shallow_does_not_recurse() {
        let left = rec(&[("a", rec(&[("x", DynamicValue::int(1))]))]);
        let right = rec(&[("a", rec(&[("y", DynamicValue::int(3))]))]);
        let merged = left.merge(&right, &MergeStrategy::Shallow);
        assert_eq!(merged, rec(&[("a", rec(&[("y", DynamicValue::int(3))]))]));
    }

    #[test]
    fn concat_appends_sequences() {
        let l = DynamicValue::sequence([DynamicValue::int(1)]);
        let r = DynamicValue::sequence([DynamicValue::int(2)]);
        assert_eq!(
            l.merge(&r, &MergeStrategy::Concat),
            DynamicValue::sequence([DynamicValue::int(1), DynamicValue::int(2)])
        );
        assert_eq!(l.merge(&r, &MergeStrategy::Auto), r);
    }

    #[test]
    fn different_variant_cases_take_right() {
        let l = DynamicValue::some(DynamicValue::int(1));
        let r = DynamicValue::none();
        assert_eq!(l.merge(&r, &MergeStrategy::Auto), r);
    }

    #[test]
    fn custom_sums_int_leaves() {
        let strategy = MergeStrategy::custom(
            |_, _, _| true,
            |_, l, r| match (l, r) {
                (
                    DynamicValue::Primitive(PrimitiveValue::Int(a)),
                    DynamicValue::Primitive(PrimitiveValue::Int(b)),
                ) => DynamicValue::int(a + b),
                (_, r) => r.clone(),
            },
        );
        let left = rec(&[("n", DynamicValue::int(1))]);
        let right = rec(&[("n", DynamicValue::int(2))]);
        assert_eq!(left.merge(&right, &strategy), rec(&[("n", DynamicValue::int(3))]));
    }
}
