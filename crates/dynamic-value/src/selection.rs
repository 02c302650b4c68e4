//! The result of resolving an optic against a value.

use crate::merge::MergeStrategy;
use crate::value::DynamicValue;

/// Zero, one, or many values matched by a [`DynamicOptic`](crate::DynamicOptic).
///
/// Values appear in traversal order: record/sequence/map order for fan-out
/// nodes, and the cartesian product order when fan-out nodes are chained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    values: Vec<DynamicValue>,
}

impl Selection {
    #[inline]
    pub fn new(values: Vec<DynamicValue>) -> Self {
        Self { values }
    }

    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn values(&self) -> &[DynamicValue] {
        &self.values
    }

    #[inline]
    pub fn into_values(self) -> Vec<DynamicValue> {
        self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn first(&self) -> Option<&DynamicValue> {
        self.values.first()
    }

    /// The selected value if exactly one matched.
    pub fn one(&self) -> Option<&DynamicValue> {
        match self.values.as_slice() {
            [single] => Some(single),
            _ => None,
        }
    }

    pub fn concat(mut self, other: Selection) -> Selection {
        self.values.extend(other.values);
        self
    }

    pub fn map(self, f: impl FnMut(DynamicValue) -> DynamicValue) -> Selection {
        Selection::new(self.values.into_iter().map(f).collect())
    }

    pub fn filter(self, mut pred: impl FnMut(&DynamicValue) -> bool) -> Selection {
        Selection::new(self.values.into_iter().filter(|v| pred(v)).collect())
    }

    /// Fold every selected value left-to-right with [`DynamicValue::merge`].
    ///
    /// Returns `None` for an empty selection.
    pub fn merged(&self, strategy: &MergeStrategy) -> Option<DynamicValue> {
        let (first, rest) = self.values.split_first()?;
        Some(
            rest.iter()
                .fold(first.clone(), |acc, next| acc.merge(next, strategy)),
        )
    }
}

impl IntoIterator for Selection {
    type Item = DynamicValue;
    type IntoIter = std::vec::IntoIter<DynamicValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a DynamicValue;
    type IntoIter = std::slice::Iter<'a, DynamicValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl FromIterator<DynamicValue> for Selection {
    fn from_iter<I: IntoIterator<Item = DynamicValue>>(iter: I) -> Self {
        Selection::new(iter.into_iter().collect())
    }
}
