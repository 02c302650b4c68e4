//! Ordered, composable migrations.

use std::ops::Add;

use dynamic_value::{DynamicValue, SchemaResult};
use serde::{Deserialize, Serialize};

use crate::action::MigrationAction;
use crate::apply::apply_all;

/// A list of [`MigrationAction`]s applied left to right.
///
/// Composition is list concatenation, so it is associative with
/// [`Migration::identity`] as the unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Migration {
    actions: Vec<MigrationAction>,
}

impl Migration {
    /// The migration with no actions.
    #[inline]
    pub fn identity() -> Self {
        Self::default()
    }

    #[inline]
    pub fn new(actions: Vec<MigrationAction>) -> Self {
        Self { actions }
    }

    #[inline]
    pub fn actions(&self) -> &[MigrationAction] {
        &self.actions
    }

    #[inline]
    pub fn into_actions(self) -> Vec<MigrationAction> {
        self.actions
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.actions.is_empty()
    }

    /// `self` followed by `other`.
    pub fn then(mut self, other: Migration) -> Self {
        self.actions.extend(other.actions);
        self
    }

    /// Reverse the action order and each action.
    ///
    /// `m.reverse().reverse() == m` always. `m.reverse()` undoes `m` only as
    /// far as every action's own reverse is exact.
    pub fn reverse(&self) -> Self {
        Self::new(self.actions.iter().rev().map(MigrationAction::reverse).collect())
    }

    /// Apply every action in order; the first error aborts.
    pub fn apply(&self, value: &DynamicValue) -> SchemaResult<DynamicValue> {
        apply_all(value, &self.actions)
    }
}

impl Add for Migration {
    type Output = Migration;

    fn add(self, rhs: Migration) -> Migration {
        self.then(rhs)
    }
}

impl From<Vec<MigrationAction>> for Migration {
    fn from(actions: Vec<MigrationAction>) -> Self {
        Self::new(actions)
    }
}

impl FromIterator<MigrationAction> for Migration {
    fn from_iter<I: IntoIterator<Item = MigrationAction>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
