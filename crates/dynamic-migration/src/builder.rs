//! Fluent construction of [`Migration`]s with shallow schema validation.

use std::collections::BTreeSet;

use dynamic_value::{DynamicOptic, DynamicValue, SchemaError, SchemaResult};
use tracing::debug;

use crate::action::MigrationAction;
use crate::migration::Migration;

/// The top-level field names a schema declares.
///
/// This is all the builder needs to know about the source and target types.
pub trait DeclaredFields {
    fn declares(&self, name: &str) -> bool;
}

impl<T: DeclaredFields + ?Sized> DeclaredFields for &T {
    fn declares(&self, name: &str) -> bool {
        (**self).declares(name)
    }
}

impl DeclaredFields for [&str] {
    fn declares(&self, name: &str) -> bool {
        self.contains(&name)
    }
}

impl<const N: usize> DeclaredFields for [&str; N] {
    fn declares(&self, name: &str) -> bool {
        self.contains(&name)
    }
}

impl DeclaredFields for Vec<String> {
    fn declares(&self, name: &str) -> bool {
        self.iter().any(|n| n == name)
    }
}

/// An owned set of declared field names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet(BTreeSet<String>);

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.0.insert(name.into());
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for FieldSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl DeclaredFields for FieldSet {
    fn declares(&self, name: &str) -> bool {
        self.0.contains(name)
    }
}

/// Accumulates actions; every step consumes the builder and returns a new one.
///
/// ```
/// use dynamic_migration::MigrationBuilder;
/// use dynamic_value::{DynamicOptic, DynamicValue};
///
/// let migration = MigrationBuilder::new(["name"], ["name", "age"])
///     .add_field(DynamicOptic::root(), "age", DynamicValue::int(0))
///     .build()
///     .unwrap();
/// assert_eq!(migration.actions().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MigrationBuilder<S, T> {
    source: S,
    target: T,
    actions: Vec<MigrationAction>,
}

impl MigrationBuilder<FieldSet, FieldSet> {
    /// A builder without schemas, for nested action lists and
    /// [`build_partial`](MigrationBuilder::build_partial).
    pub fn unchecked() -> Self {
        Self::new(FieldSet::new(), FieldSet::new())
    }
}

impl<S: DeclaredFields, T: DeclaredFields> MigrationBuilder<S, T> {
    pub fn new(source: S, target: T) -> Self {
        Self {
            source,
            target,
            actions: Vec::new(),
        }
    }

    pub fn actions(&self) -> &[MigrationAction] {
        &self.actions
    }

    /// Append a raw action.
    pub fn action(mut self, action: MigrationAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn add_field(
        self,
        at: DynamicOptic,
        name: impl Into<String>,
        default: DynamicValue,
    ) -> Self {
        self.action(MigrationAction::AddField {
            at,
            name: name.into(),
            default,
        })
    }

    pub fn drop_field(
        self,
        at: DynamicOptic,
        name: impl Into<String>,
        default_for_reverse: DynamicValue,
    ) -> Self {
        self.action(MigrationAction::DropField {
            at,
            name: name.into(),
            default_for_reverse,
        })
    }

    pub fn rename(self, at: DynamicOptic, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.action(MigrationAction::Rename {
            at,
            from: from.into(),
            to: to.into(),
        })
    }

    pub fn transform_value(
        self,
        at: DynamicOptic,
        transform: DynamicValue,
        reverse_transform: Option<DynamicValue>,
    ) -> Self {
        self.action(MigrationAction::TransformValue {
            at,
            transform,
            reverse_transform,
        })
    }

    pub fn mandate(self, at: DynamicOptic, default: DynamicValue) -> Self {
        self.action(MigrationAction::Mandate { at, default })
    }

    /// Wrap the value at `at` in `Some`. Reversing falls back to `null` for
    /// absent values.
    pub fn optionalize(self, at: DynamicOptic) -> Self {
        self.action(MigrationAction::Optionalize {
            at,
            default_for_reverse: DynamicValue::Null,
        })
    }

    pub fn join(
        self,
        at: DynamicOptic,
        source_paths: Vec<DynamicOptic>,
        combiner: DynamicValue,
        splitter: DynamicValue,
    ) -> Self {
        self.action(MigrationAction::Join {
            at,
            source_paths,
            combiner,
            splitter,
        })
    }

    pub fn split(
        self,
        at: DynamicOptic,
        target_paths: Vec<DynamicOptic>,
        splitter: DynamicValue,
        combiner: DynamicValue,
    ) -> Self {
        self.action(MigrationAction::Split {
            at,
            target_paths,
            splitter,
            combiner,
        })
    }

    pub fn change_type(
        self,
        at: DynamicOptic,
        converter: DynamicValue,
        reverse_converter: Option<DynamicValue>,
    ) -> Self {
        self.action(MigrationAction::ChangeType {
            at,
            converter,
            reverse_converter,
        })
    }

    pub fn rename_case(
        self,
        at: DynamicOptic,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.action(MigrationAction::RenameCase {
            at,
            from: from.into(),
            to: to.into(),
        })
    }

    /// Run the actions built by `nested` against the payload of `case_name`.
    /// Paths inside `nested` are relative to the payload.
    pub fn transform_case<F>(
        self,
        at: DynamicOptic,
        case_name: impl Into<String>,
        nested: F,
    ) -> Self
    where
        F: FnOnce(MigrationBuilder<FieldSet, FieldSet>) -> MigrationBuilder<FieldSet, FieldSet>,
    {
        let actions = nested(MigrationBuilder::unchecked()).actions;
        self.action(MigrationAction::TransformCase {
            at,
            case_name: case_name.into(),
            actions,
        })
    }

    pub fn transform_elements(
        self,
        at: DynamicOptic,
        transform: DynamicValue,
        reverse_transform: Option<DynamicValue>,
    ) -> Self {
        self.action(MigrationAction::TransformElements {
            at,
            transform,
            reverse_transform,
        })
    }

    pub fn transform_keys(
        self,
        at: DynamicOptic,
        transform: DynamicValue,
        reverse_transform: Option<DynamicValue>,
    ) -> Self {
        self.action(MigrationAction::TransformKeys {
            at,
            transform,
            reverse_transform,
        })
    }

    pub fn transform_values(
        self,
        at: DynamicOptic,
        transform: DynamicValue,
        reverse_transform: Option<DynamicValue>,
    ) -> Self {
        self.action(MigrationAction::TransformValues {
            at,
            transform,
            reverse_transform,
        })
    }

    /// Validate root-level field actions against the declared fields and
    /// build. All problems are reported together as `SchemaMismatch`.
    ///
    /// Actions with a non-root `at` are not checked.
    pub fn build(self) -> SchemaResult<Migration> {
        let problems = self.problems();
        if !problems.is_empty() {
            debug!(count = problems.len(), "migration failed validation");
            return Err(SchemaError::SchemaMismatch { problems });
        }
        Ok(self.build_partial())
    }

    /// Build without validation.
    pub fn build_partial(self) -> Migration {
        Migration::new(self.actions)
    }

    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for action in &self.actions {
            match action {
                MigrationAction::AddField { at, name, .. } if at.is_root() => {
                    if !self.target.declares(name) {
                        problems.push(format!(
                            "added field `{name}` is not declared by the target"
                        ));
                    }
                }
                MigrationAction::DropField { at, name, .. } if at.is_root() => {
                    if !self.source.declares(name) {
                        problems.push(format!(
                            "dropped field `{name}` is not declared by the source"
                        ));
                    }
                }
                MigrationAction::Rename { at, from, to } if at.is_root() => {
                    if !self.source.declares(from) {
                        problems.push(format!(
                            "renamed field `{from}` is not declared by the source"
                        ));
                    }
                    if !self.target.declares(to) {
                        problems.push(format!(
                            "renamed field `{to}` is not declared by the target"
                        ));
                    }
                }
                _ => {}
            }
        }
        problems
    }
}
