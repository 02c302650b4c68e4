//! Error taxonomy shared by navigation, patching and migration.

use thiserror::Error;

use crate::optic::{DynamicOptic, Node};
use crate::value::DynamicValue;

/// Result type alias for every fallible operation in the workspace.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while navigating or rewriting a [`DynamicValue`].
///
/// All variants except [`SchemaError::SchemaMismatch`] carry the path at which
/// the failure was detected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// A required record field is absent. Migrations report "field not found"
    /// through this variant as well.
    #[error("missing field `{name}` at {path}")]
    MissingField { path: DynamicOptic, name: String },

    /// An add or rename collides with a field (or map key) that already exists.
    #[error("field `{name}` already exists at {path}")]
    FieldAlreadyExists { path: DynamicOptic, name: String },

    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: DynamicOptic,
        expected: &'static str,
        found: &'static str,
    },

    /// Navigation failed structurally (index out of range, absent map key,
    /// node kind that cannot be used for the requested edit).
    #[error("invalid path at {path}: {reason}")]
    InvalidPath { path: DynamicOptic, reason: String },

    #[error("case `{case}` not found at {path}")]
    CaseNotFound { path: DynamicOptic, case: String },

    #[error("transformation failed at {path}: {reason}")]
    TransformationFailed { path: DynamicOptic, reason: String },

    /// Builder-level validation. Every problem found is reported at once.
    #[error("schema mismatch: {}", .problems.join("; "))]
    SchemaMismatch { problems: Vec<String> },
}

impl SchemaError {
    #[inline]
    pub fn missing_field(path: DynamicOptic, name: impl Into<String>) -> Self {
        SchemaError::MissingField {
            path,
            name: name.into(),
        }
    }

    #[inline]
    pub fn field_already_exists(path: DynamicOptic, name: impl Into<String>) -> Self {
        SchemaError::FieldAlreadyExists {
            path,
            name: name.into(),
        }
    }

    /// Create a type mismatch error from the value actually found.
    #[inline]
    pub fn type_mismatch(path: DynamicOptic, expected: &'static str, found: &DynamicValue) -> Self {
        SchemaError::TypeMismatch {
            path,
            expected,
            found: found.type_name(),
        }
    }

    #[inline]
    pub fn invalid_path(path: DynamicOptic, reason: impl Into<String>) -> Self {
        SchemaError::InvalidPath {
            path,
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn index_out_of_range(path: DynamicOptic, index: usize, len: usize) -> Self {
        SchemaError::InvalidPath {
            path,
            reason: format!("index {index} out of bounds (len: {len})"),
        }
    }

    #[inline]
    pub fn key_not_found(path: DynamicOptic, key: &DynamicValue) -> Self {
        SchemaError::InvalidPath {
            path,
            reason: format!("map key {key} not found"),
        }
    }

    #[inline]
    pub fn case_not_found(path: DynamicOptic, case: impl Into<String>) -> Self {
        SchemaError::CaseNotFound {
            path,
            case: case.into(),
        }
    }

    #[inline]
    pub fn transformation_failed(path: DynamicOptic, reason: impl Into<String>) -> Self {
        SchemaError::TransformationFailed {
            path,
            reason: reason.into(),
        }
    }

    /// The path carried by this error, if any.
    pub fn path(&self) -> Option<&DynamicOptic> {
        match self {
            SchemaError::MissingField { path, .. }
            | SchemaError::FieldAlreadyExists { path, .. }
            | SchemaError::TypeMismatch { path, .. }
            | SchemaError::InvalidPath { path, .. }
            | SchemaError::CaseNotFound { path, .. }
            | SchemaError::TransformationFailed { path, .. } => Some(path),
            SchemaError::SchemaMismatch { .. } => None,
        }
    }

    /// Add a path prefix to this error.
    ///
    /// Used when an error raised against a nested value (the payload of a
    /// variant case, an element addressed by `SequenceEdit.Modify`) has to be
    /// reported relative to the enclosing document.
    pub fn with_prefix(self, prefix: &DynamicOptic) -> Self {
        let relocate = |path: DynamicOptic| prefix.append(&path);
        match self {
            SchemaError::MissingField { path, name } => SchemaError::MissingField {
                path: relocate(path),
                name,
            },
            SchemaError::FieldAlreadyExists { path, name } => SchemaError::FieldAlreadyExists {
                path: relocate(path),
                name,
            },
            SchemaError::TypeMismatch {
                path,
                expected,
                found,
            } => SchemaError::TypeMismatch {
                path: relocate(path),
                expected,
                found,
            },
            SchemaError::InvalidPath { path, reason } => SchemaError::InvalidPath {
                path: relocate(path),
                reason,
            },
            SchemaError::CaseNotFound { path, case } => SchemaError::CaseNotFound {
                path: relocate(path),
                case,
            },
            SchemaError::TransformationFailed { path, reason } => {
                SchemaError::TransformationFailed {
                    path: relocate(path),
                    reason,
                }
            }
            other @ SchemaError::SchemaMismatch { .. } => other,
        }
    }

    /// Error for a path node that cannot be used by the requested edit.
    pub(crate) fn unsupported_node(path: DynamicOptic, node: &Node, action: &str) -> Self {
        SchemaError::InvalidPath {
            path,
            reason: format!("cannot {action} through `{node}`"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_path() {
        let err = SchemaError::missing_field(DynamicOptic::root().field("user"), "age");
        assert_eq!(err.to_string(), "missing field `age` at .user");
    }

    #[test]
    fn type_mismatch_reports_found_kind() {
        let err = SchemaError::type_mismatch(
            DynamicOptic::root(),
            "record",
            &DynamicValue::Sequence(vec![]),
        );
        assert_eq!(err.to_string(), "type mismatch at .: expected record, found sequence");
    }

    #[test]
    fn with_prefix_relocates_path() {
        let err = SchemaError::missing_field(DynamicOptic::root().field("b"), "c");
        let moved = err.with_prefix(&DynamicOptic::root().field("a"));
        assert_eq!(moved.path(), Some(&DynamicOptic::root().field("a").field("b")));
    }

    #[test]
    fn schema_mismatch_joins_problems() {
        let err = SchemaError::SchemaMismatch {
            problems: vec!["one".to_string(), "two".to_string()],
        };
        assert_eq!(err.to_string(), "schema mismatch: one; two");
        assert!(err.path().is_none());
    }
}
