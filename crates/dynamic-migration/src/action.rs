//! The migration action model.

use dynamic_value::{DynamicOptic, DynamicValue, SchemaResult};
use serde::{Deserialize, Serialize};

/// One reversible schema-evolution step.
///
/// `at` addresses:
/// - the record holding the field for `AddField`, `DropField` and `Rename`;
/// - the variant value for `RenameCase` and `TransformCase`;
/// - the target field for `Join` and `Split` (created if missing);
/// - the value itself for every other action.
///
/// Every action carries what its reverse needs, so
/// `action.reverse().reverse() == action` holds structurally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MigrationAction {
    AddField {
        at: DynamicOptic,
        name: String,
        default: DynamicValue,
    },
    DropField {
        at: DynamicOptic,
        name: String,
        default_for_reverse: DynamicValue,
    },
    Rename {
        at: DynamicOptic,
        from: String,
        to: String,
    },
    /// Replaces the value. Without `reverse_transform` the action is its own
    /// reverse.
    TransformValue {
        at: DynamicOptic,
        transform: DynamicValue,
        reverse_transform: Option<DynamicValue>,
    },
    /// `Some(x)` becomes `x`; `None` or null becomes `default`.
    Mandate {
        at: DynamicOptic,
        default: DynamicValue,
    },
    /// `x` becomes `Some(x)`; null becomes `None`.
    Optionalize {
        at: DynamicOptic,
        default_for_reverse: DynamicValue,
    },
    Join {
        at: DynamicOptic,
        source_paths: Vec<DynamicOptic>,
        combiner: DynamicValue,
        splitter: DynamicValue,
    },
    Split {
        at: DynamicOptic,
        target_paths: Vec<DynamicOptic>,
        splitter: DynamicValue,
        combiner: DynamicValue,
    },
    /// Replaces a primitive value with `converter`.
    ChangeType {
        at: DynamicOptic,
        converter: DynamicValue,
        reverse_converter: Option<DynamicValue>,
    },
    RenameCase {
        at: DynamicOptic,
        from: String,
        to: String,
    },
    /// Runs `actions` against the payload when the variant's case is
    /// `case_name`.
    TransformCase {
        at: DynamicOptic,
        case_name: String,
        actions: Vec<MigrationAction>,
    },
    TransformElements {
        at: DynamicOptic,
        transform: DynamicValue,
        reverse_transform: Option<DynamicValue>,
    },
    TransformKeys {
        at: DynamicOptic,
        transform: DynamicValue,
        reverse_transform: Option<DynamicValue>,
    },
    TransformValues {
        at: DynamicOptic,
        transform: DynamicValue,
        reverse_transform: Option<DynamicValue>,
    },
}

impl MigrationAction {
    /// Action kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            MigrationAction::AddField { .. } => "add_field",
            MigrationAction::DropField { .. } => "drop_field",
            MigrationAction::Rename { .. } => "rename",
            MigrationAction::TransformValue { .. } => "transform_value",
            MigrationAction::Mandate { .. } => "mandate",
            MigrationAction::Optionalize { .. } => "optionalize",
            MigrationAction::Join { .. } => "join",
            MigrationAction::Split { .. } => "split",
            MigrationAction::ChangeType { .. } => "change_type",
            MigrationAction::RenameCase { .. } => "rename_case",
            MigrationAction::TransformCase { .. } => "transform_case",
            MigrationAction::TransformElements { .. } => "transform_elements",
            MigrationAction::TransformKeys { .. } => "transform_keys",
            MigrationAction::TransformValues { .. } => "transform_values",
        }
    }

    pub fn at(&self) -> &DynamicOptic {
        match self {
            MigrationAction::AddField { at, .. }
            | MigrationAction::DropField { at, .. }
            | MigrationAction::Rename { at, .. }
            | MigrationAction::TransformValue { at, .. }
            | MigrationAction::Mandate { at, .. }
            | MigrationAction::Optionalize { at, .. }
            | MigrationAction::Join { at, .. }
            | MigrationAction::Split { at, .. }
            | MigrationAction::ChangeType { at, .. }
            | MigrationAction::RenameCase { at, .. }
            | MigrationAction::TransformCase { at, .. }
            | MigrationAction::TransformElements { at, .. }
            | MigrationAction::TransformKeys { at, .. }
            | MigrationAction::TransformValues { at, .. } => at,
        }
    }

    pub fn apply(&self, value: &DynamicValue) -> SchemaResult<DynamicValue> {
        crate::apply::apply_action(value, self)
    }

    /// The action that undoes this one.
    pub fn reverse(&self) -> MigrationAction {
        match self {
            MigrationAction::AddField { at, name, default } => MigrationAction::DropField {
                at: at.clone(),
                name: name.clone(),
                default_for_reverse: default.clone(),
            },
            MigrationAction::DropField {
                at,
                name,
                default_for_reverse,
            } => MigrationAction::AddField {
                at: at.clone(),
                name: name.clone(),
                default: default_for_reverse.clone(),
            },
            MigrationAction::Rename { at, from, to } => MigrationAction::Rename {
                at: at.clone(),
                from: to.clone(),
                to: from.clone(),
            },
            MigrationAction::TransformValue {
                at,
                transform,
                reverse_transform,
            } => {
                let (transform, reverse_transform) = swap_transforms(transform, reverse_transform);
                MigrationAction::TransformValue {
                    at: at.clone(),
                    transform,
                    reverse_transform,
                }
            }
            MigrationAction::Mandate { at, default } => MigrationAction::Optionalize {
                at: at.clone(),
                default_for_reverse: default.clone(),
            },
            MigrationAction::Optionalize {
                at,
                default_for_reverse,
            } => MigrationAction::Mandate {
                at: at.clone(),
                default: default_for_reverse.clone(),
            },
            MigrationAction::Join {
                at,
                source_paths,
                combiner,
                splitter,
            } => MigrationAction::Split {
                at: at.clone(),
                target_paths: source_paths.clone(),
                splitter: splitter.clone(),
                combiner: combiner.clone(),
            },
            MigrationAction::Split {
                at,
                target_paths,
                splitter,
                combiner,
            } => MigrationAction::Join {
                at: at.clone(),
                source_paths: target_paths.clone(),
                combiner: combiner.clone(),
                splitter: splitter.clone(),
            },
            MigrationAction::ChangeType {
                at,
                converter,
                reverse_converter,
            } => {
                let (converter, reverse_converter) = swap_transforms(converter, reverse_converter);
                MigrationAction::ChangeType {
                    at: at.clone(),
                    converter,
                    reverse_converter,
                }
            }
            MigrationAction::RenameCase { at, from, to } => MigrationAction::RenameCase {
                at: at.clone(),
                from: to.clone(),
                to: from.clone(),
            },
            MigrationAction::TransformCase {
                at,
                case_name,
                actions,
            } => MigrationAction::TransformCase {
                at: at.clone(),
                case_name: case_name.clone(),
                actions: actions.iter().rev().map(MigrationAction::reverse).collect(),
            },
            MigrationAction::TransformElements {
                at,
                transform,
                reverse_transform,
            } => {
                let (transform, reverse_transform) = swap_transforms(transform, reverse_transform);
                MigrationAction::TransformElements {
                    at: at.clone(),
                    transform,
                    reverse_transform,
                }
            }
            MigrationAction::TransformKeys {
                at,
                transform,
                reverse_transform,
            } => {
                let (transform, reverse_transform) = swap_transforms(transform, reverse_transform);
                MigrationAction::TransformKeys {
                    at: at.clone(),
                    transform,
                    reverse_transform,
                }
            }
            MigrationAction::TransformValues {
                at,
                transform,
                reverse_transform,
            } => {
                let (transform, reverse_transform) = swap_transforms(transform, reverse_transform);
                MigrationAction::TransformValues {
                    at: at.clone(),
                    transform,
                    reverse_transform,
                }
            }
        }
    }
}

// `(t, Some(r))` reverses to `(r, Some(t))`; `(t, None)` is its own reverse.
fn swap_transforms(
    forward: &DynamicValue,
    backward: &Option<DynamicValue>,
) -> (DynamicValue, Option<DynamicValue>) {
    match backward {
        Some(backward) => (backward.clone(), Some(forward.clone())),
        None => (forward.clone(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_drop_are_mutual_reverses() {
        let add = MigrationAction::AddField {
            at: DynamicOptic::root(),
            name: "age".into(),
            default: DynamicValue::int(0),
        };
        let drop = add.reverse();
        assert_eq!(
            drop,
            MigrationAction::DropField {
                at: DynamicOptic::root(),
                name: "age".into(),
                default_for_reverse: DynamicValue::int(0),
            }
        );
        assert_eq!(drop.reverse(), add);
    }

    #[test]
    fn transform_without_reverse_is_self_reverse() {
        let t = MigrationAction::TransformValue {
            at: DynamicOptic::root(),
            transform: DynamicValue::int(1),
            reverse_transform: None,
        };
        assert_eq!(t.reverse(), t);
    }

    #[test]
    fn transform_with_reverse_swaps() {
        let t = MigrationAction::ChangeType {
            at: DynamicOptic::root(),
            converter: DynamicValue::long(1),
            reverse_converter: Some(DynamicValue::int(1)),
        };
        assert_eq!(
            t.reverse(),
            MigrationAction::ChangeType {
                at: DynamicOptic::root(),
                converter: DynamicValue::int(1),
                reverse_converter: Some(DynamicValue::long(1)),
            }
        );
    }

    #[test]
    fn transform_case_reverses_inner_order() {
        let inner = vec![
            MigrationAction::Rename {
                at: DynamicOptic::root(),
                from: "a".into(),
                to: "b".into(),
            },
            MigrationAction::AddField {
                at: DynamicOptic::root(),
                name: "c".into(),
                default: DynamicValue::Null,
            },
        ];
        let t = MigrationAction::TransformCase {
            at: DynamicOptic::root(),
            case_name: "Some".into(),
            actions: inner.clone(),
        };
        let MigrationAction::TransformCase { actions, .. } = t.reverse() else {
            panic!("reverse changed the action kind");
        };
        assert_eq!(actions, vec![inner[1].reverse(), inner[0].reverse()]);
    }

    #[test]
    fn mandate_reverse_keeps_default() {
        let m = MigrationAction::Mandate {
            at: DynamicOptic::root().field("x"),
            default: DynamicValue::int(7),
        };
        assert_eq!(m.reverse().reverse(), m);
        assert_eq!(m.kind(), "mandate");
        assert_eq!(m.at(), &DynamicOptic::root().field("x"));
    }
}
