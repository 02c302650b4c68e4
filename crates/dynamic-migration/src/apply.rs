//! Sequential interpreter for migration actions.
//!
//! Every action is expressed through the `_or_fail` navigation primitives of
//! [`DynamicValue`], so an unreachable `at` surfaces as the navigation error
//! (`MissingField`, `TypeMismatch`, `InvalidPath`). A variant whose case does
//! not match a `Case` node in `at` is left unchanged.

use dynamic_value::{
    DynamicOptic, DynamicValue, Node, SchemaError, SchemaResult, NONE_CASE, SOME_CASE,
};
use tracing::{debug, trace};

use crate::action::MigrationAction;

/// Fold `actions` over `value`, stopping at the first error.
pub(crate) fn apply_all(
    value: &DynamicValue,
    actions: &[MigrationAction],
) -> SchemaResult<DynamicValue> {
    actions.iter().try_fold(value.clone(), |current, action| {
        trace!(action = action.kind(), path = %action.at(), "applying migration action");
        apply_action(&current, action)
    })
}

pub(crate) fn apply_action(
    value: &DynamicValue,
    action: &MigrationAction,
) -> SchemaResult<DynamicValue> {
    match action {
        MigrationAction::AddField { at, name, default } => {
            value.insert_or_fail(&at.clone().field(name.clone()), default.clone())
        }
        MigrationAction::DropField { at, name, .. } => {
            value.delete_or_fail(&at.clone().field(name.clone()))
        }
        MigrationAction::Rename { at, from, to } => {
            value.modify_or_fail(at, |path, target| rename_field(path, target, from, to))
        }
        MigrationAction::TransformValue { at, transform, .. } => {
            value.set_or_fail(at, transform.clone())
        }
        MigrationAction::Mandate { at, default } => {
            value.modify_or_fail(at, |path, target| match target {
                DynamicValue::Variant(case, payload) if case == SOME_CASE => {
                    Ok((**payload).clone())
                }
                DynamicValue::Variant(case, _) if case == NONE_CASE => Ok(default.clone()),
                DynamicValue::Null => Ok(default.clone()),
                other => Err(SchemaError::type_mismatch(path.clone(), "option", other)),
            })
        }
        MigrationAction::Optionalize { at, .. } => value.modify_or_fail(at, |_, target| {
            Ok(if target.is_null() {
                DynamicValue::none()
            } else {
                DynamicValue::some(target.clone())
            })
        }),
        MigrationAction::Join { at, combiner, .. } => substitute(value, at, combiner),
        MigrationAction::Split { at, splitter, .. } => substitute(value, at, splitter),
        MigrationAction::ChangeType { at, converter, .. } => {
            value.modify_or_fail(at, |path, target| match target {
                DynamicValue::Primitive(_) => Ok(converter.clone()),
                other => Err(SchemaError::type_mismatch(path.clone(), "primitive", other)),
            })
        }
        MigrationAction::RenameCase { at, from, to } => {
            value.modify_or_fail(at, |path, target| match target {
                DynamicValue::Variant(case, payload) if case == from => {
                    Ok(DynamicValue::Variant(to.clone(), payload.clone()))
                }
                DynamicValue::Variant(case, _) => {
                    debug!(
                        path = %path,
                        case = %case,
                        from = %from,
                        "case not renamed, tag differs"
                    );
                    Ok(target.clone())
                }
                _ => Err(SchemaError::case_not_found(path.clone(), from.clone())),
            })
        }
        MigrationAction::TransformCase {
            at,
            case_name,
            actions,
        } => value.modify_or_fail(at, |path, target| match target {
            DynamicValue::Variant(case, payload) if case == case_name => {
                let inner = path.clone().case(case.clone());
                let payload = apply_all(payload, actions).map_err(|e| e.with_prefix(&inner))?;
                Ok(DynamicValue::variant(case.clone(), payload))
            }
            DynamicValue::Variant(case, _) => {
                debug!(
                    path = %path,
                    case = %case,
                    expected = %case_name,
                    "case not transformed, tag differs"
                );
                Ok(target.clone())
            }
            _ => Err(SchemaError::case_not_found(path.clone(), case_name.clone())),
        }),
        MigrationAction::TransformElements { at, transform, .. } => {
            value.set_or_fail(&at.clone().elements(), transform.clone())
        }
        MigrationAction::TransformKeys { at, transform, .. } => {
            value.modify_or_fail(at, |path, target| {
                let entries = target
                    .as_map()
                    .ok_or_else(|| SchemaError::type_mismatch(path.clone(), "map", target))?;
                if entries.len() > 1 {
                    return Err(SchemaError::transformation_failed(
                        path.clone(),
                        format!("replacing every key would merge {} entries", entries.len()),
                    ));
                }
                Ok(DynamicValue::map(
                    entries.iter().map(|(_, v)| (transform.clone(), v.clone())),
                ))
            })
        }
        MigrationAction::TransformValues { at, transform, .. } => {
            value.set_or_fail(&at.clone().map_values(), transform.clone())
        }
    }
}

fn rename_field(
    path: &DynamicOptic,
    target: &DynamicValue,
    from: &str,
    to: &str,
) -> SchemaResult<DynamicValue> {
    let mut fields = target
        .as_record()
        .ok_or_else(|| SchemaError::type_mismatch(path.clone(), "record", target))?
        .to_vec();
    let pos = fields
        .iter()
        .position(|(n, _)| n == from)
        .ok_or_else(|| SchemaError::missing_field(path.clone(), from))?;
    if from != to && fields.iter().any(|(n, _)| n == to) {
        return Err(SchemaError::field_already_exists(path.clone(), to));
    }
    fields[pos].0 = to.to_owned();
    Ok(DynamicValue::Record(fields))
}

/// Put `replacement` at `at`, creating the final field if it is missing.
fn substitute(
    value: &DynamicValue,
    at: &DynamicOptic,
    replacement: &DynamicValue,
) -> SchemaResult<DynamicValue> {
    let Some((parent, Node::Field(name))) = at.split_last() else {
        return value.set_or_fail(at, replacement.clone());
    };
    value.modify_or_fail(&parent, |path, target| {
        let mut fields = target
            .as_record()
            .ok_or_else(|| SchemaError::type_mismatch(path.clone(), "record", target))?
            .to_vec();
        match fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = replacement.clone(),
            None => fields.push((name.clone(), replacement.clone())),
        }
        Ok(DynamicValue::Record(fields))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bob() -> DynamicValue {
        DynamicValue::record([("name", DynamicValue::string("Bob"))])
    }

    fn root() -> DynamicOptic {
        DynamicOptic::root()
    }

    #[test]
    fn add_field_collision() {
        let add = MigrationAction::AddField {
            at: root(),
            name: "name".into(),
            default: DynamicValue::Null,
        };
        assert!(matches!(add.apply(&bob()), Err(SchemaError::FieldAlreadyExists { .. })));
    }

    #[test]
    fn drop_missing_field() {
        let drop = MigrationAction::DropField {
            at: root(),
            name: "age".into(),
            default_for_reverse: DynamicValue::Null,
        };
        assert_eq!(drop.apply(&bob()), Err(SchemaError::missing_field(root(), "age")));
    }

    #[test]
    fn rename_keeps_position() {
        let v = DynamicValue::record([("a", DynamicValue::int(1)), ("b", DynamicValue::int(2))]);
        let rename = MigrationAction::Rename {
            at: root(),
            from: "a".into(),
            to: "z".into(),
        };
        assert_eq!(
            rename.apply(&v),
            Ok(DynamicValue::record([("z", DynamicValue::int(1)), ("b", DynamicValue::int(2))]))
        );
        let clash = MigrationAction::Rename {
            at: root(),
            from: "a".into(),
            to: "b".into(),
        };
        assert!(matches!(clash.apply(&v), Err(SchemaError::FieldAlreadyExists { .. })));
    }

    #[test]
    fn mandate_and_optionalize() {
        let at = root().field("nick");
        let mandate = MigrationAction::Mandate {
            at: at.clone(),
            default: DynamicValue::string("?"),
        };
        let some = DynamicValue::record([("nick", DynamicValue::some(DynamicValue::string("B")))]);
        let none = DynamicValue::record([("nick", DynamicValue::none())]);
        assert_eq!(
            mandate.apply(&some),
            Ok(DynamicValue::record([("nick", DynamicValue::string("B"))]))
        );
        assert_eq!(
            mandate.apply(&none),
            Ok(DynamicValue::record([("nick", DynamicValue::string("?"))]))
        );
        let not_option = DynamicValue::record([("nick", DynamicValue::int(1))]);
        assert!(matches!(
            mandate.apply(&not_option),
            Err(SchemaError::TypeMismatch { expected: "option", .. })
        ));

        let optionalize = mandate.reverse();
        let plain = DynamicValue::record([("nick", DynamicValue::string("B"))]);
        assert_eq!(optionalize.apply(&plain), Ok(some));
        let null = DynamicValue::record([("nick", DynamicValue::Null)]);
        assert_eq!(optionalize.apply(&null), Ok(none));
    }

    #[test]
    fn join_creates_target_field() {
        let v = DynamicValue::record([
            ("first", DynamicValue::string("A")),
            ("last", DynamicValue::string("B")),
        ]);
        let join = MigrationAction::Join {
            at: root().field("full"),
            source_paths: vec![root().field("first"), root().field("last")],
            combiner: DynamicValue::string("A B"),
            splitter: DynamicValue::string("A"),
        };
        let out = join.apply(&v).unwrap();
        assert_eq!(out.field("full"), Some(&DynamicValue::string("A B")));
        let split = join.reverse().apply(&out).unwrap();
        assert_eq!(split.field("full"), Some(&DynamicValue::string("A")));
    }

    #[test]
    fn change_type_requires_primitive() {
        let change = MigrationAction::ChangeType {
            at: root(),
            converter: DynamicValue::long(1),
            reverse_converter: None,
        };
        assert_eq!(change.apply(&DynamicValue::int(1)), Ok(DynamicValue::long(1)));
        assert!(matches!(change.apply(&bob()), Err(SchemaError::TypeMismatch { .. })));
    }

    #[test]
    fn rename_case_prism() {
        let rename = MigrationAction::RenameCase {
            at: root(),
            from: "Cat".into(),
            to: "Feline".into(),
        };
        let cat = DynamicValue::variant("Cat", DynamicValue::Null);
        let dog = DynamicValue::variant("Dog", DynamicValue::Null);
        assert_eq!(rename.apply(&cat), Ok(DynamicValue::variant("Feline", DynamicValue::Null)));
        assert_eq!(rename.apply(&dog), Ok(dog));
        assert!(matches!(rename.apply(&bob()), Err(SchemaError::CaseNotFound { .. })));
    }

    #[test]
    fn transform_case_reports_nested_path() {
        let t = MigrationAction::TransformCase {
            at: root().field("pet"),
            case_name: "Cat".into(),
            actions: vec![MigrationAction::DropField {
                at: root(),
                name: "lives".into(),
                default_for_reverse: DynamicValue::int(9),
            }],
        };
        let cat = DynamicValue::record([("name", DynamicValue::string("Tom"))]);
        let v = DynamicValue::record([("pet", DynamicValue::variant("Cat", cat))]);
        let err = t.apply(&v).unwrap_err();
        assert_eq!(err, SchemaError::missing_field(root().field("pet").case("Cat"), "lives"));
    }

    #[test]
    fn bulk_transforms() {
        let seq = DynamicValue::sequence([DynamicValue::int(1), DynamicValue::int(2)]);
        let elements = MigrationAction::TransformElements {
            at: root(),
            transform: DynamicValue::int(0),
            reverse_transform: None,
        };
        assert_eq!(
            elements.apply(&seq),
            Ok(DynamicValue::sequence([DynamicValue::int(0), DynamicValue::int(0)]))
        );

        let m = DynamicValue::map([
            (DynamicValue::string("a"), DynamicValue::int(1)),
            (DynamicValue::string("b"), DynamicValue::int(2)),
        ]);
        let values = MigrationAction::TransformValues {
            at: root(),
            transform: DynamicValue::Null,
            reverse_transform: None,
        };
        assert_eq!(
            values.apply(&m),
            Ok(DynamicValue::map([
                (DynamicValue::string("a"), DynamicValue::Null),
                (DynamicValue::string("b"), DynamicValue::Null),
            ]))
        );
        let keys = MigrationAction::TransformKeys {
            at: root(),
            transform: DynamicValue::string("k"),
            reverse_transform: None,
        };
        assert!(matches!(keys.apply(&m), Err(SchemaError::TransformationFailed { .. })));
    }
}
