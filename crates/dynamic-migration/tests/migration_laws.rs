use dynamic_migration::{Migration, MigrationAction, MigrationBuilder};
use dynamic_value::{DynamicOptic, DynamicValue, SchemaError};
use proptest::prelude::*;

fn leaf() -> impl Strategy<Value = DynamicValue> {
    prop_oneof![
        any::<i32>().prop_map(DynamicValue::int),
        "[a-z]{0,4}".prop_map(DynamicValue::string),
        Just(DynamicValue::Null),
        Just(DynamicValue::none()),
    ]
}

fn value() -> impl Strategy<Value = DynamicValue> {
    leaf().prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(DynamicValue::sequence),
            prop::collection::btree_map("[a-c]", inner.clone(), 0..3)
                .prop_map(DynamicValue::record),
            inner.prop_map(DynamicValue::some),
        ]
    })
}

fn path() -> impl Strategy<Value = DynamicOptic> {
    prop::collection::vec("[a-c]", 0..3).prop_map(|names| {
        names
            .into_iter()
            .fold(DynamicOptic::root(), DynamicOptic::field)
    })
}

fn name() -> impl Strategy<Value = String> {
    "[a-d]".prop_map(String::from)
}

fn action() -> impl Strategy<Value = MigrationAction> {
    let fields = prop_oneof![
        (path(), name(), leaf())
            .prop_map(|(at, name, default)| MigrationAction::AddField { at, name, default }),
        (path(), name(), leaf()).prop_map(|(at, name, default_for_reverse)| {
            MigrationAction::DropField {
                at,
                name,
                default_for_reverse,
            }
        }),
        (path(), name(), name())
            .prop_map(|(at, from, to)| MigrationAction::Rename { at, from, to }),
        (path(), leaf(), prop::option::of(leaf())).prop_map(|(at, transform, reverse_transform)| {
            MigrationAction::TransformValue {
                at,
                transform,
                reverse_transform,
            }
        }),
        (path(), leaf()).prop_map(|(at, default)| MigrationAction::Mandate { at, default }),
        (path(), leaf()).prop_map(|(at, default_for_reverse)| MigrationAction::Optionalize {
            at,
            default_for_reverse
        }),
    ];
    let reshapes = prop_oneof![
        (path(), prop::collection::vec(path(), 0..3), leaf(), leaf()).prop_map(
            |(at, source_paths, combiner, splitter)| MigrationAction::Join {
                at,
                source_paths,
                combiner,
                splitter,
            }
        ),
        (path(), prop::collection::vec(path(), 0..3), leaf(), leaf()).prop_map(
            |(at, target_paths, splitter, combiner)| MigrationAction::Split {
                at,
                target_paths,
                splitter,
                combiner,
            }
        ),
        (path(), leaf(), prop::option::of(leaf())).prop_map(|(at, converter, reverse_converter)| {
            MigrationAction::ChangeType {
                at,
                converter,
                reverse_converter,
            }
        }),
        (path(), name(), name())
            .prop_map(|(at, from, to)| MigrationAction::RenameCase { at, from, to }),
        (path(), leaf(), prop::option::of(leaf())).prop_map(|(at, transform, reverse_transform)| {
            MigrationAction::TransformElements {
                at,
                transform,
                reverse_transform,
            }
        }),
        (path(), leaf(), prop::option::of(leaf())).prop_map(|(at, transform, reverse_transform)| {
            MigrationAction::TransformKeys {
                at,
                transform,
                reverse_transform,
            }
        }),
        (path(), leaf(), prop::option::of(leaf())).prop_map(|(at, transform, reverse_transform)| {
            MigrationAction::TransformValues {
                at,
                transform,
                reverse_transform,
            }
        }),
    ];
    prop_oneof![fields, reshapes].prop_recursive(2, 8, 3, |inner| {
        (path(), name(), prop::collection::vec(inner, 0..3)).prop_map(|(at, case_name, actions)| {
            MigrationAction::TransformCase { at, case_name, actions }
        })
    })
}

fn migration() -> impl Strategy<Value = Migration> {
    prop::collection::vec(action(), 0..4).prop_map(Migration::new)
}

proptest! {
    #[test]
    fn identity_leaves_value_unchanged(v in value()) {
        prop_assert_eq!(Migration::identity().apply(&v), Ok(v));
    }

    #[test]
    fn composition_is_associative(a in migration(), b in migration(), c in migration()) {
        let left = (a.clone() + b.clone()) + c.clone();
        let right = a + (b + c);
        prop_assert_eq!(left, right);
    }

    #[test]
    fn identity_is_the_unit(m in migration()) {
        prop_assert_eq!(Migration::identity() + m.clone(), m.clone());
        prop_assert_eq!(m.clone() + Migration::identity(), m);
    }

    #[test]
    fn reverse_is_an_involution(m in migration()) {
        prop_assert_eq!(m.reverse().reverse(), m);
    }

    #[test]
    fn composed_apply_matches_sequential_apply(a in migration(), b in migration(), v in value()) {
        let sequential = a.apply(&v).and_then(|mid| b.apply(&mid));
        prop_assert_eq!((a + b).apply(&v), sequential);
    }
}

#[test]
fn add_field_scenario_round_trips() {
    let bob = DynamicValue::record([("name", DynamicValue::string("Bob"))]);
    let m = Migration::new(vec![MigrationAction::AddField {
        at: DynamicOptic::root(),
        name: "age".into(),
        default: DynamicValue::int(0),
    }]);
    let aged = m.apply(&bob).unwrap();
    assert_eq!(
        aged,
        DynamicValue::record([("name", DynamicValue::string("Bob")), ("age", DynamicValue::int(0))])
    );
    assert_eq!(
        m.reverse().actions(),
        &[MigrationAction::DropField {
            at: DynamicOptic::root(),
            name: "age".into(),
            default_for_reverse: DynamicValue::int(0),
        }]
    );
    assert_eq!(m.reverse().apply(&aged), Ok(bob));
}

#[test]
fn builder_migration_round_trips_through_variant() {
    let v1 = DynamicValue::record([
        ("name", DynamicValue::string("Tom")),
        (
            "pet",
            DynamicValue::variant("Cat", DynamicValue::record([("lives", DynamicValue::int(9))])),
        ),
    ]);
    let m = MigrationBuilder::new(["name", "pet"], ["full_name", "pet", "age"])
        .rename(DynamicOptic::root(), "name", "full_name")
        .add_field(DynamicOptic::root(), "age", DynamicValue::int(0))
        .transform_case(DynamicOptic::root().field("pet"), "Cat", |b| {
            b.rename(DynamicOptic::root(), "lives", "remaining")
        })
        .rename_case(DynamicOptic::root().field("pet"), "Cat", "Feline")
        .build()
        .unwrap();

    let v2 = m.apply(&v1).unwrap();
    assert_eq!(
        v2,
        DynamicValue::record([
            ("full_name", DynamicValue::string("Tom")),
            (
                "pet",
                DynamicValue::variant(
                    "Feline",
                    DynamicValue::record([("remaining", DynamicValue::int(9))]),
                ),
            ),
            ("age", DynamicValue::int(0)),
        ])
    );
    assert_eq!(m.reverse().apply(&v2), Ok(v1));
}

#[test]
fn builder_rejects_undeclared_fields() {
    let err = MigrationBuilder::new(["name"], ["name"])
        .add_field(DynamicOptic::root(), "age", DynamicValue::int(0))
        .build()
        .unwrap_err();
    assert!(matches!(err, SchemaError::SchemaMismatch { .. }));
    assert!(err.to_string().contains("`age`"));
}

#[test]
fn variant_actions_skip_other_cases() {
    let rex = DynamicValue::record([("name", DynamicValue::string("Rex"))]);
    let dog = DynamicValue::variant("Dog", rex);
    let m = MigrationBuilder::unchecked()
        .transform_case(DynamicOptic::root(), "Cat", |b| {
            b.drop_field(DynamicOptic::root(), "lives", DynamicValue::int(9))
        })
        .rename_case(DynamicOptic::root(), "Cat", "Feline")
        .build_partial();
    assert_eq!(m.apply(&dog), Ok(dog));
}

#[test]
fn migration_survives_json() {
    let m = MigrationBuilder::unchecked()
        .mandate(DynamicOptic::root().field("nick"), DynamicValue::string("?"))
        .join(
            DynamicOptic::root().field("full"),
            vec![DynamicOptic::root().field("first"), DynamicOptic::root().field("last")],
            DynamicValue::string("a b"),
            DynamicValue::string("a"),
        )
        .build_partial();
    let text = serde_json::to_string(&m).unwrap();
    let back: Migration = serde_json::from_str(&text).unwrap();
    assert_eq!(back, m);
}
