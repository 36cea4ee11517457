//! Integration tests for the reader/writer protocol.

use gqlshape_core::{Condition, CustomTypeId, ErrorCode, ResponseField, ScalarType, Variables};
use gqlshape_runtime::{
    fx_hash, operation_id, parse_payload, write_data, JsonResponseReader, ReadContext,
    ResponseObject, ResponseValue, ScalarTypeAdapters, SelectionShape, ShapeField, Shaped,
    ValueShape, UNKNOWN_ENUM_VALUE,
};
use proptest::prelude::*;
use serde_json::{json, Value};

const ID: CustomTypeId = CustomTypeId::from_static("ID");

fn character_shape() -> SelectionShape {
    let mut hero = SelectionShape::new("Character");
    hero.fields.push(ShapeField {
        descriptor: ResponseField::for_typename(),
        value: ValueShape::Scalar(ScalarType::String),
    });
    hero.fields.push(ShapeField {
        descriptor: ResponseField::for_string("name", "name"),
        value: ValueShape::Scalar(ScalarType::String),
    });
    hero.fields.push(ShapeField {
        descriptor: ResponseField::for_custom_type("id", "id", ID)
            .with_condition(Condition::include_if("withId")),
        value: ValueShape::CustomScalar(ID),
    });
    hero.fields.push(ShapeField {
        descriptor: ResponseField::for_int("friendCount", "friendCount").optional(),
        value: ValueShape::Scalar(ScalarType::Int),
    });
    hero.fields.push(ShapeField {
        descriptor: ResponseField::for_list("appearsIn", "appearsIn"),
        value: ValueShape::List {
            item: Box::new(ValueShape::Enum {
                values: vec!["NEWHOPE".into(), "EMPIRE".into(), "JEDI".into()],
            }),
            item_optional: true,
        },
    });

    let mut root = SelectionShape::new("Query");
    root.fields.push(ShapeField {
        descriptor: ResponseField::for_object("hero", "hero").optional(),
        value: ValueShape::Object(hero),
    });
    root
}

fn decode(shape: &SelectionShape, payload: &Value, variables: &Variables) -> ResponseObject {
    let adapters = ScalarTypeAdapters::new().register_string(ID);
    let mut reader =
        JsonResponseReader::from_value(payload, ReadContext::new(variables, &adapters)).unwrap();
    shape.read(&mut reader).unwrap()
}

/// Test that an include condition bound to false hides the field.
#[test]
fn test_include_condition() {
    let shape = character_shape();
    let payload = json!({"hero": {
        "__typename": "Human",
        "name": "Luke",
        "id": "1000",
        "appearsIn": ["JEDI"]
    }});

    let with_id = decode(&shape, &payload, &Variables::new().with("withId", true));
    let hero = with_id.get("hero").and_then(ResponseValue::as_object).unwrap();
    assert_eq!(
        hero.get("id"),
        Some(&ResponseValue::Custom(gqlshape_runtime::CustomTypeValue::String("1000".into())))
    );

    let without_id = decode(&shape, &payload, &Variables::new().with("withId", false));
    let hero = without_id.get("hero").and_then(ResponseValue::as_object).unwrap();
    assert_eq!(hero.get("id"), Some(&ResponseValue::Null));

    // An unbound include variable excludes the field.
    let unbound = decode(&shape, &payload, &Variables::new());
    assert_eq!(unbound, without_id);
}

/// Test that a null root object is absent, not an error.
#[test]
fn test_null_root_object() {
    let shape = character_shape();
    let object = decode(&shape, &json!({"hero": null}), &Variables::new());
    assert_eq!(object.get("hero"), Some(&ResponseValue::Null));
}

/// Test that a truncated payload reports an exhausted reader.
#[test]
fn test_truncated_payload() {
    let err = parse_payload(br#"{"hero": {"__typename": "Droid", "name": "R2"#).unwrap_err();
    assert_eq!(err.code, ErrorCode::ReaderExhausted);
}

/// Test that descriptors compare and hash structurally.
#[test]
fn test_descriptor_table_as_cache_key() {
    let a = character_shape().fields[0].descriptor.clone();
    let b = ResponseField::for_object("hero", "hero").optional();
    assert_eq!(a, b);
    assert_eq!(fx_hash(&a), fx_hash(&b));
    assert_ne!(a, ResponseField::for_object("hero", "hero"));
}

fn episode() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("NEWHOPE".to_string()),
        Just("EMPIRE".to_string()),
        Just("JEDI".to_string()),
        "[A-Z_]{1,12}",
    ]
}

proptest! {
    #[test]
    fn prop_parse_payload_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = parse_payload(&bytes);
    }

    #[test]
    fn prop_round_trip_is_identity(
        typename in "[A-Z][a-z]{0,8}",
        name in ".{0,24}",
        id in "[0-9]{1,6}",
        friend_count in proptest::option::of(any::<i64>()),
        appears_in in prop::collection::vec(proptest::option::of(episode()), 0..6),
    ) {
        let shape = character_shape();
        let variables = Variables::new().with("withId", true);
        let payload = json!({"hero": {
            "__typename": typename,
            "name": name,
            "id": id,
            "friendCount": friend_count,
            "appearsIn": appears_in,
        }});

        let first = decode(&shape, &payload, &variables);
        let adapters = ScalarTypeAdapters::new().register_string(ID);
        let written = write_data(&Shaped { shape: &shape, object: &first }, &adapters).unwrap();
        let second = decode(&shape, &written, &variables);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(fx_hash(&first), fx_hash(&second));
        prop_assert_eq!(first.to_string(), second.to_string());

        // Unknown enum values never fail; they land on the sentinel.
        let hero = first.get("hero").and_then(ResponseValue::as_object).unwrap();
        for value in hero.get("appearsIn").and_then(ResponseValue::as_list).unwrap() {
            if let Some(raw) = value.as_str() {
                prop_assert!(
                    ["NEWHOPE", "EMPIRE", "JEDI", UNKNOWN_ENUM_VALUE].contains(&raw)
                );
            }
        }
    }

    #[test]
    fn prop_operation_id_tracks_document(document in ".{0,200}", suffix in ".{1,8}") {
        let id = operation_id(&document);
        prop_assert_eq!(id.len(), 64);
        prop_assert!(id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        prop_assert_eq!(&id, &operation_id(&document.clone()));

        let changed = format!("{document}{suffix}");
        prop_assert_ne!(id, operation_id(&changed));
    }
}
