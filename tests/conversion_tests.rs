use chrono::{NaiveDate, TimeZone, Utc};
use modelkit::utils::{camel_case, sanitize_to_word_chars, snake_case};
use modelkit::{
    FieldDef, FieldType, Fields, ModelError, ModelRegistry, RecordType, Result, Value, to_python,
};
use serde_json::json;
use uuid::Uuid;

fn kwargs(data: serde_json::Value) -> Fields {
    match Value::from(data) {
        Value::Map(fields) => fields,
        other => panic!("expected a JSON object, got {:?}", other),
    }
}

#[test]
fn test_temporal_fields_from_json_strings() -> Result<()> {
    let event = RecordType::builder("Event")
        .field(FieldDef::new("id").typed(FieldType::uuid()))
        .field(FieldDef::new("at").typed(FieldType::timestamp()))
        .field(FieldDef::new("day").typed(FieldType::date()))
        .build()?;

    let id = Uuid::new_v4();
    let mut record = event.create(kwargs(json!({
        "id": id.to_string(),
        "at": "2024-05-06T07:08:09Z",
        "day": "2024-05-06",
    })))?;
    record.validate()?;

    assert_eq!(record["id"], Value::Uuid(id));
    assert_eq!(
        record["at"],
        Value::Timestamp(Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap())
    );
    assert_eq!(
        record["day"],
        Value::Date(NaiveDate::from_ymd_opt(2024, 5, 6).unwrap())
    );
    assert_eq!(
        record.to_json()?,
        json!({
            "id": id.to_string(),
            "at": "2024-05-06T07:08:09+00:00",
            "day": "2024-05-06",
        })
    );
    Ok(())
}

#[test]
fn test_tuple_field_round_trips_as_array() -> Result<()> {
    let model = RecordType::builder("Pairs")
        .field(FieldDef::new("pair").typed(FieldType::tuple_of(FieldType::integer())))
        .build()?;
    let mut record = model.create(kwargs(json!({"pair": ["1", 2]})))?;
    record.validate()?;

    assert_eq!(
        record["pair"],
        Value::Tuple(vec![Value::Integer(1), Value::Integer(2)])
    );
    assert_eq!(record.to_json()?, json!({"pair": [1, 2]}));
    assert_eq!(record.to_string(), "Pairs(pair=(1, 2))");
    Ok(())
}

#[test]
fn test_sequence_of_records() -> Result<()> {
    let tag = RecordType::builder("Tag")
        .field(FieldDef::new("name").typed(FieldType::text()))
        .build()?;
    let post = RecordType::builder("Post")
        .field(FieldDef::new("tags").typed(FieldType::list_of(FieldType::record(&tag))))
        .build()?;

    let mut record = post.create(kwargs(json!({"tags": [{"name": "rust"}, {"name": 1}]})))?;
    record.validate()?;

    let tags = record["tags"].as_slice().unwrap();
    assert!(tags.iter().all(|t| t.as_record().is_some()));
    assert_eq!(tags[1].as_record().unwrap()["name"], Value::from("1"));
    assert_eq!(
        to_python(&record["tags"]),
        Value::from(json!([{"name": "rust"}, {"name": "1"}]))
    );

    let mut bad = post.create(kwargs(json!({"tags": [{"name": ""}]})))?;
    assert!(!bad.is_valid()?);
    Ok(())
}

#[test]
fn test_to_python_passes_falsy_values_through() {
    for value in [
        Value::Null,
        Value::Integer(0),
        Value::Boolean(false),
        Value::from(""),
        Value::List(Vec::new()),
    ] {
        assert_eq!(to_python(&value), value);
    }
}

#[test]
fn test_value_serde_round_trip_through_json_text() -> Result<()> {
    let value = Value::from_json_str(r#"{"a": [1, 2.5, "x"], "b": {"c": null}}"#)?;
    let text = serde_json::to_string(&value)?;
    assert_eq!(text, r#"{"a":[1,2.5,"x"],"b":{"c":null}}"#);

    let back: Value = serde_json::from_str(&text)?;
    assert_eq!(back, value);
    Ok(())
}

#[test]
fn test_json_errors_are_wrapped() {
    let err = Value::from_json_str("[1,").unwrap_err();
    assert!(matches!(err, ModelError::Json(_)));
}

#[test]
fn test_integer_and_float_compare_equal() {
    assert_eq!(Value::Integer(1), Value::Float(1.0));
    assert_ne!(
        Value::List(vec![Value::Integer(1)]),
        Value::Tuple(vec![Value::Integer(1)])
    );
}

#[test]
fn test_casing_helpers() {
    assert_eq!(camel_case("my_model"), "MyModel");
    assert_eq!(camel_case("foo Bar-baz"), "FooBarBaz");
    assert_eq!(snake_case("myModel"), "my_model");
    assert_eq!(sanitize_to_word_chars("foo*bar"), "foo_bar");
}

#[test]
fn test_global_registry() -> Result<()> {
    let registry = ModelRegistry::global();
    let defined = registry.define(RecordType::builder("GlobalRegistryProbe").fields(["x"]))?;

    let found = registry.get("GlobalRegistryProbe")?.unwrap();
    assert_eq!(found.id(), defined.id());

    let record = found.create(kwargs(json!({"x": 1})))?;
    assert_eq!(record["x"], Value::Integer(1));

    registry.unregister("GlobalRegistryProbe")?;
    assert!(registry.get("GlobalRegistryProbe")?.is_none());
    Ok(())
}
