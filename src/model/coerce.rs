//! Recursive coercion of loosely typed values toward a declared [`FieldType`].
//!
//! One function per type variant. Unions are a closed type check, never a
//! conversion target; scalars fall back to calling the scalar "constructor"
//! on the value.

use chrono::{DateTime, NaiveDate, Utc};
use log::trace;
use std::sync::Arc;
use uuid::Uuid;

use super::RecordType;
use crate::core::{FieldType, ModelError, Result, ScalarType, SequenceKind, Value};

/// Coerce `value` toward `field_type`.
///
/// Null values and unconstrained types are returned unchanged.
pub fn convert(value: Value, field_type: &FieldType) -> Result<Value> {
    if value.is_null() || field_type.is_unconstrained() {
        return Ok(value);
    }

    match field_type {
        FieldType::Any | FieldType::TypeVar(_) => Ok(value),
        FieldType::Null | FieldType::Union(_) => {
            if field_type.matches(&value) {
                Ok(value)
            } else {
                Err(ModelError::TypeContract(format!(
                    "value of type {} is not an instance of {}",
                    value.type_name(),
                    field_type
                )))
            }
        }
        FieldType::Scalar(scalar) => convert_scalar(value, *scalar),
        FieldType::Record(record_type) => convert_record(value, record_type),
        FieldType::Sequence(kind, element) => convert_sequence(value, *kind, element.as_deref()),
    }
}

fn convert_scalar(value: Value, target: ScalarType) -> Result<Value> {
    if ScalarType::of(&value) == Some(target) {
        return Ok(value);
    }

    let converted = match (target, &value) {
        (ScalarType::Boolean, v) => Some(Value::Boolean(v.is_truthy())),

        (ScalarType::Integer, Value::Boolean(b)) => Some(Value::Integer(*b as i64)),
        (ScalarType::Integer, Value::Float(f)) => float_to_i64(*f).map(Value::Integer),
        (ScalarType::Integer, Value::Text(s)) => s.trim().parse::<i64>().ok().map(Value::Integer),
        (ScalarType::Integer, Value::Timestamp(t)) => Some(Value::Integer(t.timestamp())),

        (ScalarType::Float, Value::Boolean(b)) => Some(Value::Float(if *b { 1.0 } else { 0.0 })),
        (ScalarType::Float, Value::Integer(i)) => Some(Value::Float(*i as f64)),
        (ScalarType::Float, Value::Text(s)) => s.trim().parse::<f64>().ok().map(Value::Float),

        (ScalarType::Text, Value::Boolean(b)) => Some(Value::Text(Value::Boolean(*b).repr())),
        (ScalarType::Text, v) => Some(Value::Text(v.to_string())),

        (ScalarType::Timestamp, Value::Text(s)) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| Value::Timestamp(dt.with_timezone(&Utc))),
        (ScalarType::Timestamp, Value::Integer(secs)) => {
            DateTime::from_timestamp(*secs, 0).map(Value::Timestamp)
        }
        (ScalarType::Timestamp, Value::Date(d)) => d
            .and_hms_opt(0, 0, 0)
            .map(|naive| Value::Timestamp(naive.and_utc())),

        (ScalarType::Date, Value::Text(s)) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .ok()
            .map(Value::Date),
        (ScalarType::Date, Value::Timestamp(t)) => Some(Value::Date(t.date_naive())),

        (ScalarType::Uuid, Value::Text(s)) => Uuid::parse_str(s.trim()).ok().map(Value::Uuid),

        _ => None,
    };

    match converted {
        Some(converted) => {
            trace!("coerced {} {} to {}", value.type_name(), value.repr(), target);
            Ok(converted)
        }
        None => Err(ModelError::Conversion(format!(
            "cannot convert {} {} to {}",
            value.type_name(),
            value.repr(),
            target
        ))),
    }
}

fn float_to_i64(f: f64) -> Option<i64> {
    if f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f.trunc() as i64)
    } else {
        None
    }
}

fn convert_record(value: Value, record_type: &Arc<RecordType>) -> Result<Value> {
    match value {
        Value::Record(record) => {
            if record.record_type().id() == record_type.id() {
                Ok(Value::Record(record))
            } else {
                Err(ModelError::TypeContract(format!(
                    "field of type {} received an object of invalid type {}",
                    record_type.name(),
                    record.type_name()
                )))
            }
        }
        Value::Map(kwargs) => record_type.create(kwargs).map(Value::Record),
        other => Err(ModelError::Conversion(format!(
            "cannot build {} from {}",
            record_type.name(),
            other.type_name()
        ))),
    }
}

fn convert_sequence(value: Value, kind: SequenceKind, element: Option<&FieldType>) -> Result<Value> {
    let items = match value {
        Value::List(items) | Value::Tuple(items) => items,
        other => {
            return Err(ModelError::Conversion(format!(
                "cannot convert {} to {}",
                other.type_name(),
                FieldType::Sequence(kind, None)
            )));
        }
    };

    // A type variable element could be anything; picking one would be a guess.
    let element = match element {
        Some(element) if !element.is_unconstrained() => element,
        _ => return Ok(kind.wrap(items)),
    };

    let items = items
        .into_iter()
        .map(|item| {
            if element.matches(&item) {
                Ok(item)
            } else {
                convert(item, element)
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(kind.wrap(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_to_float() {
        assert_eq!(
            convert(Value::from("10"), &FieldType::float()).unwrap(),
            Value::Float(10.0)
        );
        assert_eq!(
            convert(Value::from(" 6.9 "), &FieldType::float()).unwrap(),
            Value::Float(6.9)
        );
    }

    #[test]
    fn test_float_to_text() {
        assert_eq!(
            convert(Value::Float(6.9), &FieldType::text()).unwrap(),
            Value::from("6.9")
        );
        assert_eq!(
            convert(Value::Integer(1), &FieldType::text()).unwrap(),
            Value::from("1")
        );
    }

    #[test]
    fn test_boolean_to_text() {
        assert_eq!(
            convert(Value::Boolean(true), &FieldType::text()).unwrap(),
            Value::from("True")
        );
        assert_eq!(
            convert(Value::Boolean(false), &FieldType::text()).unwrap(),
            Value::from("False")
        );
    }

    #[test]
    fn test_list_of_floats() {
        let value = Value::List(vec![Value::from("1"), Value::Integer(2), Value::from("3")]);
        let converted = convert(value, &FieldType::list_of(FieldType::float())).unwrap();
        assert_eq!(
            converted,
            Value::List(vec![Value::Float(1.0), Value::Float(2.0), Value::Float(3.0)])
        );
        assert!(matches!(converted.as_slice().unwrap()[1], Value::Float(_)));
    }

    #[test]
    fn test_tuple_kind_is_rebuilt() {
        let value = Value::List(vec![Value::Integer(1), Value::from("2")]);
        let converted = convert(value, &FieldType::tuple_of(FieldType::text())).unwrap();
        assert_eq!(
            converted,
            Value::Tuple(vec![Value::from("1"), Value::from("2")])
        );
    }

    #[test]
    fn test_unparameterized_sequence_keeps_elements() {
        let value = Value::Tuple(vec![Value::from("1"), Value::Integer(2)]);
        let converted = convert(value, &FieldType::list()).unwrap();
        assert_eq!(
            converted,
            Value::List(vec![Value::from("1"), Value::Integer(2)])
        );
    }

    #[test]
    fn test_type_var_element_skips_conversion() {
        let value = Value::List(vec![Value::from("1")]);
        let converted = convert(value.clone(), &FieldType::list_of(FieldType::type_var("T"))).unwrap();
        assert_eq!(converted, value);
    }

    #[test]
    fn test_union_is_a_closed_check() {
        let union = FieldType::union(vec![FieldType::integer(), FieldType::text()]);
        assert_eq!(convert(Value::Integer(1), &union).unwrap(), Value::Integer(1));
        let err = convert(Value::Float(1.5), &union).unwrap_err();
        assert!(matches!(err, ModelError::TypeContract(_)));
    }

    #[test]
    fn test_null_is_never_coerced() {
        assert_eq!(convert(Value::Null, &FieldType::float()).unwrap(), Value::Null);
    }

    #[test]
    fn test_bad_scalar_conversion_propagates() {
        let err = convert(Value::from("abc"), &FieldType::float()).unwrap_err();
        assert!(matches!(err, ModelError::Conversion(_)));
        let err = convert(Value::from("6.9"), &FieldType::integer()).unwrap_err();
        assert!(matches!(err, ModelError::Conversion(_)));
    }

    #[test]
    fn test_temporal_and_uuid_scalars() {
        let ts = convert(Value::from("2024-01-02T03:04:05Z"), &FieldType::timestamp()).unwrap();
        assert!(matches!(ts, Value::Timestamp(_)));

        let date = convert(Value::from("2024-01-02"), &FieldType::date()).unwrap();
        assert_eq!(date, Value::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()));

        let id = Uuid::new_v4();
        let converted = convert(Value::from(id.to_string()), &FieldType::uuid()).unwrap();
        assert_eq!(converted, Value::Uuid(id));
    }

    #[test]
    fn test_boolean_uses_truthiness() {
        assert_eq!(convert(Value::Integer(0), &FieldType::boolean()).unwrap(), Value::Boolean(false));
        assert_eq!(convert(Value::from("x"), &FieldType::boolean()).unwrap(), Value::Boolean(true));
    }
}
