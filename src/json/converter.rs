//! Conversion between [`Value`] and JSON.
//!
//! JSON objects become ordered maps, arrays become lists. In the other
//! direction tuples render as arrays, records as objects, timestamps as
//! RFC 3339 strings and non-finite floats as `null`.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::core::{Result, Value};
use crate::model::Record;

impl From<JsonValue> for Value {
    fn from(json_value: JsonValue) -> Self {
        match json_value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Boolean(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            JsonValue::String(s) => Value::Text(s),
            JsonValue::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(obj) => {
                Value::Map(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Value::Float(_) => serializer.serialize_unit(),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Timestamp(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            Value::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            Value::Uuid(u) => serializer.collect_str(u),
            Value::List(items) | Value::Tuple(items) => serializer.collect_seq(items),
            Value::Map(fields) => serializer.collect_map(fields),
            Value::Record(record) => Serialize::serialize(record, serializer),
        }
    }
}

/// Serializes the dict form of the record.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        JsonValue::deserialize(deserializer).map(Value::from)
    }
}

impl Value {
    pub fn to_json(&self) -> Result<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        let json_value: JsonValue = serde_json::from_str(input)?;
        Ok(Value::from(json_value))
    }
}
