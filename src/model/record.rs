use std::borrow::Cow;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use super::descriptor::FieldDescriptor;
use super::RecordType;
use crate::core::{Fields, ModelError, Result, Value};

static NULL: Value = Value::Null;

/// An instance of a [`RecordType`].
///
/// Holds one value per declared field. Construction alone never makes a
/// record valid; validity is established by an explicit
/// [`validate`](Record::validate) pass, which also coerces field values
/// toward their declared types in place.
#[derive(Clone)]
pub struct Record {
    record_type: Arc<RecordType>,
    values: Fields,
    validation_count: u32,
}

impl Record {
    /// Take each field from `kwargs`, falling back to the field's default.
    ///
    /// Factories run once per instance, so mutable defaults are never shared.
    /// Keys that are not declared fields are ignored here but still reach the
    /// post-init hook.
    pub fn new(record_type: &Arc<RecordType>, mut kwargs: Fields) -> Result<Self> {
        let original = record_type.post_init().map(|_| kwargs.clone());

        let mut values = Fields::with_capacity(record_type.field_count());
        for descriptor in record_type.descriptors().filter(|d| !d.is_computed()) {
            let value = match kwargs.swap_remove(descriptor.name()) {
                Some(value) => value,
                None => descriptor.default_value(),
            };
            values.insert(descriptor.name().to_string(), value);
        }

        let mut record = Self {
            record_type: Arc::clone(record_type),
            values,
            validation_count: 0,
        };

        if let (Some(hook), Some(original)) = (record_type.post_init(), original) {
            hook(&mut record, &original)?;
        }

        Ok(record)
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    pub fn type_name(&self) -> &str {
        self.record_type.name()
    }

    /// Stored value of a field. Computed fields are not stored, see [`value`](Record::value).
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Current value of any declared field, computed ones included.
    pub fn value(&self, name: &str) -> Option<Value> {
        let descriptor = self.record_type.descriptor(name)?;
        match descriptor.compute(self) {
            Some(value) => Some(value),
            None => self.values.get(name).cloned(),
        }
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.values.get_mut(name)
    }

    /// Assign a declared field. Assigning a computed field is a no-op.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        if self
            .record_type
            .descriptor(name)
            .is_some_and(FieldDescriptor::is_computed)
        {
            log::debug!("ignoring assignment to computed field '{}'", name);
            return Ok(());
        }
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(ModelError::UnknownField(
                name.to_string(),
                self.type_name().to_string(),
            )),
        }
    }

    /// Raw field values in declaration order.
    pub fn values(&self) -> &Fields {
        &self.values
    }

    /// `(name, raw value, descriptor)` for every field, computed ones included.
    pub fn fields(&self) -> impl Iterator<Item = (&str, Cow<'_, Value>, &FieldDescriptor)> {
        self.record_type.descriptors().map(|descriptor| {
            let value = match descriptor.compute(self) {
                Some(computed) => Cow::Owned(computed),
                None => Cow::Borrowed(self.values.get(descriptor.name()).unwrap_or(&NULL)),
            };
            (descriptor.name(), value, descriptor)
        })
    }

    /// Number of times [`validate`](Record::validate) has been called on this record.
    pub fn validation_count(&self) -> u32 {
        self.validation_count
    }

    pub fn is_validated(&self) -> bool {
        self.validation_count > 0
    }

    pub fn is_empty_value(&self, value: &Value) -> bool {
        self.record_type.is_empty(value)
    }

    /// Coerce every field toward its declared type, in place.
    pub fn convert_fields(&mut self) -> Result<()> {
        let record_type = Arc::clone(&self.record_type);
        for descriptor in record_type.descriptors().filter(|d| !d.is_computed()) {
            if let Some(slot) = self.values.get_mut(descriptor.name()) {
                *slot = descriptor.convert_to_type(slot.clone(), None)?;
            }
        }
        Ok(())
    }

    /// Coerce fields, then check every field; the first failure is returned.
    ///
    /// Values handed back by validation hooks are written onto the record.
    /// Computed fields are checked only when they carry a validator, and
    /// whatever the hook hands back for them is dropped.
    pub fn validate(&mut self) -> Result<()> {
        self.validation_count += 1;
        self.convert_fields()?;

        let record_type = Arc::clone(&self.record_type);
        for descriptor in record_type.descriptors() {
            if descriptor.is_computed() {
                if descriptor.has_validator() {
                    let mut computed = descriptor.compute(self).unwrap_or_default();
                    descriptor.validate(self, &mut computed)?;
                }
                continue;
            }

            let mut value = self.values.get(descriptor.name()).cloned().unwrap_or_default();
            descriptor.validate(self, &mut value)?;
            if let Some(slot) = self.values.get_mut(descriptor.name()) {
                *slot = value;
            }
        }

        Ok(())
    }

    /// Non-raising validation.
    ///
    /// Returns `Ok(false)` on the first validation-kind failure. Type
    /// contract and conversion errors still propagate.
    pub fn is_valid(&mut self) -> Result<bool> {
        match self.validate() {
            Ok(()) => Ok(true),
            Err(err) if err.is_validation() => {
                log::debug!("model '{}' failed validation: {}", self.type_name(), err);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Coerce fields, apply clean hooks and clean nested records.
    pub fn clean(&mut self) -> Result<()> {
        let record_type = Arc::clone(&self.record_type);
        for descriptor in record_type.descriptors().filter(|d| !d.is_computed()) {
            let value = self.values.get(descriptor.name()).cloned().unwrap_or_default();
            let cleaned = descriptor.clean(self, value)?;
            if let Some(slot) = self.values.get_mut(descriptor.name()) {
                *slot = cleaned;
            }
        }
        Ok(())
    }

    /// `(name, plain value)` pairs; collecting them yields the dict form of the record.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> {
        self.fields()
            .map(|(name, value, descriptor)| (name, descriptor.to_python(&value)))
    }

    /// Dict form of the record. Nested records become maps.
    pub fn to_map(&self) -> Fields {
        self.iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    /// Dict form of a record that has been validated at least once.
    pub fn as_dict(&self) -> Result<Fields> {
        if !self.is_validated() {
            return Err(ModelError::NotValidated(self.type_name().to_string()));
        }
        Ok(self.to_map())
    }

    /// JSON form of a record that has been validated at least once.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Value::Map(self.as_dict()?).to_json()
    }

    /// Validate, then return the dict form without `exclude_fields`.
    pub fn serialize(&mut self, exclude_fields: &[&str]) -> Result<Fields> {
        self.validate()?;
        Ok(self
            .iter()
            .filter(|(name, _)| !exclude_fields.contains(name))
            .map(|(name, value)| (name.to_string(), value))
            .collect())
    }

    /// Field-by-field comparison against a mapping with the same number of keys.
    pub fn eq_map(&self, other: &Fields) -> bool {
        self.record_type.field_count() == other.len()
            && self
                .fields()
                .all(|(name, value, _)| other.get(name).is_some_and(|theirs| *theirs == *value))
    }

    fn current_values(&self) -> Fields {
        self.fields()
            .map(|(name, value, _)| (name.to_string(), value.into_owned()))
            .collect()
    }

    /// Comparison against ordered `(name, value)` pairs; later duplicates win.
    pub fn eq_pairs<K, I>(&self, pairs: I) -> bool
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let other: Fields = pairs.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.eq_map(&other)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.eq_map(&other.current_values())
    }
}

impl PartialEq<Fields> for Record {
    fn eq(&self, other: &Fields) -> bool {
        self.eq_map(other)
    }
}

impl Index<&str> for Record {
    type Output = Value;

    /// Unknown names and computed fields yield `Value::Null`.
    fn index(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&NULL)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attrs: Vec<String> = self
            .fields()
            .map(|(name, value, _)| format!("{}={}", name, value.repr()))
            .collect();
        write!(f, "{}({})", self.type_name(), attrs.join(", "))
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct(self.type_name());
        for (name, value, _) in self.fields() {
            debug.field(name, &value);
        }
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AllowEmpty, FieldDef};

    fn foo_bar_model() -> Arc<RecordType> {
        RecordType::builder("MyFooBarModel")
            .fields(["foo", "bar"])
            .cleaner("foo", |_, value| {
                Ok(match value {
                    Value::Text(s) => Value::Text(s.trim().to_string()),
                    other => other,
                })
            })
            .build()
            .unwrap()
    }

    fn kwargs(pairs: &[(&str, Value)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_construction_uses_defaults() {
        let model = RecordType::builder("Defaults")
            .field(FieldDef::new("flag").with_default(true))
            .field(FieldDef::new("name"))
            .build()
            .unwrap();
        let record = model.create(Fields::new()).unwrap();
        assert_eq!(record["flag"], Value::Boolean(true));
        assert_eq!(record["name"], Value::Null);
        assert_eq!(record["missing"], Value::Null);
    }

    #[test]
    fn test_repr() {
        let record = foo_bar_model()
            .create(kwargs(&[("foo", "foo".into()), ("bar", "bar".into())]))
            .unwrap();
        let repr = record.to_string();
        assert!(repr.starts_with("MyFooBarModel("));
        assert!(repr.contains("foo='foo'"));
        assert!(repr.contains("bar='bar'"));
    }

    #[test]
    fn test_set_unknown_field() {
        let mut record = foo_bar_model().create(Fields::new()).unwrap();
        let err = record.set("baz", 1).unwrap_err();
        assert!(matches!(err, ModelError::UnknownField(_, _)));
        record.set("foo", " foo ").unwrap();
        assert_eq!(record["foo"], Value::from(" foo "));
    }

    #[test]
    fn test_clean_applies_hook() {
        let mut record = foo_bar_model()
            .create(kwargs(&[("foo", " foo ".into()), ("bar", "bar".into())]))
            .unwrap();
        record.clean().unwrap();
        assert_eq!(record["foo"], Value::from("foo"));
        assert_eq!(record["bar"], Value::from("bar"));
        assert_eq!(record.validation_count(), 0);
    }

    #[test]
    fn test_as_dict_requires_validation() {
        let model = RecordType::builder("Open")
            .fields(["a"])
            .allow_empty(AllowEmpty::All)
            .build()
            .unwrap();
        let mut record = model.create(Fields::new()).unwrap();
        assert!(matches!(record.as_dict(), Err(ModelError::NotValidated(_))));
        record.validate().unwrap();
        assert_eq!(record.as_dict().unwrap(), kwargs(&[("a", Value::Null)]));
    }

    #[test]
    fn test_computed_field_is_derived_not_stored() {
        let model = RecordType::builder("Doubled")
            .field(FieldDef::new("n"))
            .field(FieldDef::computed("twice", |record| match record["n"].as_i64() {
                Some(n) => Value::Integer(n * 2),
                None => Value::Null,
            }))
            .build()
            .unwrap();
        let mut record = model
            .create(kwargs(&[("n", Value::Integer(2)), ("twice", Value::Integer(0))]))
            .unwrap();

        assert!(record.get("twice").is_none());
        assert_eq!(record.value("twice"), Some(Value::Integer(4)));
        record.set("twice", 10).unwrap();
        record.set("n", 5).unwrap();
        assert_eq!(record.value("twice"), Some(Value::Integer(10)));
        assert_eq!(record.to_string(), "Doubled(n=5, twice=10)");
    }

    #[test]
    fn test_equality_with_pairs() {
        let record = foo_bar_model()
            .create(kwargs(&[("foo", "foo".into()), ("bar", "bar".into())]))
            .unwrap();
        assert!(record.eq_pairs([("foo", Value::from("foo")), ("bar", Value::from("bar"))]));
        assert!(!record.eq_pairs(Vec::<(String, Value)>::new()));
        assert!(!record.eq_pairs([("foo", Value::from("foo"))]));
    }
}
