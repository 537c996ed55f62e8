//! Per-field metadata.
//!
//! A [`FieldDescriptor`] is built once when its record type is defined and
//! never mutated afterwards. It holds no instance data, only the declared
//! type, the default, and the hooks registered for the field.

use std::fmt;
use std::sync::Arc;

use super::Record;
use super::coerce;
use crate::core::{FieldType, ModelError, Result, Value};

/// Custom validation for one field. Returning `Ok(Some(v))` replaces the stored value with `v`.
pub type ValidateHook = Arc<dyn Fn(&Record, &Value) -> Result<Option<Value>> + Send + Sync>;

/// Custom cleaning for one field, applied after type coercion.
pub type CleanHook = Arc<dyn Fn(&Record, Value) -> Result<Value> + Send + Sync>;

/// Zero-argument factory invoked fresh for every instance.
pub type DefaultFactory = Arc<dyn Fn() -> Value + Send + Sync>;

/// Derives a read-only field from the rest of the record.
pub type ComputeFn = Arc<dyn Fn(&Record) -> Value + Send + Sync>;

#[derive(Clone, Default)]
pub enum FieldDefault {
    /// No default: the field must be non-empty at validation time.
    #[default]
    Unset,
    Value(Value),
    Factory(DefaultFactory),
}

impl FieldDefault {
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// Produce the value a new instance starts with.
    pub fn resolve(&self) -> Value {
        match self {
            Self::Unset => Value::Null,
            Self::Value(value) => value.clone(),
            Self::Factory(factory) => factory(),
        }
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, "Unset"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Factory(_) => write!(f, "Factory(..)"),
        }
    }
}

/// Declaration of a single field, consumed by [`RecordTypeBuilder`](super::RecordTypeBuilder).
#[derive(Clone)]
pub struct FieldDef {
    pub(crate) name: String,
    pub(crate) field_type: Option<FieldType>,
    pub(crate) default: FieldDefault,
    pub(crate) compute: Option<ComputeFn>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: None,
            default: FieldDefault::Unset,
            compute: None,
        }
    }

    /// Declare a computed field.
    ///
    /// Its value is derived from the record on every read. It is never
    /// stored, coerced or assigned, and it is only validated when a
    /// validator is registered for it. It still shows up in the dict form.
    pub fn computed<F>(name: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        Self {
            compute: Some(Arc::new(compute)),
            ..Self::new(name)
        }
    }

    /// Set the declared type
    pub fn typed(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    /// Set a default value. Even a falsy default opts the field into emptiness.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    /// Set a default factory, called once per instance that omits the field.
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = FieldDefault::Factory(Arc::new(factory));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("default", &self.default)
            .field("computed", &self.compute.is_some())
            .finish()
    }
}

#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    field_type: Option<FieldType>,
    default: FieldDefault,
    compute: Option<ComputeFn>,
    allow_empty: bool,
    validate_hook: Option<ValidateHook>,
    clean_hook: Option<CleanHook>,
}

impl FieldDescriptor {
    pub(crate) fn new(
        def: FieldDef,
        listed_as_empty: bool,
        validate_hook: Option<ValidateHook>,
        clean_hook: Option<CleanHook>,
    ) -> Self {
        let type_permits_absence = def
            .field_type
            .as_ref()
            .is_some_and(FieldType::permits_absence);
        let allow_empty = listed_as_empty || type_permits_absence || def.default.is_set();

        Self {
            name: def.name,
            field_type: def.field_type,
            default: def.default,
            compute: def.compute,
            allow_empty,
            validate_hook,
            clean_hook,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> Option<&FieldType> {
        self.field_type.as_ref()
    }

    pub fn default(&self) -> &FieldDefault {
        &self.default
    }

    pub fn has_default(&self) -> bool {
        self.default.is_set()
    }

    /// The default a fresh instance receives; `Null` when unset.
    pub fn default_value(&self) -> Value {
        self.default.resolve()
    }

    pub fn allow_empty(&self) -> bool {
        self.allow_empty
    }

    pub fn is_computed(&self) -> bool {
        self.compute.is_some()
    }

    /// Current value of a computed field; `None` for stored fields.
    pub fn compute(&self, record: &Record) -> Option<Value> {
        self.compute.as_ref().map(|compute| compute(record))
    }

    pub fn has_validator(&self) -> bool {
        self.validate_hook.is_some()
    }

    pub fn has_cleaner(&self) -> bool {
        self.clean_hook.is_some()
    }

    pub(crate) fn validate_hook(&self) -> Option<&ValidateHook> {
        self.validate_hook.as_ref()
    }

    pub(crate) fn clean_hook(&self) -> Option<&CleanHook> {
        self.clean_hook.as_ref()
    }

    /// Declaration this descriptor was built from, used when a type extends another.
    pub(crate) fn definition(&self) -> FieldDef {
        FieldDef {
            name: self.name.clone(),
            field_type: self.field_type.clone(),
            default: self.default.clone(),
            compute: self.compute.clone(),
        }
    }

    /// Coerce `value` toward the declared type, or toward `type_override` when given.
    pub fn convert_to_type(&self, value: Value, type_override: Option<&FieldType>) -> Result<Value> {
        match type_override.or(self.field_type.as_ref()) {
            Some(field_type) => coerce::convert(value, field_type),
            None => Ok(value),
        }
    }

    /// Check emptiness, validate nested records, then run the field hook.
    ///
    /// `value` is updated in place: nested records may be coerced while they
    /// validate, and a hook may hand back a replacement value.
    pub fn validate(&self, record: &Record, value: &mut Value) -> Result<()> {
        if !self.allow_empty && record.is_empty_value(&*value) {
            return Err(ModelError::EmptyField(self.name.clone()));
        }

        if let Some(items) = value.as_slice_mut() {
            for item in items.iter_mut() {
                if let Some(nested) = item.as_record_mut() {
                    nested.validate()?;
                }
            }
        }

        if let Some(hook) = &self.validate_hook {
            if let Some(replacement) = hook(record, &*value)? {
                *value = replacement;
            }
            return Ok(());
        }

        if let Some(nested) = value.as_record_mut() {
            nested.validate()?;
        }

        Ok(())
    }

    /// Coerce, apply the clean hook, then clean nested records.
    pub fn clean(&self, record: &Record, value: Value) -> Result<Value> {
        let value = self.convert_to_type(value, None)?;
        let mut value = match &self.clean_hook {
            Some(hook) => hook(record, value)?,
            None => value,
        };

        match &mut value {
            Value::Record(nested) => nested.clean()?,
            Value::List(items) | Value::Tuple(items) => {
                for item in items.iter_mut() {
                    if let Some(nested) = item.as_record_mut() {
                        nested.clean()?;
                    }
                }
            }
            _ => {}
        }

        Ok(value)
    }

    /// Plain representation of a value; see [`to_python`].
    pub fn to_python(&self, value: &Value) -> Value {
        to_python(value)
    }
}

/// JSON-safe representation of a field value.
///
/// Records become maps, sequences become lists with record elements
/// converted, everything else passes through untouched.
pub fn to_python(value: &Value) -> Value {
    match value {
        Value::List(items) | Value::Tuple(items) => Value::List(
            items
                .iter()
                .map(|item| match item {
                    Value::Record(record) => Value::Map(record.to_map()),
                    other => other.clone(),
                })
                .collect(),
        ),
        Value::Record(record) => Value::Map(record.to_map()),
        other => other.clone(),
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("default", &self.default)
            .field("computed", &self.compute.is_some())
            .field("allow_empty", &self.allow_empty)
            .field("has_validator", &self.validate_hook.is_some())
            .field("has_cleaner", &self.clean_hook.is_some())
            .finish()
    }
}
