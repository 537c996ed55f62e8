//! Dynamic construction of records from untyped nested data.
//!
//! The builder accepts a mapping (typically decoded JSON), synthesizes a
//! record type from its keys and instantiates it. Nested mappings become
//! nested records, named after the field that held them.

pub mod inference;
pub mod options;

pub use inference::synthesize_type;
pub use options::{BuildOptions, DEFAULT_MAX_DEPTH, DEFAULT_MODEL_NAME, NAMELESS_MODEL_NAME};

use log::warn;
use std::iter::Peekable;
use std::sync::Arc;

use crate::core::{FieldType, Fields, ModelError, Result, Value};
use crate::model::{Record, RecordType};
use crate::utils::camel_case;

/// Builds records according to a fixed set of [`BuildOptions`].
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    options: BuildOptions,
}

impl ModelBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build one record from a mapping.
    pub fn build(&self, data: impl Into<Value>) -> Result<Record> {
        self.build_at(
            data.into(),
            &self.options.name,
            self.options.record_type.as_ref(),
            0,
        )
    }

    /// Build records lazily, all sharing one type derived from the first element.
    pub fn build_many<I>(&self, data: I) -> Result<BuildMany<I::IntoIter>>
    where
        I: IntoIterator<Item = Value>,
    {
        let mut source = data.into_iter().peekable();

        let record_type = match (&self.options.record_type, source.peek()) {
            (Some(record_type), _) => Some(Arc::clone(record_type)),
            (None, None) => None,
            (None, Some(first)) => {
                let sample = self.normalized(expect_map(first.clone())?);
                Some(synthesize_type(&self.options.name, &sample)?)
            }
        };

        Ok(BuildMany {
            builder: self.clone(),
            record_type,
            source,
        })
    }

    fn build_at(
        &self,
        data: Value,
        name: &str,
        record_type: Option<&Arc<RecordType>>,
        depth: usize,
    ) -> Result<Record> {
        if depth > self.options.max_depth {
            return Err(ModelError::DepthExceeded(self.options.max_depth));
        }

        let kwargs = self.normalized(expect_map(data)?);
        let record_type = match record_type {
            Some(record_type) => Arc::clone(record_type),
            None => synthesize_type(name, &kwargs)?,
        };

        let mut record = record_type.create(kwargs)?;
        if !self.options.recurse {
            return Ok(record);
        }

        for descriptor in record_type.descriptors() {
            if let Some(slot) = record.get_mut(descriptor.name()) {
                let value = std::mem::take(slot);
                *slot = match descriptor.field_type() {
                    None => self.rebuild_field(value, descriptor.name(), depth)?,
                    Some(field_type) => self.rebuild_declared(value, field_type, depth)?,
                };
            }
        }

        Ok(record)
    }

    /// Declared record fields are built as that type. Anything else with a
    /// declared type is left for coercion at validation time.
    fn rebuild_declared(&self, value: Value, field_type: &FieldType, depth: usize) -> Result<Value> {
        match (field_type, value) {
            (FieldType::Record(nested), value @ Value::Map(_)) => self
                .build_at(value, nested.name(), Some(nested), depth + 1)
                .map(Value::Record),
            (_, value) => Ok(value),
        }
    }

    fn rebuild_field(&self, value: Value, field: &str, depth: usize) -> Result<Value> {
        match value {
            Value::Map(_) => self
                .build_at(value, &camel_case(field), None, depth + 1)
                .map(Value::Record),
            Value::List(items) => Ok(Value::List(self.rebuild_items(items, depth)?)),
            Value::Tuple(items) => Ok(Value::Tuple(self.rebuild_items(items, depth)?)),
            other => Ok(other),
        }
    }

    fn rebuild_items(&self, items: Vec<Value>, depth: usize) -> Result<Vec<Value>> {
        items
            .into_iter()
            .map(|item| match item {
                Value::Map(_) => self
                    .build_at(item, NAMELESS_MODEL_NAME, None, depth + 1)
                    .map(Value::Record),
                other => Ok(other),
            })
            .collect()
    }

    fn normalized(&self, data: Fields) -> Fields {
        if !self.options.normalize_keys && !self.options.sanitize_keys {
            return data;
        }

        let mut out = Fields::with_capacity(data.len());
        for (key, value) in data {
            let normalized = self.options.normalize_key(&key);
            if out.contains_key(&normalized) {
                warn!(
                    "key '{}' collides with another key after normalization to '{}'",
                    key, normalized
                );
            }
            out.insert(normalized, value);
        }
        out
    }
}

fn expect_map(data: Value) -> Result<Fields> {
    match data {
        Value::Map(fields) => Ok(fields),
        other => Err(ModelError::TypeContract(format!(
            "cannot build a model from {}, a mapping is required",
            other.type_name()
        ))),
    }
}

/// Lazy sequence of records produced by [`ModelBuilder::build_many`].
pub struct BuildMany<I: Iterator<Item = Value>> {
    builder: ModelBuilder,
    record_type: Option<Arc<RecordType>>,
    source: Peekable<I>,
}

impl<I: Iterator<Item = Value>> BuildMany<I> {
    /// The type every produced record shares; `None` for an empty source.
    pub fn record_type(&self) -> Option<&Arc<RecordType>> {
        self.record_type.as_ref()
    }
}

impl<I: Iterator<Item = Value>> Iterator for BuildMany<I> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.source.next()?;
        let record_type = self.record_type.as_ref()?;
        Some(self.builder.build_at(
            item,
            record_type.name(),
            Some(record_type),
            0,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.source.size_hint()
    }
}

/// Build one record from a mapping.
pub fn build(data: impl Into<Value>, options: &BuildOptions) -> Result<Record> {
    ModelBuilder::new(options.clone()).build(data)
}

/// Build records lazily from a sequence of mappings.
pub fn build_many<I>(data: I, options: &BuildOptions) -> Result<BuildMany<I::IntoIter>>
where
    I: IntoIterator<Item = Value>,
{
    ModelBuilder::new(options.clone()).build_many(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, Value)]) -> Value {
        Value::Map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_flat_build() {
        let data = map(&[("foo", "foo".into()), ("bar", "bar".into())]);
        let record = build(data, &BuildOptions::new().name("Birl")).unwrap();
        assert_eq!(record.type_name(), "Birl");
        assert_eq!(record["foo"], Value::from("foo"));
        assert_eq!(record["bar"], Value::from("bar"));
    }

    #[test]
    fn test_non_mapping_input_is_rejected() {
        let err = build(Value::Integer(1), &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, ModelError::TypeContract(_)));
    }

    #[test]
    fn test_depth_limit() {
        let mut data = map(&[("leaf", Value::Integer(1))]);
        for _ in 0..5 {
            data = map(&[("child", data)]);
        }

        let err = build(data.clone(), &BuildOptions::new().max_depth(3)).unwrap_err();
        assert_eq!(err, ModelError::DepthExceeded(3));
        assert!(build(data.clone(), &BuildOptions::new().max_depth(5)).is_ok());
        assert!(build(data, &BuildOptions::new().max_depth(0).recurse(false)).is_ok());
    }

    #[test]
    fn test_build_many_is_lazy() {
        let data = vec![
            map(&[("a", Value::Integer(1))]),
            Value::Integer(2),
        ];
        let mut many = build_many(data, &BuildOptions::default()).unwrap();
        assert!(many.next().unwrap().is_ok());
        assert!(many.next().unwrap().is_err());
        assert!(many.next().is_none());
    }
}
