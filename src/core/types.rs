use std::fmt;
use std::sync::Arc;

use super::Value;
use crate::model::RecordType;

/// Leaf types a field value can be coerced into by calling the type's constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Boolean,
    Integer,
    Float,
    Text,
    Timestamp,
    Date,
    Uuid,
}

impl ScalarType {
    /// Concrete scalar type of a value, if it is a scalar at all.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(_) => Some(Self::Boolean),
            Value::Integer(_) => Some(Self::Integer),
            Value::Float(_) => Some(Self::Float),
            Value::Text(_) => Some(Self::Text),
            Value::Timestamp(_) => Some(Self::Timestamp),
            Value::Date(_) => Some(Self::Date),
            Value::Uuid(_) => Some(Self::Uuid),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::Integer => write!(f, "INTEGER"),
            Self::Float => write!(f, "FLOAT"),
            Self::Text => write!(f, "TEXT"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::Date => write!(f, "DATE"),
            Self::Uuid => write!(f, "UUID"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    List,
    Tuple,
}

impl SequenceKind {
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::List(_) => Some(Self::List),
            Value::Tuple(_) => Some(Self::Tuple),
            _ => None,
        }
    }

    /// Wrap elements in this container kind.
    pub fn wrap(self, items: Vec<Value>) -> Value {
        match self {
            Self::List => Value::List(items),
            Self::Tuple => Value::Tuple(items),
        }
    }
}

/// Declared type of a field.
///
/// A closed set of type descriptions, built once when the record type is
/// defined. Coercion matches on it exhaustively.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// No constraint; values are never coerced.
    Any,
    /// The none-type, only meaningful inside a union.
    Null,
    Scalar(ScalarType),
    Record(Arc<RecordType>),
    /// List or tuple, optionally parameterized by an element type.
    Sequence(SequenceKind, Option<Box<FieldType>>),
    /// Closed set of alternatives. Values are checked, never converted.
    Union(Vec<FieldType>),
    /// Unbound type variable; treated as no constraint.
    TypeVar(String),
}

impl FieldType {
    pub fn boolean() -> Self {
        Self::Scalar(ScalarType::Boolean)
    }

    pub fn integer() -> Self {
        Self::Scalar(ScalarType::Integer)
    }

    pub fn float() -> Self {
        Self::Scalar(ScalarType::Float)
    }

    pub fn text() -> Self {
        Self::Scalar(ScalarType::Text)
    }

    pub fn timestamp() -> Self {
        Self::Scalar(ScalarType::Timestamp)
    }

    pub fn date() -> Self {
        Self::Scalar(ScalarType::Date)
    }

    pub fn uuid() -> Self {
        Self::Scalar(ScalarType::Uuid)
    }

    pub fn record(record_type: &Arc<RecordType>) -> Self {
        Self::Record(Arc::clone(record_type))
    }

    /// Unparameterized list.
    pub fn list() -> Self {
        Self::Sequence(SequenceKind::List, None)
    }

    /// Unparameterized tuple.
    pub fn tuple() -> Self {
        Self::Sequence(SequenceKind::Tuple, None)
    }

    pub fn list_of(element: FieldType) -> Self {
        Self::Sequence(SequenceKind::List, Some(Box::new(element)))
    }

    pub fn tuple_of(element: FieldType) -> Self {
        Self::Sequence(SequenceKind::Tuple, Some(Box::new(element)))
    }

    pub fn union(alternatives: Vec<FieldType>) -> Self {
        Self::Union(alternatives)
    }

    /// `T` or none.
    pub fn optional(inner: FieldType) -> Self {
        Self::Union(vec![inner, Self::Null])
    }

    pub fn type_var(name: impl Into<String>) -> Self {
        Self::TypeVar(name.into())
    }

    /// Whether the type itself admits an absent value.
    pub fn permits_absence(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Union(alternatives) => alternatives.iter().any(FieldType::permits_absence),
            _ => false,
        }
    }

    /// Types that never trigger coercion.
    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Self::Any | Self::TypeVar(_))
    }

    /// Whether `value` is already an instance of this type, elements included.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Any | Self::TypeVar(_) => true,
            Self::Null => value.is_null(),
            Self::Scalar(scalar) => ScalarType::of(value) == Some(*scalar),
            Self::Record(record_type) => value
                .as_record()
                .is_some_and(|record| record.record_type().id() == record_type.id()),
            Self::Sequence(kind, element) => {
                if SequenceKind::of(value) != Some(*kind) {
                    return false;
                }
                match (element, value.as_slice()) {
                    (Some(element), Some(items)) => items.iter().all(|item| element.matches(item)),
                    _ => true,
                }
            }
            Self::Union(alternatives) => alternatives.iter().any(|alt| alt.matches(value)),
        }
    }
}

impl PartialEq for FieldType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Any, Self::Any) | (Self::Null, Self::Null) => true,
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => a.id() == b.id(),
            (Self::Sequence(ka, ea), Self::Sequence(kb, eb)) => ka == kb && ea == eb,
            (Self::Union(a), Self::Union(b)) => a == b,
            (Self::TypeVar(a), Self::TypeVar(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "ANY"),
            Self::Null => write!(f, "NULL"),
            Self::Scalar(scalar) => write!(f, "{}", scalar),
            Self::Record(record_type) => write!(f, "{}", record_type.name()),
            Self::Sequence(kind, element) => {
                let kind = match kind {
                    SequenceKind::List => "LIST",
                    SequenceKind::Tuple => "TUPLE",
                };
                match element {
                    Some(element) => write!(f, "{}[{}]", kind, element),
                    None => write!(f, "{}", kind),
                }
            }
            Self::Union(alternatives) => {
                let names: Vec<String> = alternatives.iter().map(ToString::to_string).collect();
                write!(f, "UNION[{}]", names.join(", "))
            }
            Self::TypeVar(name) => write!(f, "{}", name),
        }
    }
}
