// ============================================================================
// ModelKit Library
// ============================================================================

//! Declarative record types with field-level validation, type coercion and
//! dict conversion, plus a builder that turns untyped nested data into
//! records.
//!
//! # Examples
//!
//! ```
//! use modelkit::{FieldDef, FieldType, Fields, RecordType, Value};
//!
//! # fn main() -> modelkit::Result<()> {
//! let point = RecordType::builder("Point")
//!     .field(FieldDef::new("x").typed(FieldType::float()))
//!     .field(FieldDef::new("y").typed(FieldType::float()).with_default(0.0))
//!     .build()?;
//!
//! let mut kwargs = Fields::new();
//! kwargs.insert("x".to_string(), Value::from("1.5"));
//!
//! let mut p = point.create(kwargs)?;
//! p.validate()?;
//! assert_eq!(p["x"], Value::Float(1.5));
//! assert_eq!(p.to_json()?, serde_json::json!({"x": 1.5, "y": 0.0}));
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod core;
pub mod json;
pub mod model;
pub mod prelude;
pub mod utils;

// Re-export main types for convenience
pub use crate::core::{FieldType, Fields, ModelError, Result, ScalarType, SequenceKind, Value};

pub use crate::model::{
    AllowEmpty, CleanHook, ComputeFn, DefaultFactory, EmptinessPolicy, FieldDef, FieldDefault,
    FieldDescriptor, ModelRegistry, PostInitHook, Record, RecordType, RecordTypeBuilder,
    ValidateHook, to_python,
};

pub use crate::builder::{BuildMany, BuildOptions, ModelBuilder, build, build_many, synthesize_type};
