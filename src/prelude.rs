//! Everyday API in one import.
//!
//! ```
//! use modelkit::prelude::*;
//! ```

pub use crate::builder::{BuildOptions, build, build_many};
pub use crate::core::{FieldType, Fields, ModelError, Result, Value};
pub use crate::model::{AllowEmpty, FieldDef, Record, RecordType};
