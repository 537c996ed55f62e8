pub mod error;
pub mod types;
pub mod value;

pub use error::{ModelError, Result};
pub use types::{FieldType, ScalarType, SequenceKind};
pub use value::{Fields, Value};
