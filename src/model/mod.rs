//! Record types, field descriptors and record instances.

pub mod coerce;
pub mod descriptor;
pub mod record;
pub mod record_type;
pub mod registry;

pub use descriptor::{
    to_python, CleanHook, ComputeFn, DefaultFactory, FieldDef, FieldDefault, FieldDescriptor,
    ValidateHook,
};
pub use record::Record;
pub use record_type::{AllowEmpty, EmptinessPolicy, PostInitHook, RecordType, RecordTypeBuilder};
pub use registry::ModelRegistry;
