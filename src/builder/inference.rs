//! Record types synthesized from a sample mapping.

use log::debug;
use std::sync::Arc;

use crate::core::{Fields, Result};
use crate::model::{AllowEmpty, RecordType};

/// Build a throwaway record type whose fields are the keys of `sample`.
///
/// Every field is untyped and allows emptiness. An empty sample still gets
/// one field, named `""`, so the type is never fieldless.
pub fn synthesize_type(name: &str, sample: &Fields) -> Result<Arc<RecordType>> {
    let builder = if sample.is_empty() {
        RecordType::builder(name).fields([""])
    } else {
        RecordType::builder(name).fields(sample.keys().cloned())
    };

    let record_type = builder.allow_empty(AllowEmpty::All).open().build()?;
    debug!(
        "synthesized model '{}' from sample with {} key(s)",
        name,
        sample.len()
    );
    Ok(record_type)
}
