use std::sync::Arc;

use crate::model::RecordType;
use crate::utils::{sanitize_to_word_chars, snake_case};

/// Name given to top-level synthesized types when none is supplied.
pub const DEFAULT_MODEL_NAME: &str = "MyModel";

/// Name given to records built from mappings found inside sequences.
pub const NAMELESS_MODEL_NAME: &str = "NamelessModel";

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options for building records out of loosely structured data.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Name of the synthesized top-level type
    pub name: String,

    /// Use this type instead of synthesizing one
    pub record_type: Option<Arc<RecordType>>,

    /// Turn nested mappings into records
    pub recurse: bool,

    /// Snake-case keys
    pub normalize_keys: bool,

    /// Replace non-word characters in keys with underscores
    pub sanitize_keys: bool,

    /// Deepest nesting level accepted when recursing
    pub max_depth: usize,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self {
            name: DEFAULT_MODEL_NAME.to_string(),
            record_type: None,
            recurse: true,
            normalize_keys: true,
            sanitize_keys: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the top-level type name
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Build against an existing type
    pub fn record_type(mut self, record_type: &Arc<RecordType>) -> Self {
        self.record_type = Some(Arc::clone(record_type));
        self
    }

    pub fn recurse(mut self, recurse: bool) -> Self {
        self.recurse = recurse;
        self
    }

    pub fn normalize_keys(mut self, normalize_keys: bool) -> Self {
        self.normalize_keys = normalize_keys;
        self
    }

    pub fn sanitize_keys(mut self, sanitize_keys: bool) -> Self {
        self.sanitize_keys = sanitize_keys;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Turn an external key into a field name: sanitize first, then snake-case.
    pub fn normalize_key(&self, key: &str) -> String {
        let key = if self.sanitize_keys {
            sanitize_to_word_chars(key)
        } else {
            key.to_string()
        };
        if self.normalize_keys {
            snake_case(&key)
        } else {
            key
        }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::new()
    }
}
