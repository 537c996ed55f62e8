//! Record metadata: the set of fields of a record type and one descriptor per field.
//!
//! Field discovery is explicit. A [`RecordTypeBuilder`] collects field
//! declarations and hooks, and [`RecordTypeBuilder::build`] validates them
//! once, producing an immutable [`RecordType`] shared through an `Arc`.

use indexmap::IndexMap;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use super::descriptor::{CleanHook, FieldDef, FieldDescriptor, ValidateHook};
use super::Record;
use crate::core::{Fields, ModelError, Result, Value};
use crate::utils::is_data_attribute;

/// Which fields accept empty values regardless of their declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AllowEmpty {
    /// Only fields whose declaration implies it (a default, or an optional type).
    #[default]
    Declared,
    /// The listed fields, plus those implied by their declaration.
    Fields(HashSet<String>),
    /// Every field.
    All,
}

impl AllowEmpty {
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Fields(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        match self {
            Self::Declared => false,
            Self::Fields(names) => names.contains(name),
            Self::All => true,
        }
    }

    fn merge(self, other: &AllowEmpty) -> Self {
        match (self, other) {
            (Self::All, _) | (_, Self::All) => Self::All,
            (Self::Declared, other) => other.clone(),
            (Self::Fields(mut names), Self::Fields(more)) => {
                names.extend(more.iter().cloned());
                Self::Fields(names)
            }
            (this, Self::Declared) => this,
        }
    }
}

/// Emptiness predicate used by validation.
pub type EmptinessPolicy = fn(&Value) -> bool;

/// Hook invoked after construction with the original keyword arguments.
pub type PostInitHook = Arc<dyn Fn(&mut Record, &Fields) -> Result<()> + Send + Sync>;

pub struct RecordType {
    id: Uuid,
    name: String,
    descriptors: IndexMap<String, FieldDescriptor>,
    allow_empty: AllowEmpty,
    emptiness: EmptinessPolicy,
    post_init: Option<PostInitHook>,
}

impl RecordType {
    pub fn builder(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder::new(name)
    }

    /// Identity of this definition. Two definitions with the same name are still distinct types.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    pub fn field_count(&self) -> usize {
        self.descriptors.len()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    pub fn descriptor(&self, name: &str) -> Option<&FieldDescriptor> {
        self.descriptors.get(name)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.descriptors.values()
    }

    pub fn allow_empty(&self) -> &AllowEmpty {
        &self.allow_empty
    }

    /// Emptiness policy of this type; zero and `false` are not empty by default.
    pub fn is_empty(&self, value: &Value) -> bool {
        (self.emptiness)(value)
    }

    pub(crate) fn post_init(&self) -> Option<&PostInitHook> {
        self.post_init.as_ref()
    }

    /// Construct an instance from keyword arguments, falling back to defaults.
    pub fn create(self: &Arc<Self>, kwargs: Fields) -> Result<Record> {
        Record::new(self, kwargs)
    }

    /// Construct one record per mapping. Every mapping must carry the same keys.
    pub fn build_many<I>(self: &Arc<Self>, source: I) -> Result<Vec<Record>>
    where
        I: IntoIterator<Item = Fields>,
    {
        let source: Vec<Fields> = source.into_iter().collect();
        let Some(first) = source.first() else {
            return Ok(Vec::new());
        };

        let expected: HashSet<&String> = first.keys().collect();
        for item in &source[1..] {
            let keys: HashSet<&String> = item.keys().collect();
            if keys.symmetric_difference(&expected).next().is_some() {
                return Err(ModelError::Shape(
                    "all elements in source should have the same keys".to_string(),
                ));
            }
        }

        source.into_iter().map(|item| self.create(item)).collect()
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("descriptors", &self.descriptors)
            .field("allow_empty", &self.allow_empty)
            .field("has_post_init", &self.post_init.is_some())
            .finish()
    }
}

/// Collects field declarations and hooks for a [`RecordType`].
///
/// # Examples
///
/// ```
/// use modelkit::{FieldDef, FieldType, ModelError, RecordType};
///
/// let person = RecordType::builder("Person")
///     .field(FieldDef::new("name").typed(FieldType::text()))
///     .field(FieldDef::new("age").typed(FieldType::integer()).with_default(0))
///     .validator("name", |_, value| match value.as_str() {
///         Some(name) if name.len() < 2 => Err(ModelError::validation("name is too short")),
///         _ => Ok(None),
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(person.field_count(), 2);
/// ```
pub struct RecordTypeBuilder {
    name: String,
    fields: IndexMap<String, FieldDef>,
    validators: HashMap<String, ValidateHook>,
    cleaners: HashMap<String, CleanHook>,
    allow_empty: AllowEmpty,
    emptiness: Option<EmptinessPolicy>,
    post_init: Option<PostInitHook>,
    open: bool,
}

impl RecordTypeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            validators: HashMap::new(),
            cleaners: HashMap::new(),
            allow_empty: AllowEmpty::Declared,
            emptiness: None,
            post_init: None,
            open: false,
        }
    }

    /// Declare a field. Redeclaring a name replaces the earlier declaration.
    pub fn field(mut self, def: FieldDef) -> Self {
        self.fields.insert(def.name.clone(), def);
        self
    }

    /// Declare untyped fields without defaults.
    pub fn fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let def = FieldDef::new(name);
            self.fields.insert(def.name.clone(), def);
        }
        self
    }

    /// Register the validation hook for `field`.
    pub fn validator<F>(mut self, field: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&Record, &Value) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        self.validators.insert(field.into(), Arc::new(hook));
        self
    }

    /// Register the cleaning hook for `field`.
    pub fn cleaner<F>(mut self, field: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&Record, Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.cleaners.insert(field.into(), Arc::new(hook));
        self
    }

    /// Add to the allow-empty configuration.
    ///
    /// Repeated calls, and calls made after [`extends`](Self::extends),
    /// accumulate rather than replace.
    pub fn allow_empty(mut self, allow_empty: AllowEmpty) -> Self {
        self.allow_empty = self.allow_empty.merge(&allow_empty);
        self
    }

    /// Replace the emptiness predicate used by validation.
    pub fn emptiness(mut self, policy: EmptinessPolicy) -> Self {
        self.emptiness = Some(policy);
        self
    }

    pub fn post_init<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Record, &Fields) -> Result<()> + Send + Sync + 'static,
    {
        self.post_init = Some(Arc::new(hook));
        self
    }

    /// Inherit fields, hooks and configuration from `parent`.
    ///
    /// Anything already declared on this builder wins over the parent's
    /// version, whichever order the calls are made in.
    pub fn extends(mut self, parent: &RecordType) -> Self {
        for descriptor in parent.descriptors() {
            let name = descriptor.name().to_string();
            if let Some(hook) = descriptor.validate_hook() {
                self.validators
                    .entry(name.clone())
                    .or_insert_with(|| Arc::clone(hook));
            }
            if let Some(hook) = descriptor.clean_hook() {
                self.cleaners
                    .entry(name.clone())
                    .or_insert_with(|| Arc::clone(hook));
            }
            self.fields
                .entry(name)
                .or_insert_with(|| descriptor.definition());
        }

        self.allow_empty = self.allow_empty.merge(parent.allow_empty());
        if self.emptiness.is_none() {
            self.emptiness = Some(parent.emptiness);
        }
        if self.post_init.is_none() {
            self.post_init = parent.post_init.clone();
        }
        self
    }

    /// Skip the reserved-name check; used for types synthesized from external data.
    pub(crate) fn open(mut self) -> Self {
        self.open = true;
        self
    }

    pub fn build(self) -> Result<Arc<RecordType>> {
        if self.fields.is_empty() {
            return Err(ModelError::Definition(format!(
                "{} model must define fields",
                self.name
            )));
        }

        if !self.open {
            if let Some(name) = self.fields.keys().find(|name| !is_data_attribute(name)) {
                return Err(ModelError::Definition(format!(
                    "'{}' is not a valid field name for model '{}'",
                    name, self.name
                )));
            }
        }

        for hooked in self.validators.keys().chain(self.cleaners.keys()) {
            if !self.fields.contains_key(hooked) {
                return Err(ModelError::Definition(format!(
                    "hook registered for undeclared field '{}' on model '{}'",
                    hooked, self.name
                )));
            }
        }

        if let AllowEmpty::Fields(names) = &self.allow_empty {
            if let Some(unknown) = names.iter().find(|name| !self.fields.contains_key(*name)) {
                return Err(ModelError::Definition(format!(
                    "allow_empty lists undeclared field '{}' on model '{}'",
                    unknown, self.name
                )));
            }
        }

        let Self {
            name,
            fields,
            mut validators,
            mut cleaners,
            allow_empty,
            emptiness,
            post_init,
            ..
        } = self;

        let descriptors: IndexMap<String, FieldDescriptor> = fields
            .into_iter()
            .map(|(field_name, def)| {
                let descriptor = FieldDescriptor::new(
                    def,
                    allow_empty.contains(&field_name),
                    validators.remove(&field_name),
                    cleaners.remove(&field_name),
                );
                (field_name, descriptor)
            })
            .collect();

        debug!(
            "defined model '{}' with {} field(s)",
            name,
            descriptors.len()
        );

        Ok(Arc::new(RecordType {
            id: Uuid::new_v4(),
            name,
            descriptors,
            allow_empty,
            emptiness: emptiness.unwrap_or(Value::is_empty),
            post_init,
        }))
    }
}
