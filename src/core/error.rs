use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("{0} field cannot be empty")]
    EmptyField(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Type contract violation: {0}")]
    TypeContract(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Shape error: {0}")]
    Shape(String),

    #[error("Model '{0}' must be validated before conversion")]
    NotValidated(String),

    #[error("Definition error: {0}")]
    Definition(String),

    #[error("Field '{0}' is not declared on model '{1}'")]
    UnknownField(String, String),

    #[error("Nesting depth exceeds the limit of {0}")]
    DepthExceeded(usize),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Lock error: {0}")]
    Lock(String),
}

impl ModelError {
    /// Shorthand for raising a domain-rule violation from a validation hook.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Errors that non-raising validation reports as `false` instead of propagating.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyField(_) | Self::Validation(_))
    }

    /// Name of the offending field for `EmptyField` errors.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::EmptyField(name) | Self::UnknownField(name, _) => Some(name),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ModelError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}
