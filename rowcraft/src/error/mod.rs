use thiserror::Error;

pub mod context;

pub type Result<T> = std::result::Result<T, Error>;

// Re-export context helpers
pub use context::{ErrorChain, ErrorContext};

/// Main error type for rowcraft
///
/// Every failure the metadata engine, the SQL builder or the configuration
/// loader can report is one of these variants. Builder methods themselves
/// never fail; only section replacement and dialect lookup do.
#[derive(Error, Debug)]
pub enum Error {
    /// Extraction target is not a structured record type
    #[error("Model kind error: {type_name} is not a structured record type")]
    ModelKind { type_name: String },

    /// Values were applied to a record passed by shared reference
    #[error("Model {model} is not addressable: pass it by mutable reference to apply values")]
    NotAddressable { model: String },

    /// A value cannot be assigned or converted to the member's type
    #[error("Incompatible type for {model}.{field}: expected {expected}, found {found}")]
    IncompatibleType {
        model: String,
        field: String,
        expected: String,
        found: String,
    },

    /// A not-null member holds its type's zero value
    #[error("Null constraint violated: {model}.{field} cannot be null or empty")]
    NullConstraint { model: String, field: String },

    #[error("Section not found: {0}")]
    SectionNotFound(String),

    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // Error with context chain
    #[error("{message}")]
    WithContext {
        message: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn model_kind(type_name: impl Into<String>) -> Self {
        Self::ModelKind {
            type_name: type_name.into(),
        }
    }

    pub fn not_addressable(model: impl Into<String>) -> Self {
        Self::NotAddressable {
            model: model.into(),
        }
    }

    pub fn null_constraint(model: impl Into<String>, field: impl Into<String>) -> Self {
        Self::NullConstraint {
            model: model.into(),
            field: field.into(),
        }
    }

    pub fn section_not_found(name: impl Into<String>) -> Self {
        Self::SectionNotFound(name.into())
    }

    pub fn unsupported_dialect(name: impl Into<String>) -> Self {
        Self::UnsupportedDialect(name.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    // Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            message: context.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error once all context layers are peeled off
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Error::WithContext { source, .. } = current {
            current = source;
        }
        current
    }

    /// Stable error code, suitable for logs and API payloads
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::ModelKind { .. } => "E_MODEL_KIND",
            Error::NotAddressable { .. } => "E_NOT_ADDRESSABLE",
            Error::IncompatibleType { .. } => "E_INCOMPATIBLE_TYPE",
            Error::NullConstraint { .. } => "E_NULL_CONSTRAINT",
            Error::SectionNotFound(_) => "E_SECTION_NOT_FOUND",
            Error::UnsupportedDialect(_) => "E_UNSUPPORTED_DIALECT",
            Error::Config(_) => "E_CONFIG",
            Error::Io(_) => "E_IO",
            Error::Toml(_) => "E_TOML",
            Error::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the error came from a record's contents rather than its type
    pub fn is_validation(&self) -> bool {
        matches!(
            self.root_cause(),
            Error::NullConstraint { .. } | Error::IncompatibleType { .. }
        )
    }
}
