use std::fmt;

/// Error types for inventory source injection
#[derive(Debug)]
pub enum InjectError {
    /// A source field, option, or credential input failed validation
    SchemaViolation { field: String, reason: String },

    /// Source kind requires a linked credential and none was given
    MissingCredential(String),

    /// Plugin artifacts requested from a source kind without plugin support
    UnsupportedMode(String),

    /// Failed to materialize the private data directory
    DirectoryConstruction(String),

    /// Definition file parsing error
    ConfigParse(String),

    /// General I/O error
    Io(std::io::Error),

    /// Serialization error
    Serialization(String),
}

impl fmt::Display for InjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectError::SchemaViolation { field, reason } => {
                write!(f, "Schema violation for '{}': {}", field, reason)
            }
            InjectError::MissingCredential(kind) => {
                write!(f, "Source kind '{}' requires a linked credential", kind)
            }
            InjectError::UnsupportedMode(kind) => {
                write!(f, "Source kind '{}' does not support plugin mode", kind)
            }
            InjectError::DirectoryConstruction(msg) => {
                write!(f, "Failed to construct private data directory: {}", msg)
            }
            InjectError::ConfigParse(msg) => {
                write!(f, "Failed to parse definition: {}", msg)
            }
            InjectError::Io(err) => {
                write!(f, "I/O error: {}", err)
            }
            InjectError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for InjectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InjectError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for InjectError {
    fn from(err: std::io::Error) -> Self {
        InjectError::Io(err)
    }
}

impl From<serde_yaml::Error> for InjectError {
    fn from(err: serde_yaml::Error) -> Self {
        InjectError::ConfigParse(err.to_string())
    }
}

impl From<serde_json::Error> for InjectError {
    fn from(err: serde_json::Error) -> Self {
        InjectError::Serialization(err.to_string())
    }
}

impl InjectError {
    /// Shorthand for a schema violation on a named field.
    pub fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        InjectError::SchemaViolation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for injection operations
pub type InjectResult<T> = Result<T, InjectError>;
