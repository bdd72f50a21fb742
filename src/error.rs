/// Error types for Auto Tab Grouper
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GrouperError {
    /// A call into the browser's tab/group/storage API failed
    #[error("{op} failed: {message}")]
    Host { op: &'static str, message: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("A rule for \"{0}\" already exists.")]
    DuplicateHost(String),

    #[error("no rule with id {0}")]
    RuleNotFound(String),

    #[error("invalid {field}: {value:?}")]
    InvalidInput { field: &'static str, value: String },
}

impl GrouperError {
    pub fn host(op: &'static str, message: impl Into<String>) -> Self {
        GrouperError::Host {
            op,
            message: message.into(),
        }
    }
}

impl From<serde_wasm_bindgen::Error> for GrouperError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        GrouperError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for GrouperError {
    fn from(err: serde_json::Error) -> Self {
        GrouperError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GrouperError>;
