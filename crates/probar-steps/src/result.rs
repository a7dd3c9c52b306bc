//! Result and error types for step handlers.

use thiserror::Error;

/// Result type for step operations
pub type StepResult<T> = Result<T, StepError>;

/// Errors that can occur while executing a step
#[derive(Debug, Error)]
pub enum StepError {
    /// Parameter string carries no selector key
    #[error("Missing selector in parameter: {param:?}")]
    MissingSelector {
        /// Raw parameter string
        param: String,
    },

    /// Selector key present but empty
    #[error("Invalid selector in parameter: {param:?}")]
    InvalidSelector {
        /// Raw parameter string
        param: String,
    },

    /// Timeout value that is not a positive number
    #[error("Invalid timeout {value:?}: expected a positive number of seconds")]
    InvalidTimeout {
        /// Offending value
        value: String,
    },

    /// Step argument that could not be interpreted
    #[error("Invalid parameter {name}: {message}")]
    InvalidParam {
        /// Parameter name
        name: String,
        /// Error message
        message: String,
    },

    /// Named attribute transform is not registered
    #[error("Attribute transform not found: {name}")]
    AttributeTransformNotFound {
        /// Transform name
        name: String,
    },

    /// Expected and actual values disagree
    #[error("Verification failed: {message}")]
    Verify {
        /// Error message
        message: String,
    },

    /// Element-level verification failure
    #[error("Element verification failed: {message}")]
    VerifyElement {
        /// Error message
        message: String,
    },

    /// Failure raised by the browser or mobile driver
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Driver call timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl StepError {
    /// Create a verification error
    #[must_use]
    pub fn verify(message: impl Into<String>) -> Self {
        Self::Verify {
            message: message.into(),
        }
    }

    /// Create an element verification error
    #[must_use]
    pub fn verify_element(message: impl Into<String>) -> Self {
        Self::VerifyElement {
            message: message.into(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    #[must_use]
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParam {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Whether this is an assertion failure rather than an infrastructure fault
    #[must_use]
    pub const fn is_verification(&self) -> bool {
        matches!(self, Self::Verify { .. } | Self::VerifyElement { .. })
    }

    /// Whether this is an element-level verification failure
    #[must_use]
    pub const fn is_element_verification(&self) -> bool {
        matches!(self, Self::VerifyElement { .. })
    }
}
