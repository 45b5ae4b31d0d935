use thiserror::Error;

/// Errors produced by the browser session, the remote driver and the locator
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// Raised only when a caller forces existence of a lazy element
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Remote driver reported no element for a single-element lookup
    #[error("No such element: {0}")]
    NoSuchElement(String),

    /// Remote handle is no longer attached to the document
    #[error("Stale element reference: {0}")]
    StaleElementReference(String),

    /// Any other remote driver failure
    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Invalid value for {key}: expected {expected}")]
    InvalidValueType { key: String, expected: String },

    #[error("Unsupported attribute {attribute:?} for <{kind}>")]
    UnsupportedAttribute { attribute: String, kind: String },

    #[error("Conflicting strategy: {0}")]
    ConflictingStrategy(String),

    #[error("Can't locate all elements by index")]
    IndexNotSupportedForAll,

    #[error("Internal error: unable to build query from {0}")]
    InternalBuildFailure(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BrowserError {
    /// Whether the error means "nothing there" rather than a real failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, BrowserError::NoSuchElement(_) | BrowserError::StaleElementReference(_))
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, BrowserError>;
