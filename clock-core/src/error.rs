use thiserror::Error;

/// Failures while getting a snapshot from upstream. Nothing is rendered when one of these occurs.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("Failed to send request to {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read Climate Clock response body")]
    Body(#[source] reqwest::Error),

    #[error("Climate Clock request failed with status {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },

    #[error("Failed to parse Climate Clock JSON")]
    Json(#[source] serde_json::Error),

    #[error("Climate Clock response has no '{0}' module")]
    MissingModule(&'static str),

    #[error("Climate Clock module '{module}' has an unexpected shape")]
    InvalidModule {
        module: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A module is present but lacks something the report needs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataShapeError {
    #[error("Module '{module}' is missing field '{field}'")]
    MissingField { module: &'static str, field: &'static str },

    #[error("Module '{module}' has an empty '{field}' list")]
    EmptyList { module: &'static str, field: &'static str },

    #[error("Module '{module}' has an unparseable timestamp '{value}'")]
    InvalidTimestamp { module: &'static str, value: String },

    #[error("Date arithmetic for module '{module}' is out of range")]
    OutOfRange { module: &'static str },
}
