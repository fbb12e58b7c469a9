//! Error types for the intel services.

/// Errors that can occur while querying an upstream data source.
#[derive(Debug, thiserror::Error)]
pub enum IntelError {
    /// The request could not be sent or its body could not be decoded.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// A day count puts the date window outside the representable calendar.
    #[error("date range out of bounds: {0}")]
    InvalidRange(String),

    /// No MLB club matched the user-supplied name.
    #[error("team not found: {0}")]
    TeamNotFound(String),
}
