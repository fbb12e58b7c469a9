use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("ELEVEN_API_KEY not configured in environment")]
    MissingApiKey,

    #[error("Missing ELEVEN_AGENT_ID (or pass ?agent_id=)")]
    MissingAgentId,

    #[error("Invalid request: {0}")]
    InvalidInput(String),

    /// The request never produced an upstream response (connect, timeout,
    /// body decode).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("Upstream error")]
    Upstream { status: u16, detail: String },

    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),
}
