use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_API_BASE_URL: &str = "https://api.elevenlabs.io";
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_voice_id() -> String {
    DEFAULT_VOICE_ID.to_string()
}

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ElevenLabsConfig {
    /// Base URL of the ElevenLabs REST API, without a trailing `/v1`.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Conversational agent used when the caller does not name one.
    #[serde(default)]
    pub agent_id: Option<String>,
    /// Voice used for text-to-speech when the caller does not name one.
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default = "default_model_id")]
    pub model_id: String,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_key: None,
            agent_id: None,
            voice_id: default_voice_id(),
            model_id: default_model_id(),
        }
    }
}

impl fmt::Debug for ElevenLabsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElevenLabsConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("agent_id", &self.agent_id)
            .field("voice_id", &self.voice_id)
            .field("model_id", &self.model_id)
            .finish()
    }
}

impl ElevenLabsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Returns the API key if one is configured and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Builds `{api_base_url}/{path}` with exactly one `/` between them.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
