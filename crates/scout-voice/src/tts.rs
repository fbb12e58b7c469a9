use crate::config::ElevenLabsConfig;
use crate::error::VoiceError;
use serde_json::json;

/// Maximum text input size for TTS (64 KiB). Prevents resource exhaustion from
/// oversized synthesis requests.
pub const MAX_TTS_INPUT_BYTES: usize = 64 * 1024;

const DEFAULT_AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Audio returned by the provider, passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Service for generating speech from text.
#[derive(Debug, Clone)]
pub struct TtsService {
    config: ElevenLabsConfig,
    http: reqwest::Client,
}

impl TtsService {
    pub fn new(config: ElevenLabsConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    /// Synthesizes speech from the given text.
    ///
    /// `voice_id` and `model_id` fall back to the configured defaults when
    /// `None` or blank.
    pub async fn synthesize(
        &self,
        text: &str,
        voice_id: Option<&str>,
        model_id: Option<&str>,
    ) -> Result<SynthesizedAudio, VoiceError> {
        if text.trim().is_empty() {
            return Err(VoiceError::InvalidInput("Missing text".to_string()));
        }
        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(VoiceError::InvalidInput(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_TTS_INPUT_BYTES
            )));
        }

        let voice_id = voice_id
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(self.config.voice_id.as_str());
        if !is_valid_voice_id(voice_id) {
            return Err(VoiceError::InvalidInput(format!(
                "invalid voice id: {voice_id}"
            )));
        }
        let model_id = model_id
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(self.config.model_id.as_str());

        let api_key = self.config.api_key().ok_or(VoiceError::MissingApiKey)?;

        let resp = self
            .http
            .post(self.config.endpoint(&format!("/v1/text-to-speech/{voice_id}")))
            .header("xi-api-key", api_key)
            .header(reqwest::header::ACCEPT, DEFAULT_AUDIO_CONTENT_TYPE)
            .json(&json!({ "text": text, "model_id": model_id }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), voice_id, "tts request rejected upstream");
            return Err(VoiceError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_AUDIO_CONTENT_TYPE)
            .to_string();
        let bytes = resp.bytes().await?.to_vec();

        tracing::debug!(voice_id, model_id, bytes = bytes.len(), "synthesized speech");
        Ok(SynthesizedAudio {
            content_type,
            bytes,
        })
    }
}

/// Voice ids are spliced into the URL path, so only id-like strings pass.
fn is_valid_voice_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_id_validation() {
        assert!(is_valid_voice_id("21m00Tcm4TlvDq8ikWAM"));
        assert!(is_valid_voice_id("my_voice-2"));
        assert!(!is_valid_voice_id("../../v1/user"));
        assert!(!is_valid_voice_id("a b"));
        assert!(!is_valid_voice_id(""));
    }

    #[tokio::test]
    async fn blank_text_is_rejected_before_any_request() {
        let service = TtsService::new(ElevenLabsConfig::default(), reqwest::Client::new());
        match service.synthesize("   ", None, None).await {
            Err(VoiceError::InvalidInput(msg)) => assert_eq!(msg, "Missing text"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn oversized_text_is_rejected() {
        let service = TtsService::new(ElevenLabsConfig::new("key"), reqwest::Client::new());
        let text = "a".repeat(MAX_TTS_INPUT_BYTES + 1);
        match service.synthesize(&text, None, None).await {
            Err(VoiceError::InvalidInput(msg)) => assert!(msg.contains("exceeds maximum size")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_key_after_valid_input() {
        let service = TtsService::new(ElevenLabsConfig::default(), reqwest::Client::new());
        assert!(matches!(
            service.synthesize("hello", None, None).await,
            Err(VoiceError::MissingApiKey)
        ));
    }
}
