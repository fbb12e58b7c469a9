//! ElevenLabs integration for Scout.
//!
//! Two server-side operations keep the provider API key out of the browser:
//!
//! - [`ConversationService`] obtains a short-lived signed WebSocket URL for
//!   the conversational voice agent, which the browser then connects to
//!   directly.
//! - [`TtsService`] renders text to speech and hands back the raw audio.
//!
//! Both share one [`ElevenLabsConfig`] and one `reqwest::Client`.

pub mod config;
pub mod error;
pub mod service;
pub mod tts;

pub use config::{ElevenLabsConfig, DEFAULT_API_BASE_URL, DEFAULT_MODEL_ID, DEFAULT_VOICE_ID};
pub use error::VoiceError;
pub use service::{extract_signed_url, ConversationService};
pub use tts::{SynthesizedAudio, TtsService, MAX_TTS_INPUT_BYTES};
