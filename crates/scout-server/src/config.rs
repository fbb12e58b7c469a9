//! Server configuration loading from file and environment variables.

use scout_intel::IntelConfig;
use scout_voice::ElevenLabsConfig;
use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Tool proxy and tool backend settings.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Chat-completion relay settings.
    #[serde(default)]
    pub chat: ChatConfig,

    /// ElevenLabs signed-URL and text-to-speech settings.
    #[serde(default)]
    pub elevenlabs: ElevenLabsConfig,

    /// News, video and MLB data sources.
    #[serde(default)]
    pub intel: IntelConfig,
}

/// Which route groups this process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerRole {
    /// Browser-facing relays and the tool proxy.
    Gateway,
    /// Health check and tool endpoints.
    Backend,
    /// Both of the above in one process.
    #[default]
    Combined,
}

impl ServerRole {
    pub fn serves_gateway(self) -> bool {
        matches!(self, Self::Gateway | Self::Combined)
    }

    pub fn serves_backend(self) -> bool {
        matches!(self, Self::Backend | Self::Combined)
    }
}

impl std::str::FromStr for ServerRole {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gateway" => Ok(Self::Gateway),
            "backend" => Ok(Self::Backend),
            "combined" => Ok(Self::Combined),
            other => Err(ConfigError::InvalidValue {
                key: "server.role",
                value: other.to_string(),
            }),
        }
    }
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub role: ServerRole,

    /// Timeout for every outbound upstream request, in seconds.
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "scout_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Tool proxy and backend settings.
#[derive(Clone, Deserialize)]
pub struct ToolsConfig {
    /// Base URL the gateway forwards `/api/tools/{operation}` to.
    #[serde(default = "default_backend_base_url")]
    pub backend_base_url: String,

    /// Shared secret sent as `x-tool-token` by the gateway and required by
    /// the backend when set.
    #[serde(default)]
    pub token: Option<String>,
}

/// Chat-completion relay settings (OpenRouter-compatible).
#[derive(Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_api_base_url")]
    pub api_base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Model injected when a request does not name one.
    #[serde(default = "default_chat_model")]
    pub default_model: String,

    /// Sent as `HTTP-Referer` for provider attribution.
    #[serde(default)]
    pub referer: Option<String>,

    /// Sent as `X-Title` for provider attribution.
    #[serde(default)]
    pub title: Option<String>,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8888
}

fn default_upstream_timeout_secs() -> u64 {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_backend_base_url() -> String {
    "http://127.0.0.1:8001".to_string()
}

fn default_chat_api_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_chat_model() -> String {
    "openrouter/auto".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            role: ServerRole::default(),
            upstream_timeout_secs: default_upstream_timeout_secs(),
        }
    }
}

impl ServerConfig {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs.max(1))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            backend_base_url: default_backend_base_url(),
            token: None,
        }
    }
}

impl ToolsConfig {
    /// Returns the shared token if one is configured and non-blank.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.trim().is_empty())
    }
}

impl fmt::Debug for ToolsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolsConfig")
            .field("backend_base_url", &self.backend_base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_chat_api_base_url(),
            api_key: None,
            default_model: default_chat_model(),
            referer: None,
            title: None,
        }
    }
}

impl ChatConfig {
    /// Returns the API key if one is configured and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("default_model", &self.default_model)
            .field("referer", &self.referer)
            .field("title", &self.title)
            .finish()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting holds a value outside its allowed set.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

fn check_http_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => Ok(()),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

impl Config {
    /// Applies environment overrides using `lookup` to read variables.
    ///
    /// Provider variables keep the names the hosted functions used, so an
    /// existing `.env` works unchanged:
    ///
    /// - `SCOUT_HOST`, `SCOUT_PORT`, `SCOUT_ROLE` override `server.*`
    /// - `SCOUT_LOG_LEVEL`, `SCOUT_LOG_JSON` override `logging.*`
    /// - `BACKEND_BASE_URL`, `TOOL_TOKEN` override `tools.*`
    /// - `OPENROUTER_API_KEY`, `OPENROUTER_MODEL` override `chat.*`
    /// - `ELEVEN_API_KEY` (or `ELEVENLABS_API_KEY`), `ELEVEN_AGENT_ID`
    ///   (or `AGENT_ID`), `ELEVEN_VOICE_ID` override `elevenlabs.*`
    /// - `NEWS_API_KEY`, `YOUTUBE_API_KEY` override `intel.*`
    ///
    /// Empty variables are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let first = |keys: &[&str]| keys.iter().find_map(|k| var(*k));

        if let Some(host) = var("SCOUT_HOST") {
            if let Ok(parsed) = host.parse() {
                self.server.host = parsed;
            }
        }
        if let Some(port) = var("SCOUT_PORT") {
            if let Ok(parsed) = port.parse() {
                self.server.port = parsed;
            }
        }
        if let Some(role) = var("SCOUT_ROLE") {
            self.server.role = role.parse()?;
        }
        if let Some(level) = var("SCOUT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = var("SCOUT_LOG_JSON") {
            self.logging.json = json == "true" || json == "1";
        }

        if let Some(url) = var("BACKEND_BASE_URL") {
            self.tools.backend_base_url = url;
        }
        if let Some(token) = var("TOOL_TOKEN") {
            self.tools.token = Some(token);
        }

        if let Some(key) = var("OPENROUTER_API_KEY") {
            self.chat.api_key = Some(key);
        }
        if let Some(model) = var("OPENROUTER_MODEL") {
            self.chat.default_model = model;
        }

        if let Some(key) = first(&["ELEVEN_API_KEY", "ELEVENLABS_API_KEY"]) {
            self.elevenlabs.api_key = Some(key);
        }
        if let Some(agent) = first(&["ELEVEN_AGENT_ID", "AGENT_ID"]) {
            self.elevenlabs.agent_id = Some(agent);
        }
        if let Some(voice) = var("ELEVEN_VOICE_ID") {
            self.elevenlabs.voice_id = voice;
        }

        if let Some(key) = var("NEWS_API_KEY") {
            self.intel.news_api_key = Some(key);
        }
        if let Some(key) = var("YOUTUBE_API_KEY") {
            self.intel.youtube_api_key = Some(key);
        }

        Ok(())
    }

    /// Checks that every upstream base URL is an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_http_url("tools.backend_base_url", &self.tools.backend_base_url)?;
        check_http_url("chat.api_base_url", &self.chat.api_base_url)?;
        check_http_url("elevenlabs.api_base_url", &self.elevenlabs.api_base_url)?;
        check_http_url("intel.news_base_url", &self.intel.news_base_url)?;
        check_http_url("intel.youtube_base_url", &self.intel.youtube_base_url)?;
        check_http_url("intel.mlb_base_url", &self.intel.mlb_base_url)?;
        Ok(())
    }
}

/// Loads configuration from a TOML file, falling back to defaults, then
/// applies process environment overrides (see [`Config::apply_env_overrides`]).
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed, if
/// an override holds an invalid value, or if an upstream URL is malformed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_file() {
        let config = load_config(Some("/nonexistent/scout.toml")).unwrap();
        assert_eq!(config.server.port, 8888);
        assert_eq!(config.tools.backend_base_url, "http://127.0.0.1:8001");
        assert_eq!(config.chat.default_model, "openrouter/auto");
    }

    #[test]
    fn parses_file_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [server]
            port = 9000
            role = "backend"

            [logging]
            json = true

            [tools]
            backend_base_url = "http://tools.internal:8001/"
            token = "s3cret"

            [elevenlabs]
            agent_id = "agent-1"
            "#
        )
        .unwrap();

        let config: Config =
            toml::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.role, ServerRole::Backend);
        assert!(config.logging.json);
        assert_eq!(config.tools.token(), Some("s3cret"));
        assert_eq!(config.elevenlabs.agent_id.as_deref(), Some("agent-1"));
        assert!(!format!("{:?}", config.tools).contains("s3cret"));
    }

    #[test]
    fn env_overrides_use_fallback_names() {
        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[
                ("ELEVENLABS_API_KEY", "xi-key"),
                ("AGENT_ID", "agent-2"),
                ("TOOL_TOKEN", "tok"),
                ("SCOUT_PORT", "7001"),
                ("SCOUT_ROLE", "Gateway"),
                ("NEWS_API_KEY", ""),
            ]))
            .unwrap();

        assert_eq!(config.elevenlabs.api_key(), Some("xi-key"));
        assert_eq!(config.elevenlabs.agent_id.as_deref(), Some("agent-2"));
        assert_eq!(config.tools.token(), Some("tok"));
        assert_eq!(config.server.port, 7001);
        assert_eq!(config.server.role, ServerRole::Gateway);
        assert!(config.intel.news_api_key.is_none());
    }

    #[test]
    fn primary_env_names_win() {
        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[
                ("ELEVEN_API_KEY", "primary"),
                ("ELEVENLABS_API_KEY", "secondary"),
                ("ELEVEN_AGENT_ID", "agent-a"),
                ("AGENT_ID", "agent-b"),
            ]))
            .unwrap();
        assert_eq!(config.elevenlabs.api_key(), Some("primary"));
        assert_eq!(config.elevenlabs.agent_id.as_deref(), Some("agent-a"));
    }

    #[test]
    fn upstream_urls_are_validated() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config
            .apply_env_overrides(env(&[("BACKEND_BASE_URL", "127.0.0.1:8001")]))
            .unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "tools.backend_base_url", .. }
        ));

        config.tools.backend_base_url = "ftp://tools.internal".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_role_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides(env(&[("SCOUT_ROLE", "edge")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "server.role", .. }));
    }
}
