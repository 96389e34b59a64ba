//! Gemini Live API configuration types.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;
use zeroize::Zeroizing;

use crate::core::upstream::base::{UpstreamError, UpstreamResult};

/// Gemini Live `BidiGenerateContent` WebSocket endpoint.
pub const GEMINI_LIVE_URL: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

/// Default native-audio dialog model.
pub const DEFAULT_GEMINI_MODEL: &str = "models/gemini-2.5-flash-preview-native-audio-dialog";

/// Default prebuilt voice.
pub const DEFAULT_GEMINI_VOICE: &str = "Aoede";

/// Default spoken output language.
pub const DEFAULT_LANGUAGE_CODE: &str = "en-US";

/// Default system instruction.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a helpful assistant that speaks Spanish. Always answer using natural Spanish, even if the user asks in English.";

/// Default time allowed for the setup handshake.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Prebuilt voices known to the Live API.
pub const GEMINI_PREBUILT_VOICES: &[&str] = &[
    "Puck", "Charon", "Kore", "Fenrir", "Aoede", "Leda", "Orus", "Zephyr",
];

/// Response modality requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseModality {
    #[default]
    Audio,
}

/// Fixed configuration for every session opened by [`GeminiConnector`].
///
/// [`GeminiConnector`]: super::GeminiConnector
#[derive(Clone)]
pub struct GeminiLiveConfig {
    /// API key sent in the `x-goog-api-key` header, wiped on drop
    pub api_key: Zeroizing<String>,
    /// Model resource name, e.g. `models/gemini-2.5-flash-preview-native-audio-dialog`
    pub model: String,
    /// Prebuilt voice name
    pub voice: String,
    /// BCP-47 language code for spoken output
    pub language_code: String,
    /// System instruction sent with the setup message
    pub system_instruction: String,
    /// WebSocket endpoint
    pub url: String,
    /// Time allowed between socket open and `setupComplete`
    pub connect_timeout: Duration,
}

impl Default for GeminiLiveConfig {
    fn default() -> Self {
        Self {
            api_key: Zeroizing::new(String::new()),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            voice: DEFAULT_GEMINI_VOICE.to_string(),
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            url: GEMINI_LIVE_URL.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl std::fmt::Debug for GeminiLiveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiLiveConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("voice", &self.voice)
            .field("language_code", &self.language_code)
            .field("url", &self.url)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

impl GeminiLiveConfig {
    /// Check the configuration and return the parsed endpoint.
    pub fn validate(&self) -> UpstreamResult<Url> {
        if self.api_key.is_empty() {
            return Err(UpstreamError::InvalidConfiguration(
                "API key is required".to_string(),
            ));
        }
        if self.model.is_empty() {
            return Err(UpstreamError::InvalidConfiguration(
                "model is required".to_string(),
            ));
        }

        let url = Url::parse(&self.url).map_err(|e| {
            UpstreamError::InvalidConfiguration(format!("invalid upstream url {}: {e}", self.url))
        })?;
        match url.scheme() {
            "ws" | "wss" => {}
            other => {
                return Err(UpstreamError::InvalidConfiguration(format!(
                    "upstream url must use ws or wss, got {other}"
                )));
            }
        }

        if !GEMINI_PREBUILT_VOICES
            .iter()
            .any(|v| v.eq_ignore_ascii_case(&self.voice))
        {
            tracing::warn!(voice = %self.voice, "Voice is not a known prebuilt Gemini voice");
        }

        Ok(url)
    }

    /// Model name with the `models/` prefix the setup message expects.
    pub fn model_resource(&self) -> String {
        if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        }
    }
}
