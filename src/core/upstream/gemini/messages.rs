//! Gemini Live API WebSocket message types.
//!
//! All messages are JSON objects keyed by their kind. Only the subset the
//! relay needs is modelled here.
//!
//! Client messages (sent to server):
//! - `setup` - session configuration, must be the first frame
//! - `clientContent` - user turns
//!
//! Server messages (received from server):
//! - `setupComplete` - setup accepted, session ready
//! - `serverContent` - model turn parts and turn flags
//! - `toolCall` / `toolCallCancellation` - not used, ignored
//! - `goAway` - the server will close the connection soon
//! - `usageMetadata` - token accounting, ignored

use base64::prelude::*;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::config::{GeminiLiveConfig, ResponseModality};
use crate::core::upstream::base::{ResponseEvent, ResponsePart, UpstreamError, UpstreamResult};

// =============================================================================
// Client Messages
// =============================================================================

/// Messages sent to the Live API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientMessage {
    /// Session setup
    Setup(SetupConfig),
    /// User turn content
    ClientContent(ClientContent),
}

impl ClientMessage {
    /// Build the setup message for a session.
    pub fn setup(config: &GeminiLiveConfig) -> Self {
        ClientMessage::Setup(SetupConfig {
            model: config.model_resource(),
            generation_config: GenerationConfig {
                response_modalities: vec![ResponseModality::Audio],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: config.voice.clone(),
                        },
                    },
                    language_code: Some(config.language_code.clone())
                        .filter(|code| !code.is_empty()),
                },
            },
            system_instruction: Some(config.system_instruction.clone())
                .filter(|text| !text.is_empty())
                .map(|text| Content {
                    role: None,
                    parts: vec![Part::text(text)],
                }),
        })
    }

    /// Build a complete user turn carrying one text part.
    pub fn user_text(text: &str) -> Self {
        ClientMessage::ClientContent(ClientContent {
            turns: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(text)],
            }],
            turn_complete: true,
        })
    }
}

/// `setup` payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupConfig {
    pub model: String,
    pub generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<ResponseModality>,
    pub speech_config: SpeechConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

/// `clientContent` payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContent {
    pub turns: Vec<Content>,
    pub turn_complete: bool,
}

/// A conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// One part of a turn. Unknown part kinds deserialize with every field empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

/// Inline binary payload, base64 on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    #[serde(default)]
    pub mime_type: Option<String>,
    pub data: String,
}

// =============================================================================
// Server Messages
// =============================================================================

/// Messages received from the Live API.
///
/// The server sends one kind per frame, but every field is optional so a
/// frame of an unknown kind still parses and is skipped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMessage {
    #[serde(default)]
    pub setup_complete: Option<serde_json::Value>,
    #[serde(default)]
    pub server_content: Option<ServerContent>,
    #[serde(default)]
    pub go_away: Option<GoAway>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerContent {
    #[serde(default)]
    pub model_turn: Option<Content>,
    #[serde(default)]
    pub turn_complete: bool,
    #[serde(default)]
    pub interrupted: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoAway {
    #[serde(default)]
    pub time_left: Option<String>,
}

impl ServerMessage {
    /// Parse a raw server frame.
    pub fn parse(raw: &[u8]) -> UpstreamResult<Self> {
        serde_json::from_slice(raw)
            .map_err(|e| UpstreamError::Receive(format!("invalid server message: {e}")))
    }

    /// Convert into a [`ResponseEvent`], decoding inline audio.
    ///
    /// A part whose base64 payload is invalid fails the whole frame.
    pub fn into_event(self) -> UpstreamResult<ResponseEvent> {
        let mut event = ResponseEvent {
            go_away: self.go_away.is_some(),
            ..Default::default()
        };

        if let Some(content) = self.server_content {
            event.turn_complete = content.turn_complete;
            event.interrupted = content.interrupted;

            for part in content.model_turn.map(|turn| turn.parts).unwrap_or_default() {
                if let Some(blob) = part.inline_data {
                    let data = BASE64_STANDARD.decode(blob.data.as_bytes()).map_err(|e| {
                        UpstreamError::Receive(format!("invalid inline audio payload: {e}"))
                    })?;
                    event.parts.push(ResponsePart::InlineAudio(Bytes::from(data)));
                } else if let Some(text) = part.text {
                    event.parts.push(ResponsePart::Text(text));
                }
            }
        }

        Ok(event)
    }
}
