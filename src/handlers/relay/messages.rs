//! Relay WebSocket message types
//!
//! The client protocol is two JSON shapes:
//! - client -> server: `{"text": "..."}`
//! - server -> client: `{"audio": "<base64>"}`
//!
//! Anything else a client sends is ignored.

use base64::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Incoming Messages (Client -> Server)
// =============================================================================

/// Decoded client message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// User text to forward upstream
    Text(String),
    /// Valid JSON without a string `text` field
    Ignored,
}

/// The client frame is not valid JSON
#[derive(Debug, Error)]
#[error("Invalid message format: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Decode a raw client frame.
///
/// Text and binary frames are both accepted; the payload must be JSON.
pub fn decode(raw: &[u8]) -> Result<InboundMessage, DecodeError> {
    let value: serde_json::Value = serde_json::from_slice(raw)?;

    match value.get("text") {
        Some(serde_json::Value::String(text)) => Ok(InboundMessage::Text(text.clone())),
        _ => Ok(InboundMessage::Ignored),
    }
}

// =============================================================================
// Outgoing Messages (Server -> Client)
// =============================================================================

/// Message sent to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutboundMessage {
    /// Base64-encoded audio fragment
    Audio(String),
}

/// Wrap an audio payload for the client.
pub fn encode(payload: &[u8]) -> OutboundMessage {
    OutboundMessage::Audio(BASE64_STANDARD.encode(payload))
}

impl OutboundMessage {
    /// Render as the JSON text frame sent to the client.
    pub fn to_json(&self) -> String {
        match self {
            OutboundMessage::Audio(data) => serde_json::json!({ "audio": data }).to_string(),
        }
    }

    /// Parse a server frame, as a client would.
    pub fn parse(raw: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Decode the carried audio back to bytes.
    pub fn audio_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        match self {
            OutboundMessage::Audio(data) => BASE64_STANDARD.decode(data),
        }
    }
}
