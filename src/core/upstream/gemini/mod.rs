//! Gemini Live API module.
//!
//! Real-time audio dialog over Google's `BidiGenerateContent` WebSocket.
//!
//! # Features
//!
//! - Session setup with fixed voice, language and system instruction
//! - Text user turns
//! - Streaming audio responses (`inlineData` parts)
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_voice_relay::core::upstream::{GeminiConnector, GeminiLiveConfig, UpstreamConnector};
//!
//! let connector = GeminiConnector::new(GeminiLiveConfig {
//!     api_key: zeroize::Zeroizing::new("...".to_string()),
//!     ..Default::default()
//! })?;
//!
//! let mut session = connector.connect().await?;
//! session.sender.send_text("hola").await?;
//! while let Some(event) = session.events.next().await {
//!     // play event?.audio_parts()
//! }
//! session.sender.close().await?;
//! ```

mod client;
mod config;
mod messages;

pub use client::{GeminiConnector, GeminiSender};
pub use config::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_VOICE,
    DEFAULT_LANGUAGE_CODE, DEFAULT_SYSTEM_INSTRUCTION, GEMINI_LIVE_URL, GEMINI_PREBUILT_VOICES,
    GeminiLiveConfig, ResponseModality,
};
pub use messages::{ClientMessage, ServerMessage};
