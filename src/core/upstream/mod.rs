//! Upstream real-time generative-audio sessions.
//!
//! # Architecture
//!
//! - `UpstreamConnector` opens one session per client connection
//! - `UpstreamSession` splits into an `UpstreamSender` and a `ResponseStream`
//! - `gemini` implements the contract over the Gemini Live WebSocket API

mod base;
pub mod gemini;

pub use base::{
    ResponseEvent, ResponsePart, ResponseStream, UpstreamConnector, UpstreamError,
    UpstreamResult, UpstreamSender, UpstreamSession,
};
pub use gemini::{GEMINI_LIVE_URL, GeminiConnector, GeminiLiveConfig, GeminiSender};
