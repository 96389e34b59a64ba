//! Base traits and types for upstream real-time audio sessions.
//!
//! An upstream session is an opaque bidirectional message stream to the
//! generative-audio backend. The relay only needs four things from it:
//! connect, send a user turn, read response events, close.
//!
//! The session is handed out as two halves so the two relay pumps can
//! each own one without sharing:
//! - [`UpstreamSender`] submits text turns and releases the backend socket
//! - [`ResponseStream`] yields [`ResponseEvent`]s in arrival order

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::fmt;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while talking to the upstream backend.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Session establishment failed (handshake rejected, socket error, timeout)
    #[error("Connection failed: {0}")]
    Connect(String),

    /// A user turn could not be submitted
    #[error("Send failed: {0}")]
    Send(String),

    /// A server frame could not be understood
    #[error("Receive failed: {0}")]
    Receive(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The session has already been closed
    #[error("Not connected")]
    NotConnected,
}

/// Result type for upstream operations.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

// =============================================================================
// Response Events
// =============================================================================

/// One part of a model turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    /// Binary audio fragment embedded in the response
    InlineAudio(Bytes),
    /// Text emitted by the model
    Text(String),
}

/// A response unit received from the backend.
///
/// Carries zero or more parts plus the turn-level flags the backend
/// attaches to the same frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseEvent {
    /// Parts of the model turn, in the order the backend sent them
    pub parts: Vec<ResponsePart>,
    /// The backend finished the current model turn
    pub turn_complete: bool,
    /// The model turn was interrupted
    pub interrupted: bool,
    /// The backend announced it will close the session soon
    pub go_away: bool,
}

impl ResponseEvent {
    /// Create an event carrying a single audio fragment.
    pub fn audio(data: impl Into<Bytes>) -> Self {
        Self {
            parts: vec![ResponsePart::InlineAudio(data.into())],
            ..Default::default()
        }
    }

    /// Iterate over the audio fragments of this event.
    pub fn audio_parts(&self) -> impl Iterator<Item = &Bytes> {
        self.parts.iter().filter_map(|part| match part {
            ResponsePart::InlineAudio(data) => Some(data),
            ResponsePart::Text(_) => None,
        })
    }

    /// Whether this event carries any audio.
    pub fn has_audio(&self) -> bool {
        self.audio_parts().next().is_some()
    }
}

/// Lazy sequence of response events, terminated when the session closes.
pub type ResponseStream = BoxStream<'static, UpstreamResult<ResponseEvent>>;

// =============================================================================
// Session Traits
// =============================================================================

/// Send half of an upstream session.
#[async_trait]
pub trait UpstreamSender: Send {
    /// Submit one user-turn text to the backend.
    ///
    /// Returns once the turn is enqueued for the session's writer.
    async fn send_text(&mut self, text: &str) -> UpstreamResult<()>;

    /// Release the backend session.
    ///
    /// Calling this more than once is a no-op.
    async fn close(&mut self) -> UpstreamResult<()>;
}

/// An established upstream session, split into its two halves.
pub struct UpstreamSession {
    /// Send half, owned by the client-to-upstream pump
    pub sender: Box<dyn UpstreamSender>,
    /// Response sequence, owned by the upstream-to-client pump
    pub events: ResponseStream,
}

impl UpstreamSession {
    pub fn new(sender: Box<dyn UpstreamSender>, events: ResponseStream) -> Self {
        Self { sender, events }
    }
}

impl fmt::Debug for UpstreamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamSession").finish_non_exhaustive()
    }
}

/// Opens upstream sessions with a fixed configuration.
///
/// One connector is built at startup and shared by every accepted client;
/// each call to [`connect`](UpstreamConnector::connect) yields a fresh
/// session that is never reused.
#[async_trait]
pub trait UpstreamConnector: Send + Sync {
    /// Open one session against the backend.
    async fn connect(&self) -> UpstreamResult<UpstreamSession>;

    /// Provider name used in logs.
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_parts_skip_text() {
        let event = ResponseEvent {
            parts: vec![
                ResponsePart::Text("hola".to_string()),
                ResponsePart::InlineAudio(Bytes::from_static(&[1, 2])),
                ResponsePart::InlineAudio(Bytes::from_static(&[3])),
            ],
            ..Default::default()
        };

        let parts: Vec<&Bytes> = event.audio_parts().collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].as_ref(), &[1, 2]);
        assert_eq!(parts[1].as_ref(), &[3]);
        assert!(event.has_audio());
    }

    #[test]
    fn test_event_without_audio() {
        let event = ResponseEvent {
            turn_complete: true,
            ..Default::default()
        };
        assert!(!event.has_audio());
        assert_eq!(event.audio_parts().count(), 0);
    }

    #[test]
    fn test_error_display() {
        let err = UpstreamError::Connect("handshake rejected".to_string());
        assert_eq!(err.to_string(), "Connection failed: handshake rejected");
        assert_eq!(UpstreamError::NotConnected.to_string(), "Not connected");
    }
}
