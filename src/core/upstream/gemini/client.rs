//! Gemini Live API client implementation.
//!
//! # API Reference
//!
//! - Endpoint: `wss://generativelanguage.googleapis.com/ws/...BidiGenerateContent`
//! - Auth: `x-goog-api-key` header
//! - Protocol: WebSocket with JSON messages (the server sends them as binary frames)
//! - Audio: raw PCM, base64 encoded inside `inlineData`
//!
//! Each [`GeminiConnector::connect`] call opens one socket, performs the
//! setup handshake and then splits the socket: a writer task drains the
//! [`GeminiSender`] channel into the sink, and the read half becomes the
//! session's response stream.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use http::HeaderValue;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use super::config::GeminiLiveConfig;
use super::messages::{ClientMessage, ServerMessage};
use crate::core::upstream::base::{
    ResponseStream, UpstreamConnector, UpstreamError, UpstreamResult, UpstreamSender,
    UpstreamSession,
};

/// Channel capacity for queued client messages.
const WS_CHANNEL_CAPACITY: usize = 256;

/// Time allowed for the writer to flush the close frame.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// =============================================================================
// Connector
// =============================================================================

/// Opens Gemini Live sessions with a fixed configuration.
pub struct GeminiConnector {
    config: GeminiLiveConfig,
    url: Url,
}

impl GeminiConnector {
    /// Create a connector, validating the configuration up front.
    pub fn new(config: GeminiLiveConfig) -> UpstreamResult<Self> {
        let url = config.validate()?;
        Ok(Self { config, url })
    }

    /// Build the upgrade request with the API key header.
    fn build_request(&self) -> UpstreamResult<Request> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| UpstreamError::Connect(e.to_string()))?;

        let api_key = HeaderValue::from_str(&self.config.api_key).map_err(|_| {
            UpstreamError::InvalidConfiguration("API key is not a valid header value".to_string())
        })?;
        request.headers_mut().insert(API_KEY_HEADER, api_key);

        Ok(request)
    }

    /// Open the socket, send `setup` and wait for `setupComplete`.
    async fn handshake(&self) -> UpstreamResult<WsStream> {
        let request = self.build_request()?;
        let (mut ws, _response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| UpstreamError::Connect(e.to_string()))?;

        let setup = serde_json::to_string(&ClientMessage::setup(&self.config))
            .map_err(|e| UpstreamError::Connect(format!("failed to serialize setup: {e}")))?;
        ws.send(Message::Text(setup.into()))
            .await
            .map_err(|e| UpstreamError::Connect(format!("failed to send setup: {e}")))?;

        loop {
            let raw = match ws.next().await {
                Some(Ok(Message::Text(text))) => text.as_bytes().to_vec(),
                Some(Ok(Message::Binary(data))) => data.to_vec(),
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| format!("{} {}", u16::from(f.code), f.reason.as_str()))
                        .unwrap_or_else(|| "no close frame".to_string());
                    return Err(UpstreamError::Connect(format!(
                        "server closed the connection during setup: {reason}"
                    )));
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(UpstreamError::Connect(e.to_string())),
                None => {
                    return Err(UpstreamError::Connect(
                        "connection ended before setup completed".to_string(),
                    ));
                }
            };

            match ServerMessage::parse(&raw) {
                Ok(message) if message.setup_complete.is_some() => return Ok(ws),
                Ok(_) => tracing::debug!("Ignoring server message received before setupComplete"),
                Err(e) => tracing::warn!("Unparseable frame during setup: {}", e),
            }
        }
    }
}

#[async_trait]
impl UpstreamConnector for GeminiConnector {
    async fn connect(&self) -> UpstreamResult<UpstreamSession> {
        let ws = tokio::time::timeout(self.config.connect_timeout, self.handshake())
            .await
            .map_err(|_| {
                UpstreamError::Connect(format!(
                    "setup not completed within {}s",
                    self.config.connect_timeout.as_secs()
                ))
            })??;

        tracing::info!(model = %self.config.model, "Connected to Gemini Live API");

        let (sink, stream) = ws.split();
        let (tx, rx) = mpsc::channel::<ClientMessage>(WS_CHANNEL_CAPACITY);
        let writer = tokio::spawn(run_writer(sink, rx));

        let sender = GeminiSender {
            tx: Some(tx),
            writer: Some(writer),
        };

        Ok(UpstreamSession::new(Box::new(sender), response_stream(stream)))
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

/// Drain queued messages into the socket, then close it.
///
/// Ends when every [`GeminiSender`] handle is gone or the socket fails.
async fn run_writer(
    mut sink: futures_util::stream::SplitSink<WsStream, Message>,
    mut rx: mpsc::Receiver<ClientMessage>,
) {
    while let Some(message) = rx.recv().await {
        let json = match serde_json::to_string(&message) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!("Failed to serialize client message: {}", e);
                continue;
            }
        };

        if let Err(e) = sink.send(Message::Text(json.into())).await {
            tracing::error!("Failed to send Gemini Live message: {}", e);
            break;
        }
    }

    if let Err(e) = sink.close().await {
        tracing::debug!("Gemini Live socket already closed: {}", e);
    }
    tracing::debug!("Gemini Live writer task ended");
}

/// Map the read half of the socket into response events.
fn response_stream(mut stream: futures_util::stream::SplitStream<WsStream>) -> ResponseStream {
    Box::pin(async_stream::stream! {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    yield ServerMessage::parse(text.as_bytes()).and_then(ServerMessage::into_event);
                }
                Ok(Message::Binary(data)) => {
                    yield ServerMessage::parse(&data).and_then(ServerMessage::into_event);
                }
                Ok(Message::Close(frame)) => {
                    match frame {
                        Some(f) => tracing::info!(
                            code = u16::from(f.code),
                            reason = f.reason.as_str(),
                            "Gemini Live closed the session"
                        ),
                        None => tracing::info!("Gemini Live closed the session"),
                    }
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Gemini Live socket error: {}", e);
                    break;
                }
            }
        }
    })
}

// =============================================================================
// Sender
// =============================================================================

/// Send half of a Gemini Live session.
///
/// Dropping it without [`close`](UpstreamSender::close) still closes the
/// socket once the writer task drains its queue.
pub struct GeminiSender {
    tx: Option<mpsc::Sender<ClientMessage>>,
    writer: Option<JoinHandle<()>>,
}

#[async_trait]
impl UpstreamSender for GeminiSender {
    async fn send_text(&mut self, text: &str) -> UpstreamResult<()> {
        let Some(tx) = self.tx.as_ref() else {
            return Err(UpstreamError::NotConnected);
        };

        tx.send(ClientMessage::user_text(text))
            .await
            .map_err(|_| UpstreamError::Send("session writer has stopped".to_string()))
    }

    async fn close(&mut self) -> UpstreamResult<()> {
        // Dropping the channel lets the writer flush and send the close frame
        self.tx.take();

        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };

        match tokio::time::timeout(CLOSE_TIMEOUT, &mut writer).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Gemini Live writer task failed: {}", e),
            Err(_) => {
                tracing::warn!("Gemini Live close did not finish in time, aborting writer");
                writer.abort();
            }
        }

        tracing::info!("Disconnected from Gemini Live API");
        Ok(())
    }
}
