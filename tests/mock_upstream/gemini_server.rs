//! WebSocket mock of the Gemini Live `BidiGenerateContent` endpoint
//!
//! Speaks the subset of the protocol the relay uses: `setup` then
//! `setupComplete`, then one `serverContent` audio frame and one
//! `turnComplete` frame per `clientContent` turn. Server frames are sent as
//! binary, like the real service.

use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use base64::prelude::*;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};

/// How the mock answers the setup message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupMode {
    /// Reply `setupComplete`
    Complete,
    /// Close the socket with a policy violation
    Reject,
    /// Never answer
    Silent,
}

/// Mock Gemini server state
pub struct MockGeminiState {
    pub setup_mode: SetupMode,
    /// Audio returned for every turn
    pub reply_audio: Vec<u8>,
    /// Close the session after this many turns
    pub close_after_turns: Option<usize>,
    pub setups: Mutex<Vec<Value>>,
    pub texts: Mutex<Vec<String>>,
    pub api_keys: Mutex<Vec<Option<String>>>,
    pub connection_count: AtomicU64,
}

impl MockGeminiState {
    pub fn new(setup_mode: SetupMode, reply_audio: &[u8]) -> Self {
        Self {
            setup_mode,
            reply_audio: reply_audio.to_vec(),
            close_after_turns: None,
            setups: Mutex::new(Vec::new()),
            texts: Mutex::new(Vec::new()),
            api_keys: Mutex::new(Vec::new()),
            connection_count: AtomicU64::new(0),
        }
    }

    pub fn replying(reply_audio: &[u8]) -> Self {
        Self::new(SetupMode::Complete, reply_audio)
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    pub fn setups(&self) -> Vec<Value> {
        self.setups.lock().unwrap().clone()
    }

    pub fn api_keys(&self) -> Vec<Option<String>> {
        self.api_keys.lock().unwrap().clone()
    }

    pub fn connections(&self) -> u64 {
        self.connection_count.load(Ordering::SeqCst)
    }
}

/// Start the mock on a random local port.
///
/// Returns the `ws://` URL to configure the connector with.
pub async fn spawn_mock_gemini(state: Arc<MockGeminiState>) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let state = state.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, state).await {
                    eprintln!("Mock Gemini connection error: {}", e);
                }
            });
        }
    });

    (format!("ws://{addr}/live"), handle)
}

async fn handle_connection(
    stream: TcpStream,
    state: Arc<MockGeminiState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut api_key = None;
    let ws_stream = accept_hdr_async(
        stream,
        |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            api_key = request
                .headers()
                .get("x-goog-api-key")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            Ok(response)
        },
    )
    .await?;

    state.connection_count.fetch_add(1, Ordering::SeqCst);
    state.api_keys.lock().unwrap().push(api_key);

    let (mut write, mut read) = ws_stream.split();

    // The first frame must be setup
    let setup = match read.next().await {
        Some(Ok(Message::Text(text))) => serde_json::from_str::<Value>(&text)?,
        _ => return Ok(()),
    };
    let is_setup = setup.get("setup").is_some();
    state.setups.lock().unwrap().push(setup);

    match state.setup_mode {
        SetupMode::Complete if is_setup => {
            write.send(binary(json!({ "setupComplete": {} }))).await?;
        }
        SetupMode::Silent => {
            while let Some(Ok(_)) = read.next().await {}
            return Ok(());
        }
        _ => {
            write
                .send(Message::Close(Some(CloseFrame {
                    code: CloseCode::Policy,
                    reason: Utf8Bytes::from_static("setup rejected"),
                })))
                .await?;
            return Ok(());
        }
    }

    let mut turns = 0usize;
    while let Some(frame) = read.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let message: Value = match serde_json::from_str(&text) {
                    Ok(v) => v,
                    Err(_) => continue,
                };
                let Some(content) = message.get("clientContent") else {
                    continue;
                };

                let text = content["turns"][0]["parts"][0]["text"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                state.texts.lock().unwrap().push(text);
                turns += 1;

                let audio = json!({
                    "serverContent": {
                        "modelTurn": {
                            "parts": [{
                                "inlineData": {
                                    "mimeType": "audio/pcm;rate=24000",
                                    "data": BASE64_STANDARD.encode(&state.reply_audio)
                                }
                            }]
                        }
                    }
                });
                write.send(binary(audio)).await?;
                write
                    .send(binary(json!({ "serverContent": { "turnComplete": true } })))
                    .await?;

                if state.close_after_turns == Some(turns) {
                    write.send(Message::Close(None)).await?;
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(data)) => {
                write.send(Message::Pong(data)).await?;
            }
            Err(e) => {
                eprintln!("Mock Gemini WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    Ok(())
}

fn binary(value: Value) -> Message {
    Message::Binary(value.to_string().into_bytes().into())
}
