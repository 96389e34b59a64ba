//! Mock upstream sessions for relay tests
//!
//! - In-process: `mock_session` / `MockConnector` record every text turn and
//!   let the test script the response stream through a `MockHandle`
//! - Network: `gemini_server` speaks the Gemini Live wire protocol over a
//!   real WebSocket on a random local port

// Not every test binary uses every helper
#![allow(dead_code)]

pub mod gemini_server;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::mpsc;

use gemini_voice_relay::core::upstream::{
    ResponseEvent, UpstreamConnector, UpstreamError, UpstreamResult, UpstreamSender,
    UpstreamSession,
};

type EventTx = mpsc::UnboundedSender<UpstreamResult<ResponseEvent>>;

/// How long the wait helpers poll before failing the test
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Scripted sender behavior
#[derive(Debug, Clone, Default)]
pub struct MockBehavior {
    /// Texts whose `send_text` returns a Send error
    pub fail_texts: Vec<String>,
    /// Texts whose `send_text` panics
    pub panic_texts: Vec<String>,
    /// Audio emitted on the response stream after each accepted text
    pub reply_audio: Option<Vec<u8>>,
}

impl MockBehavior {
    pub fn replying(audio: &[u8]) -> Self {
        Self {
            reply_audio: Some(audio.to_vec()),
            ..Default::default()
        }
    }
}

/// Test-side view of one mock session
#[derive(Clone)]
pub struct MockHandle {
    texts: Arc<Mutex<Vec<String>>>,
    close_calls: Arc<AtomicUsize>,
    events: Arc<Mutex<Option<EventTx>>>,
}

impl MockHandle {
    /// Texts accepted by the sender, in order
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    /// Push an event; false once the stream has ended
    pub fn emit(&self, event: ResponseEvent) -> bool {
        self.push(Ok(event))
    }

    pub fn emit_audio(&self, data: &[u8]) -> bool {
        self.emit(ResponseEvent::audio(data.to_vec()))
    }

    pub fn emit_error(&self, error: UpstreamError) -> bool {
        self.push(Err(error))
    }

    /// End the response stream, as a backend closing its socket would
    pub fn end_stream(&self) {
        self.events.lock().unwrap().take();
    }

    /// Wait until at least `count` texts were accepted.
    pub async fn wait_for_texts(&self, count: usize) -> Vec<String> {
        let deadline = tokio::time::Instant::now() + WAIT_TIMEOUT;
        loop {
            let texts = self.texts();
            if texts.len() >= count {
                return texts;
            }
            if tokio::time::Instant::now() > deadline {
                panic!("expected {count} texts upstream, got {texts:?}");
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    fn push(&self, item: UpstreamResult<ResponseEvent>) -> bool {
        self.events
            .lock()
            .unwrap()
            .as_ref()
            .map(|tx| tx.unbounded_send(item).is_ok())
            .unwrap_or(false)
    }
}

/// Create a session whose response stream is driven by the returned handle.
pub fn mock_session(behavior: MockBehavior) -> (UpstreamSession, MockHandle) {
    let (tx, rx) = mpsc::unbounded();
    let handle = MockHandle {
        texts: Arc::new(Mutex::new(Vec::new())),
        close_calls: Arc::new(AtomicUsize::new(0)),
        events: Arc::new(Mutex::new(Some(tx))),
    };

    let sender = MockSender {
        behavior,
        handle: handle.clone(),
    };

    (UpstreamSession::new(Box::new(sender), Box::pin(rx)), handle)
}

struct MockSender {
    behavior: MockBehavior,
    handle: MockHandle,
}

#[async_trait]
impl UpstreamSender for MockSender {
    async fn send_text(&mut self, text: &str) -> UpstreamResult<()> {
        if self.behavior.panic_texts.iter().any(|t| t == text) {
            panic!("mock sender panicked on {text:?}");
        }
        if self.behavior.fail_texts.iter().any(|t| t == text) {
            return Err(UpstreamError::Send(format!("mock failure for {text:?}")));
        }

        self.handle.texts.lock().unwrap().push(text.to_string());

        if let Some(audio) = &self.behavior.reply_audio {
            self.handle.emit_audio(audio);
        }
        Ok(())
    }

    async fn close(&mut self) -> UpstreamResult<()> {
        self.handle.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Connector handing out mock sessions and keeping their handles
pub struct MockConnector {
    behavior: MockBehavior,
    fail_first: AtomicUsize,
    connects: AtomicUsize,
    sessions: Mutex<Vec<MockHandle>>,
}

impl MockConnector {
    pub fn new(behavior: MockBehavior) -> Self {
        Self::failing_first(behavior, 0)
    }

    /// Refuse the first `failures` connects with a Connect error.
    pub fn failing_first(behavior: MockBehavior, failures: usize) -> Self {
        Self {
            behavior,
            fail_first: AtomicUsize::new(failures),
            connects: AtomicUsize::new(0),
            sessions: Mutex::new(Vec::new()),
        }
    }

    /// Connect attempts, failed ones included
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Number of sessions opened successfully
    pub fn sessions(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// Wait for the `index`-th successful session.
    pub async fn wait_for_session(&self, index: usize) -> MockHandle {
        let deadline = tokio::time::Instant::now() + WAIT_TIMEOUT;
        loop {
            let opened = self.sessions.lock().unwrap().get(index).cloned();
            if let Some(handle) = opened {
                return handle;
            }
            if tokio::time::Instant::now() > deadline {
                panic!("session {index} was never opened");
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl UpstreamConnector for MockConnector {
    async fn connect(&self) -> UpstreamResult<UpstreamSession> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        let refuse = self
            .fail_first
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refuse {
            return Err(UpstreamError::Connect("mock connect refused".to_string()));
        }

        let (session, handle) = mock_session(self.behavior.clone());
        self.sessions.lock().unwrap().push(handle);
        Ok(session)
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
