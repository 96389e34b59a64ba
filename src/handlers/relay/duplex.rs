//! Duplex relay between one client connection and one upstream session
//!
//! Two pumps run as separate tasks for the lifetime of the connection:
//! - client -> upstream: decode each client frame, forward `text` turns
//! - upstream -> client: encode each inline audio part as `{"audio": ...}`
//!
//! A failed message never stops its pump; only the end of the pump's input
//! does. The relay finishes when both pumps have finished, and only then
//! releases the upstream session and the client sink.
//!
//! There is no idle timeout: a backend that never closes keeps the
//! upstream pump (and so the relay) alive after the client has gone.

use std::fmt::Display;
use std::panic::AssertUnwindSafe;

use axum::extract::ws::Message;
use futures::{FutureExt, Sink, SinkExt, Stream, StreamExt};
use tracing::{debug, error, info, warn};

use super::messages::{InboundMessage, decode, encode};
use crate::core::upstream::{ResponseStream, UpstreamSender, UpstreamSession};

/// Counters for one direction of a relay
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PumpReport {
    /// Messages delivered to the other side
    pub forwarded: u64,
    /// Well-formed input with nothing to forward
    pub ignored: u64,
    /// Messages dropped because of an error
    pub failed: u64,
}

/// Outcome of a finished relay
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelaySummary {
    pub client_to_upstream: PumpReport,
    pub upstream_to_client: PumpReport,
}

/// Run both pumps until each has finished, then release the session.
///
/// # Arguments
/// * `client_rx` - Inbound half of the client WebSocket
/// * `client_tx` - Outbound half of the client WebSocket
/// * `session` - Upstream session owned by this relay
pub async fn run_relay<S, E, K>(client_rx: S, client_tx: K, session: UpstreamSession) -> RelaySummary
where
    S: Stream<Item = Result<Message, E>> + Send + Unpin + 'static,
    E: Display + Send + 'static,
    K: Sink<Message> + Send + Unpin + 'static,
    K::Error: Display + Send,
{
    let UpstreamSession { sender, events } = session;

    let client_pump = tokio::spawn(pump_client_to_upstream(client_rx, sender));
    let upstream_pump = tokio::spawn(pump_upstream_to_client(events, client_tx));

    let (client_result, upstream_result) = tokio::join!(client_pump, upstream_pump);

    let mut summary = RelaySummary::default();

    match client_result {
        Ok((mut sender, report)) => {
            summary.client_to_upstream = report;
            if let Err(e) = sender.close().await {
                warn!("Failed to close upstream session: {}", e);
            }
        }
        Err(e) => error!("Client-to-upstream pump aborted: {}", e),
    }

    match upstream_result {
        Ok((mut client_tx, report)) => {
            summary.upstream_to_client = report;
            if let Err(e) = client_tx.close().await {
                debug!("Client connection already closed: {}", e);
            }
        }
        Err(e) => error!("Upstream-to-client pump aborted: {}", e),
    }

    info!(
        texts_forwarded = summary.client_to_upstream.forwarded,
        client_messages_failed = summary.client_to_upstream.failed,
        audio_forwarded = summary.upstream_to_client.forwarded,
        upstream_events_failed = summary.upstream_to_client.failed,
        "Relay finished"
    );

    summary
}

/// Forward client text messages to the upstream sender.
///
/// The sender is handed back even if forwarding panics, so the session is
/// only released by the relay after both pumps have finished.
async fn pump_client_to_upstream<S, E>(
    client_rx: S,
    mut sender: Box<dyn UpstreamSender>,
) -> (Box<dyn UpstreamSender>, PumpReport)
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let mut report = PumpReport::default();

    let forwarding = forward_client_messages(client_rx, sender.as_mut(), &mut report);
    if AssertUnwindSafe(forwarding).catch_unwind().await.is_err() {
        report.failed += 1;
        error!("Client-to-upstream pump panicked, no more client messages are read");
    }

    debug!("Client-to-upstream pump finished");
    (sender, report)
}

async fn forward_client_messages<S, E>(
    mut client_rx: S,
    sender: &mut dyn UpstreamSender,
    report: &mut PumpReport,
) where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    while let Some(frame) = client_rx.next().await {
        let message = match frame {
            Ok(Message::Text(text)) => decode(text.as_str().as_bytes()),
            Ok(Message::Binary(data)) => decode(&data),
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Ok(Message::Close(_)) => {
                info!("Client sent close frame");
                break;
            }
            Err(e) => {
                info!("Client connection ended: {}", e);
                break;
            }
        };

        match message {
            Ok(InboundMessage::Text(text)) => match sender.send_text(&text).await {
                Ok(()) => {
                    report.forwarded += 1;
                    debug!(bytes = text.len(), "Forwarded text upstream");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!("Failed to send text upstream: {}", e);
                }
            },
            Ok(InboundMessage::Ignored) => {
                report.ignored += 1;
                debug!("Ignoring client message without text");
            }
            Err(e) => {
                report.failed += 1;
                warn!("Dropping malformed client message: {}", e);
            }
        }
    }
}

/// Forward upstream audio parts to the client.
///
/// Like the client pump, the sink survives a panic so the relay can close it.
async fn pump_upstream_to_client<K>(events: ResponseStream, mut client_tx: K) -> (K, PumpReport)
where
    K: Sink<Message> + Unpin,
    K::Error: Display,
{
    let mut report = PumpReport::default();

    let forwarding = forward_upstream_events(events, &mut client_tx, &mut report);
    if AssertUnwindSafe(forwarding).catch_unwind().await.is_err() {
        report.failed += 1;
        error!("Upstream-to-client pump panicked, no more upstream events are read");
    }

    debug!("Upstream-to-client pump finished");
    (client_tx, report)
}

async fn forward_upstream_events<K>(
    mut events: ResponseStream,
    client_tx: &mut K,
    report: &mut PumpReport,
) where
    K: Sink<Message> + Unpin,
    K::Error: Display,
{
    while let Some(event) = events.next().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                report.failed += 1;
                warn!("Failed to read upstream event: {}", e);
                continue;
            }
        };

        if event.go_away {
            warn!("Upstream announced it will close the session");
        }
        if event.interrupted {
            debug!("Upstream turn interrupted");
        }
        if event.turn_complete {
            debug!("Upstream turn complete");
        }

        if !event.has_audio() {
            report.ignored += 1;
            continue;
        }

        for audio in event.audio_parts() {
            let frame = Message::Text(encode(audio).to_json().into());
            match client_tx.send(frame).await {
                Ok(()) => report.forwarded += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!("Failed to send audio to client: {}", e);
                }
            }
        }
    }
}
