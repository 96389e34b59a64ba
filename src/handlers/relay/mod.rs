//! Text-in / audio-out relay WebSocket
//!
//! # Protocol
//!
//! ## Client → Server
//!
//! - `{"text": "..."}`: one user turn, forwarded upstream as a complete turn
//! - Anything else is ignored
//!
//! ## Server → Client
//!
//! - `{"audio": "<base64>"}`: one fragment of model audio, in upstream order
//!
//! There are no handshake, heartbeat or error messages. An upstream session
//! that cannot be opened closes the client socket.

mod duplex;
mod handler;
pub mod messages;

pub use duplex::{PumpReport, RelaySummary, run_relay};
pub use handler::relay_handler;
