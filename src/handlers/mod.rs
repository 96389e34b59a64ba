//! HTTP and WebSocket request handlers
//!
//! - `api` - Health check endpoint
//! - `relay` - Browser WebSocket relayed to the Gemini Live API

pub mod api;
pub mod relay;

pub use relay::relay_handler;
