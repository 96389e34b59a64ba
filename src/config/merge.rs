//! Merge YAML values over environment values over defaults

use super::ServerConfig;
use super::env;
use super::yaml::YamlConfig;
use crate::core::upstream::gemini::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_VOICE,
    DEFAULT_LANGUAGE_CODE, DEFAULT_SYSTEM_INSTRUCTION, GEMINI_LIVE_URL,
};

/// Default bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port
pub const DEFAULT_PORT: u16 = 9084;

/// Default maximum WebSocket frame/message size (10 MB)
pub const DEFAULT_MAX_WS_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Build a [`ServerConfig`] from the environment, overridden by `yaml`.
///
/// # Errors
/// Returns an error if an environment variable has an invalid format.
pub(super) fn merge_config(
    yaml: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let yaml = yaml.unwrap_or_default();
    let server = yaml.server.unwrap_or_default();
    let gemini = yaml.gemini.unwrap_or_default();
    let websocket = yaml.websocket.unwrap_or_default();

    let host = server
        .host
        .or_else(|| env::var(env::HOST))
        .unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = match server.port {
        Some(port) => port,
        None => env::parse_var::<u16>(env::PORT)?.unwrap_or(DEFAULT_PORT),
    };

    let gemini_api_key = gemini
        .api_key
        .or_else(|| env::first_var(&[env::GEMINI_API_KEY, env::GOOGLE_API_KEY]))
        .unwrap_or_default();

    let model = gemini
        .model
        .or_else(|| env::var(env::GEMINI_MODEL))
        .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

    let voice = gemini
        .voice
        .or_else(|| env::var(env::GEMINI_VOICE))
        .unwrap_or_else(|| DEFAULT_GEMINI_VOICE.to_string());

    let language_code = gemini
        .language_code
        .or_else(|| env::var(env::GEMINI_LANGUAGE_CODE))
        .unwrap_or_else(|| DEFAULT_LANGUAGE_CODE.to_string());

    let system_instruction = gemini
        .system_instruction
        .or_else(|| env::var(env::GEMINI_SYSTEM_INSTRUCTION))
        .unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTION.to_string());

    let upstream_url = gemini
        .url
        .or_else(|| env::var(env::GEMINI_LIVE_URL))
        .unwrap_or_else(|| GEMINI_LIVE_URL.to_string());

    let connect_timeout_seconds = match gemini.connect_timeout_seconds {
        Some(secs) => secs,
        None => env::parse_var::<u64>(env::GEMINI_CONNECT_TIMEOUT_SECONDS)?
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
    };

    let max_ws_message_size = match websocket.max_message_size {
        Some(size) => size,
        None => env::parse_var::<usize>(env::MAX_WS_MESSAGE_SIZE)?
            .unwrap_or(DEFAULT_MAX_WS_MESSAGE_SIZE),
    };

    Ok(ServerConfig {
        host,
        port,
        gemini_api_key,
        model,
        voice,
        language_code,
        system_instruction,
        upstream_url,
        connect_timeout_seconds,
        max_ws_message_size,
    })
}
