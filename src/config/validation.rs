//! Configuration validation
//!
//! Each check returns a human-readable message; callers surface it as a
//! startup error.

use url::Url;

pub(super) fn validate_api_key(api_key: &str) -> Result<(), String> {
    if api_key.trim().is_empty() {
        return Err(
            "Gemini API key is required: set GEMINI_API_KEY (or GOOGLE_API_KEY) or gemini.api_key"
                .to_string(),
        );
    }
    Ok(())
}

pub(super) fn validate_port(port: u16) -> Result<(), String> {
    if port == 0 {
        return Err("Port must be greater than 0".to_string());
    }
    Ok(())
}

pub(super) fn validate_upstream_url(upstream_url: &str) -> Result<(), String> {
    let url = Url::parse(upstream_url)
        .map_err(|e| format!("Invalid Gemini Live URL '{upstream_url}': {e}"))?;

    match url.scheme() {
        "ws" | "wss" => Ok(()),
        other => Err(format!(
            "Gemini Live URL must use ws:// or wss://, got '{other}://'"
        )),
    }
}

pub(super) fn validate_connect_timeout(seconds: u64) -> Result<(), String> {
    if seconds == 0 {
        return Err("Gemini connect timeout must be at least 1 second".to_string());
    }
    Ok(())
}

pub(super) fn validate_max_message_size(size: usize) -> Result<(), String> {
    if size == 0 {
        return Err("WebSocket max message size must be greater than 0".to_string());
    }
    Ok(())
}
