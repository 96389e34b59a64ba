//! Environment variable readers
//!
//! Empty variables are treated as unset so a blank `.env` entry falls back
//! to the default instead of overriding it.

use std::env;
use std::str::FromStr;

pub(super) const HOST: &str = "HOST";
pub(super) const PORT: &str = "PORT";
pub(super) const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
/// Accepted when `GEMINI_API_KEY` is not set
pub(super) const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub(super) const GEMINI_MODEL: &str = "GEMINI_MODEL";
pub(super) const GEMINI_VOICE: &str = "GEMINI_VOICE";
pub(super) const GEMINI_LANGUAGE_CODE: &str = "GEMINI_LANGUAGE_CODE";
pub(super) const GEMINI_SYSTEM_INSTRUCTION: &str = "GEMINI_SYSTEM_INSTRUCTION";
pub(super) const GEMINI_LIVE_URL: &str = "GEMINI_LIVE_URL";
pub(super) const GEMINI_CONNECT_TIMEOUT_SECONDS: &str = "GEMINI_CONNECT_TIMEOUT_SECONDS";
pub(super) const MAX_WS_MESSAGE_SIZE: &str = "MAX_WS_MESSAGE_SIZE";

/// Read a variable, `None` when unset, empty or not unicode.
pub(super) fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Read the first of several variables that is set.
pub(super) fn first_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| var(name))
}

/// Read and parse a variable.
///
/// # Errors
/// Returns an error naming the variable when the value does not parse.
pub(super) fn parse_var<T>(name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("Invalid value for {name}: {e}")),
        None => Ok(None),
    }
}
