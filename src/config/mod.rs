//! Configuration module for the relay server
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use gemini_voice_relay::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use zeroize::Zeroizing;

use crate::core::upstream::GeminiLiveConfig;

mod env;
mod merge;
mod validation;
mod yaml;

pub use merge::{DEFAULT_HOST, DEFAULT_MAX_WS_MESSAGE_SIZE, DEFAULT_PORT};

/// Server configuration
///
/// Contains all configuration needed to run the relay, including:
/// - Server settings (host, port)
/// - Gemini Live session settings (key, model, voice, language, instruction)
/// - Client WebSocket limits
#[derive(Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // Gemini Live settings
    /// API key, read once at startup and handed to the connector
    pub gemini_api_key: String,
    pub model: String,
    pub voice: String,
    pub language_code: String,
    pub system_instruction: String,
    /// Live API WebSocket endpoint
    pub upstream_url: String,
    /// Time allowed for the upstream setup handshake
    /// Default: 10
    pub connect_timeout_seconds: u64,

    // Client WebSocket limits
    /// Maximum frame and message size accepted from clients
    /// Default: 10 MB
    pub max_ws_message_size: usize,
}

/// Implement Drop to zeroize the API key when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        self.gemini_api_key.zeroize();
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("gemini_api_key", &"<redacted>")
            .field("model", &self.model)
            .field("voice", &self.voice)
            .field("language_code", &self.language_code)
            .field("upstream_url", &self.upstream_url)
            .field("connect_timeout_seconds", &self.connect_timeout_seconds)
            .field("max_ws_message_size", &self.max_ws_message_size)
            .finish_non_exhaustive()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// The .env file is loaded in main.rs, so its values are already part of
    /// the environment here. Missing values fall back to defaults.
    ///
    /// # Errors
    /// Returns an error if a variable has an invalid format or validation fails.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge::merge_config(None)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the merged configuration.
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        validation::validate_api_key(&self.gemini_api_key)?;
        validation::validate_port(self.port)?;
        validation::validate_upstream_url(&self.upstream_url)?;
        validation::validate_connect_timeout(self.connect_timeout_seconds)?;
        validation::validate_max_message_size(self.max_ws_message_size)?;
        Ok(())
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Session configuration for the Gemini connector.
    pub fn gemini_config(&self) -> GeminiLiveConfig {
        GeminiLiveConfig {
            api_key: Zeroizing::new(self.gemini_api_key.clone()),
            model: self.model.clone(),
            voice: self.voice.clone(),
            language_code: self.language_code.clone(),
            system_instruction: self.system_instruction.clone(),
            url: self.upstream_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_seconds),
        }
    }
}
