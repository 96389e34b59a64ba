use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present
/// in the file override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 9084
///
/// gemini:
///   api_key: "your-gemini-key"
///   model: "models/gemini-2.5-flash-preview-native-audio-dialog"
///   voice: "Aoede"
///   language_code: "en-US"
///   system_instruction: "You are a helpful assistant that speaks Spanish."
///   url: "wss://generativelanguage.googleapis.com/ws/..."
///   connect_timeout_seconds: 10
///
/// websocket:
///   max_message_size: 10485760
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub gemini: Option<GeminiYaml>,
    pub websocket: Option<WebSocketYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Gemini Live session settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeminiYaml {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub voice: Option<String>,
    /// BCP-47 code for the spoken output (e.g., "en-US", "es-ES")
    pub language_code: Option<String>,
    pub system_instruction: Option<String>,
    /// Live API endpoint; point it at a local mock for testing
    pub url: Option<String>,
    pub connect_timeout_seconds: Option<u64>,
}

/// Client WebSocket limits from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct WebSocketYaml {
    /// Maximum frame and message size in bytes
    pub max_message_size: Option<usize>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Fields have invalid types
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}
