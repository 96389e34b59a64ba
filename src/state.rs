use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::upstream::{GeminiConnector, UpstreamConnector, UpstreamResult};

/// Shared application state
///
/// Read-only after startup. Every connection opens its own upstream session
/// through `connector`.
pub struct AppState {
    pub config: ServerConfig,
    pub connector: Arc<dyn UpstreamConnector>,
}

impl AppState {
    /// Build state with a Gemini Live connector from `config`.
    ///
    /// # Errors
    /// Returns `InvalidConfiguration` when the session settings are rejected.
    pub fn new(config: ServerConfig) -> UpstreamResult<Arc<Self>> {
        let connector = GeminiConnector::new(config.gemini_config())?;
        Ok(Self::with_connector(config, Arc::new(connector)))
    }

    /// Build state around an existing connector.
    pub fn with_connector(config: ServerConfig, connector: Arc<dyn UpstreamConnector>) -> Arc<Self> {
        Arc::new(Self { config, connector })
    }
}
