pub mod upstream;

// Re-export commonly used types for convenience
pub use upstream::{
    GeminiConnector, GeminiLiveConfig, ResponseEvent, ResponsePart, ResponseStream,
    UpstreamConnector, UpstreamError, UpstreamResult, UpstreamSender, UpstreamSession,
};
