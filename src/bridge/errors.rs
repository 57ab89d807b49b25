use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Renderer I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed renderer message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No reply from renderer within {0:?}")]
    Timeout(Duration),

    #[error("Protocol violation: {0}")]
    Protocol(String),

    #[error("Frame {0} is still outstanding")]
    RequestOutstanding(u64),

    #[error("No frame request is outstanding")]
    NoRequest,

    #[error("Bridge is not connected")]
    NotConnected,

    #[error("Failed to decode sensor payload: {0}")]
    Decode(String),

    #[error("Renderer reported an error: {0}")]
    Remote(String),
}
