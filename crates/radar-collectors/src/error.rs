use radar_core::Platform;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{platform} returned unexpected status {status}")]
    UnexpectedStatus { platform: Platform, status: u16 },

    #[error("{platform} authentication failed: {message}")]
    Auth { platform: Platform, message: String },
}
