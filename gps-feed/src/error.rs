//! Error types for the GPS feed relay

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// GPS feed error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket protocol or transport error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// WebSocket upgrade did not complete
    #[error("WebSocket handshake failed: {0}")]
    Handshake(String),

    /// Configuration could not be read or written
    #[error("Configuration error: {0}")]
    Config(String),

    /// The line source reached end of stream
    #[error("Line source closed")]
    SourceClosed,

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}
