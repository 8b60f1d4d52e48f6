//! Error types for the order reconciler

use thiserror::Error;

/// Order reconciler errors
#[derive(Error, Debug)]
pub enum ReconcilerError {
    #[error("WebSocket connection error: {0}")]
    WebSocketConnection(String),

    #[error("WebSocket message error: {0}")]
    WebSocketMessage(String),

    #[error("Failed to parse message: {0}")]
    ParseError(String),

    #[error("IPC error: {0}")]
    IpcError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Report error: {0}")]
    ReportError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine channel closed")]
    ChannelClosed,

    #[error("Connection timeout")]
    ConnectionTimeout,

    #[error("Max reconnection attempts exceeded ({0})")]
    MaxReconnectAttemptsExceeded(u32),
}

impl From<tokio_tungstenite::tungstenite::Error> for ReconcilerError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        ReconcilerError::WebSocketConnection(err.to_string())
    }
}

impl From<serde_json::Error> for ReconcilerError {
    fn from(err: serde_json::Error) -> Self {
        ReconcilerError::ParseError(err.to_string())
    }
}

impl From<rmp_serde::encode::Error> for ReconcilerError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        ReconcilerError::SerializationError(err.to_string())
    }
}

impl From<config::ConfigError> for ReconcilerError {
    fn from(err: config::ConfigError) -> Self {
        ReconcilerError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReconcilerError>;
