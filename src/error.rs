use std::io;

use thiserror::Error;

/// Failures that keep a session from being constructed at all.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Exercise not found: {0}")]
    UnsupportedExercise(String),
}

/// Failures of the connection to the tracking server.
///
/// These never end a session; the session turns them into status text.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("not connected to the tracking server")]
    NotConnected,

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to send message: {0}")]
    Send(#[from] io::Error),
}

/// Reasons an inbound frame could not be narrowed into a telemetry event.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("unknown event kind `{0}`")]
    UnknownEvent(String),

    #[error("malformed `{event}` payload: {source}")]
    Malformed {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}
