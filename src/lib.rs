//! Terminal workout coach: timed sets and rest periods driven by a countdown,
//! with rep counts, status and form corrections streamed from a tracking
//! server.
//!
//! The tracking server is reached over TCP with one JSON object per line
//! (see [`protocol`]). A Socket.IO backend needs a bridge that relays its
//! `exercise-*` events as such lines and forwards `join-exercise` and
//! `leave-exercise` back.

pub mod app_dirs;
pub mod config;
pub mod error;
pub mod exercise;
pub mod protocol;
pub mod runtime;
pub mod schedule;
pub mod session;
pub mod subscription;
pub mod timer;
pub mod transport;
pub mod ui;

pub use error::{SessionError, TelemetryError, TransportError};
pub use exercise::ExerciseKind;
pub use session::{ExerciseSession, Phase, SessionConfig, SessionSnapshot};
