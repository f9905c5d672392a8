//! Wire format spoken with the tracking server.
//!
//! Messages travel as one JSON object per line. The client sends
//! [`ClientMessage`]s; the server pushes [`ServerFrame`]s which are narrowed
//! into [`TelemetryEvent`]s before anything in the session sees them.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::error::TelemetryError;
use crate::exercise::ExerciseKind;

pub const EVENT_UPDATE: &str = "exercise-update";
pub const EVENT_COUNT: &str = "exercise-count";
pub const EVENT_STATUS: &str = "exercise-status";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinExercise {
        #[serde(rename = "type")]
        exercise: ExerciseKind,
    },
    LeaveExercise,
}

/// Raw event frame as pushed by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerFrame {
    pub event: String,
    /// Key of the exercise the event belongs to. Required: the connection is
    /// shared across sessions, so an untagged frame cannot be attributed.
    #[serde(rename = "type")]
    pub exercise: String,
    #[serde(default)]
    pub data: Value,
}

impl ServerFrame {
    pub fn new(event: impl Into<String>, exercise: ExerciseKind, data: Value) -> Self {
        Self {
            event: event.into(),
            exercise: exercise.key().to_string(),
            data,
        }
    }

    /// True when the frame is tagged for an exercise other than `joined`
    pub fn is_foreign_to(&self, joined: ExerciseKind) -> bool {
        self.exercise != joined.key()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryEvent {
    Update(Vec<String>),
    Count(u32),
    Status(String),
}

#[derive(Deserialize)]
struct UpdatePayload {
    #[serde(rename = "formTips")]
    form_tips: Vec<String>,
}

#[derive(Deserialize)]
struct CountPayload {
    count: u32,
}

#[derive(Deserialize)]
struct StatusPayload {
    status: String,
}

fn payload<T: DeserializeOwned>(frame: &ServerFrame) -> Result<T, TelemetryError> {
    T::deserialize(&frame.data).map_err(|source| TelemetryError::Malformed {
        event: frame.event.clone(),
        source,
    })
}

impl TryFrom<&ServerFrame> for TelemetryEvent {
    type Error = TelemetryError;

    fn try_from(frame: &ServerFrame) -> Result<Self, Self::Error> {
        match frame.event.as_str() {
            EVENT_UPDATE => payload::<UpdatePayload>(frame).map(|p| Self::Update(p.form_tips)),
            EVENT_COUNT => payload::<CountPayload>(frame).map(|p| Self::Count(p.count)),
            EVENT_STATUS => payload::<StatusPayload>(frame).map(|p| Self::Status(p.status)),
            other => Err(TelemetryError::UnknownEvent(other.to_string())),
        }
    }
}
