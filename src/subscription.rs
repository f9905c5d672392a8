//! Telemetry subscription client.
//!
//! Holds at most one joined exercise on a borrowed [`Connection`]. Joining a
//! different exercise always leaves the previous one first, so callers cannot
//! end up with two channels open.

use crate::error::TransportError;
use crate::exercise::ExerciseKind;
use crate::protocol::{ClientMessage, ServerFrame, TelemetryEvent};
use crate::transport::{Connection, Transport};

/// Receiver of normalized telemetry, one handler per event kind
pub trait TelemetrySink {
    fn on_update(&mut self, form_tips: Vec<String>);
    fn on_count(&mut self, count: u32);
    fn on_status(&mut self, status: String);

    fn dispatch(&mut self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::Update(form_tips) => self.on_update(form_tips),
            TelemetryEvent::Count(count) => self.on_count(count),
            TelemetryEvent::Status(status) => self.on_status(status),
        }
    }
}

/// What became of an inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Dispatched,
    NotSubscribed,
    ForeignExercise,
    Dropped,
}

pub struct SubscriptionClient<'c, T: Transport> {
    connection: &'c mut Connection<T>,
    joined: Option<ExerciseKind>,
}

impl<'c, T: Transport> SubscriptionClient<'c, T> {
    pub fn new(connection: &'c mut Connection<T>) -> Self {
        Self {
            connection,
            joined: None,
        }
    }

    pub fn joined(&self) -> Option<ExerciseKind> {
        self.joined
    }

    pub fn connection(&self) -> &Connection<T> {
        &*self.connection
    }

    pub fn subscribe(&mut self, exercise: ExerciseKind) -> Result<(), TransportError> {
        match self.joined {
            Some(current) if current == exercise => return Ok(()),
            Some(_) => self.unsubscribe(),
            None => {}
        }

        self.connection.init()?;
        self.connection.send(&ClientMessage::JoinExercise { exercise })?;
        self.joined = Some(exercise);
        tracing::info!(%exercise, "joined exercise channel");
        Ok(())
    }

    pub fn unsubscribe(&mut self) {
        let Some(exercise) = self.joined.take() else {
            return;
        };
        if !self.connection.is_connected() {
            return;
        }
        match self.connection.send(&ClientMessage::LeaveExercise) {
            Ok(()) => tracing::info!(%exercise, "left exercise channel"),
            Err(err) => tracing::warn!(%exercise, %err, "failed to leave exercise channel"),
        }
    }

    /// Forget the subscription after the peer dropped; nothing is resent
    pub fn on_disconnect(&mut self) {
        self.joined = None;
        self.connection.mark_lost();
    }

    pub fn deliver<S: TelemetrySink + ?Sized>(
        &self,
        frame: &ServerFrame,
        sink: &mut S,
    ) -> Delivery {
        let Some(joined) = self.joined else {
            tracing::debug!(event = %frame.event, "no subscription, dropping frame");
            return Delivery::NotSubscribed;
        };
        if frame.is_foreign_to(joined) {
            tracing::debug!(
                event = %frame.event,
                exercise = %frame.exercise,
                %joined,
                "dropping frame for another exercise"
            );
            return Delivery::ForeignExercise;
        }

        match TelemetryEvent::try_from(frame) {
            Ok(event) => {
                tracing::debug!(?event, "telemetry");
                sink.dispatch(event);
                Delivery::Dispatched
            }
            Err(err) => {
                tracing::debug!(%err, "dropping frame");
                Delivery::Dropped
            }
        }
    }
}
