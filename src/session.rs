//! Exercise session state machine.
//!
//! ```text
//! mount ──> Active(set=1) ──timer──> Rest ──timer──> Active(set=2) ──> …
//! ```
//!
//! The session composes a [`Timer`] and a [`SubscriptionClient`]. Timer
//! completion drives the phase; telemetry only touches rep count, status text
//! and form tips. Status text is last-writer-wins between the two.

use crate::error::SessionError;
use crate::exercise::ExerciseKind;
use crate::protocol::ServerFrame;
use crate::schedule::{TickId, TickScheduler};
use crate::subscription::{Delivery, SubscriptionClient, TelemetrySink};
use crate::timer::{TickOutcome, Timer, TimerState};
use crate::transport::{Connection, Transport};

pub const STATUS_READY: &str = "Ready to start";
pub const STATUS_REST: &str = "Rest Period";
pub const STATUS_NEXT_SET: &str = "Ready for next set";
pub const STATUS_DISCONNECTED: &str = "Disconnected from tracking server";
pub const STATUS_RECONNECTED: &str = "Reconnected to tracking server";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Active,
    Rest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub active_secs: u32,
    pub rest_secs: u32,
    pub auto_start_next_phase: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            active_secs: 180,
            rest_secs: 60,
            auto_start_next_phase: false,
        }
    }
}

impl SessionConfig {
    pub fn duration_of(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Active => self.active_secs,
            Phase::Rest => self.rest_secs,
        }
    }
}

/// Read-only projection handed to the view
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub exercise: ExerciseKind,
    pub current_set: u32,
    pub phase: Phase,
    pub rep_count: u32,
    pub status_text: String,
    pub form_tips: Vec<String>,
    pub timer: TimerState,
    pub connected: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct Progress {
    current_set: u32,
    phase: Phase,
    rep_count: u32,
    status_text: String,
    form_tips: Vec<String>,
}

impl Progress {
    fn new() -> Self {
        Self {
            current_set: 1,
            phase: Phase::Active,
            rep_count: 0,
            status_text: STATUS_READY.to_string(),
            form_tips: Vec::new(),
        }
    }
}

impl TelemetrySink for Progress {
    fn on_update(&mut self, form_tips: Vec<String>) {
        self.form_tips = form_tips;
    }

    fn on_count(&mut self, count: u32) {
        self.rep_count = count;
    }

    fn on_status(&mut self, status: String) {
        self.status_text = status;
    }
}

pub struct ExerciseSession<'c, T: Transport, S: TickScheduler> {
    exercise: ExerciseKind,
    config: SessionConfig,
    progress: Progress,
    timer: Timer,
    scheduler: S,
    client: SubscriptionClient<'c, T>,
    mounted: bool,
}

impl<'c, T: Transport, S: TickScheduler> ExerciseSession<'c, T, S> {
    /// Resolve `key`, join its telemetry channel and arm the active-phase
    /// timer without starting it.
    ///
    /// An unsupported key fails before anything is subscribed or scheduled.
    /// Connection failures do not fail the mount; they show up as status.
    pub fn mount(
        key: &str,
        config: SessionConfig,
        connection: &'c mut Connection<T>,
        scheduler: S,
    ) -> Result<Self, SessionError> {
        let exercise = ExerciseKind::from_key(key)?;

        let mut session = Self {
            exercise,
            config,
            progress: Progress::new(),
            timer: Timer::new(config.active_secs),
            scheduler,
            client: SubscriptionClient::new(connection),
            mounted: true,
        };

        if let Err(err) = session.client.subscribe(exercise) {
            tracing::warn!(%exercise, %err, "could not subscribe to telemetry");
            session.progress.status_text = STATUS_DISCONNECTED.to_string();
        }
        tracing::info!(
            %exercise,
            active_secs = config.active_secs,
            rest_secs = config.rest_secs,
            "session mounted"
        );

        Ok(session)
    }

    pub fn exercise(&self) -> ExerciseKind {
        self.exercise
    }

    pub fn phase(&self) -> Phase {
        self.progress.phase
    }

    pub fn current_set(&self) -> u32 {
        self.progress.current_set
    }

    pub fn timer(&self) -> TimerState {
        self.timer.state()
    }

    pub fn client(&self) -> &SubscriptionClient<'c, T> {
        &self.client
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            exercise: self.exercise,
            current_set: self.progress.current_set,
            phase: self.progress.phase,
            rep_count: self.progress.rep_count,
            status_text: self.progress.status_text.clone(),
            form_tips: self.progress.form_tips.clone(),
            timer: self.timer.state(),
            connected: self.client.joined().is_some(),
        }
    }

    pub fn start_timer(&mut self) -> Option<TickId> {
        let started = self.timer.start(&mut self.scheduler);
        if started.is_none() {
            tracing::debug!("timer exhausted, reset before starting");
        }
        started
    }

    pub fn pause_timer(&mut self) {
        self.timer.pause();
    }

    pub fn toggle_timer(&mut self) {
        if self.timer.is_running() {
            self.pause_timer();
        } else {
            self.start_timer();
        }
    }

    /// Rewind the countdown to the full length of the current phase
    pub fn reset_timer(&mut self) {
        self.timer.reset(self.config.duration_of(self.progress.phase));
    }

    pub fn on_tick(&mut self, id: TickId) -> TickOutcome {
        let outcome = self.timer.on_tick(id);
        if outcome == TickOutcome::Completed {
            self.advance_phase();
        }
        outcome
    }

    pub fn on_frame(&mut self, frame: &ServerFrame) -> Delivery {
        self.client.deliver(frame, &mut self.progress)
    }

    pub fn on_disconnect(&mut self, reason: &str) {
        tracing::warn!(exercise = %self.exercise, %reason, "telemetry disconnected");
        self.client.on_disconnect();
        self.progress.status_text = STATUS_DISCONNECTED.to_string();
    }

    /// Rejoin the exercise channel after a disconnect. Returns whether the
    /// session is subscribed afterwards.
    pub fn reconnect(&mut self) -> bool {
        if self.client.joined().is_some() {
            return true;
        }
        match self.client.subscribe(self.exercise) {
            Ok(()) => {
                self.progress.status_text = STATUS_RECONNECTED.to_string();
                true
            }
            Err(err) => {
                tracing::warn!(exercise = %self.exercise, %err, "reconnect failed");
                self.progress.status_text = STATUS_DISCONNECTED.to_string();
                false
            }
        }
    }

    /// Cancel the pending tick and leave the telemetry channel
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn advance_phase(&mut self) {
        let progress = &mut self.progress;
        match progress.phase {
            Phase::Active => {
                progress.phase = Phase::Rest;
                progress.status_text = STATUS_REST.to_string();
            }
            Phase::Rest => {
                progress.phase = Phase::Active;
                progress.current_set += 1;
                progress.status_text = STATUS_NEXT_SET.to_string();
            }
        }
        self.timer.reset(self.config.duration_of(progress.phase));
        tracing::info!(
            exercise = %self.exercise,
            phase = %progress.phase,
            set = progress.current_set,
            "phase changed"
        );

        if self.config.auto_start_next_phase {
            self.timer.start(&mut self.scheduler);
        }
    }

    fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.timer.pause();
        self.client.unsubscribe();
        tracing::info!(exercise = %self.exercise, "session unmounted");
    }
}

impl<T: Transport, S: TickScheduler> Drop for ExerciseSession<'_, T, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
