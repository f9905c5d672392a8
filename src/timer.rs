use crate::schedule::{TickHandle, TickId, TickScheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub remaining_secs: u32,
    pub total_secs: u32,
    pub running: bool,
}

impl TimerState {
    /// Fraction of the countdown still left, 1.0 when freshly reset
    pub fn progress(&self) -> f64 {
        self.remaining_secs as f64 / self.total_secs as f64
    }

    pub fn clock(&self) -> String {
        format_clock(self.remaining_secs)
    }
}

/// What a tick did to the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick came from a cancelled or superseded source
    Ignored,
    Ticked { remaining_secs: u32 },
    Completed,
}

/// Whole-second countdown driven by ticks from a [`TickScheduler`]
#[derive(Debug)]
pub struct Timer {
    total_secs: u32,
    remaining_secs: u32,
    ticker: Option<TickHandle>,
}

impl Timer {
    pub fn new(total_secs: u32) -> Self {
        let total_secs = total_secs.max(1);
        Self {
            total_secs,
            remaining_secs: total_secs,
            ticker: None,
        }
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
            running: self.is_running(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Start ticking. Returns the id of the live tick source, or `None` when
    /// the countdown is exhausted and needs a reset first.
    pub fn start(&mut self, scheduler: &mut dyn TickScheduler) -> Option<TickId> {
        if self.remaining_secs == 0 {
            return None;
        }
        if let Some(ticker) = &self.ticker {
            return Some(ticker.id());
        }

        let ticker = scheduler.schedule();
        let id = ticker.id();
        self.ticker = Some(ticker);
        Some(id)
    }

    pub fn pause(&mut self) {
        // dropping the handle cancels the source
        self.ticker = None;
    }

    pub fn reset(&mut self, total_secs: u32) {
        self.pause();
        self.total_secs = total_secs.max(1);
        self.remaining_secs = self.total_secs;
    }

    pub fn on_tick(&mut self, id: TickId) -> TickOutcome {
        match &self.ticker {
            Some(ticker) if ticker.id() == id => {}
            _ => return TickOutcome::Ignored,
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.pause();
            TickOutcome::Completed
        } else {
            TickOutcome::Ticked {
                remaining_secs: self.remaining_secs,
            }
        }
    }
}

/// `m:ss`, minutes unpadded
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
