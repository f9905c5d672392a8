//! Cancellable periodic ticks.
//!
//! A [`TickScheduler`] hands out one [`TickHandle`] per started countdown.
//! Every tick delivered to the event loop carries the [`TickId`] of the handle
//! that produced it, so ticks that were already queued when a handle was
//! cancelled can be recognised and discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::runtime::SessionEvent;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickId(u64);

impl TickId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Owner side of a periodic tick source. Dropping it cancels the source.
#[derive(Debug)]
pub struct TickHandle {
    id: TickId,
    cancelled: Arc<AtomicBool>,
}

impl TickHandle {
    pub fn new(id: TickId) -> (Self, Arc<AtomicBool>) {
        let cancelled = Arc::new(AtomicBool::new(false));
        (
            Self {
                id,
                cancelled: Arc::clone(&cancelled),
            },
            cancelled,
        )
    }

    pub fn id(&self) -> TickId {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub trait TickScheduler {
    /// Begin a periodic tick and return the handle that controls it
    fn schedule(&mut self) -> TickHandle;
}

impl<S: TickScheduler + ?Sized> TickScheduler for &mut S {
    fn schedule(&mut self) -> TickHandle {
        (**self).schedule()
    }
}

/// Production scheduler: one sleeper thread per handle feeding the event loop
#[derive(Debug, Clone)]
pub struct ThreadScheduler {
    events: Sender<SessionEvent>,
    period: Duration,
    next_id: u64,
}

impl ThreadScheduler {
    pub fn new(events: Sender<SessionEvent>) -> Self {
        Self::with_period(events, TICK_PERIOD)
    }

    pub fn with_period(events: Sender<SessionEvent>, period: Duration) -> Self {
        Self {
            events,
            period,
            next_id: 0,
        }
    }
}

impl TickScheduler for ThreadScheduler {
    fn schedule(&mut self) -> TickHandle {
        self.next_id += 1;
        let id = TickId::new(self.next_id);
        let (handle, cancelled) = TickHandle::new(id);

        let tx = self.events.clone();
        let period = self.period;
        thread::spawn(move || loop {
            thread::sleep(period);
            if cancelled.load(Ordering::SeqCst) {
                break;
            }
            if tx.send(SessionEvent::Tick(id)).is_err() {
                break;
            }
        });

        tracing::trace!(tick = id.0, "scheduled tick source");
        handle
    }
}

/// Deterministic scheduler for tests: records handles, never ticks by itself
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    issued: Vec<(TickId, Arc<AtomicBool>)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tick sources ever scheduled
    pub fn scheduled(&self) -> usize {
        self.issued.len()
    }

    /// Ids of tick sources that have not been cancelled
    pub fn live(&self) -> Vec<TickId> {
        self.issued
            .iter()
            .filter(|(_, cancelled)| !cancelled.load(Ordering::SeqCst))
            .map(|(id, _)| *id)
            .collect()
    }

    /// The most recently scheduled tick source, if it is still live
    pub fn current(&self) -> Option<TickId> {
        self.issued
            .last()
            .filter(|(_, cancelled)| !cancelled.load(Ordering::SeqCst))
            .map(|(id, _)| *id)
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule(&mut self) -> TickHandle {
        self.next_id += 1;
        let id = TickId::new(self.next_id);
        let (handle, cancelled) = TickHandle::new(id);
        self.issued.push((id, cancelled));
        handle
    }
}
