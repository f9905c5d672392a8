use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

use crate::protocol::ServerFrame;
use crate::schedule::TickId;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum SessionEvent {
    Key(KeyEvent),
    Resize,
    /// One second elapsed on the tick source with this id
    Tick(TickId),
    /// Inbound frame from the tracking server
    Frame(ServerFrame),
    /// The tracking server went away
    Disconnected(String),
    /// Nothing arrived within the redraw interval
    Idle,
}

/// Source of session events (keyboard, ticks, telemetry)
pub trait SessionEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError>;
}

/// All producers (terminal, ticks, transport) feed one channel
pub struct ChannelEventSource {
    rx: Receiver<SessionEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<SessionEvent>) -> Self {
        Self { rx }
    }
}

impl SessionEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Forward crossterm key presses and resizes into the event channel
pub fn spawn_terminal_input(tx: Sender<SessionEvent>) {
    std::thread::spawn(move || loop {
        let forwarded = match event::read() {
            Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                tx.send(SessionEvent::Key(key))
            }
            Ok(CtEvent::Resize(_, _)) => tx.send(SessionEvent::Resize),
            Ok(_) => Ok(()),
            Err(_) => break,
        };
        if forwarded.is_err() {
            break;
        }
    });
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Runner that advances the application one event at a time
pub struct Runner<E: SessionEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: SessionEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to the redraw interval and returns the next event, or Idle on timeout
    pub fn step(&self) -> SessionEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                SessionEvent::Idle
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn step_returns_idle_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = ChannelEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        // With no events available, step should yield Idle
        match runner.step() {
            SessionEvent::Idle => {}
            other => panic!("expected Idle on timeout, got {other:?}"),
        }
    }

    #[test]
    fn step_passes_through_events_in_order() {
        let (tx, rx) = mpsc::channel();
        tx.send(SessionEvent::Tick(TickId::new(1))).unwrap();
        tx.send(SessionEvent::Resize).unwrap();
        let es = ChannelEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            SessionEvent::Tick(id) => assert_eq!(id, TickId::new(1)),
            other => panic!("expected Tick, got {other:?}"),
        }
        match runner.step() {
            SessionEvent::Resize => {}
            other => panic!("expected Resize, got {other:?}"),
        }
    }

    #[test]
    fn step_yields_idle_once_all_producers_are_gone() {
        let (tx, rx) = mpsc::channel::<SessionEvent>();
        drop(tx);
        let runner = Runner::new(
            ChannelEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(1)),
        );
        assert!(matches!(runner.step(), SessionEvent::Idle));
    }
}
