//! Connection to the tracking server.
//!
//! [`Connection`] is the single, explicitly owned link to the server. It is
//! created once by the application, opened lazily by the first subscription
//! and closed only by [`Connection::teardown`]. The bytes underneath are
//! supplied by a [`Transport`].

use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use crate::error::TransportError;
use crate::protocol::{ClientMessage, ServerFrame};
use crate::runtime::SessionEvent;

pub trait Transport {
    /// Establish the underlying link. Inbound frames are delivered out of band
    /// (for the TCP transport, onto the event loop channel).
    fn open(&mut self) -> Result<(), TransportError>;

    fn send(&mut self, message: &ClientMessage) -> Result<(), TransportError>;

    /// Close the link. Must not report a disconnect for a local close.
    fn close(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Never opened, or torn down
    Disconnected,
    Connected,
    /// Dropped by the peer; the next `init` reconnects
    Lost,
}

#[derive(Debug)]
pub struct Connection<T: Transport> {
    transport: T,
    state: ConnectionState,
}

impl<T: Transport> Connection<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Open the link unless it is already up
    pub fn init(&mut self) -> Result<(), TransportError> {
        if self.is_connected() {
            return Ok(());
        }
        self.transport.open()?;
        self.state = ConnectionState::Connected;
        tracing::info!("connected to tracking server");
        Ok(())
    }

    pub fn send(&mut self, message: &ClientMessage) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        self.transport.send(message)
    }

    /// Record that the peer went away
    pub fn mark_lost(&mut self) {
        if self.is_connected() {
            self.transport.close();
        }
        self.state = ConnectionState::Lost;
    }

    pub fn teardown(&mut self) {
        if self.is_connected() {
            self.transport.close();
            tracing::info!("disconnected from tracking server");
        }
        self.state = ConnectionState::Disconnected;
    }
}

/// Newline-delimited JSON over TCP.
///
/// This is not Socket.IO; a Socket.IO server needs a JSON-lines bridge in
/// front of it.
///
/// A reader thread parses every inbound line into a [`ServerFrame`] and
/// forwards it to the event loop; lines that do not parse are dropped.
#[derive(Debug)]
pub struct TcpTransport {
    addr: String,
    events: Sender<SessionEvent>,
    stream: Option<TcpStream>,
    closing: Arc<AtomicBool>,
}

impl TcpTransport {
    pub fn new(addr: impl Into<String>, events: Sender<SessionEvent>) -> Self {
        Self {
            addr: addr.into(),
            events,
            stream: None,
            closing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

impl Transport for TcpTransport {
    fn open(&mut self) -> Result<(), TransportError> {
        let connect_err = |source| TransportError::Connect {
            addr: self.addr.clone(),
            source,
        };
        let stream = TcpStream::connect(&self.addr).map_err(connect_err)?;
        let reader = stream.try_clone().map_err(connect_err)?;

        // each link gets its own flag so a stale reader never reports for a new one
        let closing = Arc::new(AtomicBool::new(false));
        self.closing = Arc::clone(&closing);
        let tx = self.events.clone();
        let addr = self.addr.clone();

        thread::spawn(move || {
            let reason = read_frames(reader, &tx);
            if !closing.load(Ordering::SeqCst) {
                tracing::warn!(%addr, %reason, "tracking server connection dropped");
                let _ = tx.send(SessionEvent::Disconnected(reason));
            }
        });

        self.stream = Some(stream);
        Ok(())
    }

    fn send(&mut self, message: &ClientMessage) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');
        stream.write_all(&line)?;
        stream.flush()?;
        tracing::debug!(?message, "sent");
        Ok(())
    }

    fn close(&mut self) {
        self.closing.store(true, Ordering::SeqCst);
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

/// Pump lines until the stream ends; returns why it ended
fn read_frames(stream: TcpStream, tx: &Sender<SessionEvent>) -> String {
    for line in BufReader::new(stream).lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => return err.to_string(),
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ServerFrame>(&line) {
            Ok(frame) => {
                if tx.send(SessionEvent::Frame(frame)).is_err() {
                    return "event loop closed".to_string();
                }
            }
            Err(err) => tracing::debug!(%err, "dropping undecodable frame"),
        }
    }
    "server closed the connection".to_string()
}

/// In-memory transport that records everything sent through it
#[derive(Debug, Default)]
pub struct MemoryTransport {
    sent: Vec<ClientMessage>,
    opens: usize,
    open: bool,
    refuse: bool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose `open` always fails
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> &[ClientMessage] {
        &self.sent
    }

    pub fn opens(&self) -> usize {
        self.opens
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl Transport for MemoryTransport {
    fn open(&mut self) -> Result<(), TransportError> {
        if self.refuse {
            return Err(TransportError::Connect {
                addr: "memory".to_string(),
                source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
            });
        }
        self.opens += 1;
        self.open = true;
        Ok(())
    }

    fn send(&mut self, message: &ClientMessage) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::NotConnected);
        }
        self.sent.push(message.clone());
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }
}
