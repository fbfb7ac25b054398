//! Fibre link to the remote host.
//!
//! The workstation and the host exchange small big-endian messages over a
//! byte stream. A receiver thread owns the read side: it turns host
//! messages into [`LinkEvent`]s for the step loop, answers pending UNIBUS
//! reads, and reconnects when the stream fails. Writes go straight out from
//! the CPU thread through a shared writer slot that the receiver refills
//! after each reconnect.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use crate::MachineError;

/// Pause between reconnection attempts.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

const XMIT_ON: u8 = 1;
const XMIT_OFF: u8 = 2;
const INT: u8 = 3;
const CSR: u8 = 4;
const READ8: u8 = 5;
const READ16: u8 = 6;
const DATA: u8 = 7;
const NXM: u8 = 8;
const WRITE8: u8 = 9;
const WRITE16: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    XmitOn,
    XmitOff,
    /// Interrupt the host.
    Int,
    Csr { index: u8, data: u16 },
    Read8 { address: u32 },
    Read16 { address: u32 },
    /// Reply to a read.
    Data(u16),
    /// Reply to a read of non-existent memory.
    Nxm,
    Write8 { address: u32, data: u8 },
    Write16 { address: u32, data: u16 },
}

impl Message {
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(7);
        match *self {
            Self::XmitOn => out.push(XMIT_ON),
            Self::XmitOff => out.push(XMIT_OFF),
            Self::Int => out.push(INT),
            Self::Csr { index, data } => {
                out.extend([CSR, index]);
                out.extend(data.to_be_bytes());
            }
            Self::Read8 { address } => {
                out.push(READ8);
                out.extend(address.to_be_bytes());
            }
            Self::Read16 { address } => {
                out.push(READ16);
                out.extend(address.to_be_bytes());
            }
            Self::Data(data) => {
                out.push(DATA);
                out.extend(data.to_be_bytes());
            }
            Self::Nxm => out.push(NXM),
            Self::Write8 { address, data } => {
                out.push(WRITE8);
                out.extend(address.to_be_bytes());
                out.push(data);
            }
            Self::Write16 { address, data } => {
                out.push(WRITE16);
                out.extend(address.to_be_bytes());
                out.extend(data.to_be_bytes());
            }
        }
        out
    }

    /// Read one message. An unknown type byte is `InvalidData`.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let mut kind = [0u8; 1];
        reader.read_exact(&mut kind)?;
        let message = match kind[0] {
            XMIT_ON => Self::XmitOn,
            XMIT_OFF => Self::XmitOff,
            INT => Self::Int,
            CSR => {
                let [index, hi, lo] = read_array(reader)?;
                Self::Csr {
                    index,
                    data: u16::from_be_bytes([hi, lo]),
                }
            }
            READ8 => Self::Read8 {
                address: u32::from_be_bytes(read_array(reader)?),
            },
            READ16 => Self::Read16 {
                address: u32::from_be_bytes(read_array(reader)?),
            },
            DATA => Self::Data(u16::from_be_bytes(read_array(reader)?)),
            NXM => Self::Nxm,
            WRITE8 => {
                let [a, b, c, d, data] = read_array(reader)?;
                Self::Write8 {
                    address: u32::from_be_bytes([a, b, c, d]),
                    data,
                }
            }
            WRITE16 => {
                let [a, b, c, d, hi, lo] = read_array(reader)?;
                Self::Write16 {
                    address: u32::from_be_bytes([a, b, c, d]),
                    data: u16::from_be_bytes([hi, lo]),
                }
            }
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("unknown fibre message type {other:#04X}"),
                ));
            }
        };
        Ok(message)
    }
}

fn read_array<const N: usize, R: Read + ?Sized>(reader: &mut R) -> io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Host-side changes delivered to the step loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    Up,
    Down,
    Csr { index: u8, data: u16 },
}

/// Outcome of a UNIBUS read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Data(u16),
    /// The host reported non-existent memory, or the link dropped while
    /// the read was outstanding.
    Nxm,
}

pub type Reader = Box<dyn Read + Send>;
pub type Writer = Box<dyn Write + Send>;

/// Opens a stream to the host.
pub trait Connector: Send + 'static {
    fn connect(&mut self) -> io::Result<(Reader, Writer)>;

    /// Where the stream goes, for log messages.
    fn describe(&self) -> String;
}

/// TCP connection to `host:port`.
pub struct TcpConnector {
    address: String,
}

impl TcpConnector {
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

impl Connector for TcpConnector {
    fn connect(&mut self) -> io::Result<(Reader, Writer)> {
        let stream = TcpStream::connect(&self.address)?;
        stream.set_nodelay(true)?;
        let writer = stream.try_clone()?;
        Ok((Box::new(stream), Box::new(writer)))
    }

    fn describe(&self) -> String {
        self.address.clone()
    }
}

type WriterSlot = Arc<Mutex<Option<Writer>>>;

fn lock(slot: &WriterSlot) -> MutexGuard<'_, Option<Writer>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Link {
    writer: WriterSlot,
    events: Option<Receiver<LinkEvent>>,
    replies: Option<Receiver<Reply>>,
    _receiver: Option<thread::JoinHandle<()>>,
}

impl Link {
    /// No host: nothing is sent and every read is NXM.
    #[must_use]
    pub fn disconnected() -> Self {
        Self {
            writer: Arc::new(Mutex::new(None)),
            events: None,
            replies: None,
            _receiver: None,
        }
    }

    /// Connect to `host:port`. The first connection must succeed.
    pub fn connect(address: &str) -> Result<Self, MachineError> {
        Self::with_connector(TcpConnector::new(address), RECONNECT_DELAY).map_err(|source| {
            MachineError::Connect {
                address: address.to_owned(),
                source,
            }
        })
    }

    /// Connect through `connector` and start the receiver thread.
    pub fn with_connector<C: Connector>(mut connector: C, retry: Duration) -> io::Result<Self> {
        let (reader, writer) = connector.connect()?;
        log::info!("fibre connected to {}", connector.describe());

        let slot: WriterSlot = Arc::new(Mutex::new(Some(writer)));
        let (event_tx, event_rx) = channel();
        let (reply_tx, reply_rx) = channel();
        let receiver = Listener {
            connector,
            writer: Arc::clone(&slot),
            events: event_tx,
            replies: reply_tx,
            retry,
        };
        let handle = thread::Builder::new()
            .name("vs100-fibre".into())
            .spawn(move || receiver.run(reader))?;

        Ok(Self {
            writer: slot,
            events: Some(event_rx),
            replies: Some(reply_rx),
            _receiver: Some(handle),
        })
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        lock(&self.writer).is_some()
    }

    /// Send a message. Returns false when the link is down or the write
    /// fails; a failed write drops the stream until the receiver reconnects.
    pub fn send(&self, message: &Message) -> bool {
        let mut slot = lock(&self.writer);
        let Some(writer) = slot.as_mut() else {
            log::debug!("fibre down, {message:?} not sent");
            return false;
        };
        let bytes = message.encode();
        match writer.write_all(&bytes).and_then(|()| writer.flush()) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("fibre send failed: {e}");
                *slot = None;
                false
            }
        }
    }

    /// Send a read request and wait for the host's answer.
    ///
    /// Blocks until the host replies or the link drops.
    pub fn read(&self, request: &Message) -> Reply {
        let Some(replies) = &self.replies else {
            return Reply::Nxm;
        };
        // Discard a release left over from an earlier drop.
        while replies.try_recv().is_ok() {}
        if !self.send(request) {
            return Reply::Nxm;
        }
        replies.recv().unwrap_or(Reply::Nxm)
    }

    /// Next pending host-side change, if any.
    pub fn poll(&self) -> Option<LinkEvent> {
        self.events.as_ref()?.try_recv().ok()
    }
}

/// Read side of the link, owned by the receiver thread.
struct Listener<C> {
    connector: C,
    writer: WriterSlot,
    events: Sender<LinkEvent>,
    replies: Sender<Reply>,
    retry: Duration,
}

impl<C: Connector> Listener<C> {
    fn run(mut self, mut reader: Reader) {
        loop {
            let delivered = match Message::read_from(&mut reader) {
                Ok(Message::XmitOn) => {
                    log::info!("fibre: host transmitter on");
                    self.events.send(LinkEvent::Up).is_ok()
                }
                Ok(Message::XmitOff) => {
                    log::info!("fibre: host transmitter off");
                    self.events.send(LinkEvent::Down).is_ok()
                }
                Ok(Message::Csr { index, data }) => {
                    log::debug!("fibre: CSR{index} {data:04X}");
                    self.events.send(LinkEvent::Csr { index, data }).is_ok()
                }
                Ok(Message::Data(data)) => self.replies.send(Reply::Data(data)).is_ok(),
                Ok(Message::Nxm) => {
                    log::warn!("fibre: host reports NXM");
                    self.replies.send(Reply::Nxm).is_ok()
                }
                Ok(other) => {
                    log::warn!("fibre: unexpected message {other:?}");
                    match self.reconnect() {
                        Some(next) => {
                            reader = next;
                            true
                        }
                        None => false,
                    }
                }
                Err(e) => {
                    log::warn!("fibre receive failed: {e}");
                    match self.reconnect() {
                        Some(next) => {
                            reader = next;
                            true
                        }
                        None => false,
                    }
                }
            };
            if !delivered {
                log::debug!("fibre: machine gone, receiver exiting");
                return;
            }
        }
    }

    /// Drop the link, release any waiting read, and retry until the host
    /// answers again. Returns `None` once the machine has dropped its end.
    fn reconnect(&mut self) -> Option<Reader> {
        *lock(&self.writer) = None;
        let released = self.replies.send(Reply::Nxm).is_ok();
        if self.events.send(LinkEvent::Down).is_err() || !released {
            log::debug!("fibre: machine gone, not reconnecting");
            return None;
        }
        loop {
            match self.connector.connect() {
                Ok((reader, writer)) => {
                    log::info!("fibre reconnected to {}", self.connector.describe());
                    *lock(&self.writer) = Some(writer);
                    if self.events.send(LinkEvent::Up).is_err() {
                        log::debug!("fibre: machine gone after reconnect");
                        return None;
                    }
                    return Some(reader);
                }
                Err(e) => {
                    log::warn!("fibre reconnect to {} failed: {e}", self.connector.describe());
                    thread::sleep(self.retry);
                }
            }
        }
    }
}
