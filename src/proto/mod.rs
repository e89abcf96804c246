//! The wire-protocol state machines.
//!
//! Two interchangeable implementations live here. [`Parser`] is the
//! authoritative byte-at-a-time machine: it classifies every byte in a
//! resumable state and never needs to look ahead. [`PrescanParser`] waits
//! for a complete control line and decodes it in one pass. Both produce
//! identical event sequences for identical input.

pub(crate) mod args;
mod frame;
mod prescan;
mod stepper;

pub use self::prescan::PrescanParser;
pub use self::stepper::Parser;

use crate::event::Event;
use crate::Result;

/// Line terminator for control lines and payloads.
pub(crate) const CRLF: &[u8] = b"\r\n";

/// Terminator of an `HMSG` header block.
pub(crate) const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Longest control line tolerated before giving up on ever finding a CRLF.
///
/// Matches the default max_control_line of the reference server.
pub(crate) const MAX_CONTROL_LINE: usize = 4096;

/// The contract shared by the parser implementations.
///
/// A parser consumes raw byte chunks from a transport and queues typed
/// [`Event`]s. Chunk boundaries carry no meaning: a chunk may end
/// mid-verb, mid-argument, mid-payload, or between the CR and LF of a
/// terminator, and the next `feed` resumes exactly where the previous one
/// suspended.
pub trait Parse {
    /// Feeds a chunk of bytes, advancing the parser as far as possible.
    ///
    /// Completed events are appended to the internal queue in wire order.
    /// Fails with a protocol error on the first byte that violates the
    /// grammar, and with a closed error if the parser has been
    /// [`close`](Parse::close)d. After a protocol error the parser state
    /// is unspecified and the parser should be discarded; events queued
    /// before the offending byte remain drainable.
    fn feed(&mut self, chunk: &[u8]) -> Result<()>;

    /// Removes and returns all events queued since the last call.
    fn drain_events(&mut self) -> Vec<Event>;

    /// Closes the parser. Idempotent; later `feed` calls fail.
    fn close(&mut self);
}

/// Selects a parser implementation.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Backend {
    /// The byte-at-a-time state machine, [`Parser`].
    Bytewise,
    /// The control-line prescanning variant, [`PrescanParser`].
    Prescan,
}

impl Default for Backend {
    fn default() -> Backend {
        Backend::Bytewise
    }
}

/// Creates a parser for the requested backend.
///
/// # Example
///
/// ```
/// use nats_proto::{make_parser, Backend, Event, Parse};
///
/// let mut parser = make_parser(Backend::default());
/// parser.feed(b"PING\r\n")?;
/// assert_eq!(parser.drain_events(), vec![Event::Ping]);
/// # Ok::<(), nats_proto::Error>(())
/// ```
pub fn make_parser(backend: Backend) -> Box<dyn Parse + Send> {
    match backend {
        Backend::Bytewise => Box::new(Parser::new()),
        Backend::Prescan => Box::new(PrescanParser::new()),
    }
}
