//! The control-line prescanning parser variant.
//!
//! Instead of classifying bytes one state at a time, this variant peeks
//! at the first byte of a control line, waits until the whole line (up to
//! CRLF) is buffered, and decodes it in one pass. Its output is required
//! to be indistinguishable from [`Parser`](crate::Parser) for any input,
//! chunked in any way.

use std::fmt;
use std::mem;

use bytes::{Buf, BytesMut};
use tracing::trace;

use super::args;
use super::frame::PartialMsg;
use super::{Parse, CRLF, MAX_CONTROL_LINE};
use crate::error::{Error, Protocol};
use crate::event::Event;
use crate::info;
use crate::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scan {
    ControlLine,
    Payload,
}

/// A parser that scans for a complete control line before decoding it.
///
/// Behaviorally identical to [`Parser`](crate::Parser); the two differ
/// only in how they schedule their work over incoming chunks.
pub struct PrescanParser {
    state: Scan,
    buf: BytesMut,
    msg: PartialMsg,
    events: Vec<Event>,
    closed: bool,
}

impl PrescanParser {
    /// Creates an empty parser in its initial state.
    pub fn new() -> PrescanParser {
        PrescanParser {
            state: Scan::ControlLine,
            buf: BytesMut::new(),
            msg: PartialMsg::default(),
            events: Vec::new(),
            closed: false,
        }
    }

    /// Feeds a chunk of bytes. See [`Parse::feed`].
    pub fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        if self.closed {
            return Err(Error::new_closed());
        }
        trace!("feed; len={} state={:?}", chunk.len(), self.state);
        self.buf.extend_from_slice(chunk);
        self.advance()
    }

    /// Removes and returns all queued events. See [`Parse::drain_events`].
    pub fn drain_events(&mut self) -> Vec<Event> {
        mem::take(&mut self.events)
    }

    /// Closes the parser. See [`Parse::close`].
    pub fn close(&mut self) {
        self.closed = true;
    }

    fn advance(&mut self) -> Result<()> {
        loop {
            match self.state {
                Scan::ControlLine => {
                    let first = match self.buf.first() {
                        Some(&first) => first,
                        None => return Ok(()),
                    };
                    // A byte that cannot begin any verb is rejected without
                    // waiting for the rest of the line.
                    match first {
                        b'+' | b'-' | b'M' | b'm' | b'H' | b'h' | b'P' | b'p' | b'I'
                        | b'i' => {}
                        _ => {
                            trace!("reject; byte={:?}", first);
                            return Err(Error::new_protocol(Protocol::Verb));
                        }
                    }
                    let line_end = match find_crlf(&self.buf) {
                        Some(at) => at,
                        None => {
                            if self.buf.len() > MAX_CONTROL_LINE {
                                return Err(Error::new_protocol(Protocol::TooLong));
                            }
                            return Ok(());
                        }
                    };
                    if line_end > MAX_CONTROL_LINE {
                        return Err(Error::new_protocol(Protocol::TooLong));
                    }
                    let line = self.buf.split_to(line_end);
                    self.buf.advance(CRLF.len());
                    self.dispatch(first, &line)?;
                }
                Scan::Payload => {
                    if self.buf.len() < self.msg.needed() {
                        return Ok(());
                    }
                    let msg = mem::take(&mut self.msg);
                    let event = msg.complete(&mut self.buf)?;
                    trace!("emit; event={:?}", event);
                    self.events.push(event);
                    self.state = Scan::ControlLine;
                }
            }
        }
    }

    /// Decodes one complete control line (without its CRLF).
    fn dispatch(&mut self, first: u8, line: &[u8]) -> Result<()> {
        match first {
            b'M' | b'm' => {
                self.msg = args::parse_msg_args(argument(line, "MSG")?)?;
                self.state = Scan::Payload;
            }
            b'H' | b'h' => {
                self.msg = args::parse_hmsg_args(argument(line, "HMSG")?)?;
                self.state = Scan::Payload;
            }
            b'P' | b'p' => {
                let event = match line.get(1) {
                    Some(&b'I') | Some(&b'i') => {
                        bare_line(line, "PING")?;
                        Event::Ping
                    }
                    _ => {
                        bare_line(line, "PONG")?;
                        Event::Pong
                    }
                };
                trace!("emit; event={:?}", event);
                self.events.push(event);
            }
            b'+' => {
                bare_line(line, "+OK")?;
                trace!("emit; event=Ok");
                self.events.push(Event::Ok);
            }
            b'-' => {
                let message = args::parse_err_message(argument(line, "-ERR")?)?;
                trace!("emit; event=Err");
                self.events.push(Event::Err { message });
            }
            b'I' | b'i' => {
                let info = info::parse_info(argument(line, "INFO")?)?;
                trace!("emit; event=Info");
                self.events.push(Event::Info(Box::new(info)));
            }
            _ => {
                trace!("reject; byte={:?}", first);
                return Err(Error::new_protocol(Protocol::Verb));
            }
        }
        Ok(())
    }
}

/// Strips a case-insensitive verb and the following separator run,
/// returning the argument slice. The separator is required; a control
/// line that ends right after the verb has no argument and is rejected
/// by the argument decoders downstream (they all reject empty input).
fn argument<'a>(line: &'a [u8], verb: &str) -> Result<&'a [u8]> {
    let rest = strip_verb(line, verb)?;
    match rest.first() {
        Some(b' ') | Some(b'\t') => {}
        _ => return Err(Error::new_protocol(Protocol::Verb)),
    }
    let arg_at = rest
        .iter()
        .position(|&b| b != b' ' && b != b'\t')
        .unwrap_or(rest.len());
    Ok(&rest[arg_at..])
}

/// Accepts a verb followed by nothing but optional whitespace.
fn bare_line(line: &[u8], verb: &str) -> Result<()> {
    let rest = strip_verb(line, verb)?;
    if rest.iter().all(|&b| b == b' ' || b == b'\t') {
        Ok(())
    } else {
        Err(Error::new_protocol(Protocol::Verb))
    }
}

fn strip_verb<'a>(line: &'a [u8], verb: &str) -> Result<&'a [u8]> {
    let verb = verb.as_bytes();
    if line.len() < verb.len() {
        return Err(Error::new_protocol(Protocol::Verb));
    }
    let (head, rest) = line.split_at(verb.len());
    if head.eq_ignore_ascii_case(verb) {
        Ok(rest)
    } else {
        Err(Error::new_protocol(Protocol::Verb))
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(CRLF.len()).position(|window| window == CRLF)
}

impl Parse for PrescanParser {
    fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        PrescanParser::feed(self, chunk)
    }

    fn drain_events(&mut self) -> Vec<Event> {
        PrescanParser::drain_events(self)
    }

    fn close(&mut self) {
        PrescanParser::close(self)
    }
}

impl Default for PrescanParser {
    fn default() -> PrescanParser {
        PrescanParser::new()
    }
}

impl fmt::Debug for PrescanParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrescanParser")
            .field("backend", &"prescan")
            .field("state", &self.state)
            .field("buffered", &self.buf.len())
            .field("queued", &self.events.len())
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_for_a_complete_control_line() {
        let mut parser = PrescanParser::new();
        parser.feed(b"PING\r").unwrap();
        assert!(parser.drain_events().is_empty());
        parser.feed(b"\n").unwrap();
        assert_eq!(parser.drain_events(), vec![Event::Ping]);
    }

    #[test]
    fn rejects_garbage_after_a_bare_verb() {
        let mut parser = PrescanParser::new();
        let err = parser.feed(b"+OK nope\r\n").unwrap_err();
        assert!(err.is_protocol());
    }

    #[test]
    fn rejects_an_unknown_first_byte_without_waiting_for_crlf() {
        let mut parser = PrescanParser::new();
        let err = parser.feed(b"x").unwrap_err();
        assert!(err.is_protocol());
    }

    #[test]
    fn rejects_a_verb_that_diverges_once_the_line_completes() {
        let mut parser = PrescanParser::new();
        let err = parser.feed(b"invalid\r\n").unwrap_err();
        assert!(err.is_protocol());
    }

    #[test]
    fn rejects_an_endless_control_line() {
        let mut parser = PrescanParser::new();
        let mut chunk = b"INFO ".to_vec();
        chunk.extend(vec![b'a'; MAX_CONTROL_LINE + 8]);
        let err = parser.feed(&chunk).unwrap_err();
        assert!(err.is_protocol());
    }

    #[test]
    fn err_requires_a_separator_after_the_verb() {
        let mut parser = PrescanParser::new();
        let err = parser.feed(b"-ERR\r\n").unwrap_err();
        assert!(err.is_protocol());
    }
}
