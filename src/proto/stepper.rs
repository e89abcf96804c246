//! The authoritative byte-at-a-time state machine.

use std::fmt;
use std::mem;

use bytes::{Buf, BufMut, BytesMut};
use tracing::trace;

use super::args;
use super::frame::PartialMsg;
use super::{Parse, MAX_CONTROL_LINE};
use crate::error::{Error, Protocol};
use crate::event::Event;
use crate::info;
use crate::Result;

/// One state per classified byte. Verb chains advance a state per byte;
/// `*Spc` states swallow the separator run; `*Arg` states accumulate the
/// argument line into the scratch buffer; `MsgEnd`/`HmsgEnd`/`OpEnd`
/// expect the LF of a CRLF whose CR was already seen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    OpStart,
    OpPlus,
    OpPlusO,
    OpPlusOk,
    OpMinus,
    OpMinusE,
    OpMinusEr,
    OpMinusErr,
    OpMinusErrSpc,
    MinusErrArg,
    OpM,
    OpMs,
    OpMsg,
    OpMsgSpc,
    MsgArg,
    MsgEnd,
    MsgPayload,
    OpH,
    OpHm,
    OpHms,
    OpHmsg,
    OpHmsgSpc,
    HmsgArg,
    HmsgEnd,
    HmsgPayload,
    OpP,
    OpPi,
    OpPin,
    OpPing,
    OpPo,
    OpPon,
    OpPong,
    OpI,
    OpIn,
    OpInf,
    OpInfo,
    OpInfoSpc,
    InfoArg,
    OpEnd,
}

/// The default, byte-at-a-time protocol parser.
///
/// Every byte is classified exactly once by a resumable state machine, so
/// the parser tolerates any chunking of the input, including splits
/// mid-verb, mid-argument, mid-payload, and between CR and LF.
///
/// # Example
///
/// ```
/// use nats_proto::{Event, Parser};
///
/// let mut parser = Parser::new();
/// parser.feed(b"PING\r\nMSG the.subject 9 11\r\nhello nats!\r\n")?;
///
/// let events = parser.drain_events();
/// assert_eq!(events[0], Event::Ping);
/// match &events[1] {
///     Event::Msg { subject, payload, .. } => {
///         assert_eq!(subject, "the.subject");
///         assert_eq!(&payload[..], b"hello nats!");
///     }
///     other => panic!("unexpected event: {:?}", other),
/// }
/// # Ok::<(), nats_proto::Error>(())
/// ```
pub struct Parser {
    state: State,
    /// Bytes fed but not yet consumed by the state machine.
    buf: BytesMut,
    /// Scratch for the argument line currently being accumulated.
    arg: BytesMut,
    /// Arguments of the message whose payload is awaited.
    msg: PartialMsg,
    events: Vec<Event>,
    closed: bool,
}

impl Parser {
    /// Creates an empty parser in its initial state.
    pub fn new() -> Parser {
        Parser {
            state: State::OpStart,
            buf: BytesMut::new(),
            arg: BytesMut::new(),
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
                State::MsgPayload | State::HmsgPayload => {
                    if self.buf.len() < self.msg.needed() {
                        return Ok(());
                    }
                    let msg = mem::take(&mut self.msg);
                    let event = msg.complete(&mut self.buf)?;
                    trace!("emit; event={:?}", event);
                    self.events.push(event);
                    self.state = State::OpStart;
                }
                _ => {
                    let byte = match self.buf.first() {
                        Some(&byte) => byte,
                        None => return Ok(()),
                    };
                    self.buf.advance(1);
                    self.step(byte)?;
                }
            }
        }
    }

    /// Classifies a single byte in the current state.
    fn step(&mut self, b: u8) -> Result<()> {
        use self::State::*;

        self.state = match self.state {
            OpStart => match b {
                b'+' => OpPlus,
                b'-' => OpMinus,
                b'M' | b'm' => OpM,
                b'H' | b'h' => OpH,
                b'P' | b'p' => OpP,
                b'I' | b'i' => OpI,
                _ => return Err(self.reject(b)),
            },

            OpPlus => match b {
                b'O' | b'o' => OpPlusO,
                _ => return Err(self.reject(b)),
            },
            OpPlusO => match b {
                b'K' | b'k' => OpPlusOk,
                _ => return Err(self.reject(b)),
            },
            OpPlusOk => match b {
                b' ' | b'\t' => OpPlusOk,
                b'\r' => {
                    self.emit(Event::Ok);
                    OpEnd
                }
                _ => return Err(self.reject(b)),
            },

            OpMinus => match b {
                b'E' | b'e' => OpMinusE,
                _ => return Err(self.reject(b)),
            },
            OpMinusE => match b {
                b'R' | b'r' => OpMinusEr,
                _ => return Err(self.reject(b)),
            },
            OpMinusEr => match b {
                b'R' | b'r' => OpMinusErr,
                _ => return Err(self.reject(b)),
            },
            OpMinusErr => match b {
                b' ' | b'\t' => OpMinusErrSpc,
                _ => return Err(self.reject(b)),
            },
            OpMinusErrSpc => match b {
                b' ' | b'\t' => OpMinusErrSpc,
                b'\r' => {
                    self.finish_err_arg()?;
                    OpEnd
                }
                _ => {
                    self.push_arg(b)?;
                    MinusErrArg
                }
            },
            MinusErrArg => match b {
                b'\r' => {
                    self.finish_err_arg()?;
                    OpEnd
                }
                _ => {
                    self.push_arg(b)?;
                    MinusErrArg
                }
            },

            OpM => match b {
                b'S' | b's' => OpMs,
                _ => return Err(self.reject(b)),
            },
            OpMs => match b {
                b'G' | b'g' => OpMsg,
                _ => return Err(self.reject(b)),
            },
            OpMsg => match b {
                b' ' | b'\t' => OpMsgSpc,
                _ => return Err(self.reject(b)),
            },
            OpMsgSpc => match b {
                b' ' | b'\t' => OpMsgSpc,
                b'\r' => {
                    self.finish_msg_arg()?;
                    MsgEnd
                }
                _ => {
                    self.push_arg(b)?;
                    MsgArg
                }
            },
            MsgArg => match b {
                b'\r' => {
                    self.finish_msg_arg()?;
                    MsgEnd
                }
                _ => {
                    self.push_arg(b)?;
                    MsgArg
                }
            },
            MsgEnd => match b {
                b'\n' => MsgPayload,
                _ => return Err(self.reject(b)),
            },

            OpH => match b {
                b'M' | b'm' => OpHm,
                _ => return Err(self.reject(b)),
            },
            OpHm => match b {
                b'S' | b's' => OpHms,
                _ => return Err(self.reject(b)),
            },
            OpHms => match b {
                b'G' | b'g' => OpHmsg,
                _ => return Err(self.reject(b)),
            },
            OpHmsg => match b {
                b' ' | b'\t' => OpHmsgSpc,
                _ => return Err(self.reject(b)),
            },
            OpHmsgSpc => match b {
                b' ' | b'\t' => OpHmsgSpc,
                b'\r' => {
                    self.finish_hmsg_arg()?;
                    HmsgEnd
                }
                _ => {
                    self.push_arg(b)?;
                    HmsgArg
                }
            },
            HmsgArg => match b {
                b'\r' => {
                    self.finish_hmsg_arg()?;
                    HmsgEnd
                }
                _ => {
                    self.push_arg(b)?;
                    HmsgArg
                }
            },
            HmsgEnd => match b {
                b'\n' => HmsgPayload,
                _ => return Err(self.reject(b)),
            },

            OpP => match b {
                b'I' | b'i' => OpPi,
                b'O' | b'o' => OpPo,
                _ => return Err(self.reject(b)),
            },
            OpPi => match b {
                b'N' | b'n' => OpPin,
                _ => return Err(self.reject(b)),
            },
            OpPin => match b {
                b'G' | b'g' => OpPing,
                _ => return Err(self.reject(b)),
            },
            OpPing => match b {
                b' ' | b'\t' => OpPing,
                b'\r' => {
                    self.emit(Event::Ping);
                    OpEnd
                }
                _ => return Err(self.reject(b)),
            },
            OpPo => match b {
                b'N' | b'n' => OpPon,
                _ => return Err(self.reject(b)),
            },
            OpPon => match b {
                b'G' | b'g' => OpPong,
                _ => return Err(self.reject(b)),
            },
            OpPong => match b {
                b' ' | b'\t' => OpPong,
                b'\r' => {
                    self.emit(Event::Pong);
                    OpEnd
                }
                _ => return Err(self.reject(b)),
            },

            OpI => match b {
                b'N' | b'n' => OpIn,
                _ => return Err(self.reject(b)),
            },
            OpIn => match b {
                b'F' | b'f' => OpInf,
                _ => return Err(self.reject(b)),
            },
            OpInf => match b {
                b'O' | b'o' => OpInfo,
                _ => return Err(self.reject(b)),
            },
            OpInfo => match b {
                b' ' | b'\t' => OpInfoSpc,
                _ => return Err(self.reject(b)),
            },
            OpInfoSpc => match b {
                b' ' | b'\t' => OpInfoSpc,
                b'\r' => {
                    self.finish_info_arg()?;
                    OpEnd
                }
                _ => {
                    self.push_arg(b)?;
                    InfoArg
                }
            },
            InfoArg => match b {
                b'\r' => {
                    self.finish_info_arg()?;
                    OpEnd
                }
                _ => {
                    self.push_arg(b)?;
                    InfoArg
                }
            },

            OpEnd => match b {
                b'\n' => OpStart,
                _ => return Err(self.reject(b)),
            },

            // handled in advance()
            MsgPayload | HmsgPayload => return Err(Error::new_protocol(Protocol::Line)),
        };
        Ok(())
    }

    fn push_arg(&mut self, b: u8) -> Result<()> {
        if self.arg.len() >= MAX_CONTROL_LINE {
            return Err(Error::new_protocol(Protocol::TooLong));
        }
        self.arg.put_u8(b);
        Ok(())
    }

    fn emit(&mut self, event: Event) {
        trace!("emit; event={:?}", event);
        self.events.push(event);
    }

    fn finish_err_arg(&mut self) -> Result<()> {
        let line = self.arg.split();
        let message = args::parse_err_message(&line)?;
        self.emit(Event::Err { message });
        Ok(())
    }

    fn finish_info_arg(&mut self) -> Result<()> {
        let line = self.arg.split();
        let info = info::parse_info(&line)?;
        self.emit(Event::Info(Box::new(info)));
        Ok(())
    }

    fn finish_msg_arg(&mut self) -> Result<()> {
        let line = self.arg.split();
        self.msg = args::parse_msg_args(&line)?;
        Ok(())
    }

    fn finish_hmsg_arg(&mut self) -> Result<()> {
        let line = self.arg.split();
        self.msg = args::parse_hmsg_args(&line)?;
        Ok(())
    }

    fn reject(&self, b: u8) -> Error {
        trace!("reject; byte={:?} state={:?}", b, self.state);
        Error::new_protocol(Protocol::Verb)
    }
}

impl Parse for Parser {
    fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        Parser::feed(self, chunk)
    }

    fn drain_events(&mut self) -> Vec<Event> {
        Parser::drain_events(self)
    }

    fn close(&mut self) {
        Parser::close(self)
    }
}

impl Default for Parser {
    fn default() -> Parser {
        Parser::new()
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("backend", &"bytewise")
            .field("state", &self.state)
            .field("buffered", &self.buf.len())
            .field("queued", &self.events.len())
            .field("closed", &self.closed)
            .finish()
    }
}
