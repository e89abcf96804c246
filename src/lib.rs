#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![cfg_attr(test, deny(rust_2018_idioms))]

//! # nats-proto
//!
//! An incremental, streaming parser for the NATS client-side wire
//! protocol.
//!
//! The parser accepts arbitrary-sized chunks of bytes arriving from a
//! transport and converts them into a sequence of typed [`Event`]s. Chunk
//! boundaries carry no meaning: a chunk may end mid-verb, mid-argument,
//! mid-payload, or between the CR and LF of a terminator, and the parser
//! resumes exactly where it suspended. It recognizes the seven
//! server-to-client control verbs (`INFO`, `+OK`, `-ERR`, `PING`, `PONG`,
//! `MSG`, `HMSG`), decodes their arguments, and extracts payloads and
//! headers for messages.
//!
//! This is a building block, not a client: it performs no I/O and owns no
//! connection. A transport feeds it bytes; a subscription dispatcher
//! consumes its events.
//!
//! ```
//! use nats_proto::{Event, Parser};
//!
//! let mut parser = Parser::new();
//!
//! // Chunks split anywhere, even inside a verb or a payload.
//! parser.feed(b"PING\r\nMSG the.sub")?;
//! parser.feed(b"ject 1234 12\r\nhello ")?;
//! parser.feed(b"world!\r\n")?;
//!
//! let events = parser.drain_events();
//! assert_eq!(events[0], Event::Ping);
//! match &events[1] {
//!     Event::Msg { sid, subject, payload, .. } => {
//!         assert_eq!(*sid, 1234);
//!         assert_eq!(subject, "the.subject");
//!         assert_eq!(&payload[..], b"hello world!");
//!     }
//!     other => panic!("unexpected event: {:?}", other),
//! }
//! # Ok::<(), nats_proto::Error>(())
//! ```
//!
//! Two interchangeable implementations are provided: [`Parser`], which
//! classifies every byte in a resumable state machine, and
//! [`PrescanParser`], which waits for whole control lines before decoding
//! them. They produce identical event sequences; [`make_parser`] selects
//! one behind the common [`Parse`] trait.
//!
//! Errors are not recoverable: after a protocol error the parser should
//! be discarded and the connection closed. Events queued before the
//! offending byte remain drainable.

pub use crate::error::{Error, Result};
pub use crate::event::Event;
pub use crate::info::ServerInfo;
pub use crate::proto::{make_parser, Backend, Parse, Parser, PrescanParser};
pub use crate::version::{InvalidVersion, Version};

mod error;
mod event;
mod info;
mod proto;
mod version;
