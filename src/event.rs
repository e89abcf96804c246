//! Typed protocol events handed to the consumer.

use bytes::Bytes;

use crate::info::ServerInfo;

/// A discrete protocol event produced by a parser.
///
/// Events are queued in the order their terminating CRLF (or, for message
/// events, final payload CRLF) appears on the wire, and handed out by
/// [`drain_events`](crate::Parse::drain_events). `payload` and `header`
/// buffers are owned; the consumer may retain them freely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// `+OK`.
    Ok,
    /// `PING`.
    Ping,
    /// `PONG`.
    Pong,
    /// `-ERR 'message'`.
    Err {
        /// The error message with the surrounding single quotes stripped.
        /// Case and inner content are preserved verbatim.
        message: String,
    },
    /// `MSG`: a message delivered to a subscription.
    Msg {
        /// Subscription identifier.
        sid: u64,
        /// Subject the message was published to.
        subject: String,
        /// Reply subject, empty when the control line carried none.
        reply_to: String,
        /// Message body, exactly the declared number of bytes.
        payload: Bytes,
    },
    /// `HMSG`: a message with headers.
    HMsg {
        /// Subscription identifier.
        sid: u64,
        /// Subject the message was published to.
        subject: String,
        /// Reply subject, empty when the control line carried none.
        reply_to: String,
        /// The header block with its trailing `\r\n\r\n` terminator
        /// stripped.
        header: Bytes,
        /// Message body: the declared total minus the header block.
        payload: Bytes,
    },
    /// `INFO`: structured server information.
    Info(Box<ServerInfo>),
}
