//! Length-prefixed payload framing for `MSG` and `HMSG`.

use bytes::BytesMut;

use super::{CRLF, HEADER_TERMINATOR};
use crate::error::{Error, Protocol};
use crate::event::Event;
use crate::Result;

/// The decoded arguments of a `MSG` or `HMSG` control line, waiting for
/// its payload bytes to arrive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct PartialMsg {
    pub(crate) sid: u64,
    pub(crate) subject: String,
    pub(crate) reply_to: String,
    /// Declared header block length; `None` for `MSG`.
    pub(crate) header_size: Option<usize>,
    /// Declared length of the whole body region (header block included).
    pub(crate) total_size: usize,
}

impl PartialMsg {
    /// Bytes that must be buffered before the frame can complete: the
    /// declared total plus the trailing CRLF.
    pub(crate) fn needed(&self) -> usize {
        self.total_size + CRLF.len()
    }

    /// Splits the completed frame off the front of `buf` and produces its
    /// event.
    ///
    /// The caller must have checked `buf.len() >= self.needed()`. The
    /// payload is never scanned; the CRLF terminator is asserted only at
    /// `[total, total + 2)`, and for `HMSG` the header block must end in
    /// `\r\n\r\n`, which is stripped from the emitted header.
    pub(crate) fn complete(self, buf: &mut BytesMut) -> Result<Event> {
        debug_assert!(buf.len() >= self.needed());
        let mut body = buf.split_to(self.total_size);
        let terminator = buf.split_to(CRLF.len());
        if terminator[..] != *CRLF {
            return Err(Error::new_protocol(Protocol::PayloadTerminator));
        }
        match self.header_size {
            None => Ok(Event::Msg {
                sid: self.sid,
                subject: self.subject,
                reply_to: self.reply_to,
                payload: body.freeze(),
            }),
            Some(header_size) => {
                let mut header = body.split_to(header_size);
                if !header.ends_with(HEADER_TERMINATOR) {
                    return Err(Error::new_protocol(Protocol::HeaderTerminator));
                }
                header.truncate(header.len() - HEADER_TERMINATOR.len());
                Ok(Event::HMsg {
                    sid: self.sid,
                    subject: self.subject,
                    reply_to: self.reply_to,
                    header: header.freeze(),
                    payload: body.freeze(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(header_size: Option<usize>, total_size: usize) -> PartialMsg {
        PartialMsg {
            sid: 9,
            subject: "the.subject".to_owned(),
            reply_to: String::new(),
            header_size,
            total_size,
        }
    }

    #[test]
    fn completes_a_msg_frame() {
        let mut buf = BytesMut::from(&b"hello world!\r\ntrailing"[..]);
        let event = partial(None, 12).complete(&mut buf).unwrap();
        match event {
            Event::Msg { payload, .. } => assert_eq!(&payload[..], b"hello world!"),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(&buf[..], b"trailing");
    }

    #[test]
    fn splits_header_from_body() {
        let mut buf = BytesMut::from(&b"NATS/1.0\r\nA: B\r\n\r\nhello world!\r\n"[..]);
        let event = partial(Some(18), 30).complete(&mut buf).unwrap();
        match event {
            Event::HMsg {
                header, payload, ..
            } => {
                assert_eq!(&header[..], b"NATS/1.0\r\nA: B");
                assert_eq!(&payload[..], b"hello world!");
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn rejects_missing_payload_crlf() {
        let mut buf = BytesMut::from(&b"hello world!xx"[..]);
        let err = partial(None, 12).complete(&mut buf).unwrap_err();
        assert!(err.is_protocol());
    }

    #[test]
    fn rejects_unterminated_header_block() {
        let mut buf = BytesMut::from(&b"10000\r\n"[..]);
        let err = partial(Some(5), 5).complete(&mut buf).unwrap_err();
        assert!(err.is_protocol());
    }

    #[test]
    fn rejects_header_block_shorter_than_its_terminator() {
        let mut buf = BytesMut::from(&b"ab\r\n"[..]);
        let err = partial(Some(2), 2).complete(&mut buf).unwrap_err();
        assert!(err.is_protocol());
    }
}
