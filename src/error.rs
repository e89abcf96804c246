//! Error and Result module.

use std::error::Error as StdError;
use std::fmt;

/// Result type often returned from methods that can have `nats-proto` `Error`s.
pub type Result<T> = std::result::Result<T, Error>;

type Cause = Box<dyn StdError + Send + Sync>;

/// Represents errors that can occur while parsing the NATS wire protocol.
pub struct Error {
    inner: Box<ErrorImpl>,
}

struct ErrorImpl {
    kind: Kind,
    cause: Option<Cause>,
}

#[derive(Debug)]
pub(crate) enum Kind {
    /// Bytes violated the protocol grammar.
    Protocol(Protocol),
    /// `feed` was called after `close`.
    Closed,
}

#[derive(Debug)]
pub(crate) enum Protocol {
    /// A byte that does not begin or continue any known verb.
    Verb,
    /// A malformed argument line: wrong token count, an empty token, or
    /// whitespace inside a subject.
    Arg,
    /// A sid or size field that is not a decimal unsigned integer.
    Int,
    /// A `-ERR` argument without balanced single quotes.
    Quotes,
    /// An `INFO` argument that is not the expected JSON object.
    Json,
    /// An `HMSG` header block that does not end in CRLF CRLF.
    HeaderTerminator,
    /// A payload that is not followed by CRLF.
    PayloadTerminator,
    /// A stray byte where a control line's LF was expected.
    Line,
    /// A control line that exceeded the length cap with no CRLF in sight.
    TooLong,
}

impl Error {
    pub(crate) fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(ErrorImpl { kind, cause: None }),
        }
    }

    pub(crate) fn with<C: Into<Cause>>(mut self, cause: C) -> Error {
        self.inner.cause = Some(cause.into());
        self
    }

    pub(crate) fn new_protocol(reason: Protocol) -> Error {
        Error::new(Kind::Protocol(reason))
    }

    pub(crate) fn new_closed() -> Error {
        Error::new(Kind::Closed)
    }

    /// Returns true if the parsed bytes violated the protocol grammar.
    pub fn is_protocol(&self) -> bool {
        matches!(self.inner.kind, Kind::Protocol(_))
    }

    /// Returns true if `feed` was called on a closed parser.
    pub fn is_closed(&self) -> bool {
        matches!(self.inner.kind, Kind::Closed)
    }

    /// Consumes the error, returning its cause.
    pub fn into_cause(self) -> Option<Box<dyn StdError + Send + Sync>> {
        self.inner.cause
    }

    fn description(&self) -> &str {
        match self.inner.kind {
            Kind::Protocol(_) => "nats: protocol error",
            Kind::Closed => "nats: parser closed",
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_tuple("nats_proto::Error");
        f.field(&self.inner.kind);
        if let Some(ref cause) = self.inner.cause {
            f.field(cause);
        }
        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref cause) = self.inner.cause {
            write!(f, "{}: {}", self.description(), cause)
        } else {
            f.write_str(self.description())
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .cause
            .as_ref()
            .map(|cause| &**cause as &(dyn StdError + 'static))
    }
}

impl From<Protocol> for Error {
    fn from(reason: Protocol) -> Error {
        Error::new_protocol(reason)
    }
}

#[doc(hidden)]
trait AssertSendSync: Send + Sync + 'static {}
#[doc(hidden)]
impl AssertSendSync for Error {}
