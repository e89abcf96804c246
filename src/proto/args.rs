//! Decoders for CRLF-terminated argument lines.
//!
//! Each decoder takes the argument slice between the verb (and its
//! following spaces) and the CRLF, already accumulated by one of the
//! state machines.

use std::str;

use crate::error::{Error, Protocol};
use crate::proto::frame::PartialMsg;
use crate::Result;

/// `subject SP sid [SP reply_to] SP size`
pub(crate) fn parse_msg_args(line: &[u8]) -> Result<PartialMsg> {
    let tokens = split_tokens(line)?;
    let (reply_to, size_at) = match tokens.len() {
        3 => (String::new(), 2),
        4 => (subject(tokens[2])?, 3),
        _ => return Err(Error::new_protocol(Protocol::Arg)),
    };
    Ok(PartialMsg {
        subject: subject(tokens[0])?,
        sid: parse_u64(tokens[1])?,
        reply_to,
        header_size: None,
        total_size: parse_size(tokens[size_at])?,
    })
}

/// `subject SP sid [SP reply_to] SP header_size SP total_size`
pub(crate) fn parse_hmsg_args(line: &[u8]) -> Result<PartialMsg> {
    let tokens = split_tokens(line)?;
    let (reply_to, header_at) = match tokens.len() {
        4 => (String::new(), 2),
        5 => (subject(tokens[2])?, 3),
        _ => return Err(Error::new_protocol(Protocol::Arg)),
    };
    let header_size = parse_size(tokens[header_at])?;
    let total_size = parse_size(tokens[header_at + 1])?;
    if header_size > total_size {
        return Err(Error::new_protocol(Protocol::Arg));
    }
    Ok(PartialMsg {
        subject: subject(tokens[0])?,
        sid: parse_u64(tokens[1])?,
        reply_to,
        header_size: Some(header_size),
        total_size,
    })
}

/// The `-ERR` argument: a single-quoted message.
///
/// The quotes must be balanced; the inner text is preserved verbatim.
pub(crate) fn parse_err_message(line: &[u8]) -> Result<String> {
    if line.len() < 2 || line[0] != b'\'' || line[line.len() - 1] != b'\'' {
        return Err(Error::new_protocol(Protocol::Quotes));
    }
    let inner = &line[1..line.len() - 1];
    let message = str::from_utf8(inner).map_err(|cause| {
        Error::new_protocol(Protocol::Quotes).with(cause)
    })?;
    Ok(message.to_owned())
}

/// Splits an argument line on single spaces, rejecting empty tokens.
fn split_tokens(line: &[u8]) -> Result<Vec<&[u8]>> {
    if line.is_empty() {
        return Err(Error::new_protocol(Protocol::Arg));
    }
    let mut tokens = Vec::with_capacity(5);
    for token in line.split(|&b| b == b' ') {
        if token.is_empty() {
            return Err(Error::new_protocol(Protocol::Arg));
        }
        tokens.push(token);
    }
    Ok(tokens)
}

/// Validates and copies a subject or reply-subject token.
fn subject(token: &[u8]) -> Result<String> {
    if token.iter().any(u8::is_ascii_whitespace) {
        return Err(Error::new_protocol(Protocol::Arg));
    }
    let subject = str::from_utf8(token)
        .map_err(|cause| Error::new_protocol(Protocol::Arg).with(cause))?;
    Ok(subject.to_owned())
}

/// Decodes a decimal unsigned integer, digits only.
pub(crate) fn parse_u64(token: &[u8]) -> Result<u64> {
    debug_assert!(!token.is_empty());
    let mut value: u64 = 0;
    for &b in token {
        let digit = match b {
            b'0'..=b'9' => u64::from(b - b'0'),
            _ => return Err(Error::new_protocol(Protocol::Int)),
        };
        value = value
            .checked_mul(10)
            .and_then(|value| value.checked_add(digit))
            .ok_or_else(|| Error::new_protocol(Protocol::Int))?;
    }
    Ok(value)
}

fn parse_size(token: &[u8]) -> Result<usize> {
    use std::convert::TryFrom;

    let value = parse_u64(token)?;
    usize::try_from(value).map_err(|_| Error::new_protocol(Protocol::Int))
}
