//! RESP Wire Format Module
//!
//! Command frame encoder and reply decoder for the Redis serialization
//! protocol. Requests are arrays of bulk strings; replies are decoded by
//! branching on their first byte.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::error::{CacheError, Result};

// == Reply ==
/// A single decoded server reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reply {
    /// `+` simple string (line without the CRLF)
    Simple(String),
    /// `:` integer
    Integer(i64),
    /// `$` bulk string payload
    Bulk(Vec<u8>),
    /// `$-1` null bulk string, the wire-level miss signal
    Null,
}

// == Command Encoding ==
/// Encodes a command as an array-of-bulk-strings frame:
/// `*<n>\r\n` followed by `$<len>\r\n<bytes>\r\n` per token.
///
/// Tokens are raw bytes with a length prefix, so payloads may contain
/// any byte sequence, including embedded CRLF.
pub(crate) fn encode_command(args: &[&[u8]]) -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(format!("*{}\r\n", args.len()).as_bytes());
    for arg in args {
        frame.extend_from_slice(format!("${}\r\n", arg.len()).as_bytes());
        frame.extend_from_slice(arg);
        frame.extend_from_slice(b"\r\n");
    }
    frame
}

// == Reply Decoding ==
/// Reads exactly one reply from the stream.
///
/// The first byte selects the reply kind. An error reply (`-`) surfaces
/// as [`CacheError::Protocol`] carrying the peer's error text; an
/// unrecognized leading byte or malformed length is a framing error --
/// fail fast, no resynchronization is attempted.
///
/// Bulk payloads are read by their declared byte count, never line by
/// line, since arbitrary bytes are valid payload content. The mandatory
/// CRLF after the payload is consumed and verified so the connection is
/// reusable for the next command.
pub(crate) async fn read_reply<R>(reader: &mut R) -> Result<Reply>
where
    R: AsyncBufRead + Unpin,
{
    let line = read_header_line(reader).await?;
    let tag = line[0];
    let rest = &line[1..];

    match tag {
        b'+' => Ok(Reply::Simple(String::from_utf8_lossy(rest).into_owned())),
        b'-' => Err(CacheError::Protocol(
            String::from_utf8_lossy(rest).into_owned(),
        )),
        b':' => {
            let value = parse_decimal(rest, "integer reply")?;
            Ok(Reply::Integer(value))
        }
        b'$' => {
            let len = parse_decimal(rest, "bulk length")?;
            // -1 is the null marker; any other negative length is corrupt
            if len == -1 {
                return Ok(Reply::Null);
            }
            if len < 0 {
                return Err(CacheError::Protocol(format!(
                    "malformed bulk length: {}",
                    len
                )));
            }

            let mut data = vec![0u8; len as usize];
            reader.read_exact(&mut data).await?;

            // Mandatory trailing CRLF after the payload
            let mut crlf = [0u8; 2];
            reader.read_exact(&mut crlf).await?;
            if &crlf != b"\r\n" {
                return Err(CacheError::Protocol(
                    "bulk reply missing trailing CRLF".to_string(),
                ));
            }

            Ok(Reply::Bulk(data))
        }
        other => Err(CacheError::Protocol(format!(
            "unexpected reply type: 0x{:02x}",
            other
        ))),
    }
}

/// Reads one CRLF-terminated header line, stripped of its terminator.
async fn read_header_line<R>(reader: &mut R) -> Result<Vec<u8>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let n = reader.read_until(b'\n', &mut line).await?;
    if n == 0 {
        return Err(CacheError::Connection(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection closed while awaiting reply",
        )));
    }

    while matches!(line.last(), Some(b'\r') | Some(b'\n')) {
        line.pop();
    }
    if line.is_empty() {
        return Err(CacheError::Protocol("empty reply line".to_string()));
    }
    Ok(line)
}

/// Parses a decimal integer from a header-line fragment.
fn parse_decimal(bytes: &[u8], what: &str) -> Result<i64> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .ok_or_else(|| {
            CacheError::Protocol(format!(
                "malformed {}: {}",
                what,
                String::from_utf8_lossy(bytes)
            ))
        })
}
