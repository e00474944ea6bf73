//! Line codec for the newline-delimited text protocol
//!
//! The decoder turns an arbitrarily-chunked byte stream into complete text
//! lines; whatever follows the last terminator stays buffered and is never
//! surfaced as a line, not even at EOF. No maximum line length is enforced,
//! matching the reference behavior (a slow-drip client can grow the buffer
//! without bound).

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::messages::ServerText;

/// Protocol codec error
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Codec for the server side of a connection
///
/// Decodes client input into lines (split on `\n`, tolerant of `\r\n`) and
/// encodes [`ServerText`] messages verbatim; each catalog message carries its
/// own terminator.
pub struct ServerCodec;

impl ServerCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ServerCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ServerCodec {
    type Item = String;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(pos) = src.iter().position(|&b| b == b'\n') else {
            return Ok(None);
        };

        let line = src.split_to(pos + 1);
        let line = &line[..pos];
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        // Input is UTF-8-ish; invalid sequences become replacement characters
        Ok(Some(String::from_utf8_lossy(line).into_owned()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(line) => Ok(Some(line)),
            None => {
                // An unterminated trailing fragment is not a line; drop it.
                src.clear();
                Ok(None)
            }
        }
    }
}

impl Encoder<ServerText> for ServerCodec {
    type Error = CodecError;

    fn encode(&mut self, item: ServerText, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(item.to_string().as_bytes());
        Ok(())
    }
}
