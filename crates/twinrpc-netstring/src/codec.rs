//! Netstring framing codec.
//!
//! A frame is the decimal byte count of the payload, a colon, the payload and
//! a trailing comma: `12:hello world!,`.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::NetstringError;

/// Default upper bound for a single payload (10 MiB)
pub const DEFAULT_MAX_FRAME_LEN: usize = 10 * 1024 * 1024;

/// Longest accepted length prefix, in digits
const MAX_PREFIX_DIGITS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    Head,
    Body(usize),
}

#[derive(Debug, Clone)]
pub struct NetstringCodec {
    state: DecodeState,
    max_frame_len: usize,
}

impl NetstringCodec {
    pub fn new() -> Self {
        Self::with_max_frame_len(DEFAULT_MAX_FRAME_LEN)
    }

    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        Self {
            state: DecodeState::Head,
            max_frame_len,
        }
    }

    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }

    /// Parse the length prefix at the front of `src`, if complete.
    fn decode_head(&self, src: &BytesMut) -> Result<Option<(usize, usize)>, NetstringError> {
        let scanned = src.len().min(MAX_PREFIX_DIGITS + 1);
        for (i, byte) in src[..scanned].iter().enumerate() {
            match byte {
                b':' if i == 0 => {
                    return Err(NetstringError::InvalidLength("empty".to_string()));
                }
                b':' => {
                    let digits = &src[..i];
                    if digits.len() > 1 && digits[0] == b'0' {
                        return Err(NetstringError::InvalidLength(
                            "leading zero".to_string(),
                        ));
                    }
                    // Only ASCII digits reach this point
                    let len = digits
                        .iter()
                        .fold(0usize, |acc, d| acc * 10 + usize::from(d - b'0'));
                    if len > self.max_frame_len {
                        return Err(NetstringError::FrameTooLarge {
                            len,
                            max: self.max_frame_len,
                        });
                    }
                    return Ok(Some((i + 1, len)));
                }
                b'0'..=b'9' => {}
                other => {
                    return Err(NetstringError::InvalidLength(format!(
                        "unexpected byte {:#04x}",
                        other
                    )));
                }
            }
        }

        if scanned > MAX_PREFIX_DIGITS {
            return Err(NetstringError::InvalidLength(format!(
                "more than {} digits",
                MAX_PREFIX_DIGITS
            )));
        }
        Ok(None)
    }
}

impl Default for NetstringCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for NetstringCodec {
    type Item = Bytes;
    type Error = NetstringError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.state {
                DecodeState::Head => match self.decode_head(src)? {
                    Some((prefix_len, len)) => {
                        src.advance(prefix_len);
                        src.reserve(len + 1);
                        self.state = DecodeState::Body(len);
                    }
                    None => return Ok(None),
                },
                DecodeState::Body(len) => {
                    if src.len() < len + 1 {
                        return Ok(None);
                    }
                    let terminator = src[len];
                    if terminator != b',' {
                        return Err(NetstringError::MissingTerminator(terminator));
                    }

                    let payload = src.split_to(len).freeze();
                    src.advance(1);
                    self.state = DecodeState::Head;
                    trace!("Decoded netstring frame of {} bytes", len);
                    return Ok(Some(payload));
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() && self.state == DecodeState::Head => Ok(None),
            None => Err(NetstringError::Incomplete),
        }
    }
}

impl Encoder<Bytes> for NetstringCodec {
    type Error = NetstringError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.len() > self.max_frame_len {
            return Err(NetstringError::FrameTooLarge {
                len: item.len(),
                max: self.max_frame_len,
            });
        }

        let prefix = format!("{}:", item.len());
        dst.reserve(prefix.len() + item.len() + 1);
        dst.put_slice(prefix.as_bytes());
        dst.put_slice(&item);
        dst.put_u8(b',');
        Ok(())
    }
}
