//! # Frame Codec
//!
//! Delimiter-based transport framing for encoded message records.
//!
//! A frame is one encoded record followed by a single `\n` byte. The codec
//! never inspects record contents; it only splits inbound bytes at the
//! delimiter and appends the delimiter to outbound records.
//!
//! The delimiter is safe only because the record encoding guarantees it never
//! emits a raw `0x0A`: compact JSON escapes newlines inside strings and
//! renders byte payloads as number arrays. That guarantee belongs to the
//! encoder, not to this framing; swapping in an encoder without it would
//! desynchronize framing and would call for length-prefixed frames instead
//! (a wire-format change).

use crate::config::{FRAME_DELIMITER, MAX_FRAME_SIZE};
use crate::error::SubError;
use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Tokio codec splitting a byte stream into delimiter-terminated frames.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameCodec;

impl Decoder for FrameCodec {
    type Item = Bytes;
    type Error = SubError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, SubError> {
        match src.iter().position(|&b| b == FRAME_DELIMITER) {
            Some(pos) => {
                let mut frame = src.split_to(pos + 1);
                frame.truncate(pos); // strip the delimiter
                Ok(Some(frame.freeze()))
            }
            None if src.len() > MAX_FRAME_SIZE => {
                Err(SubError::Transport(format!(
                    "frame exceeds {MAX_FRAME_SIZE} bytes without a delimiter"
                )))
            }
            None => Ok(None),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, SubError> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => Err(SubError::Transport(
                "stream closed before frame delimiter".to_string(),
            )),
        }
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = SubError;

    fn encode(&mut self, record: Bytes, dst: &mut BytesMut) -> Result<(), SubError> {
        dst.reserve(record.len() + 1);
        dst.put(record);
        dst.put_u8(FRAME_DELIMITER);
        Ok(())
    }
}
