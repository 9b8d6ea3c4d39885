//! Frame layout and a codec for pipelined decoding.
//!
//! A frame is a 4-byte big-endian unsigned length followed by exactly that
//! many bytes of UTF-8 JSON. No padding, no terminator, no checksum: the
//! length prefix is the entire header, and it always equals the exact byte
//! length of the payload, so frames are self-terminating.

use crate::error::WireError;
use bytes::{Buf, BufMut, BytesMut};
use serde_json::Value;
use std::io;
use tokio_util::codec::{Decoder, Encoder};

/// Width of the length prefix that opens every frame.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Default payload cap applied by [`FrameCodec`] (10MB).
pub const MAX_FRAME_SIZE: usize = 10 * 1024 * 1024;

/// Codec for encoding/decoding message frames on a shared buffer.
///
/// [`recv_message`](crate::recv_message) starts a fresh accumulation on
/// every call; this codec instead holds partial frames in the `Framed` read
/// buffer across polls, for callers that pipeline many messages over one
/// connection. Unlike the per-call receive, the codec treats an undecodable
/// payload as a stream error rather than tolerating it.
pub struct FrameCodec {
    max_frame_size: usize,
}

impl FrameCodec {
    /// Create a new frame codec with the default size cap.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_frame_size: MAX_FRAME_SIZE,
        }
    }

    /// Create a codec with a custom max frame size.
    #[must_use]
    pub const fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = Value;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> io::Result<Option<Value>> {
        if buf.len() < LENGTH_PREFIX_SIZE {
            return Ok(None);
        }

        // Parse the length without consuming it until the frame is whole.
        let mut header = &buf[..LENGTH_PREFIX_SIZE];
        let payload_len = header.get_u32() as usize;

        if payload_len > self.max_frame_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                WireError::FrameTooLarge {
                    size: payload_len,
                    max: self.max_frame_size,
                },
            ));
        }

        let frame_len = LENGTH_PREFIX_SIZE + payload_len;
        if buf.len() < frame_len {
            // Reserve space for the rest of the frame.
            buf.reserve(frame_len - buf.len());
            return Ok(None);
        }

        buf.advance(LENGTH_PREFIX_SIZE);
        let payload = buf.split_to(payload_len);

        let value = serde_json::from_slice(&payload)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        Ok(Some(value))
    }
}

impl Encoder<Value> for FrameCodec {
    type Error = io::Error;

    fn encode(&mut self, message: Value, buf: &mut BytesMut) -> io::Result<()> {
        let payload = serde_json::to_vec(&message)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, WireError::Encode(e)))?;

        if payload.len() > self.max_frame_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                WireError::FrameTooLarge {
                    size: payload.len(),
                    max: self.max_frame_size,
                },
            ));
        }

        let len = u32::try_from(payload.len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                WireError::PayloadTooLarge {
                    size: payload.len(),
                },
            )
        })?;

        buf.reserve(LENGTH_PREFIX_SIZE + payload.len());
        buf.put_u32(len);
        buf.extend_from_slice(&payload);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_frame_roundtrip() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();

        let message = json!({"kind": "chat", "body": "hello", "seq": 7});

        codec.encode(message.clone(), &mut buf).unwrap();
        let decoded = codec.decode(&mut buf).unwrap().unwrap();

        assert_eq!(decoded, message);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_partial_frame() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();

        // A header declaring 100 bytes, with no payload behind it.
        buf.put_u32(100);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        // Some of the payload arrives; still not enough.
        buf.extend_from_slice(&[b'x'; 40]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_partial_header() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();

        buf.extend_from_slice(&[0, 0]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_pipelined_frames() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();

        codec.encode(json!({"seq": 1}), &mut buf).unwrap();
        codec.encode(json!({"seq": 2}), &mut buf).unwrap();

        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), json!({"seq": 1}));
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), json!({"seq": 2}));
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_oversized_frame_rejected_on_decode() {
        let mut codec = FrameCodec::new().with_max_frame_size(16);
        let mut buf = BytesMut::new();

        buf.put_u32(17);
        let err = codec.decode(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_oversized_frame_rejected_on_encode() {
        let mut codec = FrameCodec::new().with_max_frame_size(8);
        let mut buf = BytesMut::new();

        let err = codec
            .encode(json!({"body": "far too long for the cap"}), &mut buf)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_undecodable_payload_is_an_error() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();

        buf.put_u32(5);
        buf.extend_from_slice(b"notjs");

        let err = codec.decode(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
