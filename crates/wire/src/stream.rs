//! One-frame-per-call send and receive over a stream socket.
//!
//! These are the two operations the rest of the system is built on: a sender
//! that writes one message as one flushed frame, and a receiver that
//! accumulates exactly one frame, tolerating the partial deliveries inherent
//! to stream sockets. Each call owns its accumulation buffer for its
//! duration; nothing is carried over between calls, so a caller that wants
//! partial frames preserved across polls on a shared buffer uses
//! [`FrameCodec`](crate::FrameCodec) instead.
//!
//! Both operations complete inline on the calling task and spawn nothing. No
//! timeout is imposed at this layer: a receive waits indefinitely for a peer
//! that sends a header but withholds the body, and callers needing a bound
//! apply `tokio::time::timeout` or socket options themselves. The only
//! cancellation is closing the socket, which a blocked read observes as
//! closure.

use crate::error::{Result, WireError};
use crate::frame::LENGTH_PREFIX_SIZE;
use serde::Serialize;
use serde_json::Value;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Outcome of one receive call.
#[derive(Debug)]
pub enum Received {
    /// A complete, well-formed message.
    Message(Value),
    /// The peer closed the connection before a full frame arrived. Covers
    /// clean closure before the first byte as well as closure mid-header or
    /// mid-body.
    Closed,
    /// A full frame arrived but its payload was not valid UTF-8 JSON.
    Corrupt(serde_json::Error),
}

impl Received {
    /// Collapse the outcome into "message or nothing".
    ///
    /// Callers that do not care why no message was available treat every
    /// non-[`Message`](Self::Message) outcome as absence.
    #[must_use]
    pub fn into_message(self) -> Option<Value> {
        match self {
            Self::Message(value) => Some(value),
            Self::Closed | Self::Corrupt(_) => None,
        }
    }

    /// Whether the peer closed the connection.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Send one message as one frame, flushing it to the transport.
///
/// The message is encoded as UTF-8 JSON with non-ASCII characters preserved
/// verbatim, prefixed with its exact byte length as a 4-byte big-endian
/// unsigned integer, and written as a single contiguous buffer. All frame
/// bytes are handed to the transport before this returns.
///
/// Concurrent senders on one socket must be serialized externally or their
/// frames can interleave.
///
/// # Errors
///
/// Returns [`WireError::Encode`] if the message cannot be serialized,
/// [`WireError::PayloadTooLarge`] if the encoded payload exceeds what the
/// length prefix can describe, or [`WireError::Io`] on a transport failure.
pub async fn send_message<W, T>(stream: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_vec(message).map_err(WireError::Encode)?;
    let len = u32::try_from(payload.len()).map_err(|_| WireError::PayloadTooLarge {
        size: payload.len(),
    })?;

    let mut frame = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&payload);

    stream.write_all(&frame).await?;
    stream.flush().await?;

    debug!("Sent frame with {} byte payload", payload.len());
    Ok(())
}

/// Send one message, absorbing any failure into a diagnostic.
///
/// Transmission failures are non-fatal here: the error is logged and the
/// call returns normally, so a broadcast loop keeps going when one peer is
/// gone. Callers that need delivery feedback use [`send_message`].
pub async fn send_message_best_effort<W, T>(stream: &mut W, message: &T)
where
    W: AsyncWrite + Unpin + ?Sized,
    T: Serialize + ?Sized,
{
    if let Err(e) = send_message(stream, message).await {
        warn!("Failed to send message: {}", e);
    }
}

/// Receive one frame and decode it into a message.
///
/// Reads exactly four header bytes, then exactly as many payload bytes as
/// the header declares, accumulating across however many partial reads the
/// transport delivers. Peer closure at any point yields
/// `Ok(Received::Closed)` and a payload that does not parse as JSON yields
/// `Ok(Received::Corrupt)`, so a read loop can poll one connection until it
/// sees `Closed` without special-casing.
///
/// No length cap is imposed: the prefix can declare up to `u32::MAX` bytes.
/// Callers needing a smaller bound validate the declared length themselves
/// or run a [`FrameCodec`](crate::FrameCodec) with a cap.
///
/// # Errors
///
/// Returns [`WireError::Io`] only for transport faults other than closure.
pub async fn recv_message<R>(stream: &mut R) -> Result<Received>
where
    R: AsyncRead + Unpin + ?Sized,
{
    // Read length prefix (4 bytes).
    let mut header = [0u8; LENGTH_PREFIX_SIZE];
    match stream.read_exact(&mut header).await {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            debug!("Connection closed before a full header arrived");
            return Ok(Received::Closed);
        }
        Err(e) => return Err(e.into()),
    }

    let payload_len = u32::from_be_bytes(header) as usize;

    // Read message data.
    let mut payload = vec![0u8; payload_len];
    match stream.read_exact(&mut payload).await {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            debug!("Connection closed inside a {} byte payload", payload_len);
            return Ok(Received::Closed);
        }
        Err(e) => return Err(e.into()),
    }

    match serde_json::from_slice(&payload) {
        Ok(value) => {
            debug!("Received frame with {} byte payload", payload_len);
            Ok(Received::Message(value))
        }
        Err(e) => Ok(Received::Corrupt(e)),
    }
}

/// Receive one frame, collapsing every failure into absence.
///
/// Clean closure, abrupt closure mid-frame, malformed payloads, and
/// transport faults all come back as `None`; the log is the only diagnostic
/// a caller gets beyond that. This is the shape a resilient read loop wants:
/// poll until `None`, then drop the connection. Callers that need to tell
/// the outcomes apart use [`recv_message`].
pub async fn recv_message_lenient<R>(stream: &mut R) -> Option<Value>
where
    R: AsyncRead + Unpin + ?Sized,
{
    match recv_message(stream).await {
        Ok(Received::Corrupt(e)) => {
            warn!("Discarding undecodable payload: {}", e);
            None
        }
        Ok(received) => received.into_message(),
        Err(e) => {
            warn!("Failed to receive message: {}", e);
            None
        }
    }
}
