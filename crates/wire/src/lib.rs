//! Length-prefixed JSON message framing for stream sockets.
//!
//! This crate implements the wire protocol spoken between palaver peers:
//! each message is one self-describing frame, a 4-byte big-endian unsigned
//! length prefix followed by exactly that many bytes of UTF-8 JSON. The
//! length field always equals the exact byte length of the payload, so
//! frames are self-terminating and an endpoint never reads ahead of a
//! message boundary.
//!
//! Two styles of use are supported:
//!
//! - [`send_message`] / [`recv_message`]: one frame per call, directly on an
//!   `AsyncWrite`/`AsyncRead` stream. Each call owns its accumulation
//!   buffer; nothing carries over between calls.
//! - [`FrameCodec`]: a `tokio_util::codec` encoder/decoder for callers that
//!   drive a `Framed` stream and want message boundaries preserved across a
//!   shared read buffer.
//!
//! The layer is oblivious to message semantics: any JSON-representable value
//! is accepted and returned opaquely to the caller for interpretation.
//! Connection establishment, addressing, TLS, timeouts, and retry policy all
//! belong to the calling application, which hands this crate an
//! already-connected stream.
//!
//! # Example
//!
//! ```no_run
//! use palaver_wire::{recv_message, send_message, Received};
//! use serde_json::json;
//! use tokio::net::TcpStream;
//!
//! async fn greet(mut stream: TcpStream) -> palaver_wire::Result<()> {
//!     send_message(&mut stream, &json!({"kind": "hello"})).await?;
//!
//!     match recv_message(&mut stream).await? {
//!         Received::Message(reply) => println!("peer said {reply}"),
//!         Received::Closed => println!("peer went away"),
//!         Received::Corrupt(e) => println!("peer sent garbage: {e}"),
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod frame;
pub mod stream;

// Re-export commonly used types
pub use error::{Result, WireError};
pub use frame::{FrameCodec, LENGTH_PREFIX_SIZE, MAX_FRAME_SIZE};
pub use stream::{
    Received, recv_message, recv_message_lenient, send_message, send_message_best_effort,
};
