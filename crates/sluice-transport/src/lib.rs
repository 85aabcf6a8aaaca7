//! Sluice Transport Layer
//!
//! This crate provides the outgoing side of a connection:
//! - The [`OutgoingFrames`] submit interface and its single-shot
//!   completion signal ([`write_callback`])
//! - A task-backed [`FrameWriter`] that writes frames one at a time
//! - Frame sinks for raw byte streams and WebSocket (tokio-tungstenite)

pub mod callback;
pub mod error;
pub mod sink;
pub mod traits;
pub mod writer;

pub use callback::{write_callback, FutureWriteCallback, WriteCallback, WriteFailure};
pub use error::{Result, TransportError};
pub use sink::{FrameSink, RawFrameSink};
pub use traits::OutgoingFrames;
pub use writer::FrameWriter;

#[cfg(feature = "websocket")]
pub use sink::WebSocketFrameSink;
