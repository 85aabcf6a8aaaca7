//! Sluice Core
//!
//! Frame and policy primitives shared by the Sluice crates.
//!
//! This crate provides:
//! - WebSocket frame values and their wire header ([`Frame`], [`OpCode`])
//! - Outbound message policy ([`WebSocketPolicy`])
//! - Reusable byte region supply ([`BufferPool`])

pub mod error;
pub mod frame;
pub mod policy;
pub mod pool;

pub use error::{Error, Result};
pub use frame::{Frame, OpCode};
pub use policy::WebSocketPolicy;
pub use pool::{ArrayBufferPool, BufferPool, HeapBufferPool};

/// Default per-frame payload capacity for binary message streams
pub const DEFAULT_MAX_BINARY_MESSAGE_BUFFER_SIZE: usize = 32 * 1024;

/// Largest payload a control frame may carry
pub const MAX_CONTROL_PAYLOAD: usize = 125;
