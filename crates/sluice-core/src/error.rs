//! Error types for Sluice core

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Opcode value not defined by RFC 6455
    #[error("unknown opcode: 0x{0:x}")]
    UnknownOpCode(u8),

    /// Control frame payload over the 125 byte limit
    #[error("control frame payload too large: {0} bytes (max 125)")]
    ControlPayloadTooLarge(usize),

    /// Control frame without the final marker
    #[error("control frame {0:?} must not be fragmented")]
    FragmentedControlFrame(crate::OpCode),

    /// Rejected policy value
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),
}
