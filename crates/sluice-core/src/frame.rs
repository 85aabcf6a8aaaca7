//! WebSocket frame values and header encoding
//!
//! Outbound frame layout (RFC 6455, server role, unmasked):
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ Byte 0:     [7]   FIN                                           │
//! │             [6:4] RSV1-3 (always 0, no extensions)              │
//! │             [3:0] Opcode                                        │
//! │ Byte 1:     [7]   MASK (0)                                      │
//! │             [6:0] Payload length (0-125, 126 = u16, 127 = u64)  │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ [If len == 126] Bytes 2-3: Payload length (uint16 big-endian)   │
//! │ [If len == 127] Bytes 2-9: Payload length (uint64 big-endian)   │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ Payload                                                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use crate::{Error, Result, MAX_CONTROL_PAYLOAD};
use bytes::{BufMut, Bytes, BytesMut};

/// Smallest frame header
pub const MIN_HEADER_SIZE: usize = 2;

/// Largest frame header (unmasked)
pub const MAX_HEADER_SIZE: usize = 10;

const FIN_BIT: u8 = 0x80;

/// Frame opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    Continuation = 0x0,
    Text = 0x1,
    Binary = 0x2,
    Close = 0x8,
    Ping = 0x9,
    Pong = 0xA,
}

impl OpCode {
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0x0 => Ok(OpCode::Continuation),
            0x1 => Ok(OpCode::Text),
            0x2 => Ok(OpCode::Binary),
            0x8 => Ok(OpCode::Close),
            0x9 => Ok(OpCode::Ping),
            0xA => Ok(OpCode::Pong),
            other => Err(Error::UnknownOpCode(other)),
        }
    }

    pub fn is_control(self) -> bool {
        (self as u8) & 0x08 != 0
    }

    /// Text or Binary: the opcodes that may start a message
    pub fn is_data(self) -> bool {
        matches!(self, OpCode::Text | OpCode::Binary)
    }
}

/// A single outbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub fin: bool,
    pub opcode: OpCode,
    pub payload: Bytes,
}

impl Frame {
    /// Create a final frame with an empty payload
    pub fn new(opcode: OpCode) -> Self {
        Self {
            fin: true,
            opcode,
            payload: Bytes::new(),
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn with_fin(mut self, fin: bool) -> Self {
        self.fin = fin;
        self
    }

    /// Header size for a payload of the given length
    pub fn header_len(payload_len: usize) -> usize {
        match payload_len {
            0..=125 => MIN_HEADER_SIZE,
            126..=0xFFFF => MIN_HEADER_SIZE + 2,
            _ => MAX_HEADER_SIZE,
        }
    }

    /// Total encoded size
    pub fn size(&self) -> usize {
        Self::header_len(self.payload.len()) + self.payload.len()
    }

    /// Check control frame constraints
    pub fn validate(&self) -> Result<()> {
        if self.opcode.is_control() {
            if !self.fin {
                return Err(Error::FragmentedControlFrame(self.opcode));
            }
            if self.payload.len() > MAX_CONTROL_PAYLOAD {
                return Err(Error::ControlPayloadTooLarge(self.payload.len()));
            }
        }
        Ok(())
    }

    /// Encode frame to bytes
    pub fn encode(&self) -> Result<Bytes> {
        self.validate()?;

        let len = self.payload.len();
        let mut buf = BytesMut::with_capacity(self.size());

        let mut first = self.opcode as u8;
        if self.fin {
            first |= FIN_BIT;
        }
        buf.put_u8(first);

        match len {
            0..=125 => buf.put_u8(len as u8),
            126..=0xFFFF => {
                buf.put_u8(126);
                buf.put_u16(len as u16);
            }
            _ => {
                buf.put_u8(127);
                buf.put_u64(len as u64);
            }
        }

        buf.extend_from_slice(&self.payload);

        Ok(buf.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_classes() {
        assert!(OpCode::Ping.is_control());
        assert!(OpCode::Close.is_control());
        assert!(!OpCode::Continuation.is_control());
        assert!(OpCode::Binary.is_data());
        assert!(!OpCode::Continuation.is_data());
    }

    #[test]
    fn test_opcode_reserved() {
        assert_eq!(OpCode::from_u8(0x2), Ok(OpCode::Binary));
        assert_eq!(OpCode::from_u8(0x3), Err(Error::UnknownOpCode(0x3)));
        assert_eq!(OpCode::from_u8(0xB), Err(Error::UnknownOpCode(0xB)));
    }

    #[test]
    fn test_header_len_boundaries() {
        assert_eq!(Frame::header_len(0), 2);
        assert_eq!(Frame::header_len(125), 2);
        assert_eq!(Frame::header_len(126), 4);
        assert_eq!(Frame::header_len(65535), 4);
        assert_eq!(Frame::header_len(65536), 10);
    }

    #[test]
    fn test_encode_continuation_not_final() {
        let frame = Frame::new(OpCode::Continuation)
            .with_payload(&b"abc"[..])
            .with_fin(false);

        let encoded = frame.encode().unwrap();
        assert_eq!(&encoded[..], &[0x00, 0x03, b'a', b'b', b'c']);
    }

    #[test]
    fn test_fragmented_ping_rejected() {
        let frame = Frame::new(OpCode::Ping).with_fin(false);
        assert_eq!(
            frame.encode(),
            Err(Error::FragmentedControlFrame(OpCode::Ping))
        );
    }
}
