//! Frame sinks
//!
//! A [`FrameSink`] puts one frame on the wire at a time. [`FrameWriter`]
//! drives a sink from its own task.
//!
//! [`FrameWriter`]: crate::FrameWriter

use async_trait::async_trait;
use sluice_core::Frame;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::Result;

/// Destination for encoded frames
#[async_trait]
pub trait FrameSink: Send {
    /// Write a frame and return once it has been handed to the connection
    async fn write_frame(&mut self, frame: &Frame) -> Result<()>;
}

/// Writes unmasked RFC 6455 frames to any byte stream
pub struct RawFrameSink<W> {
    io: W,
}

impl<W> RawFrameSink<W> {
    pub fn new(io: W) -> Self {
        Self { io }
    }

    pub fn into_inner(self) -> W {
        self.io
    }
}

#[async_trait]
impl<W> FrameSink for RawFrameSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let encoded = frame.encode()?;
        self.io.write_all(&encoded).await?;
        self.io.flush().await?;
        Ok(())
    }
}

#[cfg(feature = "websocket")]
pub use self::websocket::WebSocketFrameSink;

#[cfg(feature = "websocket")]
mod websocket {
    use async_trait::async_trait;
    use futures_util::{Sink, SinkExt};
    use sluice_core::{Frame, OpCode};
    use tokio_tungstenite::tungstenite::{
        protocol::{
            frame::{
                coding::{CloseCode, Data, OpCode as WsOpCode},
                Frame as WsFrame,
            },
            CloseFrame,
        },
        Error as WsError, Message as WsMessage,
    };

    use super::FrameSink;
    use crate::error::{Result, TransportError};

    /// Sends frames through a tungstenite message sink
    ///
    /// Data frames are passed as raw `Message::Frame` values so fragmentation
    /// is preserved on the wire; tungstenite applies the client mask when the
    /// underlying stream is a client. Control frames go through the matching
    /// control message.
    pub struct WebSocketFrameSink<T> {
        inner: T,
    }

    impl<T> WebSocketFrameSink<T> {
        pub fn new(inner: T) -> Self {
            Self { inner }
        }

        pub fn into_inner(self) -> T {
            self.inner
        }
    }

    fn data_frame(frame: &Frame, data: Data) -> WsMessage {
        WsMessage::Frame(WsFrame::message(
            frame.payload.to_vec(),
            WsOpCode::Data(data),
            frame.fin,
        ))
    }

    fn close_frame(payload: &[u8]) -> Result<Option<CloseFrame<'static>>> {
        if payload.len() < 2 {
            return Ok(None);
        }
        let code = u16::from_be_bytes([payload[0], payload[1]]);
        let reason = String::from_utf8(payload[2..].to_vec())
            .map_err(|e| TransportError::Other(format!("close reason is not utf-8: {}", e)))?;

        Ok(Some(CloseFrame {
            code: CloseCode::from(code),
            reason: reason.into(),
        }))
    }

    fn to_message(frame: &Frame) -> Result<WsMessage> {
        frame.validate()?;
        let message = match frame.opcode {
            OpCode::Continuation => data_frame(frame, Data::Continue),
            OpCode::Text => data_frame(frame, Data::Text),
            OpCode::Binary => data_frame(frame, Data::Binary),
            OpCode::Ping => WsMessage::Ping(frame.payload.to_vec()),
            OpCode::Pong => WsMessage::Pong(frame.payload.to_vec()),
            OpCode::Close => WsMessage::Close(close_frame(&frame.payload)?),
        };
        Ok(message)
    }

    #[async_trait]
    impl<T> FrameSink for WebSocketFrameSink<T>
    where
        T: Sink<WsMessage, Error = WsError> + Unpin + Send,
    {
        async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
            let message = to_message(frame)?;
            self.inner.send(message).await?;
            Ok(())
        }
    }

}
