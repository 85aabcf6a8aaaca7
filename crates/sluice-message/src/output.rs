//! Blocking message output stream

use parking_lot::Mutex;
use sluice_core::{BufferPool, Frame, OpCode, WebSocketPolicy};
use sluice_transport::{write_callback, OutgoingFrames};
use std::io;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::error::{Result, StreamError};
use crate::fragment::FragmentBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamStatus {
    Open,
    /// A flush failed; what reached the peer is unknown
    Broken,
    Closed,
}

struct StreamState {
    buffer: FragmentBuffer,
    opcode: OpCode,
    frames_sent: u64,
    status: StreamStatus,
}

impl StreamState {
    fn ensure_open(&self) -> Result<()> {
        match self.status {
            StreamStatus::Open => Ok(()),
            StreamStatus::Broken => Err(StreamError::Broken),
            StreamStatus::Closed => Err(StreamError::Closed),
        }
    }
}

/// Outbound binary message written as a byte stream
///
/// Bytes are collected in a buffer of `max_binary_message_buffer_size` and
/// emitted as one frame whenever the buffer is full and more bytes arrive, on
/// [`flush`](Self::flush), and on [`close`](Self::close), which sends the
/// final frame. Every operation holds the stream lock while it waits for the
/// transport to acknowledge its frame, so a stream shared between threads
/// never interleaves frames.
///
/// The waits are blocking; call from a plain thread (or `spawn_blocking`),
/// not from an async task.
///
/// After a failed flush the stream is broken: further calls fail with
/// [`StreamError::Broken`] without touching the transport.
pub struct MessageOutputStream {
    outgoing: Arc<dyn OutgoingFrames>,
    pool: Arc<dyn BufferPool>,
    state: Mutex<StreamState>,
}

impl MessageOutputStream {
    /// Create an open stream, taking its frame buffer from `pool`
    pub fn new(
        outgoing: Arc<dyn OutgoingFrames>,
        policy: &WebSocketPolicy,
        pool: Arc<dyn BufferPool>,
    ) -> Result<Self> {
        policy.validate()?;

        let capacity = policy.max_binary_message_buffer_size;
        let buffer = FragmentBuffer::new(pool.acquire(capacity), capacity);

        Ok(Self {
            outgoing,
            pool,
            state: Mutex::new(StreamState {
                buffer,
                opcode: OpCode::Binary,
                frames_sent: 0,
                status: StreamStatus::Open,
            }),
        })
    }

    /// Append bytes to the message, sending full frames as needed
    pub fn write(&self, data: &[u8]) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.ensure_open()?;
        debug!("write({} bytes)", data.len());

        let mut left = data;
        while !left.is_empty() {
            if state.buffer.is_full() {
                self.flush_frame(state, false)?;
            }
            let taken = state.buffer.append(left);
            left = &left[taken..];
        }
        Ok(())
    }

    /// Send whatever is buffered, possibly nothing, as a non-final frame
    pub fn flush(&self) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.ensure_open()?;
        debug!("flush()");

        self.flush_frame(state, false)
    }

    /// Send the buffered bytes as the final frame and close the stream
    ///
    /// Closing twice is an error, not a no-op.
    pub fn close(&self) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.ensure_open()?;
        debug!("close()");

        self.flush_frame(state, true)?;
        state.status = StreamStatus::Closed;
        self.pool.release(state.buffer.release());

        debug!("Sent frame count: {}", state.frames_sent);
        Ok(())
    }

    /// Frames acknowledged by the transport so far
    pub fn frames_sent(&self) -> u64 {
        self.state.lock().frames_sent
    }

    /// Whether [`close`](Self::close) completed
    pub fn is_closed(&self) -> bool {
        self.state.lock().status == StreamStatus::Closed
    }

    /// Drain the buffer into one frame and block until the transport settles it.
    fn flush_frame(&self, state: &mut StreamState, fin: bool) -> Result<()> {
        let payload = state.buffer.drain();
        trace!(
            "flush(fin={}): {:?} frame with {} bytes",
            fin,
            state.opcode,
            payload.len()
        );
        let frame = Frame::new(state.opcode).with_payload(payload).with_fin(fin);

        let (callback, blocker) = write_callback();
        self.outgoing.outgoing_frame(frame, callback);

        match blocker.wait() {
            Ok(()) => {
                state.frames_sent += 1;
                state.opcode = OpCode::Continuation;
                Ok(())
            }
            Err(source) => {
                state.status = StreamStatus::Broken;
                Err(StreamError::Flush {
                    frame: state.frames_sent,
                    source,
                })
            }
        }
    }
}

impl Drop for MessageOutputStream {
    fn drop(&mut self) {
        let region = self.state.get_mut().buffer.release();
        if region.capacity() > 0 {
            self.pool.release(region);
        }
    }
}

impl io::Write for MessageOutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        MessageOutputStream::write(self, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        MessageOutputStream::flush(self)?;
        Ok(())
    }
}

impl io::Write for &MessageOutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        MessageOutputStream::write(*self, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        MessageOutputStream::flush(*self)?;
        Ok(())
    }
}
