//! Task-backed frame writer

use sluice_core::Frame;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace};

use crate::callback::WriteCallback;
use crate::error::TransportError;
use crate::sink::FrameSink;
use crate::traits::OutgoingFrames;

type Submission = (Frame, WriteCallback);

/// [`OutgoingFrames`] backed by a writer task
///
/// Frames are written in submission order, one at a time. The first sink
/// error poisons the writer: every later frame fails with the same reason.
/// Aborting the returned task handle drops queued callbacks, which their
/// waiters observe as cancellation.
#[derive(Clone)]
pub struct FrameWriter {
    tx: mpsc::UnboundedSender<Submission>,
}

impl FrameWriter {
    /// Spawn the writer task on the current tokio runtime
    pub fn spawn<S>(sink: S) -> (Self, JoinHandle<()>)
    where
        S: FrameSink + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(sink, rx));
        (Self { tx }, handle)
    }

    /// Whether the writer task is still accepting frames
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

impl OutgoingFrames for FrameWriter {
    fn outgoing_frame(&self, frame: Frame, callback: WriteCallback) {
        if let Err(mpsc::error::SendError((_, callback))) = self.tx.send((frame, callback)) {
            debug!("Frame submitted after writer stopped");
            callback.write_failed(TransportError::ConnectionClosed);
        }
    }
}

async fn run<S: FrameSink>(mut sink: S, mut rx: mpsc::UnboundedReceiver<Submission>) {
    let mut broken: Option<String> = None;

    while let Some((frame, callback)) = rx.recv().await {
        if let Some(reason) = &broken {
            callback.write_failed(TransportError::SendFailed(reason.clone()));
            continue;
        }

        trace!(
            "Writing frame opcode={:?} fin={} len={}",
            frame.opcode,
            frame.fin,
            frame.payload.len()
        );

        match sink.write_frame(&frame).await {
            Ok(()) => callback.write_success(),
            Err(e) => {
                error!("Frame write error: {}", e);
                broken = Some(e.to_string());
                callback.write_failed(e);
            }
        }
    }

    debug!("Frame writer stopped");
}
