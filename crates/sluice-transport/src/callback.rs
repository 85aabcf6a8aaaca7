//! Single-shot write completion signal
//!
//! [`write_callback`] returns the two halves of a completion signal. The
//! [`WriteCallback`] travels with a frame into the transport and is settled
//! exactly once; the [`FutureWriteCallback`] stays with the submitter, who
//! waits on it either blocking or async.

use thiserror::Error;
use tokio::sync::oneshot;

use crate::error::TransportError;

/// Why a submitted frame did not complete
#[derive(Error, Debug)]
pub enum WriteFailure {
    /// The transport reported an error for this frame
    #[error(transparent)]
    Transport(TransportError),

    /// The callback was dropped before it was settled
    #[error("write cancelled before completion")]
    Cancelled,
}

/// Create a linked callback / waiter pair
pub fn write_callback() -> (WriteCallback, FutureWriteCallback) {
    let (tx, rx) = oneshot::channel();
    (WriteCallback { tx }, FutureWriteCallback { rx })
}

/// Settling half, handed to the transport with the frame
#[derive(Debug)]
pub struct WriteCallback {
    tx: oneshot::Sender<Result<(), TransportError>>,
}

impl WriteCallback {
    pub fn write_success(self) {
        // The waiter may be gone already; nothing left to notify then.
        let _ = self.tx.send(Ok(()));
    }

    pub fn write_failed(self, error: TransportError) {
        let _ = self.tx.send(Err(error));
    }
}

/// Waiting half, kept by the submitter
#[derive(Debug)]
pub struct FutureWriteCallback {
    rx: oneshot::Receiver<Result<(), TransportError>>,
}

impl FutureWriteCallback {
    /// Block the current thread until the write is settled
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context,
    /// like every tokio blocking receive.
    pub fn wait(self) -> Result<(), WriteFailure> {
        Self::settle(self.rx.blocking_recv())
    }

    /// Wait for the write to be settled
    pub async fn completed(self) -> Result<(), WriteFailure> {
        Self::settle(self.rx.await)
    }

    fn settle(
        outcome: std::result::Result<Result<(), TransportError>, oneshot::error::RecvError>,
    ) -> Result<(), WriteFailure> {
        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(WriteFailure::Transport(e)),
            Err(_) => Err(WriteFailure::Cancelled),
        }
    }
}
