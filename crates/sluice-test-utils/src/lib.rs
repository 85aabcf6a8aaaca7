//! Common test helpers and utilities for Sluice tests
//!
//! This crate provides:
//! - A scripted [`OutgoingFrames`] transport that records every frame
//! - Deferred acknowledgement from another thread with overlap detection
//! - Injected transport failures and dropped (cancelled) callbacks
//! - Tracing setup for test output

use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use sluice_core::{Frame, OpCode};
use sluice_transport::{OutgoingFrames, TransportError, WriteCallback};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Tracing
// ============================================================================

/// Install a fmt subscriber honouring `RUST_LOG`; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Recording transport
// ============================================================================

/// How the transport settles a given submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Succeed,
    Fail,
    Drop,
}

/// Transport double that records frames and settles callbacks on a script
///
/// By default every frame is acknowledged immediately on the submitting
/// thread. [`deferred`](Self::deferred) moves acknowledgement to a separate
/// thread after a delay; [`fail_on`](Self::fail_on) and
/// [`cancel_on`](Self::cancel_on) script the outcome of one submission by
/// its zero-based index.
#[derive(Default)]
pub struct RecordingFrames {
    frames: Mutex<Vec<Frame>>,
    delay: Option<Duration>,
    fail_on: Option<usize>,
    cancel_on: Option<usize>,
    in_flight: Arc<AtomicBool>,
    overlaps: AtomicUsize,
}

impl RecordingFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acknowledge from another thread after `delay`
    pub fn deferred(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Report a transport error for the submission at `index`
    pub fn fail_on(mut self, index: usize) -> Self {
        self.fail_on = Some(index);
        self
    }

    /// Drop the callback of the submission at `index` without settling it
    pub fn cancel_on(mut self, index: usize) -> Self {
        self.cancel_on = Some(index);
        self
    }

    /// Every submitted frame, in submission order
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().clone()
    }

    pub fn submissions(&self) -> usize {
        self.frames.lock().len()
    }

    /// Concatenation of all submitted payloads
    pub fn payload(&self) -> Bytes {
        let frames = self.frames.lock();
        let mut out = BytesMut::new();
        for frame in frames.iter() {
            out.extend_from_slice(&frame.payload);
        }
        out.freeze()
    }

    /// Submissions that arrived while an earlier frame was still unsettled
    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    fn outcome(&self, index: usize) -> Outcome {
        if self.fail_on == Some(index) {
            Outcome::Fail
        } else if self.cancel_on == Some(index) {
            Outcome::Drop
        } else {
            Outcome::Succeed
        }
    }
}

fn settle(callback: WriteCallback, outcome: Outcome, index: usize) {
    match outcome {
        Outcome::Succeed => callback.write_success(),
        Outcome::Fail => callback.write_failed(TransportError::SendFailed(format!(
            "scripted failure on frame {}",
            index
        ))),
        Outcome::Drop => drop(callback),
    }
}

impl OutgoingFrames for RecordingFrames {
    fn outgoing_frame(&self, frame: Frame, callback: WriteCallback) {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }

        let index = {
            let mut frames = self.frames.lock();
            frames.push(frame);
            frames.len() - 1
        };
        let outcome = self.outcome(index);

        match self.delay {
            None => {
                self.in_flight.store(false, Ordering::SeqCst);
                settle(callback, outcome, index);
            }
            Some(delay) => {
                let in_flight = self.in_flight.clone();
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    in_flight.store(false, Ordering::SeqCst);
                    settle(callback, outcome, index);
                });
            }
        }
    }
}

// ============================================================================
// Frame assertions
// ============================================================================

/// `(opcode, fin, payload)` view of a frame for compact assertions
pub fn describe(frame: &Frame) -> (OpCode, bool, &[u8]) {
    (frame.opcode, frame.fin, frame.payload.as_ref())
}
