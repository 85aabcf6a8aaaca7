//! Frame Writer Tests (sluice-transport)
//!
//! Tests for the task-backed frame writer:
//! - Submission order and completion
//! - Error poisoning after a sink failure
//! - Cancellation when the writer task is aborted
//! - Raw byte stream output

use async_trait::async_trait;
use bytes::Bytes;
use sluice_core::{Frame, OpCode};
use sluice_transport::{
    write_callback, FrameSink, FrameWriter, OutgoingFrames, RawFrameSink, TransportError,
    WriteFailure,
};
use std::sync::{Arc, Mutex};
use tokio::io::AsyncReadExt;

// ============================================================================
// Helper sinks
// ============================================================================

#[derive(Clone, Default)]
struct RecordingSink {
    frames: Arc<Mutex<Vec<Frame>>>,
    fail_at: Option<usize>,
}

#[async_trait]
impl FrameSink for RecordingSink {
    async fn write_frame(&mut self, frame: &Frame) -> sluice_transport::Result<()> {
        let mut frames = self.frames.lock().unwrap();
        if Some(frames.len()) == self.fail_at {
            return Err(TransportError::SendFailed("peer reset".to_string()));
        }
        frames.push(frame.clone());
        Ok(())
    }
}

struct StalledSink;

#[async_trait]
impl FrameSink for StalledSink {
    async fn write_frame(&mut self, _frame: &Frame) -> sluice_transport::Result<()> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

fn data(payload: &'static [u8], fin: bool) -> Frame {
    Frame::new(OpCode::Binary)
        .with_payload(Bytes::from_static(payload))
        .with_fin(fin)
}

// ============================================================================
// Ordering
// ============================================================================

#[tokio::test]
async fn test_frames_written_in_submission_order() {
    let sink = RecordingSink::default();
    let frames = sink.frames.clone();
    let (writer, _handle) = FrameWriter::spawn(sink);

    let mut waiters = Vec::new();
    for (i, payload) in [&b"one"[..], b"two", b"three"].into_iter().enumerate() {
        let (callback, waiter) = write_callback();
        writer.outgoing_frame(data(payload, i == 2), callback);
        waiters.push(waiter);
    }

    for waiter in waiters {
        waiter.completed().await.expect("write should succeed");
    }

    let written = frames.lock().unwrap();
    let payloads: Vec<&[u8]> = written.iter().map(|f| f.payload.as_ref()).collect();
    assert_eq!(payloads, vec![&b"one"[..], b"two", b"three"]);
    assert!(written[2].fin);
}

// ============================================================================
// Failure handling
// ============================================================================

#[tokio::test]
async fn test_sink_error_poisons_later_frames() {
    let sink = RecordingSink {
        fail_at: Some(1),
        ..Default::default()
    };
    let frames = sink.frames.clone();
    let (writer, _handle) = FrameWriter::spawn(sink);

    let (first, first_waiter) = write_callback();
    let (second, second_waiter) = write_callback();
    let (third, third_waiter) = write_callback();
    writer.outgoing_frame(data(b"a", false), first);
    writer.outgoing_frame(data(b"b", false), second);
    writer.outgoing_frame(data(b"c", true), third);

    assert!(first_waiter.completed().await.is_ok());
    assert!(matches!(
        second_waiter.completed().await,
        Err(WriteFailure::Transport(TransportError::SendFailed(_)))
    ));
    match third_waiter.completed().await {
        Err(WriteFailure::Transport(TransportError::SendFailed(reason))) => {
            assert!(reason.contains("peer reset"), "reason was {}", reason)
        }
        other => panic!("expected poisoned writer, got {:?}", other),
    }

    assert_eq!(frames.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_abort_cancels_pending_write() {
    let (writer, handle) = FrameWriter::spawn(StalledSink);

    let (callback, waiter) = write_callback();
    writer.outgoing_frame(data(b"stuck", true), callback);

    tokio::task::yield_now().await;
    handle.abort();
    let _ = handle.await;

    assert!(matches!(
        waiter.completed().await,
        Err(WriteFailure::Cancelled)
    ));
}

#[tokio::test]
async fn test_submit_after_stop_fails_closed() {
    let (writer, handle) = FrameWriter::spawn(RecordingSink::default());
    handle.abort();
    let _ = handle.await;
    assert!(!writer.is_open());

    let (callback, waiter) = write_callback();
    writer.outgoing_frame(data(b"late", true), callback);

    assert!(matches!(
        waiter.completed().await,
        Err(WriteFailure::Transport(TransportError::ConnectionClosed))
    ));
}

#[tokio::test]
async fn test_invalid_control_frame_reported() {
    let (client, _server) = tokio::io::duplex(1024);
    let (writer, _handle) = FrameWriter::spawn(RawFrameSink::new(client));

    let (callback, waiter) = write_callback();
    writer.outgoing_frame(Frame::new(OpCode::Ping).with_fin(false), callback);

    assert!(matches!(
        waiter.completed().await,
        Err(WriteFailure::Transport(TransportError::Frame(_)))
    ));
}

// ============================================================================
// Raw byte stream
// ============================================================================

#[tokio::test]
async fn test_raw_writer_extended_length() {
    let (client, mut server) = tokio::io::duplex(4096);
    let (writer, _handle) = FrameWriter::spawn(RawFrameSink::new(client));

    let payload = Bytes::from(vec![0x5Au8; 300]);
    let (callback, waiter) = write_callback();
    writer.outgoing_frame(
        Frame::new(OpCode::Continuation).with_payload(payload.clone()),
        callback,
    );
    waiter.completed().await.expect("write should succeed");

    let mut header = [0u8; 4];
    server.read_exact(&mut header).await.unwrap();
    assert_eq!(header, [0x80, 126, 0x01, 0x2C]);

    let mut body = vec![0u8; 300];
    server.read_exact(&mut body).await.unwrap();
    assert_eq!(body, payload);
}
