//! Outgoing frame interface

use sluice_core::Frame;

use crate::callback::WriteCallback;

/// Accepts frames for transmission
///
/// Implementations must not block: the frame is queued and `callback` is
/// settled once the outcome is known. Dropping the callback without settling
/// it reports a cancelled write to the waiter.
pub trait OutgoingFrames: Send + Sync {
    fn outgoing_frame(&self, frame: Frame, callback: WriteCallback);
}
