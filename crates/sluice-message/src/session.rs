//! Session handle for creating message streams

use sluice_core::{BufferPool, HeapBufferPool, WebSocketPolicy};
use sluice_transport::OutgoingFrames;
use std::sync::Arc;

use crate::error::Result;
use crate::output::MessageOutputStream;

/// Outgoing side of a connection: transport, policy and buffer supply
///
/// The transport is shared with every stream minted here; streams only
/// submit frames to it and never close it.
#[derive(Clone)]
pub struct Session {
    outgoing: Arc<dyn OutgoingFrames>,
    policy: WebSocketPolicy,
    pool: Arc<dyn BufferPool>,
}

impl Session {
    /// Create a session with the default policy and heap-allocated buffers
    pub fn new(outgoing: Arc<dyn OutgoingFrames>) -> Self {
        Self {
            outgoing,
            policy: WebSocketPolicy::default(),
            pool: Arc::new(HeapBufferPool),
        }
    }

    pub fn with_policy(mut self, policy: WebSocketPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_buffer_pool(mut self, pool: Arc<dyn BufferPool>) -> Self {
        self.pool = pool;
        self
    }

    pub fn policy(&self) -> &WebSocketPolicy {
        &self.policy
    }

    /// Start a new outbound binary message
    pub fn output_stream(&self) -> Result<MessageOutputStream> {
        MessageOutputStream::new(self.outgoing.clone(), &self.policy, self.pool.clone())
    }
}
