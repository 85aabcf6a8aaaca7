//! Outbound message policy

use serde::{Deserialize, Serialize};

use crate::{Error, Result, DEFAULT_MAX_BINARY_MESSAGE_BUFFER_SIZE};

/// Limits applied to outbound message streams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSocketPolicy {
    /// Payload capacity of each frame emitted by a binary message stream
    pub max_binary_message_buffer_size: usize,
}

impl Default for WebSocketPolicy {
    fn default() -> Self {
        Self {
            max_binary_message_buffer_size: DEFAULT_MAX_BINARY_MESSAGE_BUFFER_SIZE,
        }
    }
}

impl WebSocketPolicy {
    pub fn with_max_binary_message_buffer_size(mut self, size: usize) -> Self {
        self.max_binary_message_buffer_size = size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_binary_message_buffer_size == 0 {
            return Err(Error::InvalidPolicy(
                "max_binary_message_buffer_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = WebSocketPolicy::default();
        assert_eq!(policy.max_binary_message_buffer_size, 32 * 1024);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let policy = WebSocketPolicy::default().with_max_binary_message_buffer_size(0);
        assert!(matches!(policy.validate(), Err(Error::InvalidPolicy(_))));
    }
}
