//! Message stream error types

use std::io;
use thiserror::Error;

use sluice_transport::WriteFailure;

pub type Result<T> = std::result::Result<T, StreamError>;

#[derive(Error, Debug)]
pub enum StreamError {
    /// Operation after a completed close
    #[error("stream is closed")]
    Closed,

    /// Operation after an earlier flush failed
    #[error("stream is unusable after a failed flush")]
    Broken,

    /// The frame could not be delivered
    #[error("failed to flush frame {frame}: {source}")]
    Flush {
        frame: u64,
        #[source]
        source: WriteFailure,
    },

    #[error("invalid policy: {0}")]
    Policy(#[from] sluice_core::Error),
}

impl From<StreamError> for io::Error {
    fn from(e: StreamError) -> Self {
        let kind = match &e {
            StreamError::Closed | StreamError::Broken => io::ErrorKind::BrokenPipe,
            StreamError::Policy(_) => io::ErrorKind::InvalidInput,
            StreamError::Flush { .. } => io::ErrorKind::Other,
        };
        io::Error::new(kind, e)
    }
}
