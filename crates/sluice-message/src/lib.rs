//! Sluice Message Streams
//!
//! Exposes a plain "write, flush, close" byte stream for one outbound
//! message and cuts it into frames as the bytes arrive:
//! - the first frame carries the data opcode, later ones are continuations
//! - only the frame emitted by `close` carries the final marker
//! - each frame is acknowledged by the transport before the next is sent
//!
//! ```no_run
//! # fn run(session: &sluice_message::Session) -> sluice_message::Result<()> {
//! let stream = session.output_stream()?;
//! stream.write(b"large payload ...")?;
//! stream.close()?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fragment;
pub mod output;
pub mod session;

pub use error::{Result, StreamError};
pub use fragment::FragmentBuffer;
pub use output::MessageOutputStream;
pub use session::Session;
