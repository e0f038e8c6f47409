//! Non-blocking access to a blocking, line-oriented input source.
//!
//! A [`LineBuffer`] spawns one background collector thread at construction.
//! That thread performs the blocking line reads and appends each completed
//! line to a synchronized FIFO; callers poll the buffer from any thread
//! through accessors that never block. When the buffer is bounded, a full
//! queue makes the collector wait (backpressure) instead of dropping lines.
//!
//! ```no_run
//! use nonblock_input::LineBuffer;
//!
//! let mut input = LineBuffer::stdin();
//!
//! // ... inside some event loop:
//! if let Some(line) = input.read_one() {
//!     println!("got: {line}");
//! }
//!
//! input.shutdown(None).unwrap();
//! ```

mod buffer;
mod error;
mod queue;
mod source;

pub use buffer::{LineBuffer, Shutdown};
pub use error::ShutdownError;
pub use queue::State;
pub use source::{LineSource, StdinSource};
