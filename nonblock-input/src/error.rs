use std::time::Duration;

use thiserror::Error;

/// Failures surfaced by [`LineBuffer::shutdown`](crate::LineBuffer::shutdown).
#[derive(Error, Debug)]
pub enum ShutdownError {
    #[error("collector thread still blocked after {0:?}; the input source never produced a line to unblock it")]
    Timeout(Duration),

    #[error("collector thread panicked")]
    CollectorPanicked,
}
