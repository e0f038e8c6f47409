use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ShutdownError;
use crate::queue::{LineQueue, State};
use crate::source::{LineSource, StdinSource};

/// Pause before retrying a read that hit end-of-stream or failed. A
/// console reports EOF only until more input arrives, but a closed pipe
/// reports it forever; the pause keeps that case from spinning a core.
const SOURCE_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Outcome of a successful [`LineBuffer::shutdown`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// The collector thread was joined and the buffer is now
    /// [`State::Stopped`].
    Clean,
    /// A previous call already stopped the buffer.
    AlreadyStopped,
}

/// Non-blocking view over a blocking line source.
///
/// Construction spawns a single collector thread that reads lines from
/// the source for the buffer's whole lifetime; accessors can be called
/// from any thread and never block. Dropping a running buffer initiates
/// shutdown without joining, so the drop can't hang on a read that only
/// the source can unblock.
pub struct LineBuffer {
    queue: Arc<LineQueue>,
    collector: Option<JoinHandle<()>>,
    unblock_hint: Option<String>,
}

impl LineBuffer {
    /// Buffers every line the source produces, with no bound.
    pub fn unbounded<S: LineSource>(source: S) -> Self {
        Self::start(source, None)
    }

    /// Holds at most `capacity` unconsumed lines. When the buffer is
    /// full the collector waits for a consumer instead of dropping
    /// lines, which in turn stops pulling from the source.
    pub fn bounded<S: LineSource>(source: S, capacity: NonZeroUsize) -> Self {
        Self::start(source, Some(capacity))
    }

    /// Unbounded buffer over [`StdinSource`].
    pub fn stdin() -> Self {
        Self::unbounded(StdinSource)
    }

    /// Bounded buffer over [`StdinSource`].
    pub fn stdin_bounded(capacity: NonZeroUsize) -> Self {
        Self::bounded(StdinSource, capacity)
    }

    fn start<S: LineSource>(source: S, capacity: Option<NonZeroUsize>) -> Self {
        let queue = Arc::new(LineQueue::new(capacity));
        let unblock_hint = source.shutdown_hint();
        let collector = {
            let queue = Arc::clone(&queue);
            thread::Builder::new()
                .name("line-collector".into())
                .spawn(move || collect(source, queue))
                .expect("failed to spawn collector thread")
        };
        Self {
            queue,
            collector: Some(collector),
            unblock_hint,
        }
    }

    /// Removes and returns the oldest buffered line, or `None` when
    /// nothing is buffered. Never blocks.
    pub fn read_one(&self) -> Option<String> {
        self.queue.dequeue_one()
    }

    /// Removes and returns every buffered line in arrival order, or
    /// `None` when nothing is buffered. Never blocks.
    pub fn read_all(&self) -> Option<Vec<String>> {
        self.queue.dequeue_all()
    }

    /// Number of lines currently buffered. Never blocks.
    pub fn available_count(&self) -> usize {
        self.queue.len()
    }

    /// Current lifecycle state. Never blocks.
    pub fn state(&self) -> State {
        self.queue.state()
    }

    /// Stops the collector thread and joins it.
    ///
    /// The collector is usually parked inside a blocking read that only
    /// the source can unblock, so this prints the source's
    /// [`shutdown_hint`](LineSource::shutdown_hint) (for stdin: asking
    /// the operator to press enter) and then waits. With
    /// `timeout = None` the wait is unbounded; with `Some(limit)` an
    /// uncooperative source yields [`ShutdownError::Timeout`], the
    /// buffer stays in [`State::ShuttingDown`], and a later call may
    /// retry the join. Buffered lines remain drainable throughout. A
    /// call after a clean stop returns [`Shutdown::AlreadyStopped`].
    pub fn shutdown(&mut self, timeout: Option<Duration>) -> Result<Shutdown, ShutdownError> {
        let Some(collector) = self.collector.take() else {
            return Ok(Shutdown::AlreadyStopped);
        };

        self.queue.begin_shutdown();
        if let Some(hint) = &self.unblock_hint {
            println!("{hint}");
        }

        debug!(?timeout, "waiting for collector thread to unblock");
        if let Some(limit) = timeout {
            if !self.queue.wait_collector_exit_timeout(limit) {
                // Keep the handle so a later call can finish the join
                // once the source finally yields a line.
                self.collector = Some(collector);
                return Err(ShutdownError::Timeout(limit));
            }
        } else {
            self.queue.wait_collector_exit();
        }

        collector
            .join()
            .map_err(|_| ShutdownError::CollectorPanicked)?;
        self.queue.mark_stopped();
        debug!("collector thread joined");
        Ok(Shutdown::Clean)
    }
}

impl Drop for LineBuffer {
    fn drop(&mut self) {
        if self.collector.is_some() {
            self.queue.begin_shutdown();
        }
    }
}

/// Marks collector exit when the thread returns *or* unwinds. Without
/// this a panicking `read_line` would leave `collector_exited` false
/// forever: `shutdown(None)` would hang and a bounded shutdown would
/// blame the source instead of surfacing the panic through `join`.
struct ExitFlag {
    queue: Arc<LineQueue>,
}

impl Drop for ExitFlag {
    fn drop(&mut self) {
        self.queue.mark_collector_exited();
    }
}

/// Body of the collector thread: the sole writer to the queue.
fn collect<S: LineSource>(mut source: S, queue: Arc<LineQueue>) {
    let _exit = ExitFlag {
        queue: Arc::clone(&queue),
    };
    debug!("collector thread started");
    loop {
        if !queue.is_running() {
            break;
        }
        match source.read_line() {
            Ok(Some(line)) => {
                // A refusal means shutdown began while we were reading;
                // the line that unblocked the read is discarded.
                if !queue.enqueue(line) {
                    break;
                }
            }
            Ok(None) => thread::sleep(SOURCE_RETRY_DELAY),
            Err(e) => {
                warn!("reading from line source failed: {e}");
                thread::sleep(SOURCE_RETRY_DELAY);
            }
        }
    }
    debug!("collector thread exited");
}
