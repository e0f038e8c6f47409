use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Lifecycle of a [`LineBuffer`](crate::LineBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// The collector thread is reading lines into the buffer.
    Running,
    /// Shutdown has begun; no new lines are admitted, but the buffered
    /// ones can still be drained.
    ShuttingDown,
    /// The collector thread has been joined.
    Stopped,
}

struct Guarded {
    lines: VecDeque<String>,
    state: State,
    collector_exited: bool,
}

/// FIFO of completed lines shared between the collector thread and the
/// accessor side. One mutex guards both the queue and the state flag, so
/// no caller ever observes a half-finished mutation.
pub(crate) struct LineQueue {
    guarded: Mutex<Guarded>,
    /// Signalled when consumption frees capacity or shutdown begins.
    /// The collector parks here instead of spinning when the queue is
    /// full; `Condvar::wait` releases the mutex while parked.
    space: Condvar,
    /// Signalled once the collector thread has returned.
    exited: Condvar,
    capacity: Option<NonZeroUsize>,
}

impl LineQueue {
    pub(crate) fn new(capacity: Option<NonZeroUsize>) -> Self {
        Self {
            guarded: Mutex::new(Guarded {
                lines: VecDeque::new(),
                state: State::Running,
                collector_exited: false,
            }),
            space: Condvar::new(),
            exited: Condvar::new(),
            capacity,
        }
    }

    /// Appends a line, waiting while the queue is at capacity. Returns
    /// `false` if shutdown began before the line could be appended; the
    /// line is discarded in that case and the caller should stop.
    pub(crate) fn enqueue(&self, line: String) -> bool {
        let mut g = self.lock();
        if let Some(cap) = self.capacity {
            while g.state == State::Running && g.lines.len() >= cap.get() {
                g = self.space.wait(g).expect("line queue lock poisoned");
            }
        }
        if g.state != State::Running {
            return false;
        }
        g.lines.push_back(line);
        true
    }

    /// Pops the oldest line, or `None` when nothing is buffered.
    pub(crate) fn dequeue_one(&self) -> Option<String> {
        let mut g = self.lock();
        let line = g.lines.pop_front();
        drop(g);
        if line.is_some() {
            self.space.notify_one();
        }
        line
    }

    /// Takes every buffered line at once, oldest first, or `None` when
    /// nothing is buffered.
    pub(crate) fn dequeue_all(&self) -> Option<Vec<String>> {
        let mut g = self.lock();
        if g.lines.is_empty() {
            return None;
        }
        let lines = g.lines.drain(..).collect();
        drop(g);
        self.space.notify_one();
        Some(lines)
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().lines.len()
    }

    pub(crate) fn state(&self) -> State {
        self.lock().state
    }

    pub(crate) fn is_running(&self) -> bool {
        self.state() == State::Running
    }

    /// Flips `Running` into `ShuttingDown` and wakes a collector parked
    /// on a full queue so it can observe the change and bail out.
    pub(crate) fn begin_shutdown(&self) {
        let mut g = self.lock();
        if g.state == State::Running {
            g.state = State::ShuttingDown;
        }
        drop(g);
        self.space.notify_all();
    }

    pub(crate) fn mark_stopped(&self) {
        self.lock().state = State::Stopped;
    }

    /// Called by the collector thread as its last action, including
    /// while unwinding from a panic; a lock poisoned by that same panic
    /// must not turn the notification into a second panic.
    pub(crate) fn mark_collector_exited(&self) {
        let mut g = match self.guarded.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        g.collector_exited = true;
        drop(g);
        self.exited.notify_all();
    }

    pub(crate) fn wait_collector_exit(&self) {
        let mut g = self.lock();
        while !g.collector_exited {
            g = self.exited.wait(g).expect("line queue lock poisoned");
        }
    }

    /// Bounded variant; returns whether the collector exited in time.
    pub(crate) fn wait_collector_exit_timeout(&self, limit: Duration) -> bool {
        let g = self.lock();
        let (g, _) = self
            .exited
            .wait_timeout_while(g, limit, |g| !g.collector_exited)
            .expect("line queue lock poisoned");
        g.collector_exited
    }

    fn lock(&self) -> MutexGuard<'_, Guarded> {
        self.guarded.lock().expect("line queue lock poisoned")
    }
}
