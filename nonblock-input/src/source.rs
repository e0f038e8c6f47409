use std::io::{self, BufRead};

/// A blocking, line-oriented input source consumed by a
/// [`LineBuffer`](crate::LineBuffer)'s collector thread.
pub trait LineSource: Send + 'static {
    /// Blocks until the next line arrives and returns it without its
    /// trailing delimiter. `Ok(None)` means the source reported
    /// end-of-stream; the collector treats that as transient and retries,
    /// since a console only stays at EOF until the operator types again.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Prompt shown to the operator when shutdown needs the source to
    /// produce one more line: a read with no intrinsic cancellation can
    /// only be unblocked by actual input arriving. Sources that can be
    /// unblocked programmatically (e.g. scripted test sources) return
    /// `None` and no prompt is printed.
    fn shutdown_hint(&self) -> Option<String> {
        None
    }
}

/// Reads lines from the process's standard input.
///
/// Stdin is a single process-wide resource: nothing stops several
/// buffers from being built over it, but they will steal lines from one
/// another, so in practice construct one.
pub struct StdinSource;

impl LineSource for StdinSource {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    fn shutdown_hint(&self) -> Option<String> {
        Some("Please hit [ENTER]".to_string())
    }
}
