use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

use crate::{JobId, Outcome, RunStats};

/// Shared counters and the single overwriting console status line.
///
/// Counter updates and console writes happen under one lock, so a status
/// line always reflects the counters at the moment it was printed and lines
/// from concurrent jobs never interleave.
pub struct ProgressAggregator {
    inner: Mutex<ProgressState>,
}

struct ProgressState {
    stats: RunStats,
    console: Box<dyn Write + Send>,
    last_width: usize,
}

impl ProgressAggregator {
    pub fn new(console: Box<dyn Write + Send>) -> Self {
        Self {
            inner: Mutex::new(ProgressState {
                stats: RunStats::default(),
                console,
                last_width: 0,
            }),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Discards console output; counters still work.
    pub fn silent() -> Self {
        Self::new(Box::new(io::sink()))
    }

    /// Count `outcome` and show it as the current status line.
    pub fn record(&self, job_id: JobId, outcome: Outcome, subject: &str) {
        let mut state = self.lock();
        state.stats.record(outcome);
        let line = format!("Job {job_id} - {}: {subject}", outcome.label());
        state.print_line(&line);
    }

    /// Count `outcome` without touching the console.
    pub fn count(&self, outcome: Outcome) {
        self.lock().stats.record(outcome);
    }

    pub fn status(&self, message: &str) {
        self.lock().print_line(message);
    }

    /// End the status line so following output starts on a fresh line.
    pub fn finish(&self) {
        let mut state = self.lock();
        if state.last_width > 0 {
            let _ = writeln!(state.console);
            let _ = state.console.flush();
            state.last_width = 0;
        }
    }

    pub fn snapshot(&self) -> RunStats {
        self.lock().stats
    }

    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        // A job that panicked mid-update leaves counters usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProgressState {
    fn print_line(&mut self, message: &str) {
        let width = message.chars().count();
        let padding = self.last_width.saturating_sub(width);
        let _ = write!(self.console, "\r{message}{:padding$}", "");
        let _ = self.console.flush();
        self.last_width = width;
    }
}
