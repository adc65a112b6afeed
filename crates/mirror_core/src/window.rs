use chrono::{NaiveDateTime, TimeDelta};
use thiserror::Error;

/// Earliest modification time an entry may carry to be considered this run.
///
/// Fixed once computed; every filter decision is `modified_at >= cutoff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AgeCutoff(NaiveDateTime);

impl AgeCutoff {
    pub fn at(timestamp: NaiveDateTime) -> Self {
        Self(timestamp)
    }

    /// `now - days`, saturating at the earliest representable timestamp.
    pub fn days_before(now: NaiveDateTime, days: u32) -> Self {
        TimeDelta::try_days(i64::from(days))
            .and_then(|delta| now.checked_sub_signed(delta))
            .map(Self)
            .unwrap_or_else(Self::unbounded)
    }

    /// Admits every entry regardless of age.
    pub fn unbounded() -> Self {
        Self(NaiveDateTime::MIN)
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.0
    }

    pub fn admits(&self, modified_at: NaiveDateTime) -> bool {
        modified_at >= self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    /// Everything on the remote site.
    Full,
    /// Entries modified since the previous completed run.
    SinceLastRun,
    /// Entries modified in the last `n` days.
    Days(u32),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("no previous run recorded")]
    NoPreviousRun,
    #[error("day count must be a positive integer")]
    ZeroDays,
}

impl TimeWindow {
    pub fn cutoff(
        &self,
        now: NaiveDateTime,
        last_run: Option<NaiveDateTime>,
    ) -> Result<AgeCutoff, WindowError> {
        match self {
            TimeWindow::Full => Ok(AgeCutoff::unbounded()),
            TimeWindow::SinceLastRun => last_run
                .map(AgeCutoff::at)
                .ok_or(WindowError::NoPreviousRun),
            TimeWindow::Days(0) => Err(WindowError::ZeroDays),
            TimeWindow::Days(days) => Ok(AgeCutoff::days_before(now, *days)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeWindow::Full => "Full download",
            TimeWindow::SinceLastRun => "Since last download",
            TimeWindow::Days(_) => "Custom",
        }
    }
}
