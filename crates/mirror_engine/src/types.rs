use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;

/// Identifier of one scan or download job, carried in log records.
pub type JobId = u64;

/// One row of a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub url: String,
    pub modified_at: NaiveDateTime,
}

/// One planned file download.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DownloadTask {
    pub source_url: String,
    pub destination_path: PathBuf,
}

/// Aggregate counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub skipped_existing: u64,
    pub skipped_error: u64,
    pub downloaded: u64,
}

impl RunStats {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::SkippedExisting => self.skipped_existing += 1,
            Outcome::SkippedError => self.skipped_error += 1,
            Outcome::Downloaded => self.downloaded += 1,
            Outcome::Planned => {}
        }
    }
}

/// What happened to a file or directory; `Planned` is reported but not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Planned,
    SkippedExisting,
    SkippedError,
    Downloaded,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Planned => "Downloading",
            Outcome::SkippedExisting => "Skipped (Already downloaded)",
            Outcome::SkippedError => "Skipped (Error)",
            Outcome::Downloaded => "Downloaded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
