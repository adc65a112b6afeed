use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use engine_logging::engine_job;
use log::Level;
use mirror_core::{sanitize_name, AgeCutoff};
use thiserror::Error;

use crate::{
    decode_listing, parse_listing, DecodeError, DirectoryEntry, DownloadTask, FetchError,
    Fetcher, JobId, ListingError, ListingPage, MirrorConfig, Outcome, ProgressAggregator,
};

#[derive(Debug, Error)]
pub enum ListingFetchError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Parse(#[from] ListingError),
}

/// Fetch, decode and parse one listing page.
pub async fn fetch_listing(
    fetcher: &dyn Fetcher,
    job_id: JobId,
    url: &str,
) -> Result<ListingPage, ListingFetchError> {
    let output = fetcher.fetch(job_id, url).await?;
    let decoded = decode_listing(&output.bytes, output.metadata.content_type.as_deref())?;
    Ok(parse_listing(&decoded.html, url)?)
}

/// One subdirectory to scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanJob {
    pub job_id: JobId,
    pub url: String,
    /// Already sanitized; used as the local directory name.
    pub dir_name: String,
}

impl ScanJob {
    pub fn for_entry(job_id: JobId, entry: &DirectoryEntry) -> Self {
        Self {
            job_id,
            url: entry.url.clone(),
            dir_name: sanitize_name(&entry.name),
        }
    }
}

/// Turns subdirectory listings into download tasks for one run.
///
/// Destination paths are claimed run-wide, so two remote names that sanitize
/// to the same local name yield a single task.
pub struct DirectoryScanner {
    fetcher: Arc<dyn Fetcher>,
    config: MirrorConfig,
    claimed: Mutex<HashSet<PathBuf>>,
}

impl DirectoryScanner {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: MirrorConfig) -> Self {
        Self {
            fetcher,
            config,
            claimed: Mutex::new(HashSet::new()),
        }
    }

    pub async fn scan(
        &self,
        job: &ScanJob,
        cutoff: AgeCutoff,
        progress: &ProgressAggregator,
    ) -> Vec<DownloadTask> {
        let page = match fetch_listing(self.fetcher.as_ref(), job.job_id, &job.url).await {
            Ok(page) => page,
            Err(err) => {
                engine_job!(Level::Warn, job.job_id, "listing {} failed: {}", job.url, err);
                progress.record(job.job_id, Outcome::SkippedError, &job.dir_name);
                return Vec::new();
            }
        };
        engine_job!(
            Level::Debug,
            job.job_id,
            "listing {} has {} entries ({} malformed)",
            job.url,
            page.entries.len(),
            page.malformed_rows
        );

        let mut tasks = Vec::new();
        for entry in page.entries {
            if !self.config.wants_file(&entry.url) || !cutoff.admits(entry.modified_at) {
                continue;
            }
            if let Some(task) = self.plan(job, entry, progress).await {
                tasks.push(task);
            }
        }
        tasks
    }

    async fn plan(
        &self,
        job: &ScanJob,
        entry: DirectoryEntry,
        progress: &ProgressAggregator,
    ) -> Option<DownloadTask> {
        let file_name = sanitize_name(&entry.name);
        let dir = self.config.download_root.join(&job.dir_name);
        let destination = dir.join(&file_name);
        let subject = format!("{}/{}", job.dir_name, file_name);

        if let Err(err) = tokio::fs::create_dir_all(&dir).await {
            engine_job!(Level::Warn, job.job_id, "cannot create {:?}: {}", dir, err);
            progress.record(job.job_id, Outcome::SkippedError, &subject);
            return None;
        }

        match tokio::fs::try_exists(&destination).await {
            Ok(false) => {}
            Ok(true) => {
                engine_job!(Level::Debug, job.job_id, "{} already on disk", subject);
                progress.record(job.job_id, Outcome::SkippedExisting, &subject);
                return None;
            }
            Err(err) => {
                engine_job!(Level::Warn, job.job_id, "cannot stat {:?}: {}", destination, err);
                progress.record(job.job_id, Outcome::SkippedError, &subject);
                return None;
            }
        }

        if !self.claim(&destination) {
            engine_job!(
                Level::Warn,
                job.job_id,
                "{:?} maps to {}, already planned this run; {} not downloaded",
                entry.name,
                subject,
                entry.url
            );
            progress.record(job.job_id, Outcome::SkippedExisting, &subject);
            return None;
        }

        engine_job!(Level::Debug, job.job_id, "planned {} from {}", subject, entry.url);
        progress.record(job.job_id, Outcome::Planned, &subject);
        Some(DownloadTask {
            source_url: entry.url,
            destination_path: destination,
        })
    }

    fn claim(&self, destination: &Path) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(destination.to_path_buf())
    }
}
