use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime, Timelike};
use engine_logging::{engine_debug, engine_info, engine_warn};
use mirror_core::{AgeCutoff, RunPhase, TimeWindow, WindowError};
use thiserror::Error;

use crate::{
    ensure_output_dir, fetch_listing, run_bounded, DirectoryScanner, DownloadTask, Downloader,
    FetchError, Fetcher, JobId, ListingFetchError, MirrorConfig, PersistError,
    ProgressAggregator, ReqwestFetcher, RunStateError, RunStateStore, RunStats, ScanJob,
};

const ROOT_JOB: JobId = 0;

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("cannot compute age cutoff: {0}")]
    Window(#[from] WindowError),
    #[error("download directory unusable: {0}")]
    OutputDir(#[from] PersistError),
    #[error("failed to read root listing {url}: {source}")]
    RootListing {
        url: String,
        #[source]
        source: ListingFetchError,
    },
    #[error(transparent)]
    RunState(#[from] RunStateError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub cutoff: AgeCutoff,
    pub stats: RunStats,
    /// Subdirectories that passed the age filter and were scanned.
    pub scanned_directories: usize,
    /// Download tasks produced by the scan phase.
    pub planned: usize,
    pub elapsed: Duration,
    /// Timestamp written to the run-state store.
    pub finished_at: NaiveDateTime,
}

/// Two-phase mirror run: scan every fresh subdirectory, then download.
pub struct Mirror {
    fetcher: Arc<dyn Fetcher>,
    config: MirrorConfig,
}

impl Mirror {
    pub fn new(config: MirrorConfig) -> Result<Self, FetchError> {
        let fetcher = ReqwestFetcher::new(config.fetch.clone())?;
        Ok(Self::with_fetcher(Arc::new(fetcher), config))
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, config: MirrorConfig) -> Self {
        Self { fetcher, config }
    }

    pub async fn run(
        &self,
        window: TimeWindow,
        run_state: &RunStateStore,
        progress: &ProgressAggregator,
    ) -> Result<RunReport, MirrorError> {
        let started = Instant::now();
        let mut phase = PhaseTracker::new();

        let cutoff = window.cutoff(now(), run_state.load())?;
        engine_info!(
            "Mirroring {} into {:?} ({}, cutoff {})",
            self.config.root_url,
            self.config.download_root,
            window.label(),
            cutoff.timestamp()
        );
        ensure_output_dir(&self.config.download_root)?;

        phase.advance(RunPhase::ListRoot);
        let scan_jobs = self.list_root(cutoff, progress).await?;
        let scanned_directories = scan_jobs.len();

        phase.advance(RunPhase::DispatchScans);
        let scanner = DirectoryScanner::new(self.fetcher.clone(), self.config.clone());
        let scanner = &scanner;
        let per_directory = run_bounded("scan", self.config.workers, scan_jobs, move |job| {
            async move { scanner.scan(&job, cutoff, progress).await }
        })
        .await;

        phase.advance(RunPhase::CollectScanResults);
        let tasks: Vec<DownloadTask> = per_directory.into_iter().flatten().collect();
        let planned = tasks.len();
        engine_info!(
            "Scanned {} directories, {} files to download",
            scanned_directories,
            planned
        );

        phase.advance(RunPhase::DispatchDownloads);
        let first_download = scanned_directories as JobId + 1;
        let download_jobs: Vec<(JobId, DownloadTask)> = (first_download..).zip(tasks).collect();
        let downloader = &Downloader::new(self.fetcher.clone());
        let outcomes = run_bounded(
            "download",
            self.config.workers,
            download_jobs,
            move |(job_id, task)| async move {
                downloader.download(job_id, &task, progress).await
            },
        );

        phase.advance(RunPhase::AwaitDownloads);
        let outcomes = outcomes.await;
        engine_debug!("{} downloads settled", outcomes.len());
        progress.finish();

        phase.advance(RunPhase::PersistRunState);
        let finished_at = now();
        run_state.save(finished_at)?;

        phase.advance(RunPhase::Done);
        let report = RunReport {
            cutoff,
            stats: progress.snapshot(),
            scanned_directories,
            planned,
            elapsed: started.elapsed(),
            finished_at,
        };
        engine_info!(
            "Run done in {:.2?}: {} downloaded, {} already present, {} errors",
            report.elapsed,
            report.stats.downloaded,
            report.stats.skipped_existing,
            report.stats.skipped_error
        );
        Ok(report)
    }

    /// Root rows modified at or after `cutoff`, as scan jobs numbered from 1.
    async fn list_root(
        &self,
        cutoff: AgeCutoff,
        progress: &ProgressAggregator,
    ) -> Result<Vec<ScanJob>, MirrorError> {
        let root_url = &self.config.root_url;
        let page = fetch_listing(self.fetcher.as_ref(), ROOT_JOB, root_url)
            .await
            .map_err(|source| MirrorError::RootListing {
                url: root_url.clone(),
                source,
            })?;
        if page.malformed_rows > 0 {
            engine_warn!(
                "Root listing had {} malformed rows; they were skipped",
                page.malformed_rows
            );
        }

        let mut jobs = Vec::new();
        for (index, entry) in page.entries.iter().enumerate() {
            progress.status(&format!("Indexing entry {}", index + 1));
            if cutoff.admits(entry.modified_at) {
                jobs.push(ScanJob::for_entry(jobs.len() as JobId + 1, entry));
            }
        }
        engine_info!(
            "Root listing has {} entries, {} modified since cutoff",
            page.entries.len(),
            jobs.len()
        );
        Ok(jobs)
    }
}

/// Local wall-clock time at the run-state file's one-second resolution.
fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

struct PhaseTracker {
    current: RunPhase,
}

impl PhaseTracker {
    fn new() -> Self {
        Self {
            current: RunPhase::ComputeCutoff,
        }
    }

    fn advance(&mut self, to: RunPhase) {
        debug_assert!(
            self.current.can_advance_to(to),
            "illegal phase step {:?} -> {:?}",
            self.current,
            to
        );
        engine_debug!("phase {:?} -> {:?}", self.current, to);
        self.current = to;
    }
}
