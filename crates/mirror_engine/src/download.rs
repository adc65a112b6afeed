use std::path::Path;
use std::sync::Arc;

use engine_logging::engine_job;
use log::Level;

use crate::{DownloadTask, Fetcher, JobId, Outcome, ProgressAggregator};

/// Single-attempt file download; failures only show up in the counters.
pub struct Downloader {
    fetcher: Arc<dyn Fetcher>,
}

impl Downloader {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn download(
        &self,
        job_id: JobId,
        task: &DownloadTask,
        progress: &ProgressAggregator,
    ) -> Outcome {
        let outcome = match self.fetcher.fetch(job_id, &task.source_url).await {
            Ok(output) if output.metadata.status == 200 => {
                match write_file(&task.destination_path, &output.bytes).await {
                    Ok(()) => {
                        engine_job!(
                            Level::Debug,
                            job_id,
                            "wrote {} bytes to {:?}",
                            output.bytes.len(),
                            task.destination_path
                        );
                        Outcome::Downloaded
                    }
                    Err(err) => {
                        engine_job!(
                            Level::Warn,
                            job_id,
                            "write {:?} failed: {}",
                            task.destination_path,
                            err
                        );
                        Outcome::SkippedError
                    }
                }
            }
            Ok(output) => {
                engine_job!(
                    Level::Warn,
                    job_id,
                    "{} answered {}, not downloading",
                    task.source_url,
                    output.metadata.status
                );
                Outcome::SkippedError
            }
            Err(err) => {
                engine_job!(Level::Warn, job_id, "{} failed: {}", task.source_url, err);
                Outcome::SkippedError
            }
        };

        let subject = task.destination_path.display().to_string();
        progress.record(job_id, outcome, &subject);
        outcome
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Err(err) = tokio::fs::write(path, bytes).await {
        let _ = tokio::fs::remove_file(path).await;
        return Err(err);
    }
    Ok(())
}
