use std::future::Future;

use engine_logging::engine_debug;
use futures_util::stream::{self, StreamExt};

/// Run `job` over every item with at most `limit` in flight.
///
/// Returns once every job has finished; results arrive in completion order,
/// not submission order. The return is the barrier between run phases.
pub async fn run_bounded<T, R, F, Fut>(stage: &str, limit: usize, items: Vec<T>, job: F) -> Vec<R>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = R>,
{
    let limit = limit.max(1);
    engine_debug!("stage={} jobs={} limit={} started", stage, items.len(), limit);
    let results: Vec<R> = stream::iter(items)
        .map(job)
        .buffer_unordered(limit)
        .collect()
        .await;
    engine_debug!("stage={} jobs={} drained", stage, results.len());
    results
}
