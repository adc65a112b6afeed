use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use mirror_engine::run_bounded;

#[tokio::test]
async fn never_exceeds_the_limit_and_runs_everything() {
    let in_flight = AtomicUsize::new(0);
    let peak = AtomicUsize::new(0);
    let (in_flight, peak) = (&in_flight, &peak);

    let mut results = run_bounded("test", 3, (0..20).collect(), move |n: u32| async move {
        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        in_flight.fetch_sub(1, Ordering::SeqCst);
        n * 2
    })
    .await;

    results.sort_unstable();
    assert_eq!(results, (0..20).map(|n| n * 2).collect::<Vec<_>>());
    assert!(peak.load(Ordering::SeqCst) <= 3);
    assert!(peak.load(Ordering::SeqCst) >= 2);
    assert_eq!(in_flight.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn zero_limit_still_makes_progress() {
    let results = run_bounded("test", 0, vec![1, 2, 3], |n: i32| async move { n + 1 }).await;
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn empty_stage_returns_immediately() {
    let results: Vec<()> = run_bounded("test", 10, Vec::<u8>::new(), |_| async {}).await;
    assert!(results.is_empty());
}
