mod support;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mirror_core::AgeCutoff;
use mirror_engine::{
    DirectoryScanner, DownloadTask, FetchSettings, MirrorConfig, ProgressAggregator,
    ReqwestFetcher, RunStats, ScanJob,
};
use pretty_assertions::assert_eq;
use support::{days_ago, listing_html};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn scanner(download_root: PathBuf) -> DirectoryScanner {
    let settings = FetchSettings {
        request_timeout: Duration::from_secs(5),
        ..FetchSettings::default()
    };
    let fetcher = Arc::new(ReqwestFetcher::new(settings).unwrap());
    DirectoryScanner::new(fetcher, MirrorConfig::default_with_output(download_root))
}

fn job(server: &MockServer, dir_path: &str, dir_name: &str) -> ScanJob {
    ScanJob {
        job_id: 1,
        url: format!("{}{dir_path}", server.uri()),
        dir_name: dir_name.to_string(),
    }
}

async fn mount_listing(server: &MockServer, dir_path: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(dir_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn keeps_fresh_allow_listed_files_only() {
    let server = MockServer::start().await;
    let html = listing_html(&[
        ("ep1.srt", "/subs/anime-a/ep1.srt", days_ago(2)),
        ("ep1.zip", "/subs/anime-a/ep1.zip", days_ago(40)),
        ("notes.txt", "/subs/anime-a/notes.txt", days_ago(1)),
        ("EP2.SRT", "/subs/anime-a/EP2.SRT", days_ago(1)),
        ("ep3 [v2].ass", "/subs/anime-a/ep3%20[v2].ass", days_ago(3)),
    ]);
    mount_listing(&server, "/subs/anime-a/", html).await;

    let temp = TempDir::new().unwrap();
    let root = temp.path().join("downloaded_files");
    let progress = ProgressAggregator::silent();
    let cutoff = AgeCutoff::at(days_ago(7));

    let tasks = scanner(root.clone())
        .scan(&job(&server, "/subs/anime-a/", "Anime_A"), cutoff, &progress)
        .await;

    assert_eq!(
        tasks,
        vec![
            DownloadTask {
                source_url: format!("{}/subs/anime-a/ep1.srt", server.uri()),
                destination_path: root.join("Anime_A").join("ep1.srt"),
            },
            DownloadTask {
                source_url: format!("{}/subs/anime-a/ep3%20[v2].ass", server.uri()),
                destination_path: root.join("Anime_A").join("ep3_v2.ass"),
            },
        ]
    );
    assert!(root.join("Anime_A").is_dir());
    assert_eq!(progress.snapshot(), RunStats::default());
}

#[tokio::test]
async fn existing_destination_is_counted_not_planned() {
    let server = MockServer::start().await;
    let html = listing_html(&[
        ("ep1.srt", "/subs/anime-a/ep1.srt", days_ago(2)),
        ("ep2.srt", "/subs/anime-a/ep2.srt", days_ago(2)),
    ]);
    mount_listing(&server, "/subs/anime-a/", html).await;

    let temp = TempDir::new().unwrap();
    let root = temp.path().join("downloaded_files");
    fs::create_dir_all(root.join("Anime_A")).unwrap();
    fs::write(root.join("Anime_A").join("ep1.srt"), "old").unwrap();

    let progress = ProgressAggregator::silent();
    let tasks = scanner(root.clone())
        .scan(
            &job(&server, "/subs/anime-a/", "Anime_A"),
            AgeCutoff::unbounded(),
            &progress,
        )
        .await;

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].destination_path, root.join("Anime_A").join("ep2.srt"));
    assert_eq!(progress.snapshot().skipped_existing, 1);
    assert_eq!(fs::read_to_string(root.join("Anime_A").join("ep1.srt")).unwrap(), "old");
}

#[tokio::test]
async fn failing_listing_counts_one_error_and_plans_nothing() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subs/gone/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let progress = ProgressAggregator::silent();
    let tasks = scanner(temp.path().to_path_buf())
        .scan(&job(&server, "/subs/gone/", "Gone"), AgeCutoff::unbounded(), &progress)
        .await;

    assert!(tasks.is_empty());
    assert_eq!(
        progress.snapshot(),
        RunStats {
            skipped_error: 1,
            ..RunStats::default()
        }
    );
    assert!(!temp.path().join("Gone").exists());
}

#[tokio::test]
async fn names_colliding_after_sanitizing_are_planned_once_per_run() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        "/subs/a/",
        listing_html(&[
            ("ep 1.srt", "/subs/a/ep%201.srt", days_ago(1)),
            ("ep  1.srt", "/subs/a/ep%20%201.srt", days_ago(1)),
        ]),
    )
    .await;
    mount_listing(
        &server,
        "/subs/a-again/",
        listing_html(&[("ep 1.srt", "/subs/a-again/ep%201.srt", days_ago(1))]),
    )
    .await;

    let temp = TempDir::new().unwrap();
    let scanner = scanner(temp.path().to_path_buf());
    let progress = ProgressAggregator::silent();

    let first = scanner
        .scan(&job(&server, "/subs/a/", "A"), AgeCutoff::unbounded(), &progress)
        .await;
    let second = scanner
        .scan(&job(&server, "/subs/a-again/", "A"), AgeCutoff::unbounded(), &progress)
        .await;

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
    assert_eq!(first[0].destination_path, temp.path().join("A").join("ep_1.srt"));
    assert_eq!(progress.snapshot().skipped_existing, 2);
}

#[tokio::test]
async fn names_that_sanitize_alike_are_planned_once() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        "/subs/j/",
        listing_html(&[
            ("第1話.srt", "/subs/j/ep1-wa.srt", days_ago(1)),
            ("第1回.srt", "/subs/j/ep1-kai.srt", days_ago(1)),
        ]),
    )
    .await;

    let temp = TempDir::new().unwrap();
    let scanner = scanner(temp.path().to_path_buf());
    let progress = ProgressAggregator::silent();

    let tasks = scanner
        .scan(&job(&server, "/subs/j/", "J"), AgeCutoff::unbounded(), &progress)
        .await;

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].destination_path, temp.path().join("J").join("1.srt"));
    assert!(tasks[0].source_url.ends_with("/subs/j/ep1-wa.srt"));
    assert_eq!(
        progress.snapshot(),
        RunStats {
            skipped_existing: 1,
            skipped_error: 0,
            downloaded: 0,
        }
    );
}
