//! Mirror engine: listing fetch, scan and download pipeline.
mod config;
mod decode;
mod download;
mod fetch;
mod listing;
mod mirror;
mod persist;
mod progress;
mod run_state;
mod scan;
mod stage;
mod types;

pub use config::{
    MirrorConfig, DEFAULT_DOWNLOAD_ROOT, DEFAULT_EXTENSIONS, DEFAULT_ROOT_URL, DEFAULT_WORKERS,
};
pub use decode::{decode_listing, DecodeError, DecodedListing};
pub use download::Downloader;
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use listing::{
    parse_listing, parse_listing_date, ListingError, ListingPage, LISTING_DATE_FORMAT,
};
pub use mirror::{Mirror, MirrorError, RunReport};
pub use persist::{ensure_output_dir, write_atomically, PersistError};
pub use progress::ProgressAggregator;
pub use run_state::{RunStateError, RunStateStore, DEFAULT_RUN_STATE_FILE, RUN_STATE_FORMAT};
pub use scan::{fetch_listing, DirectoryScanner, ListingFetchError, ScanJob};
pub use stage::run_bounded;
pub use types::{
    DirectoryEntry, DownloadTask, FailureKind, FetchError, FetchMetadata, FetchOutput, JobId,
    Outcome, RunStats,
};
