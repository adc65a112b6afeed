use std::path::PathBuf;

use clap::Parser;
use mirror_core::TimeWindow;

use crate::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(
    name = "subtitle_mirror",
    version,
    about = "Mirror new subtitle files from a directory-listing site"
)]
pub struct Cli {
    /// RON settings file. Defaults to ./mirror.ron when that file exists.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listing page whose rows are the subdirectories to mirror.
    #[arg(long)]
    pub root_url: Option<String>,

    /// Local directory receiving `<subdir>/<file>`.
    #[arg(short = 'o', long)]
    pub download_dir: Option<PathBuf>,

    /// File holding the timestamp of the last completed run.
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Concurrent scans or downloads.
    #[arg(short = 'n', long)]
    pub workers: Option<usize>,

    /// Download everything, without prompting.
    #[arg(long, conflicts_with_all = ["since_last", "days"])]
    pub full: bool,

    /// Only entries modified since the last completed run, without prompting.
    #[arg(long, conflicts_with = "days")]
    pub since_last: bool,

    /// Only entries modified in the last N days, without prompting.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub days: Option<u32>,

    /// Where log records go; the console carries the progress line.
    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Window chosen on the command line, if any.
    pub fn window(&self) -> Option<TimeWindow> {
        if self.full {
            Some(TimeWindow::Full)
        } else if self.since_last {
            Some(TimeWindow::SinceLastRun)
        } else {
            self.days.map(TimeWindow::Days)
        }
    }
}
