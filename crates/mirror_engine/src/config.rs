use std::path::PathBuf;

use crate::FetchSettings;

pub const DEFAULT_ROOT_URL: &str = "https://kitsunekko.net/dirlist.php?dir=subtitles%2Fjapanese%2F";
pub const DEFAULT_DOWNLOAD_ROOT: &str = "downloaded_files";
pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_EXTENSIONS: &[&str] = &[".zip", ".7z", ".rar", ".ass", ".srt"];

#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Listing whose rows are the subdirectories to mirror.
    pub root_url: String,
    /// Files land in `download_root/<subdir>/<file>`.
    pub download_root: PathBuf,
    /// Concurrent jobs per stage.
    pub workers: usize,
    /// Case-sensitive URL suffixes worth downloading.
    pub extensions: Vec<String>,
    pub fetch: FetchSettings,
}

impl MirrorConfig {
    pub fn default_with_output(download_root: PathBuf) -> Self {
        Self {
            download_root,
            ..Self::default()
        }
    }

    pub fn wants_file(&self, url: &str) -> bool {
        self.extensions.iter().any(|ext| url.ends_with(ext.as_str()))
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            root_url: DEFAULT_ROOT_URL.to_string(),
            download_root: PathBuf::from(DEFAULT_DOWNLOAD_ROOT),
            workers: DEFAULT_WORKERS,
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            fetch: FetchSettings::default(),
        }
    }
}
