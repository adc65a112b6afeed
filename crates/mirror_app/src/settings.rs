use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use engine_logging::engine_info;
use mirror_engine::{MirrorConfig, DEFAULT_RUN_STATE_FILE};
use serde::Deserialize;

use crate::cli::Cli;

const DEFAULT_SETTINGS_FILE: &str = "mirror.ron";

/// Optional overrides read from a RON file, e.g.
///
/// ```ron
/// #![enable(implicit_some)]
/// (
///     download_dir: "/srv/subs",
///     workers: 4,
///     request_timeout_secs: 120,
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub root_url: Option<String>,
    pub download_dir: Option<PathBuf>,
    pub state_file: Option<PathBuf>,
    pub workers: Option<usize>,
    pub extensions: Option<Vec<String>>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub max_bytes: Option<u64>,
}

/// Everything a run needs, after defaults, file and command line are merged.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub mirror: MirrorConfig,
    pub state_file: PathBuf,
}

/// Read `explicit` (which must exist) or `./mirror.ron` (if it exists).
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<Settings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_SETTINGS_FILE);
            if !default.exists() {
                return Ok(Settings::default());
            }
            default
        }
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read settings file {path:?}"))?;
    let settings = parse_settings(&content)
        .with_context(|| format!("failed to parse settings file {path:?}"))?;
    engine_info!("Loaded settings from {:?}", path);
    Ok(settings)
}

pub fn parse_settings(content: &str) -> anyhow::Result<Settings> {
    Ok(ron::from_str(content)?)
}

impl Settings {
    /// Command-line values win over file values.
    pub fn overlay(self, cli: &Cli) -> Settings {
        Settings {
            root_url: cli.root_url.clone().or(self.root_url),
            download_dir: cli.download_dir.clone().or(self.download_dir),
            state_file: cli.state_file.clone().or(self.state_file),
            workers: cli.workers.or(self.workers),
            ..self
        }
    }

    pub fn resolve(self) -> anyhow::Result<Resolved> {
        let mut mirror = MirrorConfig::default();
        if let Some(root_url) = self.root_url {
            mirror.root_url = root_url;
        }
        if let Some(dir) = self.download_dir {
            mirror.download_root = dir;
        }
        if let Some(workers) = self.workers {
            if workers == 0 {
                bail!("workers must be at least 1");
            }
            mirror.workers = workers;
        }
        if let Some(extensions) = self.extensions {
            if extensions.is_empty() {
                bail!("extensions must not be empty");
            }
            mirror.extensions = extensions;
        }
        if let Some(secs) = self.connect_timeout_secs {
            mirror.fetch.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.request_timeout_secs {
            mirror.fetch.request_timeout = Duration::from_secs(secs);
        }
        if let Some(max_bytes) = self.max_bytes {
            mirror.fetch.max_bytes = max_bytes;
        }

        Ok(Resolved {
            mirror,
            state_file: self
                .state_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RUN_STATE_FILE)),
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use mirror_engine::{DEFAULT_ROOT_URL, DEFAULT_WORKERS};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn defaults_apply_without_a_file() {
        let resolved = Settings::default().resolve().unwrap();
        assert_eq!(resolved.mirror.root_url, DEFAULT_ROOT_URL);
        assert_eq!(resolved.mirror.workers, DEFAULT_WORKERS);
        assert_eq!(resolved.mirror.download_root, PathBuf::from("downloaded_files"));
        assert_eq!(resolved.state_file, PathBuf::from("last_run_date.txt"));
    }

    #[test]
    fn file_values_override_defaults() {
        let settings = parse_settings(
            r#"#![enable(implicit_some)]
            (
                download_dir: "/srv/subs",
                workers: 3,
                extensions: [".srt"],
                request_timeout_secs: 5,
            )"#,
        )
        .unwrap();

        let resolved = settings.resolve().unwrap();
        assert_eq!(resolved.mirror.download_root, PathBuf::from("/srv/subs"));
        assert_eq!(resolved.mirror.workers, 3);
        assert_eq!(resolved.mirror.extensions, vec![".srt".to_string()]);
        assert_eq!(resolved.mirror.fetch.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn command_line_beats_file() {
        let settings = Settings {
            workers: Some(3),
            root_url: Some("https://example.com/list".into()),
            ..Settings::default()
        };
        let cli = Cli::parse_from(["subtitle_mirror", "--workers", "8", "-o", "out"]);

        let resolved = settings.overlay(&cli).resolve().unwrap();
        assert_eq!(resolved.mirror.workers, 8);
        assert_eq!(resolved.mirror.download_root, PathBuf::from("out"));
        assert_eq!(resolved.mirror.root_url, "https://example.com/list");
    }

    #[test]
    fn zero_workers_is_rejected() {
        let settings = Settings {
            workers: Some(0),
            ..Settings::default()
        };
        assert!(settings.resolve().is_err());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(parse_settings("(wokers: Some(3))").is_err());
    }

    #[test]
    fn explicit_settings_file_must_exist() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.ron");
        assert!(load_settings(Some(&missing)).is_err());

        let present = temp.path().join("mirror.ron");
        fs::write(&present, "(workers: Some(2))").unwrap();
        assert_eq!(load_settings(Some(&present)).unwrap().workers, Some(2));
    }
}
