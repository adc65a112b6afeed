mod cli;
mod logging;
mod prompt;
mod settings;

use std::process::ExitCode;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use engine_logging::{engine_error, engine_info};
use mirror_engine::{Mirror, ProgressAggregator, RunReport, RunStateStore};

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.log, cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            engine_error!("Run aborted: {:#}", err);
            eprintln!("Fatal: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let resolved = settings::load_settings(cli.config.as_deref())?
        .overlay(&cli)
        .resolve()?;

    let run_state = RunStateStore::new(resolved.state_file);
    let last_run = run_state.load();
    println!(
        "{}",
        prompt::last_run_banner(last_run, Local::now().naive_local())
    );

    let window = match cli.window() {
        Some(window) => window,
        None => prompt::choose_window(last_run.is_some())?,
    };
    engine_info!("Selected window: {:?}", window);

    let mirror = Mirror::new(resolved.mirror).context("failed to build HTTP client")?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let progress = ProgressAggregator::stdout();
    let result = runtime.block_on(mirror.run(window, &run_state, &progress));
    progress.finish();

    let report = result.context("mirror run failed, last run date not updated")?;
    print_summary(&report);
    Ok(())
}

fn print_summary(report: &RunReport) {
    println!("Download completed.");
    println!(
        "Files skipped because they already existed: {}",
        report.stats.skipped_existing
    );
    println!(
        "Files skipped because of an error: {}",
        report.stats.skipped_error
    );
    println!("Files downloaded: {}", report.stats.downloaded);
    println!("Runtime: {:.2} seconds", report.elapsed.as_secs_f64());
    println!("Last run date saved.");
}
