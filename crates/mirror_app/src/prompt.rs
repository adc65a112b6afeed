use std::fmt;

use anyhow::Context;
use chrono::NaiveDateTime;
use inquire::validator::Validation;
use inquire::{CustomType, Select};
use mirror_core::{describe_elapsed, TimeWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowChoice {
    Full,
    SinceLastRun,
    Custom,
}

impl fmt::Display for WindowChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WindowChoice::Full => TimeWindow::Full.label(),
            WindowChoice::SinceLastRun => TimeWindow::SinceLastRun.label(),
            WindowChoice::Custom => TimeWindow::Days(1).label(),
        };
        f.write_str(label)
    }
}

/// "Since last download" only makes sense once a run has completed.
fn window_choices(has_previous_run: bool) -> Vec<WindowChoice> {
    let mut choices = vec![WindowChoice::Full];
    if has_previous_run {
        choices.push(WindowChoice::SinceLastRun);
    }
    choices.push(WindowChoice::Custom);
    choices
}

pub fn last_run_banner(last_run: Option<NaiveDateTime>, now: NaiveDateTime) -> String {
    match last_run {
        Some(last) => format!("Last run was {}.", describe_elapsed(now - last)),
        None => "First run, a full scrape is recommended".to_string(),
    }
}

/// Ask which time window to mirror. Invalid input reprompts.
pub fn choose_window(has_previous_run: bool) -> anyhow::Result<TimeWindow> {
    let choice = Select::new("What should be downloaded?", window_choices(has_previous_run))
        .with_help_message("↑↓ to move, enter to select")
        .prompt()
        .context("time window prompt aborted")?;

    match choice {
        WindowChoice::Full => Ok(TimeWindow::Full),
        WindowChoice::SinceLastRun => Ok(TimeWindow::SinceLastRun),
        WindowChoice::Custom => ask_days().map(TimeWindow::Days),
    }
}

fn ask_days() -> anyhow::Result<u32> {
    CustomType::<u32>::new("Enter the number of days to check:")
        .with_error_message("Invalid input. Please enter a valid positive integer.")
        .with_validator(|days: &u32| {
            if *days == 0 {
                Ok(Validation::Invalid("Please enter a positive integer.".into()))
            } else {
                Ok(Validation::Valid)
            }
        })
        .prompt()
        .context("day count prompt aborted")
}
