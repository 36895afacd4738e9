//! Output layer: turns the run outcome into the status line and exit code

use crate::check::report::{RunReport, Status};

/// What a run ended with.
#[derive(Debug)]
pub enum Outcome {
    Report(RunReport),
    Critical(String),
}

impl Outcome {
    pub fn status(&self) -> Status {
        match self {
            Outcome::Report(report) => report.status(),
            Outcome::Critical(_) => Status::Critical,
        }
    }
}

/// Prints to stdout and returns the exit code.
pub fn display(outcome: &Outcome) -> i32 {
    for line in render(outcome) {
        println!("{}", line);
    }
    outcome.status().exit_code()
}

pub fn render(outcome: &Outcome) -> Vec<String> {
    let status = outcome.status();
    let report = match outcome {
        Outcome::Report(report) => report,
        Outcome::Critical(reason) => return vec![format!("{} - {}", status, reason)],
    };

    if report.total_containers == 0 {
        return vec![format!("{} - No running containers found", status)];
    }

    if report.update_count == 0 {
        let line = if report.failed_count == 0 {
            format!("{} - All {} container(s) are up to date", status, report.total_containers)
        } else {
            format!(
                "{} - {} image(s) could not be checked, but no updates found ({} container(s), 0 updates)",
                status, report.failed_count, report.total_containers
            )
        };
        return vec![line];
    }

    let mut summary = format!("{} - {} container(s) have image updates available", status, report.update_count);
    if report.failed_count > 0 {
        summary.push_str(&format!(" ({} image(s) could not be checked)", report.failed_count));
    }

    let mut lines = vec![summary];
    lines.extend(
        report
            .stale_images
            .iter()
            .map(|s| format!("  {} ({})", s.container, s.image)),
    );
    lines
}
