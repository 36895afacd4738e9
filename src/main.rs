mod backend;
mod check;
mod cli;
mod utils;

use clap::Parser;
use check::output::{self, Outcome};
use cli::Cli;
use utils::CheckError;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let reason = e.to_string();
            let reason = reason.lines().next().unwrap_or("").trim_start_matches("error: ");
            let err = CheckError::InvalidConfig(reason.to_string());
            std::process::exit(output::display(&Outcome::Critical(err.to_string())));
        }
    };

    utils::logging::init(cli.verbose);

    let outcome = match check::run_check(&cli.config()) {
        Ok(report) => Outcome::Report(report),
        Err(e) => {
            log::error!("{}", e);
            Outcome::Critical(e.to_string())
        }
    };

    std::process::exit(output::display(&outcome));
}
