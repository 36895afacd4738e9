use clap::Parser;
use std::time::Duration;

use crate::check::CheckConfig;

#[derive(Parser, Debug)]
#[command(name = "check_image_updates")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_TIME"), ")"))]
#[command(about = "Report running containers whose image has a newer version in its registry", long_about = None)]
#[command(after_help = "Environment: CHECK_IMAGE_UPDATES_DEBUG=1 traces every backend call on stderr. \
Only --runtime and --helper also read an environment variable.\n\
Invalid arguments print a CRITICAL status line and exit 2.")]
pub struct Cli {
    /// Container runtime CLI
    #[arg(long, env = "CHECK_IMAGE_UPDATES_RUNTIME", default_value = "docker")]
    pub runtime: String,

    /// Registry inspection helper used when manifest inspection fails
    #[arg(long, env = "CHECK_IMAGE_UPDATES_HELPER", default_value = "skopeo")]
    pub helper: String,

    /// Timeout in seconds for every external command
    #[arg(long, default_value_t = 30,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Number of images resolved in parallel
    #[arg(short, long, default_value_t = 1,
          value_parser = clap::value_parser!(u64).range(1..=64))]
    pub jobs: u64,

    /// Never retry runtime access through sudo
    #[arg(long)]
    pub no_sudo: bool,

    /// Debug diagnostics on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn config(&self) -> CheckConfig {
        CheckConfig {
            runtime: self.runtime.clone(),
            helper: self.helper.clone(),
            timeout: Duration::from_secs(self.timeout),
            jobs: usize::try_from(self.jobs).unwrap_or(1),
            allow_sudo: !self.no_sudo,
        }
    }
}
