pub mod digest;
pub mod evaluator;
pub mod lister;
pub mod output;
pub mod probe;
pub mod reference;
pub mod report;
pub mod resolver;

use log::debug;
use nix::unistd::Uid;
use std::time::Duration;

use crate::backend::docker::DockerCli;
use crate::backend::skopeo::Skopeo;
use crate::backend::{ContainerBackend, RegistryHelper};
use crate::utils::{Result, TrackedContainer};
use report::RunReport;
use resolver::Resolver;

#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub runtime: String,
    pub helper: String,
    pub timeout: Duration,
    pub jobs: usize,
    pub allow_sudo: bool,
}

/// Probes the runtime, then checks every running container. Only an unreachable runtime
/// is an error; everything later folds into the report.
pub fn run_check(config: &CheckConfig) -> Result<RunReport> {
    let modes = probe::candidate_modes(config.allow_sudo, Uid::effective().is_root());
    let (docker, mode) = probe::probe(&modes, |mode| DockerCli::new(&config.runtime, mode, config.timeout))?;
    debug!("using {} invocation for {}", mode, config.runtime);

    let helper = Skopeo::detect(&config.helper, config.timeout);
    if helper.is_none() {
        debug!("{} not found, registry helper fallback disabled", config.helper);
    }

    Ok(check_containers(&docker, helper.as_ref().map(|h| h as &dyn RegistryHelper), config.jobs))
}

pub fn check_containers(
    backend: &dyn ContainerBackend,
    helper: Option<&dyn RegistryHelper>,
    jobs: usize,
) -> RunReport {
    let containers: Vec<TrackedContainer> = lister::list_running_containers(backend)
        .into_iter()
        .map(TrackedContainer::new)
        .collect();

    if containers.is_empty() {
        return report::aggregate(&[], &[]);
    }

    let resolver = Resolver::new(backend, helper);
    let verdicts = evaluator::evaluate(&containers, &resolver, jobs);
    for v in &verdicts {
        debug!(
            "{}: {:?} (local {}, registry {})",
            v.image,
            v.status,
            v.local.as_ref().map_or("-", |d| d.short()),
            v.remote.as_ref().map_or("-", |d| d.short()),
        );
    }

    let report = report::aggregate(&containers, &verdicts);
    debug!(
        "{} unique image(s): {} fresh, {} stale, {} unknown",
        verdicts.len(),
        report.images.fresh,
        report.images.stale,
        report.images.unknown
    );
    report
}
