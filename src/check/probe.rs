//! Runtime reachability probe
//!
//! Tries each invocation mode in order and keeps the first backend that answers. The
//! chosen mode is used for every later call of the run.

use log::debug;

use crate::backend::ContainerBackend;
use crate::utils::{CheckError, InvocationMode, Result};

/// Direct access first, sudo only when allowed and not already root.
pub fn candidate_modes(allow_sudo: bool, is_root: bool) -> Vec<InvocationMode> {
    let mut modes = vec![InvocationMode::Direct];
    if allow_sudo && !is_root {
        modes.push(InvocationMode::Sudo);
    }
    modes
}

pub fn probe<B, F>(modes: &[InvocationMode], connect: F) -> Result<(B, InvocationMode)>
where
    B: ContainerBackend,
    F: Fn(InvocationMode) -> B,
{
    let mut last_error = None;

    for &mode in modes {
        let backend = connect(mode);
        match backend.probe_access() {
            Ok(version) => {
                debug!("runtime reachable ({} mode), server version {}", mode, version);
                return Ok((backend, mode));
            }
            Err(e) => {
                debug!("probe in {} mode failed: {}", mode, e);
                last_error = Some(e);
            }
        }
    }

    Err(CheckError::BackendUnreachable(match last_error {
        Some(e) => e.to_string(),
        None => "no invocation mode to try".to_string(),
    }))
}
