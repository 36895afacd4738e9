//! Everything that talks to the outside world: the container runtime CLI and the optional
//! registry inspection helper.

pub mod docker;
pub mod exec;
pub mod skopeo;

#[cfg(test)]
pub mod fake;

use crate::check::digest::Digest;
use crate::check::reference::NormalizedImageRef;
use crate::utils::{ContainerRecord, ExecError, ResolveError};

/// Capabilities the check consumes from a container runtime.
pub trait ContainerBackend: Send + Sync {
    /// Confirms the daemon answers, returning its version.
    fn probe_access(&self) -> Result<String, ExecError>;

    /// Running containers; malformed rows are already dropped.
    fn list_containers(&self) -> Result<Vec<ContainerRecord>, ExecError>;

    /// Repo digest recorded when the image was pulled.
    fn inspect_local_digest(&self, image: &NormalizedImageRef) -> Result<Digest, ResolveError>;

    /// Digest of the registry's current manifest, fetched without pulling layers.
    fn fetch_manifest_digest(&self, image: &NormalizedImageRef) -> Result<Digest, ResolveError>;
}

/// External tool able to read a manifest digest straight from the registry.
pub trait RegistryHelper: Send + Sync {
    fn name(&self) -> &str;

    fn inspect_remote_digest(&self, image: &NormalizedImageRef) -> Result<Digest, ResolveError>;
}
