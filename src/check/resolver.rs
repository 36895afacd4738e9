//! Local and remote digest resolution
//!
//! Local: the repo digest the runtime recorded at pull time. Remote: an ordered chain of
//! strategies, the first one producing a valid digest wins. Failures are collected for
//! diagnostics and never escalate past the image.

use log::debug;
use std::fmt;

use crate::backend::{ContainerBackend, RegistryHelper};
use crate::check::digest::Digest;
use crate::check::reference::NormalizedImageRef;
use crate::utils::ResolveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestSource {
    Local,
    Remote,
}

impl fmt::Display for DigestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestSource::Local => write!(f, "local"),
            DigestSource::Remote => write!(f, "registry"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestResult {
    pub value: Option<Digest>,
    pub source: DigestSource,
    /// One entry per failed attempt, in the order tried.
    pub failures: Vec<String>,
}

impl DigestResult {
    pub fn resolved(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStrategy {
    /// Registry manifest fetched by the runtime itself.
    Manifest,
    /// External registry inspection tool.
    Helper,
}

pub const REMOTE_CHAIN: [RemoteStrategy; 2] = [RemoteStrategy::Manifest, RemoteStrategy::Helper];

impl fmt::Display for RemoteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteStrategy::Manifest => write!(f, "manifest inspect"),
            RemoteStrategy::Helper => write!(f, "registry helper"),
        }
    }
}

pub struct Resolver<'a> {
    backend: &'a dyn ContainerBackend,
    helper: Option<&'a dyn RegistryHelper>,
}

impl<'a> Resolver<'a> {
    pub fn new(backend: &'a dyn ContainerBackend, helper: Option<&'a dyn RegistryHelper>) -> Self {
        Resolver { backend, helper }
    }

    pub fn resolve_local(&self, image: &NormalizedImageRef) -> DigestResult {
        match self.backend.inspect_local_digest(image) {
            Ok(digest) => DigestResult {
                value: Some(digest),
                source: DigestSource::Local,
                failures: Vec::new(),
            },
            Err(e) => {
                debug!("{}: local digest: {}", image, e);
                DigestResult {
                    value: None,
                    source: DigestSource::Local,
                    failures: vec![format!("local: {}", e)],
                }
            }
        }
    }

    pub fn resolve_remote(&self, image: &NormalizedImageRef) -> DigestResult {
        let mut failures = Vec::new();

        for strategy in REMOTE_CHAIN {
            match self.attempt(strategy, image) {
                Ok(digest) => {
                    debug!("{}: remote digest {} via {}", image, digest.short(), strategy);
                    return DigestResult {
                        value: Some(digest),
                        source: DigestSource::Remote,
                        failures,
                    };
                }
                Err(e) => {
                    debug!("{}: {} failed: {}", image, strategy, e);
                    failures.push(format!("{}: {}", strategy, e));
                }
            }
        }

        DigestResult { value: None, source: DigestSource::Remote, failures }
    }

    fn attempt(&self, strategy: RemoteStrategy, image: &NormalizedImageRef) -> Result<Digest, ResolveError> {
        match strategy {
            RemoteStrategy::Manifest => self.backend.fetch_manifest_digest(image),
            RemoteStrategy::Helper => {
                let helper = self.helper.ok_or(ResolveError::HelperUnavailable)?;
                helper.inspect_remote_digest(image).map_err(|e| {
                    debug!("{}: {} could not inspect: {}", image, helper.name(), e);
                    e
                })
            }
        }
    }
}
