//! In-memory backend and helper for unit tests, counting every call.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::backend::{ContainerBackend, RegistryHelper};
use crate::check::digest::Digest;
use crate::check::reference::NormalizedImageRef;
use crate::utils::{ContainerRecord, ExecError, ResolveError};

pub fn digest(c: char) -> Digest {
    Digest::parse(&format!("sha256:{}", c.to_string().repeat(64))).unwrap()
}

fn unreachable_exec() -> ExecError {
    ExecError::Failed {
        program: "docker".to_string(),
        status: "exit code 1".to_string(),
        stderr: "Cannot connect to the Docker daemon".to_string(),
    }
}

#[derive(Debug, Default)]
pub struct FakeBackend {
    pub reachable: bool,
    pub containers: Vec<ContainerRecord>,
    pub local: HashMap<String, Digest>,
    pub remote: HashMap<String, Digest>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        FakeBackend { reachable: true, ..Default::default() }
    }

    pub fn container(mut self, name: &str, image: &str) -> Self {
        self.containers.push(ContainerRecord { name: name.to_string(), raw_image: image.to_string() });
        self
    }

    pub fn local(mut self, image: &str, d: Digest) -> Self {
        self.local.insert(image.to_string(), d);
        self
    }

    pub fn remote(mut self, image: &str, d: Digest) -> Self {
        self.remote.insert(image.to_string(), d);
        self
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ContainerBackend for FakeBackend {
    fn probe_access(&self) -> Result<String, ExecError> {
        self.record("probe".to_string());
        if self.reachable {
            Ok("24.0.7".to_string())
        } else {
            Err(unreachable_exec())
        }
    }

    fn list_containers(&self) -> Result<Vec<ContainerRecord>, ExecError> {
        self.record("list".to_string());
        Ok(self.containers.clone())
    }

    fn inspect_local_digest(&self, image: &NormalizedImageRef) -> Result<Digest, ResolveError> {
        self.record(format!("local {}", image));
        self.local.get(image.as_str()).cloned().ok_or(ResolveError::NoRepoDigest)
    }

    fn fetch_manifest_digest(&self, image: &NormalizedImageRef) -> Result<Digest, ResolveError> {
        self.record(format!("manifest {}", image));
        self.remote
            .get(image.as_str())
            .cloned()
            .ok_or_else(|| ResolveError::Parse("manifest unknown".to_string()))
    }
}

#[derive(Debug, Default)]
pub struct FakeHelper {
    pub remote: HashMap<String, Digest>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeHelper {
    pub fn remote(mut self, image: &str, d: Digest) -> Self {
        self.remote.insert(image.to_string(), d);
        self
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl RegistryHelper for FakeHelper {
    fn name(&self) -> &str {
        "fake-helper"
    }

    fn inspect_remote_digest(&self, image: &NormalizedImageRef) -> Result<Digest, ResolveError> {
        self.calls.lock().unwrap().push(image.to_string());
        self.remote
            .get(image.as_str())
            .cloned()
            .ok_or_else(|| ResolveError::Parse("helper: manifest unknown".to_string()))
    }
}
