use std::fmt;

use crate::check::reference::NormalizedImageRef;

/// One running container as reported by the runtime listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRecord {
    pub name: String,
    pub raw_image: String,
}

/// A listed container together with its canonical image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedContainer {
    pub record: ContainerRecord,
    pub image: NormalizedImageRef,
}

impl TrackedContainer {
    pub fn new(record: ContainerRecord) -> Self {
        let image = NormalizedImageRef::normalize(&record.raw_image);
        TrackedContainer { record, image }
    }
}

/// How every runtime command of a run is launched. Fixed once the probe succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    Direct,
    Sudo,
}

impl fmt::Display for InvocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationMode::Direct => write!(f, "direct"),
            InvocationMode::Sudo => write!(f, "sudo"),
        }
    }
}
