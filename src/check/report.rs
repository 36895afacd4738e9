//! Run-level aggregation of per-image verdicts

use std::collections::HashMap;
use std::fmt;

use crate::check::evaluator::{ImageVerdict, Verdict};
use crate::check::reference::NormalizedImageRef;
use crate::utils::TrackedContainer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warning,
    Critical,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::Warning => write!(f, "WARNING"),
            Status::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleContainer {
    pub container: String,
    pub image: NormalizedImageRef,
}

/// Unique image counts per verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageBuckets {
    pub fresh: usize,
    pub stale: usize,
    pub unknown: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub total_containers: usize,
    /// Containers running a stale image.
    pub update_count: usize,
    /// Unique images that could not be classified.
    pub failed_count: usize,
    pub images: ImageBuckets,
    pub stale_images: Vec<StaleContainer>,
}

impl RunReport {
    pub fn status(&self) -> Status {
        if self.total_containers == 0 {
            return Status::Ok;
        }
        match (self.update_count, self.failed_count) {
            (0, 0) => Status::Ok,
            _ => Status::Warning,
        }
    }
}

pub fn aggregate(containers: &[TrackedContainer], verdicts: &[ImageVerdict]) -> RunReport {
    let mut images = ImageBuckets::default();
    for v in verdicts {
        match v.status {
            Verdict::Fresh => images.fresh += 1,
            Verdict::Stale => images.stale += 1,
            Verdict::Unknown => images.unknown += 1,
        }
    }

    let by_image: HashMap<&NormalizedImageRef, Verdict> =
        verdicts.iter().map(|v| (&v.image, v.status)).collect();

    let stale_images: Vec<StaleContainer> = containers
        .iter()
        .filter(|c| by_image.get(&c.image) == Some(&Verdict::Stale))
        .map(|c| StaleContainer { container: c.record.name.clone(), image: c.image.clone() })
        .collect();

    RunReport {
        total_containers: containers.len(),
        update_count: stale_images.len(),
        failed_count: images.unknown,
        images,
        stale_images,
    }
}
