//! Per-image update classification

use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;

use crate::check::digest::Digest;
use crate::check::reference::NormalizedImageRef;
use crate::check::resolver::Resolver;
use crate::utils::TrackedContainer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Fresh,
    Stale,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageVerdict {
    pub image: NormalizedImageRef,
    pub status: Verdict,
    pub local: Option<Digest>,
    pub remote: Option<Digest>,
}

/// Unique images in first-seen order, each paired with its first container, whose name
/// stands for the image in messages.
pub fn unique_images(containers: &[TrackedContainer]) -> Vec<(&NormalizedImageRef, &str)> {
    let mut claimed = HashSet::new();
    containers
        .iter()
        .filter(|c| claimed.insert(&c.image))
        .map(|c| (&c.image, c.record.name.as_str()))
        .collect()
}

/// Classifies every unique image once. `jobs > 1` spreads the images over scoped workers.
pub fn evaluate(containers: &[TrackedContainer], resolver: &Resolver<'_>, jobs: usize) -> Vec<ImageVerdict> {
    let work = unique_images(containers);

    if jobs <= 1 || work.len() <= 1 {
        return work
            .iter()
            .map(|(image, name)| evaluate_image(resolver, image, name))
            .collect();
    }

    let cursor = AtomicUsize::new(0);
    let slots = Mutex::new(vec![None; work.len()]);

    thread::scope(|s| {
        for _ in 0..jobs.min(work.len()) {
            s.spawn(|| loop {
                let i = cursor.fetch_add(1, Ordering::SeqCst);
                let Some((image, name)) = work.get(i) else { break };
                let verdict = evaluate_image(resolver, image, name);
                if let Ok(mut slots) = slots.lock() {
                    slots[i] = Some(verdict);
                }
            });
        }
    });

    slots
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .into_iter()
        .flatten()
        .collect()
}

pub fn evaluate_image(resolver: &Resolver<'_>, image: &NormalizedImageRef, representative: &str) -> ImageVerdict {
    info!("Checking {} ({})", representative, image);
    if let Some(host) = image.registry_host() {
        debug!("{}: registry {}", image, host);
    }

    let unknown = |local: Option<Digest>| ImageVerdict {
        image: image.clone(),
        status: Verdict::Unknown,
        local,
        remote: None,
    };

    // No remote lookup when there is nothing local to compare against
    let local = resolver.resolve_local(image);
    if !local.resolved() {
        warn!("{}: cannot determine {} digest ({})", image, local.source, local.failures.join("; "));
        return unknown(None);
    }

    let remote = resolver.resolve_remote(image);
    if !remote.resolved() {
        warn!("{}: cannot determine {} digest ({})", image, remote.source, remote.failures.join("; "));
        return unknown(local.value);
    }

    let (Some(local), Some(remote)) = (local.value, remote.value) else {
        return unknown(None);
    };

    let status = if local == remote { Verdict::Fresh } else { Verdict::Stale };
    match status {
        Verdict::Stale => info!("{}: update available ({} -> {})", image, local.short(), remote.short()),
        _ => debug!("{}: up to date ({})", image, local.short()),
    }

    ImageVerdict {
        image: image.clone(),
        status,
        local: Some(local),
        remote: Some(remote),
    }
}
