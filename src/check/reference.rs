//! Image reference canonicalization
//!
//! Every container image is reduced to `repository[:tag]` with an explicit tag. A registry
//! host in front of the repository is kept, manifest lookups need it.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

pub const DEFAULT_TAG: &str = "latest";

lazy_static! {
    static ref REGISTRY_HOST_RE: Regex =
        Regex::new(r"\.[A-Za-z]{2}").expect("registry host pattern");
}

/// Canonical `repository:tag` reference, the deduplication key of a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedImageRef(String);

impl NormalizedImageRef {
    pub fn normalize(raw: &str) -> Self {
        let raw = raw.trim();
        if last_segment(raw).contains(':') {
            NormalizedImageRef(raw.to_string())
        } else {
            NormalizedImageRef(format!("{}:{}", raw, DEFAULT_TAG))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The reference with tag and digest removed, as used in `RepoDigests` entries.
    pub fn repository(&self) -> &str {
        let start = self.0.len() - last_segment(&self.0).len();
        match self.0[start..].find(|c| c == ':' || c == '@') {
            Some(i) => &self.0[..start + i],
            None => &self.0,
        }
    }

    /// First path segment when it looks like a registry host (a dot followed by two letters).
    /// Informational only, the host always stays part of the reference.
    pub fn registry_host(&self) -> Option<&str> {
        let (first, _) = self.0.split_once('/')?;
        if REGISTRY_HOST_RE.is_match(first) {
            Some(first)
        } else {
            None
        }
    }
}

impl fmt::Display for NormalizedImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn last_segment(s: &str) -> &str {
    match s.rfind('/') {
        Some(i) => &s[i + 1..],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> String {
        NormalizedImageRef::normalize(s).as_str().to_string()
    }

    #[test]
    fn appends_latest_when_untagged() {
        assert_eq!(norm("nginx"), "nginx:latest");
        assert_eq!(norm("library/nginx"), "library/nginx:latest");
        assert_eq!(norm("ghcr.io/org/app"), "ghcr.io/org/app:latest");
        assert_eq!(norm("localhost:5000/app"), "localhost:5000/app:latest");
    }

    #[test]
    fn keeps_explicit_tag_and_digest() {
        assert_eq!(norm("nginx:1.25-alpine"), "nginx:1.25-alpine");
        assert_eq!(norm("registry.example.com:5000/team/app:v2"), "registry.example.com:5000/team/app:v2");
        let pinned = format!("redis@sha256:{}", "a".repeat(64));
        assert_eq!(norm(&pinned), pinned);
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in [
            "nginx",
            "nginx:latest",
            "quay.io/prometheus/node-exporter",
            "localhost:5000/app",
            "my.registry.io:443/a/b/c:1.0",
            " postgres ",
        ] {
            let once = NormalizedImageRef::normalize(raw);
            let twice = NormalizedImageRef::normalize(once.as_str());
            assert_eq!(once, twice, "{}", raw);
            assert!(once.as_str().matches(":latest").count() <= 1);
        }
    }

    #[test]
    fn repository_strips_tag_and_digest() {
        let r = NormalizedImageRef::normalize("localhost:5000/team/app");
        assert_eq!(r.repository(), "localhost:5000/team/app");

        let r = NormalizedImageRef::normalize("nginx:1.25");
        assert_eq!(r.repository(), "nginx");

        let pinned = format!("redis@sha256:{}", "b".repeat(64));
        let r = NormalizedImageRef::normalize(&pinned);
        assert_eq!(r.repository(), "redis");
    }

    #[test]
    fn registry_host_detection() {
        let host = |s: &str| NormalizedImageRef::normalize(s).registry_host().map(String::from);
        assert_eq!(host("ghcr.io/org/app"), Some("ghcr.io".to_string()));
        assert_eq!(host("registry.example.com:5000/app"), Some("registry.example.com:5000".to_string()));
        assert_eq!(host("library/nginx"), None);
        assert_eq!(host("nginx"), None);
        assert_eq!(host("localhost:5000/app"), None);
        assert_eq!(host("10.0.0.1/app"), None);
    }
}
