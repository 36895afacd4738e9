use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

use crate::utils::ResolveError;

lazy_static! {
    static ref DIGEST_RE: Regex = Regex::new("^sha256:[0-9a-fA-F]{64}$").expect("digest pattern");
}

/// A validated `sha256:<64 hex>` manifest digest, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest(String);

impl Digest {
    pub fn parse(s: &str) -> Result<Self, ResolveError> {
        let s = s.trim();
        if DIGEST_RE.is_match(s) {
            Ok(Digest(s.to_ascii_lowercase()))
        } else {
            Err(ResolveError::MalformedDigest(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for log lines.
    pub fn short(&self) -> &str {
        &self.0[..19]
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_sha256_with_64_hex() {
        let hex = "0123456789abcdef".repeat(4);
        let d = Digest::parse(&format!("sha256:{}", hex)).unwrap();
        assert_eq!(d.as_str(), format!("sha256:{}", hex));
        assert_eq!(d.short(), "sha256:0123456789ab");
    }

    #[test]
    fn uppercase_hex_is_folded() {
        let d = Digest::parse(&format!("sha256:{}", "AB".repeat(32))).unwrap();
        assert_eq!(d, Digest::parse(&format!("sha256:{}", "ab".repeat(32))).unwrap());
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert!(Digest::parse(&format!("  sha256:{}\n", "c".repeat(64))).is_ok());
    }

    #[test]
    fn rejects_other_shapes() {
        for bad in [
            String::new(),
            "sha256:".to_string(),
            format!("sha256:{}", "a".repeat(63)),
            format!("sha256:{}", "a".repeat(65)),
            format!("sha512:{}", "a".repeat(64)),
            format!("sha256:{}g", "a".repeat(63)),
            format!("nginx@sha256:{}", "a".repeat(64)),
            "<no value>".to_string(),
        ] {
            assert!(
                matches!(Digest::parse(&bad), Err(ResolveError::MalformedDigest(_))),
                "{:?}",
                bad
            );
        }
    }
}
