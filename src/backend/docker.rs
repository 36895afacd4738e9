//! Docker CLI backend
//! Sources: docker info, docker ps, docker image inspect, docker manifest inspect,
//! docker buildx imagetools inspect

use log::debug;
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::time::Duration;

use crate::backend::exec::Runner;
use crate::backend::ContainerBackend;
use crate::check::digest::Digest;
use crate::check::lister;
use crate::check::reference::NormalizedImageRef;
use crate::utils::{ContainerRecord, ExecError, InvocationMode, ResolveError};

const EXPERIMENTAL_ENV: [(&str, &str); 1] = [("DOCKER_CLI_EXPERIMENTAL", "enabled")];

pub struct DockerCli {
    runner: Runner,
}

impl DockerCli {
    pub fn new(program: &str, mode: InvocationMode, timeout: Duration) -> Self {
        DockerCli { runner: Runner::new(program, mode, timeout) }
    }

    fn imagetools_digest(&self, image: &NormalizedImageRef) -> Result<Digest, ResolveError> {
        let out = self.runner.run(&[
            "buildx", "imagetools", "inspect",
            "--format", "{{json .Manifest}}",
            image.as_str(),
        ])?;

        let descriptor: Descriptor = serde_json::from_str(out.trim())
            .map_err(|e| ResolveError::Parse(format!("imagetools JSON: {}", e)))?;
        Digest::parse(&descriptor.digest)
    }
}

impl ContainerBackend for DockerCli {
    fn probe_access(&self) -> Result<String, ExecError> {
        let out = self.runner.run(&["info", "--format", "{{.ServerVersion}}"])?;
        let version = out.trim();
        if version.is_empty() {
            return Err(ExecError::Failed {
                program: self.runner.program().to_string(),
                status: "exit code 0".to_string(),
                stderr: "no server version reported".to_string(),
            });
        }
        Ok(version.to_string())
    }

    fn list_containers(&self) -> Result<Vec<ContainerRecord>, ExecError> {
        let out = self.runner.run(&["ps", "--format", "{{.Names}}\t{{.Image}}"])?;
        Ok(lister::parse_listing(&out))
    }

    fn inspect_local_digest(&self, image: &NormalizedImageRef) -> Result<Digest, ResolveError> {
        let out = self.runner.run(&[
            "image", "inspect",
            "--format", "{{json .RepoDigests}}",
            image.as_str(),
        ])?;

        let entries: Option<Vec<String>> = serde_json::from_str(out.trim())
            .map_err(|e| ResolveError::Parse(format!("RepoDigests JSON: {}", e)))?;
        select_repo_digest(image, &entries.unwrap_or_default())
    }

    fn fetch_manifest_digest(&self, image: &NormalizedImageRef) -> Result<Digest, ResolveError> {
        let out = self
            .runner
            .run_with_env(&["manifest", "inspect", "--verbose", image.as_str()], &EXPERIMENTAL_ENV)?;

        match parse_manifest_inspect(&out)? {
            ManifestAnswer::Single(digest) => Ok(digest),
            ManifestAnswer::List { platforms } => {
                debug!(
                    "{}: manifest list of {} platform(s), asking imagetools for the index digest",
                    image, platforms
                );
                self.imagetools_digest(image)
            }
        }
    }
}

// ── manifest parsing ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Descriptor {
    digest: String,
}

#[derive(Debug, Deserialize)]
struct VerboseManifest {
    #[serde(rename = "Descriptor")]
    descriptor: Descriptor,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ManifestInspect {
    Single(VerboseManifest),
    List(Vec<IgnoredAny>),
}

#[derive(Debug, PartialEq)]
enum ManifestAnswer {
    Single(Digest),
    /// Per-platform entries only; the index digest is not part of the output.
    List { platforms: usize },
}

fn parse_manifest_inspect(out: &str) -> Result<ManifestAnswer, ResolveError> {
    let parsed: ManifestInspect = serde_json::from_str(out.trim())
        .map_err(|e| ResolveError::Parse(format!("manifest JSON: {}", e)))?;

    match parsed {
        ManifestInspect::Single(m) => Ok(ManifestAnswer::Single(Digest::parse(&m.descriptor.digest)?)),
        ManifestInspect::List(entries) => Ok(ManifestAnswer::List { platforms: entries.len() }),
    }
}

// ── repo digests ────────────────────────────────────────────────────────────

/// Picks the `repo@digest` entry belonging to the image's repository, falling back to the
/// first entry (retagged images carry several).
fn select_repo_digest(image: &NormalizedImageRef, entries: &[String]) -> Result<Digest, ResolveError> {
    let pairs: Vec<(&str, &str)> = entries.iter().filter_map(|e| e.split_once('@')).collect();
    let wanted = hub_short_name(image.repository());

    let (_, digest) = pairs
        .iter()
        .find(|(repo, _)| hub_short_name(repo) == wanted)
        .or_else(|| pairs.first())
        .ok_or(ResolveError::NoRepoDigest)?;

    Digest::parse(digest)
}

fn hub_short_name(repo: &str) -> &str {
    let repo = repo.strip_prefix("docker.io/").unwrap_or(repo);
    repo.strip_prefix("library/").unwrap_or(repo)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(c: char) -> String {
        std::iter::repeat(c).take(64).collect()
    }

    fn image(s: &str) -> NormalizedImageRef {
        NormalizedImageRef::normalize(s)
    }

    #[test]
    fn single_platform_manifest() {
        let out = format!(
            r#"{{"Ref":"docker.io/library/alpine:3.19","Descriptor":{{"mediaType":"application/vnd.docker.distribution.manifest.v2+json","digest":"sha256:{}","size":528}},"SchemaV2Manifest":{{}}}}"#,
            hex('a')
        );
        assert_eq!(
            parse_manifest_inspect(&out).unwrap(),
            ManifestAnswer::Single(Digest::parse(&format!("sha256:{}", hex('a'))).unwrap())
        );
    }

    #[test]
    fn manifest_list_needs_index_lookup() {
        let out = format!(
            r#"[{{"Ref":"docker.io/library/nginx:latest@sha256:{0}","Descriptor":{{"digest":"sha256:{0}","platform":{{"architecture":"amd64","os":"linux"}}}}}}]"#,
            hex('b')
        );
        assert_eq!(parse_manifest_inspect(&out).unwrap(), ManifestAnswer::List { platforms: 1 });
    }

    #[test]
    fn manifest_with_bad_digest_is_rejected() {
        let out = r#"{"Descriptor":{"digest":"sha256:deadbeef"}}"#;
        assert!(matches!(parse_manifest_inspect(out), Err(ResolveError::MalformedDigest(_))));
        assert!(matches!(parse_manifest_inspect("no such manifest"), Err(ResolveError::Parse(_))));
    }

    #[test]
    fn repo_digest_prefers_matching_repository() {
        let entries = vec![
            format!("mirror.local/nginx@sha256:{}", hex('1')),
            format!("nginx@sha256:{}", hex('2')),
        ];
        let d = select_repo_digest(&image("nginx"), &entries).unwrap();
        assert_eq!(d.as_str(), format!("sha256:{}", hex('2')));

        let d = select_repo_digest(&image("docker.io/library/nginx:1.25"), &entries).unwrap();
        assert_eq!(d.as_str(), format!("sha256:{}", hex('2')));
    }

    #[test]
    fn repo_digest_falls_back_to_first_entry() {
        let entries = vec![format!("old-name/app@sha256:{}", hex('3'))];
        let d = select_repo_digest(&image("new-name/app:v1"), &entries).unwrap();
        assert_eq!(d.as_str(), format!("sha256:{}", hex('3')));
    }

    #[test]
    fn no_repo_digest_for_local_builds() {
        assert!(matches!(select_repo_digest(&image("mybuild"), &[]), Err(ResolveError::NoRepoDigest)));
        let junk = vec!["not-a-digest".to_string()];
        assert!(matches!(select_repo_digest(&image("mybuild"), &junk), Err(ResolveError::NoRepoDigest)));
    }
}
