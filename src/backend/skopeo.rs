//! skopeo as the registry inspection fallback
//! Only the `.Digest` field is requested; anything but one digest line is rejected.

use std::time::Duration;

use crate::backend::exec::{find_program, Runner};
use crate::backend::RegistryHelper;
use crate::check::digest::Digest;
use crate::check::reference::NormalizedImageRef;
use crate::utils::{InvocationMode, ResolveError};

pub struct Skopeo {
    runner: Runner,
}

impl Skopeo {
    /// `None` when the program is not installed.
    pub fn detect(program: &str, timeout: Duration) -> Option<Self> {
        find_program(program)?;
        Some(Skopeo { runner: Runner::new(program, InvocationMode::Direct, timeout) })
    }
}

impl RegistryHelper for Skopeo {
    fn name(&self) -> &str {
        self.runner.program()
    }

    fn inspect_remote_digest(&self, image: &NormalizedImageRef) -> Result<Digest, ResolveError> {
        let transport = format!("docker://{}", image);
        let out = self
            .runner
            .run(&["inspect", "--no-tags", "--format", "{{.Digest}}", &transport])?;
        parse_single_digest(&out)
    }
}

fn parse_single_digest(out: &str) -> Result<Digest, ResolveError> {
    let mut lines = out.lines().map(str::trim).filter(|l| !l.is_empty());
    match (lines.next(), lines.next()) {
        (Some(line), None) => Digest::parse(line),
        (None, _) => Err(ResolveError::Parse("empty helper output".to_string())),
        (Some(_), Some(_)) => Err(ResolveError::Parse("helper printed more than one line".to_string())),
    }
}
