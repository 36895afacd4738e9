use thiserror::Error;

/// Run-level failures. Only these may stop a check before a report exists.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Cannot access Docker daemon: {0}")]
    BackendUnreachable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failures of a single external command.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("{0}: command not found")]
    NotFound(String),

    #[error("{program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program}: timed out after {secs}s")]
    TimedOut { program: String, secs: u64 },

    #[error("{program}: exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Why one digest resolution strategy produced nothing usable.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("image has no repo digest (built locally or never pulled)")]
    NoRepoDigest,

    #[error("malformed digest {0:?}")]
    MalformedDigest(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("no registry inspection helper installed")]
    HelperUnavailable,
}

pub type Result<T> = std::result::Result<T, CheckError>;
