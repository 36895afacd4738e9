pub mod error;
pub mod logging;
pub mod types;

pub use error::{CheckError, ExecError, ResolveError, Result};
pub use types::{ContainerRecord, InvocationMode, TrackedContainer};
