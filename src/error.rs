use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced to callers of the container lifecycle.
///
/// Construction-time errors (`UnsupportedVersion`) fire before any
/// container is started. Poll-time errors (`ReadinessTimeout`,
/// `FatalProbe`) fire after the launcher has already stopped the
/// container, so no handle leaks either way.
#[derive(Debug, Error)]
pub enum Error {
    /// The image's major version has no known environment profile.
    #[error("unsupported {service} major version {version}")]
    UnsupportedVersion { service: &'static str, version: u32 },

    /// The readiness budget ran out while the probe kept reporting
    /// "not yet". Carries the last retryable failure.
    #[error("container not ready after {attempts} attempts in {elapsed:?}: {last}")]
    ReadinessTimeout {
        elapsed: Duration,
        attempts: u32,
        last: anyhow::Error,
    },

    /// The probe hit a condition that more waiting cannot fix.
    #[error("readiness probe failed fatally on attempt {attempts}: {cause}")]
    FatalProbe { attempts: u32, cause: anyhow::Error },

    /// A container runtime call (start/stop/port lookup) failed.
    #[error("container runtime: {0}")]
    Runtime(anyhow::Error),
}
