pub mod docker;

use serde::{Deserialize, Serialize};

use crate::config::ContainerConfig;
use crate::error::Result;

/// Opaque reference to a started container, issued by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerHandle {
    pub id: String,
}

impl ContainerHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// The container runtime consumed by the launcher, treated as a
/// black box: create/start, stop, and port-mapping lookups. The
/// launcher calls `start` exactly once per lifecycle and begins
/// polling readiness immediately after it returns.
pub trait ContainerRuntime {
    fn start(&self, config: &ContainerConfig) -> Result<ContainerHandle>;
    fn stop(&self, handle: &ContainerHandle) -> Result<()>;
    /// Host-side IP or hostname through which the container's mapped
    /// ports are reachable.
    fn host_ip(&self, handle: &ContainerHandle) -> Result<String>;
    /// Host port the runtime mapped to `internal_port`.
    fn mapped_port(&self, handle: &ContainerHandle, internal_port: u16) -> Result<u16>;
}
