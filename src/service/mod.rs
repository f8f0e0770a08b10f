pub mod elasticsearch;
pub mod mysql;
pub mod postgres;

use tracing::{info, warn};

use crate::config::ContainerConfig;
use crate::error::Result;
use crate::readiness::{wait_until_ready, Probe, WaitPolicy};
use crate::runtime::{ContainerHandle, ContainerRuntime};

/// Read an environment variable with a fixed fallback, for the
/// default-credential convenience lookups.
pub(crate) fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Start a container and block until it is ready to serve traffic.
///
/// This is the one code path every service wrapper goes through
/// (composition instead of a wrapper-class hierarchy): start the
/// container, resolve its host address and mapped ports, build the
/// readiness probe against the mapped `readiness_port`, and poll.
///
/// If readiness fails, the container is stopped before the error is
/// returned, so a fatal probe or a timeout never leaks a handle.
pub fn launch<P, F>(
    runtime: Box<dyn ContainerRuntime>,
    config: ContainerConfig,
    readiness_port: u16,
    policy: WaitPolicy,
    probe_factory: F,
) -> Result<RunningContainer>
where
    P: Probe,
    F: FnOnce(&str, u16) -> P,
{
    let handle = runtime.start(&config)?;
    info!(image = %config.image, id = %handle.id, "waiting for container readiness");

    // Everything after start must stop the container on failure
    let ready: Result<(String, Vec<(u16, u16)>)> = (|| {
        let host = runtime.host_ip(&handle)?;
        let mut ports = Vec::with_capacity(config.exposed_ports.len());
        for &internal in &config.exposed_ports {
            ports.push((internal, runtime.mapped_port(&handle, internal)?));
        }
        let probe_port = ports
            .iter()
            .find(|(internal, _)| *internal == readiness_port)
            .map(|(_, mapped)| *mapped)
            .unwrap_or(readiness_port);

        wait_until_ready(policy, probe_factory(&host, probe_port))?;
        Ok((host, ports))
    })();

    match ready {
        Ok((host, ports)) => Ok(RunningContainer {
            runtime,
            handle: Some(handle),
            config,
            host,
            ports,
        }),
        Err(e) => {
            if let Err(stop_err) = runtime.stop(&handle) {
                warn!(id = %handle.id, error = %stop_err, "failed to stop container after readiness failure");
            }
            Err(e)
        }
    }
}

/// A live, reachable container. Owns its runtime handle; dropping it
/// stops the container on a best-effort basis, `stop` does so
/// explicitly and reports failures.
pub struct RunningContainer {
    runtime: Box<dyn ContainerRuntime>,
    handle: Option<ContainerHandle>,
    config: ContainerConfig,
    host: String,
    ports: Vec<(u16, u16)>,
}

impl RunningContainer {
    /// Host through which the mapped ports are reachable.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Host port mapped to `internal_port`, resolved at launch.
    pub fn mapped_port(&self, internal_port: u16) -> Option<u16> {
        self.ports
            .iter()
            .find(|(internal, _)| *internal == internal_port)
            .map(|(_, mapped)| *mapped)
    }

    /// The launch configuration, frozen at start time.
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn handle(&self) -> Option<&ContainerHandle> {
        self.handle.as_ref()
    }

    /// Stop and discard the container.
    pub fn stop(mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            self.runtime.stop(&handle)?;
        }
        Ok(())
    }
}

impl Drop for RunningContainer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = self.runtime.stop(&handle) {
                warn!(id = %handle.id, error = %e, "failed to stop container on drop");
            }
        }
    }
}
