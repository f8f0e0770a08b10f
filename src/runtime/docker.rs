use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::config::ContainerConfig;
use crate::error::Error;
use crate::runtime::{ContainerHandle, ContainerRuntime};

/// Container runtime backed by the `docker` CLI (also works with a
/// `podman` binary that speaks the docker argument surface).
///
/// Each exposed internal port is published to an ephemeral host port;
/// `mapped_port` asks the daemon which one it picked.
pub struct DockerCli {
    binary: String,
}

impl DockerCli {
    pub fn new() -> Self {
        Self {
            binary: "docker".to_string(),
        }
    }

    /// Use a different CLI binary, e.g. `podman`.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, args: &[String]) -> Result<String> {
        debug!(binary = %self.binary, args = ?args, "running container CLI");
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .with_context(|| format!("executing {}", self.binary))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{} {} failed: {}",
                self.binary,
                args.first().map(String::as_str).unwrap_or(""),
                stderr.trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerRuntime for DockerCli {
    fn start(&self, config: &ContainerConfig) -> crate::Result<ContainerHandle> {
        let mut args = vec!["run".to_string(), "-d".to_string()];
        for (key, value) in &config.env {
            args.push("-e".to_string());
            args.push(format!("{}={}", key, value));
        }
        for port in &config.exposed_ports {
            // No host port given: the daemon picks an ephemeral one
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        args.push(config.image.clone());

        let container_id = self.run(&args).map_err(Error::Runtime)?;
        info!(image = %config.image, id = %container_id, "container started");
        Ok(ContainerHandle::new(container_id))
    }

    fn stop(&self, handle: &ContainerHandle) -> crate::Result<()> {
        // rm -f both stops and removes, leaving nothing behind
        self.run(&["rm".to_string(), "-f".to_string(), handle.id.clone()])
            .map_err(Error::Runtime)?;
        info!(id = %handle.id, "container removed");
        Ok(())
    }

    fn host_ip(&self, _handle: &ContainerHandle) -> crate::Result<String> {
        // Published ports are bound on the daemon host
        Ok("localhost".to_string())
    }

    fn mapped_port(&self, handle: &ContainerHandle, internal_port: u16) -> crate::Result<u16> {
        let stdout = self
            .run(&[
                "port".to_string(),
                handle.id.clone(),
                internal_port.to_string(),
            ])
            .map_err(Error::Runtime)?;

        // Output is one binding per line, e.g. "0.0.0.0:49153"
        stdout
            .lines()
            .filter_map(|line| line.rsplit(':').next())
            .find_map(|port| port.trim().parse::<u16>().ok())
            .ok_or_else(|| {
                Error::Runtime(anyhow::anyhow!(
                    "no host port mapped for {}/{}: {:?}",
                    handle.id,
                    internal_port,
                    stdout
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_port_output_parsing() {
        // Mirrors the parsing in mapped_port
        let stdout = "0.0.0.0:49153\n[::]:49153";
        let port = stdout
            .lines()
            .filter_map(|line| line.rsplit(':').next())
            .find_map(|p| p.trim().parse::<u16>().ok());
        assert_eq!(port, Some(49153));
    }
}
