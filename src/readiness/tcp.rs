use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use anyhow::anyhow;
use tracing::debug;

use super::ProbeError;

/// TCP connect probe for services whose readiness signal is simply
/// "the port accepts a connection" (database listeners, mostly).
/// Callers with a real client driver can inject their own [`super::Probe`]
/// instead; this is the dependency-free default.
pub struct TcpProbe {
    host: String,
    port: u16,
    connect_timeout: Duration,
}

impl TcpProbe {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: Duration::from_secs(1),
        }
    }
}

// ENETUNREACH / EHOSTUNREACH; the ErrorKind variants for these are
// newer than our MSRV, so match the raw codes
const ENETUNREACH: i32 = 101;
const EHOSTUNREACH: i32 = 113;

/// Connection-level errors that mean "listener not up yet". Routes
/// can also be transiently missing while the runtime wires up
/// container networking, so unreachable-network errors retry too.
fn is_transient(err: &io::Error) -> bool {
    if matches!(err.raw_os_error(), Some(ENETUNREACH) | Some(EHOSTUNREACH)) {
        return true;
    }
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::TimedOut
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::WouldBlock
    )
}

impl super::Probe for TcpProbe {
    fn check(&mut self) -> Result<(), ProbeError> {
        let addr = format!("{}:{}", self.host, self.port);
        // DNS may not resolve yet while the runtime wires up networking
        let resolved = match addr.to_socket_addrs() {
            Ok(mut addrs) => addrs.next(),
            Err(e) => {
                debug!(addr = %addr, error = %e, "address not resolvable yet");
                return Err(ProbeError::Retryable(
                    anyhow!(e).context(format!("resolving {}", addr)),
                ));
            }
        };
        let resolved = resolved.ok_or_else(|| {
            ProbeError::Retryable(anyhow!("no addresses resolved for {}", addr))
        })?;

        match TcpStream::connect_timeout(&resolved, self.connect_timeout) {
            Ok(_) => {
                debug!(addr = %addr, "TCP port accepting connections");
                Ok(())
            }
            Err(e) if is_transient(&e) => {
                debug!(addr = %addr, error = %e, "TCP connect failed");
                Err(ProbeError::Retryable(
                    anyhow!(e).context(format!("connecting to {}", addr)),
                ))
            }
            Err(e) => Err(ProbeError::Fatal(
                anyhow::Error::new(e).context(format!("connecting to {}", addr)),
            )),
        }
    }
}
