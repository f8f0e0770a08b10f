pub mod http;
pub mod tcp;

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::{Error, Result};

/// One readiness-check attempt against a just-started container.
///
/// Implementations classify their own failures: a connection that is
/// not yet acceptable (refused, unresolvable, driver "not ready")
/// is [`ProbeError::Retryable`] and the poller will try again; any
/// condition that more waiting cannot fix is [`ProbeError::Fatal`]
/// and aborts the poll immediately.
pub trait Probe {
    fn check(&mut self) -> std::result::Result<(), ProbeError>;
}

impl<F> Probe for F
where
    F: FnMut() -> std::result::Result<(), ProbeError>,
{
    fn check(&mut self) -> std::result::Result<(), ProbeError> {
        self()
    }
}

/// Outcome of a single failed probe attempt.
#[derive(Debug)]
pub enum ProbeError {
    /// Service still booting, try again after the delay.
    Retryable(anyhow::Error),
    /// Service will never become ready under the current config.
    Fatal(anyhow::Error),
}

/// Timeout and backoff for one readiness wait.
#[derive(Debug, Clone, Copy)]
pub struct WaitPolicy {
    /// Wall-clock budget for the whole wait.
    pub timeout: Duration,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            delay: Duration::from_secs(1),
        }
    }
}

/// Block the calling thread until `probe` succeeds.
///
/// Single thread of control, no concurrent probing: attempt, and on a
/// retryable failure sleep `policy.delay` and attempt again while
/// wall-clock budget remains. A fatal probe failure propagates
/// immediately without consuming the rest of the budget. On budget
/// exhaustion the last retryable failure is surfaced as
/// [`Error::ReadinessTimeout`] with elapsed time and attempt count.
///
/// A first attempt is always made, even with a zero timeout.
pub fn wait_until_ready<P: Probe>(policy: WaitPolicy, mut probe: P) -> Result<()> {
    let start = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        match probe.check() {
            Ok(()) => {
                info!(
                    attempts = attempts,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "container ready"
                );
                return Ok(());
            }
            Err(ProbeError::Fatal(cause)) => {
                return Err(Error::FatalProbe { attempts, cause });
            }
            Err(ProbeError::Retryable(last)) => {
                let elapsed = start.elapsed();
                if elapsed >= policy.timeout {
                    return Err(Error::ReadinessTimeout {
                        elapsed,
                        attempts,
                        last,
                    });
                }
                debug!(
                    attempts = attempts,
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %last,
                    "container not ready yet"
                );
                thread::sleep(policy.delay);
            }
        }
    }
}
