use std::time::Duration;

use anyhow::anyhow;
use tracing::debug;

use super::ProbeError;

/// HTTP readiness probe: GET `url`, ready on a 2xx response.
///
/// Transport-level failures (connection refused, DNS not yet
/// resolvable, timeout) mean the service is still booting and are
/// retryable. A response with a non-2xx status means the server is up
/// but refusing us, which more waiting will not fix.
pub struct HttpProbe {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .expect("build HTTP probe client");
        Self { url: url.into(), client }
    }
}

impl super::Probe for HttpProbe {
    fn check(&mut self) -> Result<(), ProbeError> {
        match self.client.get(&self.url).send() {
            Ok(resp) if resp.status().is_success() => {
                debug!(url = %self.url, "HTTP endpoint ready");
                Ok(())
            }
            Ok(resp) => Err(ProbeError::Fatal(anyhow!(
                "unexpected HTTP status {} from {}",
                resp.status(),
                self.url
            ))),
            Err(e) => {
                debug!(url = %self.url, error = %e, "HTTP request failed");
                Err(ProbeError::Retryable(anyhow!(e).context("HTTP probe")))
            }
        }
    }
}
