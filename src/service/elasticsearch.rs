use crate::config::ContainerConfig;
use crate::error::{Error, Result};
use crate::readiness::http::HttpProbe;
use crate::readiness::WaitPolicy;
use crate::runtime::ContainerRuntime;
use crate::service::{launch, RunningContainer};
use crate::version::major_version;

const DEFAULT_IMAGE: &str = "elasticsearch";
const HTTP_PORT: u16 = 9200;

/// Environment required for each supported major version to come up
/// in a test-friendly mode.
fn environment_by_version(version: u32) -> Result<&'static [(&'static str, &'static str)]> {
    match version {
        // Avoids the vm.max_map_count kernel-parameter bootstrap check
        6 => Ok(&[("discovery.zen.minimum_master_nodes", "1")]),
        7 => Ok(&[]),
        // 8.x defaults to TLS, which the plaintext HTTP probe cannot
        // pass; security is not needed for a throwaway test node
        8 => Ok(&[("xpack.security.enabled", "false")]),
        version => Err(Error::UnsupportedVersion {
            service: "elasticsearch",
            version,
        }),
    }
}

/// Single-node Elasticsearch container.
///
/// The startup environment depends on the image's major version, so
/// construction resolves the version profile up front and fails on an
/// unsupported major before any container exists.
///
/// ```no_run
/// use drydock::runtime::docker::DockerCli;
/// use drydock::service::elasticsearch::ElasticsearchContainer;
///
/// let es = ElasticsearchContainer::new()?
///     .start(Box::new(DockerCli::new()))?;
/// let url = es.url();
/// # Ok::<(), drydock::Error>(())
/// ```
pub struct ElasticsearchContainer {
    image: String,
    port: u16,
    version_env: &'static [(&'static str, &'static str)],
    policy: WaitPolicy,
}

impl ElasticsearchContainer {
    pub fn new() -> Result<Self> {
        Self::with_image(DEFAULT_IMAGE)
    }

    pub fn with_image(image: impl Into<String>) -> Result<Self> {
        let image = image.into();
        let version_env = environment_by_version(major_version(&image))?;
        Ok(Self {
            image,
            port: HTTP_PORT,
            version_env,
            policy: WaitPolicy::default(),
        })
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn wait_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Launch configuration this container will start with.
    pub fn config(&self) -> ContainerConfig {
        let mut config = ContainerConfig::new(&self.image)
            .with_env("transport.host", "127.0.0.1")
            .with_env("http.host", "0.0.0.0")
            .with_exposed_port(self.port);
        for (key, value) in self.version_env {
            config = config.with_env(*key, *value);
        }
        config
    }

    /// Start the container and block until its HTTP endpoint answers
    /// with a 200.
    pub fn start(self, runtime: Box<dyn ContainerRuntime>) -> Result<RunningElasticsearch> {
        let config = self.config();
        let container = launch(runtime, config, self.port, self.policy, |host, port| {
            HttpProbe::new(format!("http://{}:{}/", host, port))
        })?;

        let host = container.host().to_string();
        let port = container.mapped_port(self.port).unwrap_or(self.port);
        Ok(RunningElasticsearch { container, host, port })
    }
}

/// A reachable Elasticsearch node.
pub struct RunningElasticsearch {
    container: RunningContainer,
    host: String,
    port: u16,
}

impl RunningElasticsearch {
    /// Base URL of the HTTP API.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn container(&self) -> &RunningContainer {
        &self.container
    }

    pub fn stop(self) -> Result<()> {
        self.container.stop()
    }
}

#[deprecated(note = "renamed to `ElasticsearchContainer`")]
pub type ElasticSearchContainer = ElasticsearchContainer;
