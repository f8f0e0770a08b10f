use crate::config::ContainerConfig;
use crate::error::Result;
use crate::readiness::tcp::TcpProbe;
use crate::readiness::WaitPolicy;
use crate::runtime::ContainerRuntime;
use crate::service::{env_or, launch, RunningContainer};
use crate::urls::connection_url;

const DEFAULT_IMAGE: &str = "postgres:latest";
const POSTGRES_PORT: u16 = 5432;

/// Postgres database container.
///
/// Credentials default to the `POSTGRES_USER` / `POSTGRES_PASSWORD` /
/// `POSTGRES_DB` environment variables, then to `"test"`. The same
/// values are handed to the container so the database it creates on
/// first boot matches the connection URL handed to the caller.
///
/// ```no_run
/// use drydock::runtime::docker::DockerCli;
/// use drydock::service::postgres::PostgresContainer;
///
/// let pg = PostgresContainer::new()
///     .dbname("orders")
///     .start(Box::new(DockerCli::new()))?;
/// let url = pg.connection_url();
/// # Ok::<(), drydock::Error>(())
/// ```
pub struct PostgresContainer {
    image: String,
    port: u16,
    user: String,
    password: String,
    dbname: String,
    driver: Option<String>,
    policy: WaitPolicy,
}

impl PostgresContainer {
    pub fn new() -> Self {
        Self::with_image(DEFAULT_IMAGE)
    }

    pub fn with_image(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            port: POSTGRES_PORT,
            user: env_or("POSTGRES_USER", "test"),
            password: env_or("POSTGRES_PASSWORD", "test"),
            dbname: env_or("POSTGRES_DB", "test"),
            driver: None,
            policy: WaitPolicy::default(),
        }
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn dbname(mut self, dbname: impl Into<String>) -> Self {
        self.dbname = dbname.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Driver suffix for the connection URL dialect, e.g. `"asyncpg"`
    /// yields `postgresql+asyncpg://...`.
    pub fn driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = Some(driver.into());
        self
    }

    pub fn wait_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn dialect(&self) -> String {
        match &self.driver {
            Some(driver) => format!("postgresql+{}", driver),
            None => "postgresql".to_string(),
        }
    }

    /// Start the container and block until the listener accepts
    /// connections.
    pub fn start(self, runtime: Box<dyn ContainerRuntime>) -> Result<RunningPostgres> {
        let config = ContainerConfig::new(&self.image)
            .with_env("POSTGRES_USER", &self.user)
            .with_env("POSTGRES_PASSWORD", &self.password)
            .with_env("POSTGRES_DB", &self.dbname)
            .with_exposed_port(self.port);

        let container = launch(runtime, config, self.port, self.policy, |host, port| {
            TcpProbe::new(host, port)
        })?;

        let host = container.host().to_string();
        let port = container.mapped_port(self.port).unwrap_or(self.port);
        Ok(RunningPostgres {
            container,
            dialect: self.dialect(),
            user: self.user,
            password: self.password,
            dbname: self.dbname,
            host,
            port,
        })
    }
}

impl Default for PostgresContainer {
    fn default() -> Self {
        Self::new()
    }
}

/// A reachable Postgres database.
pub struct RunningPostgres {
    container: RunningContainer,
    dialect: String,
    user: String,
    password: String,
    dbname: String,
    host: String,
    port: u16,
}

impl RunningPostgres {
    /// Driver-ready connection URL,
    /// `postgresql[+driver]://user:password@host:port/dbname`.
    pub fn connection_url(&self) -> String {
        connection_url(
            &self.dialect,
            &self.user,
            &self.password,
            &self.host,
            self.port,
            &self.dbname,
        )
    }

    pub fn container(&self) -> &RunningContainer {
        &self.container
    }

    pub fn stop(self) -> Result<()> {
        self.container.stop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_with_and_without_driver() {
        assert_eq!(PostgresContainer::new().dialect(), "postgresql");
        assert_eq!(
            PostgresContainer::new().driver("asyncpg").dialect(),
            "postgresql+asyncpg"
        );
    }

    #[test]
    fn test_builder_overrides_credentials() {
        let pg = PostgresContainer::new()
            .user("alice")
            .password("s3cret")
            .dbname("orders");
        assert_eq!(pg.user, "alice");
        assert_eq!(pg.password, "s3cret");
        assert_eq!(pg.dbname, "orders");
    }
}
