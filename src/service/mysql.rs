use crate::config::ContainerConfig;
use crate::error::Result;
use crate::readiness::tcp::TcpProbe;
use crate::readiness::WaitPolicy;
use crate::runtime::ContainerRuntime;
use crate::service::{env_or, launch, RunningContainer};
use crate::urls::connection_url;

const DEFAULT_IMAGE: &str = "mysql:latest";
const MYSQL_PORT: u16 = 3306;

/// MySQL database container. Also runs MariaDB images, which speak
/// the same protocol and take the same `MYSQL_*` variables.
///
/// Credentials default to the `MYSQL_USER` / `MYSQL_PASSWORD` /
/// `MYSQL_ROOT_PASSWORD` / `MYSQL_DATABASE` environment variables,
/// then to `"test"`.
pub struct MySqlContainer {
    image: String,
    port: u16,
    user: String,
    password: String,
    root_password: String,
    database: String,
    driver: Option<String>,
    policy: WaitPolicy,
}

impl MySqlContainer {
    pub fn new() -> Self {
        Self::with_image(DEFAULT_IMAGE)
    }

    pub fn with_image(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            port: MYSQL_PORT,
            user: env_or("MYSQL_USER", "test"),
            password: env_or("MYSQL_PASSWORD", "test"),
            root_password: env_or("MYSQL_ROOT_PASSWORD", "test"),
            database: env_or("MYSQL_DATABASE", "test"),
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

    pub fn root_password(mut self, root_password: impl Into<String>) -> Self {
        self.root_password = root_password.into();
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Driver suffix for the connection URL dialect, e.g. `"pymysql"`
    /// yields `mysql+pymysql://...`.
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
            Some(driver) => format!("mysql+{}", driver),
            None => "mysql".to_string(),
        }
    }

    /// Launch configuration this container will start with.
    ///
    /// Connecting as `root` uses the server's root account directly:
    /// the root password becomes the user password and no separate
    /// `MYSQL_USER` account is created.
    pub fn config(&self) -> ContainerConfig {
        let root_password = if self.user == "root" {
            &self.password
        } else {
            &self.root_password
        };

        let mut config = ContainerConfig::new(&self.image)
            .with_env("MYSQL_ROOT_PASSWORD", root_password)
            .with_env("MYSQL_DATABASE", &self.database)
            .with_exposed_port(self.port);

        if self.user != "root" {
            config = config
                .with_env("MYSQL_USER", &self.user)
                .with_env("MYSQL_PASSWORD", &self.password);
        }
        config
    }

    /// Start the container and block until the listener accepts
    /// connections.
    pub fn start(self, runtime: Box<dyn ContainerRuntime>) -> Result<RunningMySql> {
        let config = self.config();
        let container = launch(runtime, config, self.port, self.policy, |host, port| {
            TcpProbe::new(host, port)
        })?;

        let host = container.host().to_string();
        let port = container.mapped_port(self.port).unwrap_or(self.port);
        Ok(RunningMySql {
            container,
            dialect: self.dialect(),
            user: self.user,
            password: self.password,
            database: self.database,
            host,
            port,
        })
    }
}

impl Default for MySqlContainer {
    fn default() -> Self {
        Self::new()
    }
}

/// A reachable MySQL database.
pub struct RunningMySql {
    container: RunningContainer,
    dialect: String,
    user: String,
    password: String,
    database: String,
    host: String,
    port: u16,
}

impl RunningMySql {
    /// Driver-ready connection URL,
    /// `mysql[+driver]://user:password@host:port/database`.
    pub fn connection_url(&self) -> String {
        connection_url(
            &self.dialect,
            &self.user,
            &self.password,
            &self.host,
            self.port,
            &self.database,
        )
    }

    pub fn container(&self) -> &RunningContainer {
        &self.container
    }

    pub fn stop(self) -> Result<()> {
        self.container.stop()
    }
}

#[deprecated(note = "use `MySqlContainer` with a `mariadb` image")]
pub type MariaDbContainer = MySqlContainer;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_root_user_gets_own_account() {
        let config = MySqlContainer::new()
            .user("app")
            .password("apppw")
            .root_password("rootpw")
            .config();

        assert_eq!(config.env.get("MYSQL_USER").map(String::as_str), Some("app"));
        assert_eq!(config.env.get("MYSQL_PASSWORD").map(String::as_str), Some("apppw"));
        assert_eq!(
            config.env.get("MYSQL_ROOT_PASSWORD").map(String::as_str),
            Some("rootpw")
        );
    }

    #[test]
    fn test_root_user_overrides_root_password() {
        let config = MySqlContainer::new()
            .user("root")
            .password("apppw")
            .root_password("rootpw")
            .config();

        // root logs in with its own password; no separate account
        assert_eq!(
            config.env.get("MYSQL_ROOT_PASSWORD").map(String::as_str),
            Some("apppw")
        );
        assert!(config.env.get("MYSQL_USER").is_none());
        assert!(config.env.get("MYSQL_PASSWORD").is_none());
    }

    #[test]
    fn test_database_env_always_present() {
        let config = MySqlContainer::new().database("orders").config();
        assert_eq!(
            config.env.get("MYSQL_DATABASE").map(String::as_str),
            Some("orders")
        );
        assert_eq!(config.exposed_ports, vec![MYSQL_PORT]);
    }

    #[test]
    fn test_dialect_with_driver_suffix() {
        assert_eq!(
            MySqlContainer::new().driver("pymysql").dialect(),
            "mysql+pymysql"
        );
    }
}
