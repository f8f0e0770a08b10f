use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Launch configuration for one container.
///
/// Built incrementally by a service wrapper before launch; the
/// launcher passes it to the runtime by shared reference and never
/// touches it again once the container is started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    pub image: String,
    /// Environment entries, ordered by key so the resolved set is
    /// stable and deterministic.
    pub env: BTreeMap<String, String>,
    /// Internal ports the runtime should map to host ports.
    pub exposed_ports: Vec<u16>,
}

impl ContainerConfig {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            env: BTreeMap::new(),
            exposed_ports: Vec::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_exposed_port(mut self, port: u16) -> Self {
        self.exposed_ports.push(port);
        self
    }
}
