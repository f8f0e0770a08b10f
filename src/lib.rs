pub mod config;
pub mod error;
pub mod readiness;
pub mod runtime;
pub mod service;
pub mod urls;
pub mod version;

// Re-export core types for convenience
pub use config::ContainerConfig;
pub use error::{Error, Result};
pub use readiness::{wait_until_ready, Probe, ProbeError, WaitPolicy};
pub use runtime::{ContainerHandle, ContainerRuntime};
pub use service::RunningContainer;
