// Common test utilities for drydock integration tests
#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use drydock::{ContainerConfig, ContainerHandle, ContainerRuntime, Error, Result};

/// Route test logs through tracing; `RUST_LOG=debug cargo test` shows
/// the poller's attempt-by-attempt trace.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Scripted in-process runtime. Records every call so tests can
/// assert on lifecycle behavior (exactly one start, stop on failure,
/// no leaked handles).
#[derive(Default)]
pub struct MockState {
    pub started: Vec<ContainerConfig>,
    pub stopped: Vec<String>,
    /// Host port reported for every mapped_port lookup.
    pub mapped_to: Option<u16>,
    pub fail_start: bool,
}

#[derive(Clone, Default)]
pub struct MockRuntime {
    pub state: Arc<Mutex<MockState>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `port` as the host mapping for every exposed port.
    pub fn with_mapped_port(port: u16) -> Self {
        let runtime = Self::default();
        runtime.state.lock().unwrap().mapped_to = Some(port);
        runtime
    }

    pub fn started_count(&self) -> usize {
        self.state.lock().unwrap().started.len()
    }

    pub fn stopped_ids(&self) -> Vec<String> {
        self.state.lock().unwrap().stopped.clone()
    }
}

impl ContainerRuntime for MockRuntime {
    fn start(&self, config: &ContainerConfig) -> Result<ContainerHandle> {
        let mut state = self.state.lock().unwrap();
        if state.fail_start {
            return Err(Error::Runtime(anyhow::anyhow!("scripted start failure")));
        }
        state.started.push(config.clone());
        Ok(ContainerHandle::new(format!("mock-{}", state.started.len())))
    }

    fn stop(&self, handle: &ContainerHandle) -> Result<()> {
        self.state.lock().unwrap().stopped.push(handle.id.clone());
        Ok(())
    }

    fn host_ip(&self, _handle: &ContainerHandle) -> Result<String> {
        Ok("localhost".to_string())
    }

    fn mapped_port(&self, _handle: &ContainerHandle, internal_port: u16) -> Result<u16> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .mapped_to
            .unwrap_or(internal_port.wrapping_add(30000)))
    }
}

/// Bind an ephemeral port and answer every connection with a fixed
/// HTTP status line. The accept thread is detached; it dies with the
/// test process.
pub fn spawn_http_server(status_line: &'static str) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test http server");
    let port = listener.local_addr().unwrap().port();

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let _ = write!(
                stream,
                "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status_line
            );
        }
    });

    port
}

/// Bind an ephemeral TCP port that accepts connections (a stand-in
/// for a database listener).
pub fn spawn_tcp_listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test tcp listener");
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// A free port with nothing listening on it (bound once, then
/// released).
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().unwrap().port()
}
