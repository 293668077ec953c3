//! Shared utilities for integration testing.

use std::io::Write;

use reqwest::redirect::Policy;
use tempfile::NamedTempFile;
use urlshort::config::ServerConfig;
use urlshort::lifecycle::{self, Running, Shutdown};

/// Start a server on an ephemeral port.
pub async fn start_server(mut config: ServerConfig) -> (Running, Shutdown) {
    config.listener.bind_address = "127.0.0.1:0".to_string();
    let shutdown = Shutdown::new();
    let running = lifecycle::start(config, &shutdown)
        .await
        .expect("server should start");
    (running, shutdown)
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Write `contents` to a temp file with the given extension.
#[allow(dead_code)]
pub fn redirect_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}
