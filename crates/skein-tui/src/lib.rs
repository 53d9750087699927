//! skein TUI — the terminal log viewer.
//!
//! [`run`] starts the TCP log server on a background tokio runtime and runs
//! the [`App`] loop on the calling thread until the operator quits.

pub mod app;
pub mod event;
pub mod theme;
pub mod widgets;

pub use app::App;

use std::time::Duration;

use anyhow::Context;
use skein_core::config::Config;
use skein_server::{Server, DEFAULT_PORT};
use tokio::sync::mpsc;

/// Listen on all interfaces at [`DEFAULT_PORT`] and show incoming records.
pub fn run(config: Config) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    let server = runtime
        .block_on(Server::bind(("0.0.0.0", DEFAULT_PORT)))
        .with_context(|| format!("could not listen on port {DEFAULT_PORT}"))?
        .with_idle_timeout(config.server.idle_timeout());

    let (tx, rx) = mpsc::unbounded_channel();
    runtime.spawn(server.run(tx));

    let theme = theme::Theme::load_default();
    let result = App::new(rx, config, theme).run();

    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}
