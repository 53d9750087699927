use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "skein", about = "Hierarchical remote logging viewer")]
struct Cli {
    /// Write debug logs to /tmp/skein-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Connect to a running viewer and emit a sample logger hierarchy.
    Demo {
        #[arg(long, default_value = "127.0.0.1:3001")]
        addr: SocketAddr,
        /// Number of rounds to emit.
        #[arg(long, default_value_t = 20)]
        count: usize,
        /// Pause between rounds, in milliseconds.
        #[arg(long, default_value_t = 200)]
        interval_ms: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            if cli.debug {
                init_file_logging()?;
            }
            let config = skein_core::config::Config::load().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "config unreadable, using defaults");
                skein_core::config::Config::defaults()
            });
            skein_tui::run(config)
        }
        Some(Command::Demo {
            addr,
            count,
            interval_ms,
        }) => {
            // the demo owns no terminal UI, so diagnostics go to stderr
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(env_filter(if cli.debug { "debug" } else { "info" }))
                .init();
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(skein::demo::run(
                addr,
                count,
                Duration::from_millis(interval_ms),
            ))
        }
    }
}

fn init_file_logging() -> anyhow::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("/tmp/skein-debug.log")?;
    tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(env_filter("debug"))
        .init();
    tracing::info!("skein debug log started, tail -f /tmp/skein-debug.log");
    Ok(())
}

fn env_filter(default: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
}
