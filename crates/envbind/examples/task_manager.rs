//! Example: loading service options from an optional file plus the environment
//!
//! Environment only, falling back to the default:
//!   cargo run --package envbind --example task_manager
//!
//! With a config file (`socketIOServer: io.internal:9000`):
//!   `cargo run --package envbind --example task_manager -- -c task_manager.yaml`
//!
//! The environment always wins:
//!   `SOCKETIO_SERVER=io.local:7000 cargo run --package envbind --example task_manager`
//!
//! Set `RUST_LOG=envbind=debug` to see where each field came from.

use std::path::PathBuf;

use clap::Parser;
use envbind::Bindable;
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(about = "Task manager service")]
struct Args {
    /// Config File Location
    #[arg(short = 'c')]
    config: Option<PathBuf>,
}

#[derive(Bindable, Debug, Default, Deserialize, Serialize)]
struct Options {
    /// Address of the Socket.IO server.
    #[serde(rename = "socketIOServer")]
    #[env(var = "SOCKETIO_SERVER", default = "localhost:8000")]
    socket_io_server: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Start of program");

    let args = Args::parse();
    let mut opts = Options::default();

    if let Err(e) = envbind::load_config(args.config.as_deref(), &mut opts) {
        eprintln!("{:?}", miette::Report::from(e));
        std::process::exit(1);
    }

    tracing::info!(socket_io_server = %opts.socket_io_server, "configuration loaded");
}
