use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mbo_console::devserver::{self, DevServerConfig};

#[derive(Parser)]
#[command(name = "mbo-dev-server")]
#[command(about = "In-memory MBO backend (development)", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Write bound address to this file (dev/test convenience)
    #[arg(long)]
    addr_file: Option<PathBuf>,

    /// Reject access tokens older than this many seconds
    #[arg(long)]
    access_ttl_secs: Option<u64>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let cfg = DevServerConfig {
        addr: args.addr,
        access_ttl: args.access_ttl_secs.map(Duration::from_secs),
    };
    devserver::serve(cfg, args.addr_file.as_ref()).await
}
