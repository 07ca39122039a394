//! `tessera-server`: runs a Tessera game server on a TCP port.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tessera::{TesseraServer, DEFAULT_PORT};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tessera-server", version, about = "Tile-world game server")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// TCP port for game clients.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// JSON map file. The built-in map is used if omitted or unreadable.
    #[arg(long)]
    map: Option<PathBuf>,

    /// Close connections idle for this many seconds. 0 disables the timeout.
    #[arg(long, default_value_t = 300)]
    idle_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let idle_timeout = match args.idle_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    let mut builder = TesseraServer::builder()
        .bind(&format!("{}:{}", args.host, args.port))
        .idle_timeout(idle_timeout);
    if let Some(map) = args.map {
        builder = builder.map_path(map);
    }

    let server = match builder.build().await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "failed to start server");
            return ExitCode::FAILURE;
        }
    };

    match server.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server stopped");
            ExitCode::FAILURE
        }
    }
}
