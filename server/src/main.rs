use clap::Parser;
use log::{error, info};
use server::network::Server;
use std::time::Duration;

/// Main-method of the application.
/// Parses command-line arguments, then runs the matchmaking server until
/// the process is interrupted.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        /// Server port to listen on
        #[clap(short, long, default_value = "8080")]
        port: u16,
        /// Interval between matchmaking pairing ticks, in milliseconds
        #[clap(long, default_value = "1000")]
        pairing_interval_ms: u64,
    }

    env_logger::init();
    let args = Args::parse();

    let address = format!("{}:{}", args.host, args.port);
    let server = Server::bind(&address, Duration::from_millis(args.pairing_interval_ms)).await?;

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
