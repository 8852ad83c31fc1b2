use clap::Parser;
use log::{error, info};
use server::{ClipScorer, Server};
use std::path::PathBuf;

/// Drawing scoring service for the guessing game.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = shared::DEFAULT_PORT)]
    port: u16,

    /// Directory holding the model artifact (model.safetensors, tokenizer.json)
    #[arg(short, long, default_value = "./model")]
    model: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Loading similarity model from {}", args.model.display());
    let scorer = match ClipScorer::load(&args.model) {
        Ok(scorer) => scorer,
        Err(e) => {
            error!("Failed to load similarity model: {}", e);
            std::process::exit(1);
        }
    };

    let address = format!("{}:{}", args.host, args.port);
    let server = Server::bind(&address, scorer).await?;

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server stopped: {}", e);
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
