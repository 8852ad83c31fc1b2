use clap::Parser;
use client::{load_drawing, random_drawing, GuessClient};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::DrawingRequest;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scoring service address
    #[arg(short = 's', long, default_value = "127.0.0.1:5000")]
    server: String,

    /// Candidate words, comma separated
    #[arg(short = 'c', long, value_delimiter = ',', required = true)]
    candidates: Vec<String>,

    /// Word the drawing is supposed to show
    #[arg(short = 't', long)]
    target: String,

    /// JSON file with stroke events; a random scribble is sent when omitted
    #[arg(short = 'd', long)]
    drawing: Option<PathBuf>,

    /// Number of strokes in the random scribble
    #[arg(long, default_value = "5")]
    strokes: usize,

    /// Seed for the random scribble
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let drawing = match &args.drawing {
        Some(path) => {
            info!("Loading drawing from {}", path.display());
            load_drawing(path)?
        }
        None => {
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            info!("Generating scribble with {} strokes", args.strokes);
            random_drawing(&mut rng, args.strokes)
        }
    };

    let request = DrawingRequest {
        drawing,
        candidates: args.candidates,
        target: args.target,
    };

    let client = GuessClient::new(args.server);
    info!(
        "Submitting {} stroke events to {}",
        request.drawing.len(),
        client.addr()
    );

    let verdict = client.request(&request).await?;
    println!(
        "Predicted: {} | Correct: {} | Score: {}",
        verdict.predicted_word, verdict.is_correct, verdict.score
    );

    Ok(())
}
