use clap::Parser;
use client::network::{connect, Client};
use client::strategy::RandomStrategy;
use log::info;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:3379")]
    server: String,

    /// Pause after each answer in milliseconds
    #[arg(short = 't', long, default_value = "100")]
    think_ms: u64,

    /// How often to try connecting before giving up
    #[arg(long, default_value = "50")]
    connect_attempts: u32,

    /// Delay between connection attempts in milliseconds
    #[arg(long, default_value = "100")]
    retry_ms: u64,

    /// Seed for the color choice (random when omitted)
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

    info!("Starting client...");
    info!("Connecting to: {}", args.server);

    let stream = connect(
        &args.server,
        args.connect_attempts,
        Duration::from_millis(args.retry_ms),
    )
    .await?;

    let strategy = match args.seed {
        Some(seed) => RandomStrategy::seeded(seed),
        None => RandomStrategy::new(),
    };

    let mut client = Client::new(stream, strategy, Duration::from_millis(args.think_ms));
    let summary = client.run().await?;

    println!(
        "Played {} moves, {}",
        summary.moves,
        if summary.deactivated {
            "deactivated by the server"
        } else {
            "game over"
        }
    );

    Ok(())
}
