use clap::Parser;
use log::{error, info};
use server::config::ServerConfig;
use server::coordinator::GameReport;
use server::error::ServerError;
use server::network::Server;
use shared::{Color, ACCEPT_WINDOW_SECS, DEFAULT_PORT, RESPONSE_TIMEOUT_MS, TURN_PAUSE_MS};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Seconds during which new players may connect
    #[arg(long, default_value_t = ACCEPT_WINDOW_SECS)]
    accept_window_secs: u64,

    /// Milliseconds a player has to answer a broadcast
    #[arg(long, default_value_t = RESPONSE_TIMEOUT_MS)]
    response_timeout_ms: u64,

    /// Maximum random pause between turns of one player, in milliseconds
    #[arg(long, default_value_t = TURN_PAUSE_MS)]
    turn_pause_ms: u64,

    /// Board width (random when omitted)
    #[arg(long)]
    columns: Option<usize>,

    /// Board height (random when omitted)
    #[arg(long)]
    rows: Option<usize>,

    /// Number of colors (random when omitted)
    #[arg(long)]
    colors: Option<Color>,

    /// Stop after this many moves
    #[arg(long)]
    max_moves: Option<u64>,

    /// Write the final board and move log as JSON to this file
    #[arg(long)]
    snapshot_out: Option<PathBuf>,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        ServerConfig {
            host: args.host,
            port: args.port,
            accept_window: Duration::from_secs(args.accept_window_secs),
            response_timeout: Duration::from_millis(args.response_timeout_ms),
            turn_pause: Duration::from_millis(args.turn_pause_ms),
            columns: args.columns,
            rows: args.rows,
            colors: args.colors,
            max_moves: args.max_moves,
            snapshot_out: args.snapshot_out,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let config = ServerConfig::from(Args::parse());
    let snapshot_out = config.snapshot_out.clone();

    let server = Server::bind(config).await?;
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Could not listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        println!("Received Ctrl+C, shutting down gracefully...");
    };

    let report = match server.run_until(shutdown).await {
        Ok(report) => report,
        Err(ServerError::Shutdown) => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    print_summary(&report);

    if let Some(path) = snapshot_out {
        write_report(&report, &path)?;
        info!("Final board written to {}", path.display());
    }

    Ok(())
}

fn print_summary(report: &GameReport) {
    println!(
        "Game over: {} moves on a {}x{} board with {} colors",
        report.moves.len(),
        report.board.columns,
        report.board.rows,
        report.board.num_colors
    );
    for player in &report.players {
        println!(
            "  player {} at ({}, {}): color {}, score {}, {:?}",
            player.id,
            player.origin_x + 1,
            player.origin_y + 1,
            player.color,
            player.score,
            player.state
        );
    }
}

fn write_report(report: &GameReport, path: &Path) -> Result<(), ServerError> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}
