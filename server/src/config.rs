use shared::{Color, ACCEPT_WINDOW_SECS, DEFAULT_PORT, RESPONSE_TIMEOUT_MS, TURN_PAUSE_MS};
use std::path::PathBuf;
use std::time::Duration;

/// Everything a game instance needs to know before it starts listening
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// How long new connections are accepted
    pub accept_window: Duration,
    /// Deadline for a player's answer after its broadcast was sent
    pub response_timeout: Duration,
    /// Upper bound of the random pause between two turn requests
    pub turn_pause: Duration,
    /// Overrides for the randomly chosen board size
    pub columns: Option<usize>,
    pub rows: Option<usize>,
    pub colors: Option<Color>,
    /// End the game after this many applied moves
    pub max_moves: Option<u64>,
    /// Where to write the final board as JSON
    pub snapshot_out: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            accept_window: Duration::from_secs(ACCEPT_WINDOW_SECS),
            response_timeout: Duration::from_millis(RESPONSE_TIMEOUT_MS),
            turn_pause: Duration::from_millis(TURN_PAUSE_MS),
            columns: None,
            rows: None,
            colors: None,
            max_moves: None,
            snapshot_out: None,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
