use shared::BoardError;
use std::io;
use thiserror::Error;

/// Errors that stop a game before or after play; per-turn problems never
/// surface here, they deactivate the offending player instead.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("board setup failed: {0}")]
    Board(#[from] BoardError),
    #[error("no players connected during the acceptance window")]
    NoPlayers,
    #[error("shutdown requested before the game started")]
    Shutdown,
    #[error("board has {cells} cells, not enough for {players} players")]
    BoardTooSmall { cells: usize, players: usize },
    #[error("snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}
