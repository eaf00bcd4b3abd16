//! Authoritative game state: the board, the ordered player sessions and the
//! move log.
//!
//! `GameState` is never shared directly. The turn coordinator owns it behind a
//! mutex, so every method here runs with exclusive access.

use crate::error::ServerError;
use crate::session::{PlayerId, PlayerSession, SessionState};
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use shared::{encode_state, Board, BoardError, BoardSnapshot, Color};
use thiserror::Error;

/// Why a move was refused. Any rejection deactivates the player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveRejection {
    #[error("color {color} is outside [1, {num_colors}]")]
    OutOfRange { color: Color, num_colors: Color },
    #[error("color {color} is already owned by player {owner}")]
    ColorTaken { color: Color, owner: PlayerId },
    #[error("player {0} is not active")]
    NotActive(PlayerId),
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error("board rejected the move: {0}")]
    Board(#[from] BoardError),
}

/// One applied move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    /// Board revision the move was computed against
    pub revision: u64,
    pub player: PlayerId,
    pub color: Color,
    pub recolored: usize,
}

/// Board size and color count for a new game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardDimensions {
    pub columns: usize,
    pub rows: usize,
    pub num_colors: Color,
}

impl BoardDimensions {
    /// Random dimensions that scale with the number of players.
    ///
    /// There are always more colors than players, and at least one more
    /// column and row than players.
    pub fn for_players<R: Rng + ?Sized>(players: usize, rng: &mut R) -> Self {
        let n = players.max(1);
        Self {
            columns: n + 1 + rng.gen_range(0..=9 * n - 2),
            rows: n + 1 + rng.gen_range(0..=9 * n - 2),
            num_colors: (n + 1 + rng.gen_range(0..=4 * n - 2)) as Color,
        }
    }
}

#[derive(Debug)]
pub struct GameState {
    board: Board,
    players: Vec<PlayerSession>,
    /// Index of the session holding the turn
    playing: Option<usize>,
    revision: u64,
    moves: Vec<MoveRecord>,
}

impl GameState {
    /// Builds a game from sessions that are already placed, keeping their order
    pub fn from_sessions(board: Board, players: Vec<PlayerSession>) -> Self {
        Self {
            board,
            players,
            playing: None,
            revision: 0,
            moves: Vec::new(),
        }
    }

    /// Places every session, shuffles the play order once and activates all.
    ///
    /// Origins are sampled at random until no earlier placed player already
    /// holds the same cell with the same color.
    pub fn setup<R: Rng + ?Sized>(
        board: Board,
        mut players: Vec<PlayerSession>,
        rng: &mut R,
    ) -> Result<Self, ServerError> {
        if players.is_empty() {
            return Err(ServerError::NoPlayers);
        }
        if board.cell_count() < players.len() {
            return Err(ServerError::BoardTooSmall {
                cells: board.cell_count(),
                players: players.len(),
            });
        }

        for p in 0..players.len() {
            let (placed, rest) = players.split_at_mut(p);
            let (x, y, color) = loop {
                let x = rng.gen_range(0..board.columns());
                let y = rng.gen_range(0..board.rows());
                let color = board.color_at(x, y)?;
                if is_free_position(placed, x, y, color) {
                    break (x, y, color);
                }
            };

            let player = &mut rest[0];
            player.initialize(x, y, color);
            info!(
                "Player {} initialized at ({}, {}) with color {}",
                player.id, x, y, color
            );
        }

        players.shuffle(rng);
        for player in &mut players {
            player.activate();
        }

        let order: Vec<String> = players.iter().map(|p| p.id.to_string()).collect();
        info!(
            "Game ready: {}x{} board, {} colors, order {}",
            board.columns(),
            board.rows(),
            board.num_colors(),
            order.join(" ")
        );

        Ok(Self::from_sessions(board, players))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[PlayerSession] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerSession> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn index_of(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    /// Number of moves applied so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// The player who most recently took the turn
    pub fn playing(&self) -> Option<PlayerId> {
        self.playing.map(|i| self.players[i].id)
    }

    pub fn active_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_active()).count()
    }

    /// Records `id` as the holder of the turn and returns its index
    pub fn begin_turn(&mut self, id: PlayerId) -> Result<usize, MoveRejection> {
        let index = self.index_of(id).ok_or(MoveRejection::UnknownPlayer(id))?;
        self.playing = Some(index);
        Ok(index)
    }

    /// Current colors of all sessions in play order
    pub fn colors(&self) -> Vec<Color> {
        self.players.iter().map(|p| p.color).collect()
    }

    /// State broadcast for the player at `index`
    pub fn frame_for(&self, index: usize) -> String {
        encode_state(&self.board, self.players[index].origin(), &self.colors())
    }

    /// Returns the active player, other than `index`, that owns `color`
    pub fn color_owner(&self, index: usize, color: Color) -> Option<PlayerId> {
        self.players
            .iter()
            .enumerate()
            .find(|(i, p)| *i != index && p.is_active() && p.color == color)
            .map(|(_, p)| p.id)
    }

    /// Checks a move without applying it
    pub fn validate_move(&self, index: usize, color: Color) -> Result<(), MoveRejection> {
        let player = &self.players[index];
        if !player.is_active() {
            return Err(MoveRejection::NotActive(player.id));
        }
        if !self.board.is_valid_color(color) {
            return Err(MoveRejection::OutOfRange {
                color,
                num_colors: self.board.num_colors(),
            });
        }
        if let Some(owner) = self.color_owner(index, color) {
            return Err(MoveRejection::ColorTaken { color, owner });
        }
        Ok(())
    }

    /// Validates and applies a move for the player at `index`.
    ///
    /// On rejection the player becomes inactive for the rest of the game and
    /// the board is left untouched.
    pub fn apply_move(&mut self, index: usize, color: Color) -> Result<MoveRecord, MoveRejection> {
        if let Err(rejection) = self.validate_move(index, color) {
            self.deactivate(index);
            return Err(rejection);
        }

        let (x, y) = self.players[index].origin();
        let recolored = match self.board.flood_fill(x, y, color) {
            Ok(recolored) => recolored,
            Err(e) => {
                self.deactivate(index);
                return Err(e.into());
            }
        };

        if recolored > 0 {
            self.refresh_colors();
        }

        let player = &mut self.players[index];
        player.color = color;
        player.score += recolored as u64;

        let record = MoveRecord {
            revision: self.revision,
            player: player.id,
            color,
            recolored,
        };
        self.revision += 1;
        self.moves.push(record);

        debug!(
            "Move {}: player {} took color {} ({} cells)",
            record.revision, record.player, color, recolored
        );

        Ok(record)
    }

    /// Re-reads every placed player's color from its origin cell. A flood
    /// can reach another player's origin when both share a region.
    fn refresh_colors(&mut self) {
        for player in &mut self.players {
            if player.state == SessionState::Connecting {
                continue;
            }
            if let Ok(color) = self.board.color_at(player.origin_x, player.origin_y) {
                player.color = color;
            }
        }
    }

    pub fn deactivate(&mut self, index: usize) {
        let player = &mut self.players[index];
        if player.is_active() {
            player.deactivate();
            info!("Player {} deactivated", player.id);
        }
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.board.snapshot()
    }
}

fn is_free_position(placed: &[PlayerSession], x: usize, y: usize, color: Color) -> bool {
    !placed
        .iter()
        .filter(|p| p.holds_position())
        .any(|p| p.color == color && p.origin_x == x && p.origin_y == y)
}
