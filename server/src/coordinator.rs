//! Turn coordination between concurrently running player tasks
//!
//! The coordinator is a monitor around the [`GameState`]: a player task that
//! wants to move calls [`TurnCoordinator::take_turn`], which waits for the
//! lock, sends the broadcast, reads the answer and applies or rejects the
//! move, all while holding the lock. Dropping the guard wakes the next waiter.
//!
//! There is no round-robin. The order of the session list is only used for the
//! color line of the broadcast; the next mover is whichever task acquires the
//! lock first. Because the answer is read inside the critical section, every
//! read and write is bounded by the configured response timeout so a silent
//! player cannot stall the game.

use crate::connection::{Choice, Connection};
use crate::game::{GameState, MoveRecord, MoveRejection};
use crate::session::PlayerSession;
use log::{info, warn};
use serde::Serialize;
use shared::{BoardSnapshot, INACTIVE_STATUS};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{watch, Mutex};

#[derive(Debug, Clone, Copy)]
pub struct TurnSettings {
    /// Bound on every write to and read from a player during its turn
    pub response_timeout: Duration,
    /// End the game after this many applied moves
    pub max_moves: Option<u64>,
}

/// What happened during one call to `take_turn`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Applied(MoveRecord),
    /// The player was deactivated during this turn
    Rejected(MoveRejection),
    /// The player is inactive; no I/O was performed
    Skipped,
    /// The game has ended; no I/O was performed
    GameOver,
}

/// Final state of a game
#[derive(Debug, Clone, Serialize)]
pub struct GameReport {
    pub players: Vec<PlayerSession>,
    pub board: BoardSnapshot,
    pub moves: Vec<MoveRecord>,
}

pub struct TurnCoordinator {
    game: Mutex<GameState>,
    settings: TurnSettings,
    finished: watch::Sender<bool>,
}

impl TurnCoordinator {
    pub fn new(game: GameState, settings: TurnSettings) -> Self {
        let (finished, _) = watch::channel(false);
        Self {
            game: Mutex::new(game),
            settings,
            finished,
        }
    }

    /// Receiver that flips to `true` once the game has ended
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.finished.subscribe()
    }

    pub fn is_finished(&self) -> bool {
        *self.finished.borrow()
    }

    /// Ends the game; turns requested afterwards return `GameOver`
    pub fn finish(&self) {
        if !self.finished.send_replace(true) {
            info!("Game finished");
        }
    }

    /// Plays one turn for the player behind `connection`.
    ///
    /// Waits until no other task holds the turn. Active players are sent the
    /// current state and their answer is validated and applied; any unusable
    /// answer, I/O failure or invalid color deactivates them. Inactive
    /// players are polled without any I/O.
    pub async fn take_turn<S>(&self, connection: &mut Connection<S>) -> TurnOutcome
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut game = self.game.lock().await;

        if self.is_finished() {
            return TurnOutcome::GameOver;
        }

        let player = connection.player();
        let index = match game.begin_turn(player) {
            Ok(index) => index,
            Err(rejection) => {
                warn!("Turn requested by {}: {}", player, rejection);
                return TurnOutcome::Rejected(rejection);
            }
        };

        if !game.players()[index].is_active() {
            return TurnOutcome::Skipped;
        }

        let deadline = self.settings.response_timeout;
        let frame = game.frame_for(index);
        let choice = match connection.send_frame(&frame, deadline).await {
            Ok(()) => connection.read_choice(deadline).await,
            Err(e) => Choice::Invalid(format!("send failed: {}", e)),
        };

        if let Choice::Invalid(reason) = &choice {
            warn!("Player {} gave no usable answer: {}", player, reason);
        }

        let outcome = match game.apply_move(index, choice.color()) {
            Ok(record) => {
                if let Some(max) = self.settings.max_moves {
                    if game.revision() >= max {
                        info!("Move limit of {} reached", max);
                        self.finish();
                    }
                }
                TurnOutcome::Applied(record)
            }
            Err(rejection) => {
                if let Err(e) = connection.send_status(INACTIVE_STATUS, deadline).await {
                    warn!("Could not notify player {}: {}", player, e);
                }
                TurnOutcome::Rejected(rejection)
            }
        };

        if game.active_count() == 0 {
            info!("No active players left");
            self.finish();
        }

        outcome
    }

    /// Copy of the board taken under the turn lock
    pub async fn snapshot(&self) -> BoardSnapshot {
        self.game.lock().await.snapshot()
    }

    pub async fn report(&self) -> GameReport {
        let game = self.game.lock().await;
        GameReport {
            players: game.players().to_vec(),
            board: game.snapshot(),
            moves: game.moves().to_vec(),
        }
    }
}
