//! Server-side record of one participant
//!
//! A `PlayerSession` is plain data. The task driving the player's connection
//! lives in `connection`, and the authoritative list of sessions lives in the
//! `GameState` owned by the turn coordinator.

use serde::Serialize;
use shared::Color;
use std::fmt;
use std::net::SocketAddr;

/// Unique player identifier assigned by the server in accept order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a session
///
/// `Connecting -> Initialized -> Active -> Inactive`, where `Inactive` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    /// Stream accepted, no game semantics yet
    Connecting,
    /// Origin and starting color assigned
    Initialized,
    /// Takes part in turns
    Active,
    /// Sent an invalid answer; polled but never plays again
    Inactive,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSession {
    pub id: PlayerId,
    /// Peer address, for logging only
    pub addr: Option<SocketAddr>,
    pub origin_x: usize,
    pub origin_y: usize,
    /// Color of the region this player owns
    pub color: Color,
    pub state: SessionState,
    /// Cells recolored by this player's accepted moves
    pub score: u64,
}

impl PlayerSession {
    pub fn new(id: PlayerId, addr: Option<SocketAddr>) -> Self {
        Self {
            id,
            addr,
            origin_x: 0,
            origin_y: 0,
            color: 0,
            state: SessionState::Connecting,
            score: 0,
        }
    }

    /// Places the player on the board. Only valid from `Connecting`.
    pub fn initialize(&mut self, x: usize, y: usize, color: Color) {
        debug_assert_eq!(self.state, SessionState::Connecting);
        self.origin_x = x;
        self.origin_y = y;
        self.color = color;
        self.state = SessionState::Initialized;
    }

    pub fn activate(&mut self) {
        if self.state == SessionState::Initialized {
            self.state = SessionState::Active;
        }
    }

    pub fn deactivate(&mut self) {
        self.state = SessionState::Inactive;
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn origin(&self) -> (usize, usize) {
        (self.origin_x, self.origin_y)
    }

    /// True if this player has been placed and is still in the game
    pub fn holds_position(&self) -> bool {
        matches!(self.state, SessionState::Initialized | SessionState::Active)
    }
}
