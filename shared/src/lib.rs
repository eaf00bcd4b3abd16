//! # Shared Game Library
//!
//! Types used by both the server and the reference client of the flood-fill
//! coloring game:
//!
//! - [`board`]: the colored grid and the iterative flood fill
//! - [`protocol`]: the line-oriented text protocol spoken over TCP
//! - [`error`]: board and protocol error types
//!
//! Nothing in this crate performs I/O.

pub mod board;
pub mod error;
pub mod protocol;

pub use board::{Board, BoardSnapshot, Color};
pub use error::{BoardError, ProtocolError};
pub use protocol::{encode_state, parse_choice, Header, StateFrame, INACTIVE_STATUS};

/// Port of the reference deployment
pub const DEFAULT_PORT: u16 = 3379;
/// Seconds the server accepts new players before the game starts
pub const ACCEPT_WINDOW_SECS: u64 = 5;
/// Milliseconds the server waits for a player's answer
pub const RESPONSE_TIMEOUT_MS: u64 = 5000;
/// Upper bound of the random pause between two turn requests
pub const TURN_PAUSE_MS: u64 = 100;
