//! # Flood Coloring Server
//!
//! Authoritative server for the multiplayer flood-coloring game. Players
//! connect over TCP during a short acceptance window, each is given a
//! distinct origin cell on a random board, and from then on they compete for
//! turns. On its turn a player is sent the full board and answers with one
//! color; the server flood-fills the player's region with that color.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Board
//! The board lives only on the server. Clients receive a fresh copy on every
//! turn and never send anything but a color number.
//!
//! ### Move Validation
//! A move is rejected when the color is outside `[1, num_colors]` or is the
//! current color of another active player. Rejection deactivates the player
//! for the rest of the game; so does an unparsable, late or missing answer.
//!
//! ### Turn Exclusivity
//! Exactly one player at a time reads the board, talks to its client and
//! mutates the board. All moves are therefore totally ordered and the move
//! log shows one entry per board revision.
//!
//! ## Architecture Design
//!
//! ### One Task per Player
//! Every connection is driven by its own tokio task
//! ([`connection::run_player`]). The task owns the socket; the player's game
//! data lives in a plain [`session::PlayerSession`] inside the game state.
//!
//! ### Monitor
//! [`coordinator::TurnCoordinator`] wraps the game state in a tokio mutex.
//! Holding the lock is holding the turn. There is no round-robin: whichever
//! task acquires the lock next plays next.
//!
//! ### Bounded I/O
//! Because the client is consulted while the lock is held, every write and
//! read of a turn is bounded by the response timeout.
//!
//! ## Module Organization
//!
//! - `config`: listener and game settings
//! - `connection`: line protocol over one player's stream, player task
//! - `coordinator`: turn monitor, game end, final report
//! - `error`: server error type
//! - `game`: board, sessions, placement and move validation
//! - `network`: TCP listener, acceptance window, game lifecycle
//! - `session`: per-player state machine
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::bind(ServerConfig::default()).await?;
//!
//!     // Accepts players for five seconds, then plays until nobody is left
//!     let report = server.run().await?;
//!     println!("{} moves played", report.moves.len());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod coordinator;
pub mod error;
pub mod game;
pub mod network;
pub mod session;
