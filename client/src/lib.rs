//! # Reference Client
//!
//! A minimal player for the flood-coloring server. It connects, waits for the
//! server to grant it a turn, and answers every state broadcast with a random
//! color that no other player currently holds.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! Connection with retry, reading broadcasts line by line, replying with the
//! chosen color. The loop ends when the server sends `INACTIVE` or closes
//! the connection.
//!
//! ### Strategy Module (`strategy`)
//! The color choice. Falls back to the color of the player's own origin cell
//! when every color is taken, which the server accepts as long as no other
//! active player owns it.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::{connect, Client};
//! use client::strategy::RandomStrategy;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let stream = connect("127.0.0.1:3379", 50, Duration::from_millis(100)).await?;
//!     let mut client = Client::new(stream, RandomStrategy::new(), Duration::from_millis(100));
//!
//!     let summary = client.run().await?;
//!     println!("{} moves, deactivated: {}", summary.moves, summary.deactivated);
//!
//!     Ok(())
//! }
//! ```

pub mod network;
pub mod strategy;
