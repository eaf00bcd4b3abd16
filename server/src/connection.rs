//! Per-player connection handling
//!
//! [`Connection`] wraps the byte stream of one player and speaks the text
//! protocol on it. [`run_player`] is the task that drives one connection for
//! the whole game: ask the coordinator for the turn, play it, pause, repeat.

use crate::coordinator::{TurnCoordinator, TurnOutcome};
use crate::session::PlayerId;
use log::{debug, info};
use rand::Rng;
use shared::{parse_choice, Color};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::time::{sleep, timeout};

/// Longest answer line accepted, newline included
pub const MAX_ANSWER_LEN: u64 = 64;

/// A player's answer to a state broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Color(Color),
    /// Missing, late or unparsable answer, with the reason
    Invalid(String),
}

impl Choice {
    /// The color to validate; unusable answers become 0, which is never valid
    pub fn color(&self) -> Color {
        match self {
            Choice::Color(color) => *color,
            Choice::Invalid(_) => 0,
        }
    }
}

pub struct Connection<S> {
    player: PlayerId,
    stream: BufReader<S>,
    line: String,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(player: PlayerId, stream: S) -> Self {
        Self {
            player,
            stream: BufReader::new(stream),
            line: String::new(),
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// Writes a complete state broadcast, failing if it takes longer than `deadline`
    pub async fn send_frame(&mut self, frame: &str, deadline: Duration) -> io::Result<()> {
        self.write_with_deadline(frame.as_bytes(), deadline).await
    }

    /// Writes a single status line
    pub async fn send_status(&mut self, status: &str, deadline: Duration) -> io::Result<()> {
        let line = format!("{}\n", status);
        self.write_with_deadline(line.as_bytes(), deadline).await
    }

    /// Reads one answer line, waiting at most `deadline`
    pub async fn read_choice(&mut self, deadline: Duration) -> Choice {
        self.line.clear();

        let mut bounded = (&mut self.stream).take(MAX_ANSWER_LEN);
        match timeout(deadline, bounded.read_line(&mut self.line)).await {
            Err(_) => Choice::Invalid(format!("no answer within {:?}", deadline)),
            Ok(Err(e)) => Choice::Invalid(format!("read failed: {}", e)),
            Ok(Ok(0)) => Choice::Invalid("connection closed".to_string()),
            Ok(Ok(n)) if n as u64 >= MAX_ANSWER_LEN && !self.line.ends_with('\n') => {
                Choice::Invalid(format!("answer longer than {} bytes", MAX_ANSWER_LEN))
            }
            Ok(Ok(_)) => match parse_choice(&self.line) {
                Ok(color) => Choice::Color(color),
                Err(e) => Choice::Invalid(e.to_string()),
            },
        }
    }

    pub async fn shutdown(&mut self) {
        let _ = self.stream.get_mut().shutdown().await;
    }

    async fn write_with_deadline(&mut self, bytes: &[u8], deadline: Duration) -> io::Result<()> {
        let stream = self.stream.get_mut();
        let write = async {
            stream.write_all(bytes).await?;
            stream.flush().await
        };

        match timeout(deadline, write).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("write blocked for {:?}", deadline),
            )),
        }
    }
}

/// Drives one player until the game ends.
///
/// Between turns the task sleeps for a random duration up to `turn_pause`.
/// This is a cooperative yield, not a scheduling guarantee: whichever task
/// acquires the coordinator next plays next.
pub async fn run_player<S>(
    coordinator: Arc<TurnCoordinator>,
    mut connection: Connection<S>,
    turn_pause: Duration,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let player = connection.player();
    let mut finished = coordinator.subscribe();
    let mut turns = 0u64;

    loop {
        match coordinator.take_turn(&mut connection).await {
            TurnOutcome::GameOver => break,
            TurnOutcome::Applied(record) => {
                turns += 1;
                debug!(
                    "Player {} moved to color {} at revision {}",
                    player, record.color, record.revision
                );
            }
            TurnOutcome::Rejected(reason) => {
                info!("Player {} is out: {}", player, reason);
            }
            TurnOutcome::Skipped => {}
        }

        let pause = random_pause(turn_pause);
        tokio::select! {
            _ = sleep(pause) => {}
            // Loop once more so take_turn reports the end
            _ = finished.changed() => {}
        }
    }

    connection.shutdown().await;
    debug!("Player {} task stopped after {} moves", player, turns);
}

fn random_pause(max: Duration) -> Duration {
    let max_ms = max.as_millis() as u64;
    Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
}
