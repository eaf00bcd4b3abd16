use crate::strategy::RandomStrategy;
use log::{debug, info, warn};
use shared::{Header, ProtocolError, StateFrame, INACTIVE_STATUS};
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::sleep;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not reach {addr} after {attempts} attempts: {source}")]
    Connect {
        addr: String,
        attempts: u32,
        source: io::Error,
    },
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed broadcast: {0}")]
    Protocol(#[from] ProtocolError),
}

/// What the server sent when the client waited for its turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    State(StateFrame),
    Inactive,
    Closed,
}

/// How a game ended from the client's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSummary {
    pub moves: u64,
    pub deactivated: bool,
}

/// Opens a TCP connection, retrying while the server is not up yet
pub async fn connect(addr: &str, attempts: u32, retry: Duration) -> Result<TcpStream, ClientError> {
    let attempts = attempts.max(1);
    let mut attempt = 1;

    loop {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                info!("Connected to {} (attempt {})", addr, attempt);
                return Ok(stream);
            }
            Err(e) if attempt >= attempts => {
                return Err(ClientError::Connect {
                    addr: addr.to_string(),
                    attempts,
                    source: e,
                });
            }
            Err(e) => {
                debug!("Connection attempt {} to {} failed: {}", attempt, addr, e);
                attempt += 1;
                sleep(retry).await;
            }
        }
    }
}

pub struct Client<S> {
    stream: BufReader<S>,
    strategy: RandomStrategy,
    think: Duration,
    line: String,
}

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, strategy: RandomStrategy, think: Duration) -> Self {
        Client {
            stream: BufReader::new(stream),
            strategy,
            think,
            line: String::new(),
        }
    }

    /// Waits for the next message of the server
    pub async fn next_message(&mut self) -> Result<ServerMessage, ClientError> {
        let Some(first) = self.read_line().await? else {
            return Ok(ServerMessage::Closed);
        };
        if first.trim() == INACTIVE_STATUS {
            return Ok(ServerMessage::Inactive);
        }

        let header = Header::parse(&first)?;
        let mut text = first;
        text.push('\n');
        for _ in 0..header.remaining_lines() {
            match self.read_line().await? {
                Some(line) => {
                    text.push_str(&line);
                    text.push('\n');
                }
                // A broadcast cut short; decoding names the missing line
                None => break,
            }
        }

        Ok(ServerMessage::State(StateFrame::decode(&text)?))
    }

    /// Sends the chosen color as one line
    pub async fn reply(&mut self, color: shared::Color) -> Result<(), ClientError> {
        let stream = self.stream.get_mut();
        stream.write_all(format!("{}\n", color).as_bytes()).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Answers every broadcast until the server deactivates the client or
    /// closes the connection
    pub async fn run(&mut self) -> Result<GameSummary, ClientError> {
        let mut moves = 0;

        loop {
            match self.next_message().await? {
                ServerMessage::State(frame) => {
                    debug!(
                        "Board with {} players, origin ({}, {}):\n{}",
                        frame.header.num_players,
                        frame.origin.0 + 1,
                        frame.origin.1 + 1,
                        frame.board
                    );

                    let color = self.strategy.choose(&frame);
                    self.reply(color).await?;
                    moves += 1;
                    debug!("Chose color {}", color);

                    if !self.think.is_zero() {
                        sleep(self.think).await;
                    }
                }
                ServerMessage::Inactive => {
                    warn!("Deactivated by the server after {} moves", moves);
                    return Ok(GameSummary {
                        moves,
                        deactivated: true,
                    });
                }
                ServerMessage::Closed => {
                    info!("Server closed the connection after {} moves", moves);
                    return Ok(GameSummary {
                        moves,
                        deactivated: false,
                    });
                }
            }
        }
    }

    async fn read_line(&mut self) -> Result<Option<String>, ClientError> {
        self.line.clear();
        if self.stream.read_line(&mut self.line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(self.line.trim_end_matches(['\r', '\n']).to_string()))
    }
}
