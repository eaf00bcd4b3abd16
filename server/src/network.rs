//! Server network layer: accepting players and running one game over TCP

use crate::config::ServerConfig;
use crate::connection::{run_player, Connection};
use crate::coordinator::{GameReport, TurnCoordinator, TurnSettings};
use crate::error::ServerError;
use crate::game::{BoardDimensions, GameState};
use crate::session::{PlayerId, PlayerSession};
use log::{error, info, warn};
use shared::Board;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout_at, Duration, Instant};

/// One game instance bound to a TCP port
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
}

impl Server {
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(config.address()).await?;
        info!("Server listening on {}", listener.local_addr()?);
        Ok(Server { listener, config })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections until the acceptance window closes
    pub async fn accept_players(&self) -> Vec<(TcpStream, SocketAddr)> {
        let deadline = Instant::now() + self.config.accept_window;
        let mut accepted = Vec::new();

        info!(
            "Waiting {:?} for players to connect",
            self.config.accept_window
        );

        loop {
            match timeout_at(deadline, self.listener.accept()).await {
                Err(_) => break,
                Ok(Ok((stream, addr))) => {
                    info!("Player connected from {}", addr);
                    if let Err(e) = stream.set_nodelay(true) {
                        warn!("Could not disable Nagle for {}: {}", addr, e);
                    }
                    accepted.push((stream, addr));
                }
                Ok(Err(e)) => {
                    error!("Error accepting connection: {}", e);
                    sleep(Duration::from_millis(10)).await;
                }
            }
        }

        info!("Acceptance window closed, {} players connected", accepted.len());
        accepted
    }

    /// Accepts players, sets up the board and plays until the game ends
    pub async fn run(self) -> Result<GameReport, ServerError> {
        self.run_until(std::future::pending()).await
    }

    /// Like [`Server::run`], but `shutdown` completing ends the game early.
    /// The report of the partially played game is still returned.
    pub async fn run_until<F>(self, shutdown: F) -> Result<GameReport, ServerError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let accepted = tokio::select! {
            accepted = self.accept_players() => accepted,
            _ = &mut shutdown => {
                info!("Shutdown requested before the game started");
                return Err(ServerError::Shutdown);
            }
        };

        let coordinator = Arc::new(self.prepare_game(&accepted)?);
        self.play(coordinator, accepted, shutdown).await
    }

    /// Builds the board and places the players; no turn is played yet
    fn prepare_game(
        &self,
        accepted: &[(TcpStream, SocketAddr)],
    ) -> Result<TurnCoordinator, ServerError> {
        if accepted.is_empty() {
            return Err(ServerError::NoPlayers);
        }

        let sessions: Vec<PlayerSession> = accepted
            .iter()
            .enumerate()
            .map(|(i, (_, addr))| PlayerSession::new(PlayerId(i as u32 + 1), Some(*addr)))
            .collect();

        let mut rng = rand::thread_rng();
        let random = BoardDimensions::for_players(sessions.len(), &mut rng);
        let board = Board::with_rng(
            self.config.columns.unwrap_or(random.columns),
            self.config.rows.unwrap_or(random.rows),
            self.config.colors.unwrap_or(random.num_colors),
            &mut rng,
        )?;
        let game = GameState::setup(board, sessions, &mut rng)?;

        Ok(TurnCoordinator::new(
            game,
            TurnSettings {
                response_timeout: self.config.response_timeout,
                max_moves: self.config.max_moves,
            },
        ))
    }

    async fn play<F>(
        &self,
        coordinator: Arc<TurnCoordinator>,
        accepted: Vec<(TcpStream, SocketAddr)>,
        shutdown: F,
    ) -> Result<GameReport, ServerError>
    where
        F: Future<Output = ()>,
    {
        let handles: Vec<_> = accepted
            .into_iter()
            .enumerate()
            .map(|(i, (stream, _))| {
                let connection = Connection::new(PlayerId(i as u32 + 1), stream);
                tokio::spawn(run_player(
                    Arc::clone(&coordinator),
                    connection,
                    self.config.turn_pause,
                ))
            })
            .collect();

        info!("Game started with {} players", handles.len());

        let mut finished = coordinator.subscribe();
        let game_over = async {
            while !*finished.borrow() {
                if finished.changed().await.is_err() {
                    break;
                }
            }
        };

        tokio::select! {
            _ = game_over => {}
            _ = shutdown => {
                info!("Shutdown requested, ending the game");
                coordinator.finish();
            }
        }

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Player task panicked: {}", e);
            }
        }

        let report = coordinator.report().await;
        info!(
            "Game over after {} moves, {} players still active",
            report.moves.len(),
            report.players.iter().filter(|p| p.is_active()).count()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    fn test_config() -> ServerConfig {
        ServerConfig {
            port: 0,
            accept_window: Duration::from_millis(200),
            response_timeout: Duration::from_millis(200),
            turn_pause: Duration::from_millis(5),
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_accept_window_closes() {
        let server = Server::bind(test_config()).await.unwrap();
        let addr = server.local_addr().unwrap();

        let connector = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });

        let started = std::time::Instant::now();
        let accepted = server.accept_players().await;
        let _client = connector.await.unwrap();

        assert_eq!(accepted.len(), 1);
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_run_without_players_fails() {
        let server = Server::bind(test_config()).await.unwrap();
        assert!(matches!(server.run().await, Err(ServerError::NoPlayers)));
    }

    #[tokio::test]
    async fn test_shutdown_during_accept_window() {
        let server = Server::bind(ServerConfig {
            accept_window: Duration::from_secs(30),
            ..test_config()
        })
        .await
        .unwrap();
        let addr = server.local_addr().unwrap();

        let connector = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
        let shutdown = tokio::time::sleep(Duration::from_millis(100));

        let result = tokio::time::timeout(Duration::from_secs(5), server.run_until(shutdown))
            .await
            .unwrap();
        let _client = connector.await.unwrap();

        assert!(matches!(result, Err(ServerError::Shutdown)));
    }

    #[tokio::test]
    async fn test_board_overrides_are_used() {
        let server = Server::bind(ServerConfig {
            columns: Some(4),
            rows: Some(3),
            colors: Some(9),
            ..test_config()
        })
        .await
        .unwrap();
        let addr = server.local_addr().unwrap();

        let connector = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
        let accepted = server.accept_players().await;
        let _client = connector.await.unwrap();

        let coordinator = server.prepare_game(&accepted).unwrap();
        let snapshot = coordinator.snapshot().await;
        assert_eq!((snapshot.columns, snapshot.rows, snapshot.num_colors), (4, 3, 9));
    }

    #[tokio::test]
    async fn test_board_too_small_for_players() {
        let server = Server::bind(ServerConfig {
            columns: Some(1),
            rows: Some(1),
            ..test_config()
        })
        .await
        .unwrap();
        let addr = server.local_addr().unwrap();

        let connector = tokio::spawn(async move {
            let a = TcpStream::connect(addr).await.unwrap();
            let b = TcpStream::connect(addr).await.unwrap();
            (a, b)
        });
        let accepted = server.accept_players().await;
        let _clients = connector.await.unwrap();

        assert!(matches!(
            server.prepare_game(&accepted),
            Err(ServerError::BoardTooSmall {
                cells: 1,
                players: 2
            })
        ));
    }

    #[tokio::test]
    async fn test_single_garbage_player_ends_game() {
        let server = Server::bind(test_config()).await.unwrap();
        let addr = server.local_addr().unwrap();

        let client = tokio::spawn(async move {
            let stream = TcpStream::connect(addr).await.unwrap();
            let (read, mut write) = stream.into_split();
            let mut lines = BufReader::new(read).lines();
            let mut received = Vec::new();
            while let Ok(Some(line)) = lines.next_line().await {
                if received.is_empty() {
                    // Answer the first line of the first frame with garbage
                    write.write_all(b"abc\n").await.unwrap();
                }
                received.push(line);
            }
            received
        });

        let report = tokio::time::timeout(Duration::from_secs(10), server.run())
            .await
            .unwrap()
            .unwrap();
        let received = client.await.unwrap();

        assert!(report.moves.is_empty());
        assert!(!report.players[0].is_active());
        assert_eq!(received.last().map(String::as_str), Some("INACTIVE"));
    }

    #[tokio::test]
    async fn test_shutdown_ends_running_game() {
        let server = Server::bind(test_config()).await.unwrap();
        let addr = server.local_addr().unwrap();

        // Connects and never answers; the game only ends through shutdown
        // or the response timeout
        let client = tokio::spawn(async move {
            let stream = TcpStream::connect(addr).await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(stream);
        });

        let shutdown = tokio::time::sleep(Duration::from_millis(250));
        let report = tokio::time::timeout(Duration::from_secs(10), server.run_until(shutdown))
            .await
            .unwrap()
            .unwrap();
        client.abort();

        assert!(report.moves.is_empty());
        assert_eq!(report.players.len(), 1);
    }
}
