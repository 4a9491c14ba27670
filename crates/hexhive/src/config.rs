//! Server tunables.

use std::time::Duration;

/// Settings applied to every match a [`GameServer`](crate::GameServer)
/// runs.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Matches allowed to run at once. Further pairs wait in the lobby
    /// until a slot frees up.
    pub max_active_games: usize,
    /// How long a fresh connection has to send its handshake.
    pub handshake_timeout: Duration,
    /// How long the side to move has to submit a move. Running out aborts
    /// the match.
    pub move_timeout: Duration,
    /// Plies after which an undecided match is scored a tie. `None` means
    /// no limit.
    pub max_turns: Option<u32>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_active_games: 20,
            handshake_timeout: Duration::from_secs(5),
            move_timeout: Duration::from_secs(60),
            max_turns: None,
        }
    }
}
