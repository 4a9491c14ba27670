//! Who is connected and which matches are running.
//!
//! Both registries are plain maps. The server wraps each in a
//! `tokio::sync::Mutex` and holds the lock only for a single call, never
//! across an await on the network.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use hexhive_protocol::{GameId, PlayerId};
use hexhive_transport::ConnectionId;

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// A player that has completed its handshake at least once.
#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub id: PlayerId,
    /// The most recent connection this identity handshook on.
    pub connection: ConnectionId,
    /// Matches this player currently sits in.
    pub games: HashSet<GameId>,
}

/// Every known player, keyed by identity.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<PlayerId, PlayerRecord>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `id` handshook on `connection`.
    ///
    /// A returning identity keeps its game memberships; only the
    /// connection is updated.
    pub fn register(&mut self, id: PlayerId, connection: ConnectionId) {
        self.players
            .entry(id)
            .and_modify(|record| record.connection = connection)
            .or_insert_with(|| PlayerRecord {
                id,
                connection,
                games: HashSet::new(),
            });
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.players.get(&id)
    }

    /// Adds `game` to the player's memberships. Returns `false` if the
    /// player is unknown.
    pub fn join_game(&mut self, id: PlayerId, game: GameId) -> bool {
        match self.players.get_mut(&id) {
            Some(record) => {
                record.games.insert(game);
                true
            }
            None => false,
        }
    }

    /// Removes `game` from the player's memberships.
    pub fn leave_game(&mut self, id: PlayerId, game: GameId) {
        if let Some(record) = self.players.get_mut(&id) {
            record.games.remove(&game);
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

/// A running match.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub id: GameId,
    pub white: PlayerId,
    pub black: PlayerId,
    pub started_at: Instant,
}

/// Running matches, keyed by ID. Allocates the IDs as well.
#[derive(Debug)]
pub struct GameRegistry {
    games: HashMap<GameId, GameRecord>,
    next_id: u64,
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRegistry {
    pub fn new() -> Self {
        Self {
            games: HashMap::new(),
            next_id: 1,
        }
    }

    /// Registers a new match and returns its fresh ID. IDs are never
    /// reused within one registry.
    pub fn create(&mut self, white: PlayerId, black: PlayerId) -> GameId {
        let id = GameId(self.next_id);
        self.next_id += 1;
        self.games.insert(
            id,
            GameRecord {
                id,
                white,
                black,
                started_at: Instant::now(),
            },
        );
        id
    }

    pub fn remove(&mut self, id: GameId) -> Option<GameRecord> {
        self.games.remove(&id)
    }

    pub fn get(&self, id: GameId) -> Option<&GameRecord> {
        self.games.get(&id)
    }

    pub fn active_count(&self) -> usize {
        self.games.len()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_returning_player_keeps_games() {
        let mut players = PlayerRegistry::new();
        players.register(PlayerId(1), ConnectionId::new(10));
        assert!(players.join_game(PlayerId(1), GameId(5)));

        players.register(PlayerId(1), ConnectionId::new(11));

        let record = players.get(PlayerId(1)).unwrap();
        assert_eq!(record.connection, ConnectionId::new(11));
        assert!(record.games.contains(&GameId(5)));
        assert_eq!(players.len(), 1);
    }

    #[test]
    fn test_join_game_unknown_player_returns_false() {
        let mut players = PlayerRegistry::new();
        assert!(!players.join_game(PlayerId(9), GameId(1)));
        assert!(players.is_empty());
    }

    #[test]
    fn test_leave_game_removes_membership() {
        let mut players = PlayerRegistry::new();
        players.register(PlayerId(1), ConnectionId::new(1));
        players.join_game(PlayerId(1), GameId(1));
        players.join_game(PlayerId(1), GameId(2));

        players.leave_game(PlayerId(1), GameId(1));

        let games = &players.get(PlayerId(1)).unwrap().games;
        assert!(!games.contains(&GameId(1)));
        assert!(games.contains(&GameId(2)));
    }

    #[test]
    fn test_create_game_assigns_increasing_ids() {
        let mut games = GameRegistry::new();
        let a = games.create(PlayerId(1), PlayerId(2));
        let b = games.create(PlayerId(3), PlayerId(4));
        assert!(b > a);
        assert_eq!(games.active_count(), 2);
        assert_eq!(games.get(a).unwrap().white, PlayerId(1));
    }

    #[test]
    fn test_remove_game_frees_slot_without_reusing_id() {
        let mut games = GameRegistry::new();
        let a = games.create(PlayerId(1), PlayerId(2));
        assert!(games.remove(a).is_some());
        assert_eq!(games.active_count(), 0);
        assert!(games.remove(a).is_none());

        let b = games.create(PlayerId(1), PlayerId(2));
        assert_ne!(a, b);
    }
}
