//! Players waiting to be paired.

use std::collections::VecDeque;

use hexhive_protocol::PlayerId;

/// First-come, first-served queue of handshaken connections.
///
/// An identity appears at most once, so a player can never be paired with
/// itself. Generic over the connection type so it can be tested without a
/// network.
#[derive(Debug)]
pub struct Lobby<C> {
    waiting: VecDeque<(PlayerId, C)>,
}

impl<C> Default for Lobby<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Lobby<C> {
    pub fn new() -> Self {
        Self {
            waiting: VecDeque::new(),
        }
    }

    /// Queues `conn` under `player`.
    ///
    /// # Errors
    /// Hands `conn` back if `player` is already waiting.
    pub fn enqueue(&mut self, player: PlayerId, conn: C) -> Result<(), C> {
        if self.contains(player) {
            return Err(conn);
        }
        self.waiting.push_back((player, conn));
        Ok(())
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.waiting.iter().any(|(id, _)| *id == player)
    }

    /// Removes the two longest-waiting players, or nothing if fewer than
    /// two are waiting.
    pub fn pop_pair(&mut self) -> Option<((PlayerId, C), (PlayerId, C))> {
        if self.waiting.len() < 2 {
            return None;
        }
        let first = self.waiting.pop_front()?;
        let second = self.waiting.pop_front()?;
        Some((first, second))
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    /// Empties the queue, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = (PlayerId, C)> + '_ {
        self.waiting.drain(..)
    }
}
