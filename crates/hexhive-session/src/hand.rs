//! Pieces a player has not placed yet.

use std::collections::BTreeMap;

use hexhive_engine::PieceType;
use serde::{Deserialize, Serialize};

/// Remaining count per piece type for one side.
///
/// Serialized as a plain map, e.g. `{"QueenBee": 1, "Spider": 2}`. Types
/// with no entry count as zero.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hand {
    counts: BTreeMap<PieceType, u32>,
}

impl Hand {
    /// The full starting set: one queen bee, two spiders, two beetles,
    /// three grasshoppers and three soldier ants.
    pub fn standard() -> Self {
        Self::from_counts([
            (PieceType::QueenBee, 1),
            (PieceType::Spider, 2),
            (PieceType::Beetle, 2),
            (PieceType::Grasshopper, 3),
            (PieceType::SoldierAnt, 3),
        ])
    }

    /// Builds a hand from explicit counts. Later entries for the same type
    /// overwrite earlier ones.
    pub fn from_counts(counts: impl IntoIterator<Item = (PieceType, u32)>) -> Self {
        Self {
            counts: counts.into_iter().collect(),
        }
    }

    pub fn count(&self, piece_type: PieceType) -> u32 {
        self.counts.get(&piece_type).copied().unwrap_or(0)
    }

    pub fn has(&self, piece_type: PieceType) -> bool {
        self.count(piece_type) > 0
    }

    /// Takes one piece of `piece_type` out of the hand.
    ///
    /// Returns `false` (and changes nothing) if none are left, so counts
    /// never go negative.
    pub fn take(&mut self, piece_type: PieceType) -> bool {
        match self.counts.get_mut(&piece_type) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }

    /// Piece types with at least one piece left, in [`PieceType::ALL`]
    /// order.
    pub fn available(&self) -> impl Iterator<Item = PieceType> + '_ {
        PieceType::ALL.into_iter().filter(|t| self.has(*t))
    }

    /// Total number of pieces left.
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
