use crate::model::colour::Colour;
use crate::model::kind::CardKind;
use serde::{Deserialize, Serialize};

/// Cards drawn so far in one branch, counted per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hand {
    counts: [u32; 4],
}

impl Hand {
    pub const fn new() -> Self {
        Self { counts: [0; 4] }
    }

    pub const fn from_counts(counts: [u32; 4]) -> Self {
        Self { counts }
    }

    pub const fn count(&self, kind: CardKind) -> u32 {
        self.counts[kind.index()]
    }

    pub const fn counts(&self) -> [u32; 4] {
        self.counts
    }

    /// The hand after one more card of `kind`.
    pub fn with(&self, kind: CardKind) -> Self {
        let mut counts = self.counts;
        counts[kind.index()] += 1;
        Self { counts }
    }

    pub fn total_size(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Draws that count toward the target; bonus cards are free.
    pub fn counted_size(&self) -> u32 {
        CardKind::ALL
            .iter()
            .filter(|kind| !kind.is_bonus())
            .map(|&kind| self.count(kind))
            .sum()
    }

    pub fn misses(&self) -> u32 {
        CardKind::ALL
            .iter()
            .filter(|kind| kind.is_miss())
            .map(|&kind| self.count(kind))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_size() == 0
    }

    /// Face value of the hand under `colour`'s damage table.
    pub fn damage(&self, colour: Colour) -> u32 {
        CardKind::ALL
            .iter()
            .map(|&kind| colour.damage(kind) * self.count(kind))
            .sum()
    }

    pub fn white_damage(&self) -> u32 {
        self.damage(Colour::White)
    }
}
