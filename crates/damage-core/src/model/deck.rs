use crate::model::kind::CardKind;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Undrawn cards, counted per kind.
///
/// Decks are small `Copy` snapshots: drawing produces a new deck rather than
/// mutating the current one, so a branch can never corrupt its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deck {
    counts: [u32; 4],
}

impl Deck {
    pub const fn new(counts: [u32; 4]) -> Self {
        Self { counts }
    }

    /// Six misses, six hits, three crits and three bonus crits.
    pub const fn standard() -> Self {
        Self::new([6, 6, 3, 3])
    }

    /// Five copies of the standard deck shuffled together.
    pub const fn large() -> Self {
        Self::new([30, 30, 15, 15])
    }

    pub const fn count(&self, kind: CardKind) -> u32 {
        self.counts[kind.index()]
    }

    pub const fn counts(&self) -> [u32; 4] {
        self.counts
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// The deck left after drawing one card of `kind`, or `None` if none remain.
    pub fn without(&self, kind: CardKind) -> Option<Self> {
        let remaining = self.counts[kind.index()].checked_sub(1)?;
        let mut counts = self.counts;
        counts[kind.index()] = remaining;
        Some(Self { counts })
    }

    /// Numerator and denominator of the chance that the next card is `kind`.
    pub fn draw_odds(&self, kind: CardKind) -> (u32, u32) {
        (self.count(kind), self.total())
    }
}

impl fmt::Display for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [miss, hit, crit, bonus] = self.counts;
        write!(f, "({miss},{hit},{crit},{bonus})")
    }
}

#[cfg(test)]
mod tests {
    use super::Deck;
    use crate::model::kind::CardKind;

    #[test]
    fn standard_deck_has_18_cards() {
        let deck = Deck::standard();
        assert_eq!(deck.total(), 18);
        assert_eq!(deck.count(CardKind::Bonus), 3);
        assert_eq!(Deck::large().total(), 90);
    }

    #[test]
    fn without_removes_exactly_one_card() {
        let deck = Deck::standard();
        let next = deck.without(CardKind::Hit).expect("hits remain");
        assert_eq!(next.count(CardKind::Hit), 5);
        assert_eq!(next.total(), 17);
        assert_eq!(deck.count(CardKind::Hit), 6, "original snapshot untouched");
    }

    #[test]
    fn without_exhausted_kind_is_none() {
        let deck = Deck::new([1, 0, 0, 0]);
        assert!(deck.without(CardKind::Hit).is_none());
        let empty = deck.without(CardKind::Miss).expect("one miss left");
        assert!(empty.is_empty());
        assert!(empty.without(CardKind::Miss).is_none());
    }

    #[test]
    fn draw_odds_use_current_total() {
        let deck = Deck::standard();
        assert_eq!(deck.draw_odds(CardKind::Crit), (3, 18));
    }

    #[test]
    fn display_lists_counts_in_kind_order() {
        assert_eq!(Deck::standard().to_string(), "(6,6,3,3)");
    }
}
