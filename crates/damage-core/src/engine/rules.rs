use crate::model::hand::Hand;

/// Misses at which drawing stops, unless a bonus card has pushed the hand past the target.
pub const BUST_MISSES: u32 = 2;

/// A hand is finished once its counted draws reach the target.
pub fn is_terminal(hand: &Hand, target: u32) -> bool {
    hand.counted_size() == target
}

/// Whether a freshly drawn hand may keep going.
///
/// Draws that fail this check are dropped outright: they neither finish nor
/// contribute damage, so their probability mass leaves the computation.
pub fn continues(hand: &Hand, target: u32) -> bool {
    target < hand.total_size() || hand.misses() < BUST_MISSES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_ignores_bonus_cards() {
        assert!(is_terminal(&Hand::new(), 0));
        assert!(!is_terminal(&Hand::from_counts([0, 1, 0, 1]), 2));
        assert!(is_terminal(&Hand::from_counts([0, 1, 1, 1]), 2));
    }

    #[test]
    fn second_miss_stops_the_draw() {
        assert!(continues(&Hand::from_counts([1, 0, 0, 0]), 3));
        assert!(!continues(&Hand::from_counts([2, 0, 0, 0]), 3));
        assert!(!continues(&Hand::from_counts([2, 1, 0, 0]), 3));
    }

    #[test]
    fn overdrawn_hand_ignores_misses() {
        // Two misses plus a bonus card with target 2: total 3 exceeds the target.
        assert!(continues(&Hand::from_counts([2, 0, 0, 1]), 2));
        assert!(!continues(&Hand::from_counts([2, 0, 0, 0]), 2));
    }
}
