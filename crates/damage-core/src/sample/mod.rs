//! Random play-outs of the same draw rules, for cross-checking the engine.
//!
//! A sequence that busts or runs out of cards scores zero, matching the
//! engine's treatment of discarded draws, so the sample mean converges to the
//! exact expectation.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::engine::rules;
use crate::model::colour::Colour;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::kind::CardKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawEnd {
    Finished,
    Busted,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOutcome {
    pub hand: Hand,
    pub end: DrawEnd,
}

impl DrawOutcome {
    pub fn damage(&self, colour: Colour) -> u32 {
        match self.end {
            DrawEnd::Finished => self.hand.damage(colour),
            DrawEnd::Busted | DrawEnd::Exhausted => 0,
        }
    }
}

/// Play one draw sequence from `deck`, continuing `hand`.
pub fn draw_once<R: Rng + ?Sized>(
    deck: &Deck,
    hand: &Hand,
    target: u32,
    rng: &mut R,
) -> DrawOutcome {
    let mut deck = *deck;
    let mut hand = *hand;
    loop {
        if rules::is_terminal(&hand, target) {
            return DrawOutcome {
                hand,
                end: DrawEnd::Finished,
            };
        }
        let Some((kind, next)) = draw_card(&deck, rng) else {
            return DrawOutcome {
                hand,
                end: DrawEnd::Exhausted,
            };
        };
        deck = next;
        hand = hand.with(kind);
        if !rules::continues(&hand, target) {
            return DrawOutcome {
                hand,
                end: DrawEnd::Busted,
            };
        }
    }
}

fn draw_card<R: Rng + ?Sized>(deck: &Deck, rng: &mut R) -> Option<(CardKind, Deck)> {
    let total = deck.total();
    if total == 0 {
        return None;
    }
    let mut pick = rng.gen_range(0..total);
    for kind in CardKind::ALL {
        let count = deck.count(kind);
        if pick < count {
            return deck.without(kind).map(|next| (kind, next));
        }
        pick -= count;
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleEstimate {
    pub trials: u64,
    pub mean: f64,
    pub variance: f64,
    pub finished: u64,
    pub busted: u64,
    pub exhausted: u64,
}

impl SampleEstimate {
    pub fn std_error(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        (self.variance / self.trials as f64).sqrt()
    }

    pub fn finished_rate(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.finished as f64 / self.trials as f64
    }
}

/// Average `colour` damage over `trials` seeded play-outs.
pub fn estimate(
    deck: &Deck,
    hand: &Hand,
    target: u32,
    colour: Colour,
    trials: u64,
    seed: u64,
) -> SampleEstimate {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut mean = 0.0f64;
    let mut m2 = 0.0f64;
    let mut finished = 0u64;
    let mut busted = 0u64;
    let mut exhausted = 0u64;

    for n in 1..=trials {
        let outcome = draw_once(deck, hand, target, &mut rng);
        match outcome.end {
            DrawEnd::Finished => finished += 1,
            DrawEnd::Busted => busted += 1,
            DrawEnd::Exhausted => exhausted += 1,
        }
        // Welford update
        let value = f64::from(outcome.damage(colour));
        let delta = value - mean;
        mean += delta / n as f64;
        m2 += delta * (value - mean);
    }

    let variance = if trials > 1 {
        m2 / (trials - 1) as f64
    } else {
        0.0
    };

    SampleEstimate {
        trials,
        mean,
        variance,
        finished,
        busted,
        exhausted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_hits_always_finish() {
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = draw_once(&Deck::new([0, 3, 0, 0]), &Hand::new(), 2, &mut rng);
        assert_eq!(outcome.end, DrawEnd::Finished);
        assert_eq!(outcome.damage(Colour::White), 2);
        assert_eq!(outcome.damage(Colour::Black), 8);
    }

    #[test]
    fn all_misses_always_bust() {
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = draw_once(&Deck::new([2, 0, 0, 0]), &Hand::new(), 2, &mut rng);
        assert_eq!(outcome.end, DrawEnd::Busted);
        assert_eq!(outcome.hand.misses(), 2);
        assert_eq!(outcome.damage(Colour::Red), 0);
    }

    #[test]
    fn short_deck_runs_dry() {
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = draw_once(&Deck::new([0, 0, 0, 2]), &Hand::new(), 1, &mut rng);
        assert_eq!(outcome.end, DrawEnd::Exhausted);
        assert_eq!(outcome.hand.count(CardKind::Bonus), 2);
        assert_eq!(outcome.damage(Colour::Red), 0);
    }

    #[test]
    fn estimate_is_seed_deterministic() {
        let deck = Deck::standard();
        let a = estimate(&deck, &Hand::new(), 3, Colour::White, 500, 11);
        let b = estimate(&deck, &Hand::new(), 3, Colour::White, 500, 11);
        assert_eq!(a, b);
        assert_eq!(a.finished + a.busted + a.exhausted, 500);
    }

    #[test]
    fn estimate_tracks_exact_single_draw() {
        let est = estimate(&Deck::standard(), &Hand::new(), 1, Colour::White, 20_000, 7);
        assert_eq!(est.busted, 0);
        assert!((est.mean - 1.175).abs() < 5.0 * est.std_error());
    }

    #[test]
    fn estimate_scores_with_the_requested_colour() {
        let deck = Deck::new([0, 4, 0, 0]);
        let est = estimate(&deck, &Hand::new(), 2, Colour::Yellow, 50, 2);
        assert_eq!(est.mean, 4.0);
        assert_eq!(est.variance, 0.0);
    }

    #[test]
    fn empty_estimate_has_no_spread() {
        let est = estimate(&Deck::standard(), &Hand::new(), 2, Colour::White, 0, 1);
        assert_eq!(est.trials, 0);
        assert_eq!(est.std_error(), 0.0);
        assert_eq!(est.finished_rate(), 0.0);
    }
}
