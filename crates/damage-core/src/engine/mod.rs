//! Exact expectation of deck damage.
//!
//! The walk enumerates every distinguishable draw sequence:
//! - a hand whose counted draws equal the target is terminal and pays out;
//! - otherwise each kind still in the deck is drawn in canonical order,
//!   weighted by `remaining / deck total`;
//! - draws failing [`rules::continues`] are dropped without contribution.
//!
//! Deck and hand are passed as value snapshots, so no branch ever has to
//! restore shared state for its siblings.

pub mod payoff;
pub mod rules;

use serde::Serialize;
use tracing::{Level, event};

use crate::model::colour::Colour;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::kind::CardKind;
use crate::value::{Exact, Weight};

pub use payoff::{ColourDamage, Payoff, ReachMass, Traced, WalkStats, WhiteDamage, WithMass};

/// Expected damage of finishing `hand` from `deck`, scaled by `path`.
pub fn expected_damage<W: Weight>(deck: &Deck, hand: &Hand, target: u32, path: W) -> W {
    walk(*deck, *hand, target, &path, &mut WhiteDamage, 0)
}

/// Same walk as [`expected_damage`], scored with `colour`'s damage table.
pub fn expected_colour_damage<W: Weight>(
    deck: &Deck,
    hand: &Hand,
    target: u32,
    colour: Colour,
    path: W,
) -> W {
    walk(*deck, *hand, target, &path, &mut ColourDamage(colour), 0)
}

pub fn expected_damage_exact(deck: &Deck, hand: &Hand, target: u32, path: &Exact) -> Exact {
    walk(*deck, *hand, target, path, &mut WhiteDamage, 0)
}

pub fn expected_damage_approx(deck: &Deck, hand: &Hand, target: u32, path: f64) -> f64 {
    walk(*deck, *hand, target, &path, &mut WhiteDamage, 0)
}

/// Probability that the draw reaches a terminal hand at all.
pub fn terminal_mass<W: Weight>(deck: &Deck, hand: &Hand, target: u32) -> W {
    walk(*deck, *hand, target, &W::one(), &mut ReachMass, 0)
}

/// Runs `payoff` over the whole draw tree starting with probability one.
pub fn walk_with<W: Weight, P: Payoff<W>>(
    deck: &Deck,
    hand: &Hand,
    target: u32,
    payoff: &mut P,
) -> W {
    walk(*deck, *hand, target, &W::one(), payoff, 0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation<W> {
    pub colour: Colour,
    pub expected: W,
    pub terminal_mass: W,
    pub stats: WalkStats,
}

impl<W: Weight> Evaluation<W> {
    /// Mass lost to discarded draws and decks that ran dry.
    pub fn leaked_mass(&self) -> W {
        self.terminal_mass.complement()
    }
}

/// Expected white damage, terminal mass and walk shape for one scenario.
pub fn evaluate<W: Weight>(deck: &Deck, hand: &Hand, target: u32) -> Evaluation<W> {
    evaluate_colour(deck, hand, target, Colour::White)
}

/// One instrumented walk scored with `colour`'s damage table.
pub fn evaluate_colour<W: Weight>(
    deck: &Deck,
    hand: &Hand,
    target: u32,
    colour: Colour,
) -> Evaluation<W> {
    if tracing::enabled!(Level::DEBUG) {
        event!(
            Level::DEBUG,
            deck = %deck,
            hand = ?hand.counts(),
            draws = target,
            colour = %colour,
            "evaluating draw tree"
        );
    }

    let mut traced = Traced::new(WithMass::<W, _>::new(ColourDamage(colour)));
    let expected: W = walk_with(deck, hand, target, &mut traced);
    let terminal_mass = traced.inner().mass().clone();
    let stats = traced.stats();

    event!(
        Level::DEBUG,
        draws = target,
        nodes = stats.nodes,
        terminals = stats.terminals,
        discarded = stats.discarded,
        max_depth = stats.max_depth,
        "draw tree evaluated"
    );

    Evaluation {
        colour,
        expected,
        terminal_mass,
        stats,
    }
}

fn walk<W: Weight, P: Payoff<W>>(
    deck: Deck,
    hand: Hand,
    target: u32,
    path: &W,
    payoff: &mut P,
    depth: u32,
) -> W {
    payoff.visit(depth);
    if rules::is_terminal(&hand, target) {
        return payoff.terminal(&hand, path);
    }

    let mut total = W::zero();
    for kind in CardKind::ALL {
        let Some(next_deck) = deck.without(kind) else {
            continue;
        };
        let (numer, denom) = deck.draw_odds(kind);
        let next_hand = hand.with(kind);
        if !rules::continues(&next_hand, target) {
            payoff.discarded(&next_hand, path);
            continue;
        }
        let branch = path.mul(&W::from_ratio(numer, denom));
        total.accumulate(walk(next_deck, next_hand, target, &branch, payoff, depth + 1));
    }
    total
}
