use serde::Serialize;

use crate::model::colour::Colour;
use crate::model::hand::Hand;
use crate::value::Weight;

/// What the walk collects at each finished hand.
pub trait Payoff<W: Weight> {
    /// Contribution of a terminal branch reached with probability `path`.
    fn terminal(&mut self, hand: &Hand, path: &W) -> W;

    /// Called for a draw the continuation guard throws away. `path` is the
    /// probability of the node the draw was attempted from.
    fn discarded(&mut self, _hand: &Hand, _path: &W) {}

    fn visit(&mut self, _depth: u32) {}
}

/// Damage of the finished hand weighted by its path probability.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhiteDamage;

impl<W: Weight> Payoff<W> for WhiteDamage {
    fn terminal(&mut self, hand: &Hand, path: &W) -> W {
        W::from_damage(hand.white_damage()).mul(path)
    }
}

/// Damage of the finished hand under another deck colour's table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColourDamage(pub Colour);

impl<W: Weight> Payoff<W> for ColourDamage {
    fn terminal(&mut self, hand: &Hand, path: &W) -> W {
        W::from_damage(hand.damage(self.0)).mul(path)
    }
}

/// Probability of reaching each terminal branch.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReachMass;

impl<W: Weight> Payoff<W> for ReachMass {
    fn terminal(&mut self, _hand: &Hand, path: &W) -> W {
        path.clone()
    }
}

/// Sums the probability of every terminal branch while `inner` pays out,
/// so one walk yields both the expectation and the terminal mass.
#[derive(Debug)]
pub struct WithMass<W, P> {
    inner: P,
    mass: W,
}

impl<W: Weight, P> WithMass<W, P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            mass: W::zero(),
        }
    }

    pub fn mass(&self) -> &W {
        &self.mass
    }
}

impl<W: Weight, P: Payoff<W>> Payoff<W> for WithMass<W, P> {
    fn terminal(&mut self, hand: &Hand, path: &W) -> W {
        self.mass.accumulate(path.clone());
        self.inner.terminal(hand, path)
    }

    fn discarded(&mut self, hand: &Hand, path: &W) {
        self.inner.discarded(hand, path);
    }

    fn visit(&mut self, depth: u32) {
        self.inner.visit(depth);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WalkStats {
    pub nodes: u64,
    pub terminals: u64,
    pub discarded: u64,
    pub max_depth: u32,
}

/// Counts the shape of the walk while delegating contributions.
#[derive(Debug, Default)]
pub struct Traced<P> {
    inner: P,
    stats: WalkStats,
}

impl<P> Traced<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            stats: WalkStats::default(),
        }
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<W: Weight, P: Payoff<W>> Payoff<W> for Traced<P> {
    fn terminal(&mut self, hand: &Hand, path: &W) -> W {
        self.stats.terminals += 1;
        self.inner.terminal(hand, path)
    }

    fn discarded(&mut self, hand: &Hand, path: &W) {
        self.stats.discarded += 1;
        self.inner.discarded(hand, path);
    }

    fn visit(&mut self, depth: u32) {
        self.stats.nodes += 1;
        self.stats.max_depth = self.stats.max_depth.max(depth);
        self.inner.visit(depth);
    }
}
