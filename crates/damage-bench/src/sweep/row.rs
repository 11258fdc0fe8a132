use damage_core::engine::WalkStats;
use damage_core::{Colour, Deck, Exact, Hand};
use serde::Serialize;

use crate::config::{Arithmetic, ScenarioConfig};

/// One JSONL line: every requested variant of one (scenario, target) pair.
#[derive(Debug, Clone, Serialize)]
pub struct TargetRow {
    pub run_id: String,
    pub scenario: String,
    pub target: u32,
    pub deck: Deck,
    pub hand: Hand,
    pub colour: Colour,
    pub arithmetic: Arithmetic,
    pub exact: Option<Exact>,
    pub exact_f64: Option<f64>,
    pub approx: Option<f64>,
    pub single: Option<f32>,
    pub drift_approx: Option<f64>,
    pub drift_single: Option<f64>,
    pub terminal_mass: Option<f64>,
    pub terminal_mass_exact: Option<Exact>,
    pub leaked_mass_exact: Option<Exact>,
    pub stats: Option<WalkStats>,
    pub sampling: Option<SamplingRow>,
    pub elapsed_ms: f64,
}

impl TargetRow {
    pub(crate) fn new(run_id: &str, scenario: &ScenarioConfig, target: u32) -> Self {
        Self {
            run_id: run_id.to_string(),
            scenario: scenario.name.clone(),
            target,
            deck: scenario.deck,
            hand: scenario.hand,
            colour: scenario.colour,
            arithmetic: scenario.arithmetic,
            exact: None,
            exact_f64: None,
            approx: None,
            single: None,
            drift_approx: None,
            drift_single: None,
            terminal_mass: None,
            terminal_mass_exact: None,
            leaked_mass_exact: None,
            stats: None,
            sampling: None,
            elapsed_ms: 0.0,
        }
    }

    /// Most precise value available for reporting.
    pub fn best_value(&self) -> Option<f64> {
        self.exact_f64
            .or(self.approx)
            .or(self.single.map(f64::from))
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SamplingRow {
    pub trials: u64,
    pub seed: u64,
    pub mean: f64,
    pub std_error: f64,
    pub ci95: (f64, f64),
    pub finished_rate: f64,
    pub covers_reference: Option<bool>,
}
