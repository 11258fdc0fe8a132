mod row;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use damage_core::engine::{evaluate_colour, expected_colour_damage};
use damage_core::sample::estimate;
use damage_core::{Exact, Weight};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{ResolvedOutputs, ScenarioConfig, SweepConfig};
use crate::report::{ReportCollector, ReportError, confidence_interval};

pub use row::{SamplingRow, TargetRow};

/// Primary entry point for running configured sweeps.
pub struct SweepRunner {
    config: SweepConfig,
    outputs: ResolvedOutputs,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub scenarios: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub plot_path: Option<PathBuf>,
    pub telemetry_path: Option<PathBuf>,
    pub max_abs_drift: Option<f64>,
}

impl SweepRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: SweepConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        if config.scenarios.is_empty() {
            return Err(RunnerError::NoScenarios);
        }

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
        })
    }

    /// Evaluate every scenario, streaming one JSONL row per target to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;
        if !self.outputs.plots_dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.outputs.plots_dir)?;
        }

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.run_seed());
        let mut rows_written = 0usize;
        let mut report = ReportCollector::new(&self.config.run_id);

        for scenario in &self.config.scenarios {
            let scenario_seed = rng.next_u64();
            report.begin_scenario(scenario);

            for target in scenario.targets.iter() {
                let row = evaluate_target(
                    &self.config.run_id,
                    scenario,
                    target,
                    scenario_seed.wrapping_add(u64::from(target)),
                );
                serde_json::to_writer(&mut writer, &row)?;
                writer.write_all(b"\n")?;
                report.record(&row);
                rows_written += 1;
            }
        }

        writer.flush()?;

        let summary = report.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;
        let plot_path = match summary.render_plot(&self.outputs.plots_dir) {
            Ok(path) => Some(path),
            Err(err) => {
                event!(Level::WARN, error = %err, "plot rendering skipped");
                eprintln!("WARN: {}", err);
                None
            }
        };

        let telemetry_path = self
            .logging_enabled
            .then(|| self.outputs.telemetry_path());

        Ok(RunSummary {
            scenarios: self.config.scenarios.len(),
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            plot_path,
            telemetry_path,
            max_abs_drift: summary.max_abs_drift(),
        })
    }
}

/// Run the configured numeric variants for one target.
pub fn evaluate_target(run_id: &str, scenario: &ScenarioConfig, target: u32, seed: u64) -> TargetRow {
    let started = Instant::now();
    let deck = &scenario.deck;
    let hand = &scenario.hand;
    let colour = scenario.colour;
    let mut row = TargetRow::new(run_id, scenario, target);

    if scenario.arithmetic.runs_exact() {
        let eval = evaluate_colour::<Exact>(deck, hand, target, colour);
        row.exact_f64 = Some(eval.expected.to_f64());
        row.terminal_mass = Some(eval.terminal_mass.to_f64());
        row.leaked_mass_exact = Some(eval.leaked_mass());
        row.terminal_mass_exact = Some(eval.terminal_mass);
        row.stats = Some(eval.stats);
        row.exact = Some(eval.expected);
    }

    if scenario.arithmetic.runs_approx() {
        if row.stats.is_some() {
            row.approx = Some(expected_colour_damage::<f64>(deck, hand, target, colour, 1.0));
        } else {
            let eval = evaluate_colour::<f64>(deck, hand, target, colour);
            row.terminal_mass = Some(eval.terminal_mass);
            row.stats = Some(eval.stats);
            row.approx = Some(eval.expected);
        }
    }

    if scenario.arithmetic.runs_single() {
        row.single = Some(expected_colour_damage::<f32>(deck, hand, target, colour, 1.0));
    }

    if let Some(exact) = row.exact_f64 {
        row.drift_approx = row.approx.map(|approx| approx - exact);
        row.drift_single = row.single.map(|single| f64::from(single) - exact);
    }

    if let Some(sampling) = scenario.sampling {
        let est = estimate(deck, hand, target, colour, sampling.trials, seed);
        let ci95 = confidence_interval(est.mean, est.std_error());
        let reference = row.exact_f64.or(row.approx);
        row.sampling = Some(SamplingRow {
            trials: est.trials,
            seed,
            mean: est.mean,
            std_error: est.std_error(),
            ci95,
            finished_rate: est.finished_rate(),
            covers_reference: reference.map(|value| ci95.0 <= value && value <= ci95.1),
        });
    }

    row.elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;

    let exact_label = row.exact.as_ref().map(ToString::to_string);
    event!(
        Level::INFO,
        scenario = %scenario.name,
        draws = target,
        colour = %colour,
        exact = exact_label.as_deref(),
        approx = row.approx,
        elapsed_ms = row.elapsed_ms,
        "target evaluated"
    );

    row
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("configuration defines no scenarios")]
    NoScenarios,
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("report error: {0}")]
    Report(#[from] ReportError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Arithmetic, SamplingConfig, TargetRange};
    use damage_core::{Colour, Deck, Hand};

    fn scenario(arithmetic: Arithmetic) -> ScenarioConfig {
        ScenarioConfig {
            name: "standard".to_string(),
            deck: Deck::standard(),
            hand: Hand::new(),
            targets: TargetRange { from: 0, to: 2 },
            colour: Colour::White,
            arithmetic,
            sampling: None,
        }
    }

    #[test]
    fn exact_row_carries_rational_and_mass() {
        let row = evaluate_target("t", &scenario(Arithmetic::Exact), 2, 1);
        assert_eq!(row.exact.as_ref().map(ToString::to_string).as_deref(), Some("47/20"));
        assert_eq!(
            row.terminal_mass_exact.as_ref().map(ToString::to_string).as_deref(),
            Some("46/51")
        );
        assert_eq!(
            row.leaked_mass_exact.as_ref().map(ToString::to_string).as_deref(),
            Some("5/51")
        );
        assert!(row.approx.is_none());
        assert!(row.single.is_none());
    }

    #[test]
    fn approx_only_row_still_reports_walk_shape() {
        let row = evaluate_target("t", &scenario(Arithmetic::Approx), 1, 1);
        assert!(row.exact.is_none());
        assert!(row.stats.is_some());
        assert!((row.approx.unwrap_or_default() - 1.175).abs() < 1e-12);
        assert!(row.drift_approx.is_none());
    }

    #[test]
    fn all_variants_report_drift() {
        let row = evaluate_target("t", &scenario(Arithmetic::All), 2, 1);
        assert!(row.drift_approx.is_some_and(|d| d.abs() < 1e-12));
        assert!(row.drift_single.is_some_and(|d| d.abs() < 1e-5));
    }

    #[test]
    fn coloured_row_uses_the_colour_table() {
        let mut config = scenario(Arithmetic::All);
        config.colour = Colour::Yellow;
        let row = evaluate_target("t", &config, 1, 1);
        assert_eq!(row.colour, Colour::Yellow);
        assert_eq!(row.exact.as_ref().map(ToString::to_string).as_deref(), Some("157/80"));
        assert!(row.drift_approx.is_some_and(|d| d.abs() < 1e-12));
    }

    #[test]
    fn empty_deck_leaks_everything() {
        let mut config = scenario(Arithmetic::Exact);
        config.deck = Deck::new([0, 0, 0, 0]);
        let row = evaluate_target("t", &config, 1, 1);
        assert_eq!(row.exact.as_ref().map(ToString::to_string).as_deref(), Some("0"));
        assert_eq!(
            row.leaked_mass_exact.as_ref().map(ToString::to_string).as_deref(),
            Some("1")
        );
        assert_eq!(row.terminal_mass, Some(0.0));
    }

    #[test]
    fn sampling_row_is_seeded() {
        let mut config = scenario(Arithmetic::Exact);
        config.sampling = Some(SamplingConfig { trials: 2_000 });
        let a = evaluate_target("t", &config, 1, 5);
        let b = evaluate_target("t", &config, 1, 5);
        let (a, b) = (a.sampling.expect("sampled"), b.sampling.expect("sampled"));
        assert_eq!(a.mean, b.mean);
        assert_eq!(a.seed, 5);
        assert!(a.ci95.0 <= a.mean && a.mean <= a.ci95.1);
        assert_eq!(a.finished_rate, 1.0);
    }
}
