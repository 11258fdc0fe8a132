use std::fs;
use std::path::{Path, PathBuf};

use damage_core::{Colour, Deck, Hand};
use plotters::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::{Arithmetic, ScenarioConfig};
use crate::sweep::TargetRow;

const CONFIDENCE_LEVEL: f64 = 0.95;
const FALLBACK_Z: f64 = 1.96;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render plot: {0}")]
    Plot(String),
    #[error("no evaluated targets to plot")]
    Empty,
}

/// Two-sided normal interval around a sample mean.
pub fn confidence_interval(mean: f64, std_error: f64) -> (f64, f64) {
    let z = Normal::new(0.0, 1.0)
        .map(|normal| normal.inverse_cdf(0.5 + CONFIDENCE_LEVEL / 2.0))
        .unwrap_or(FALLBACK_Z);
    let margin = z * std_error;
    (mean - margin, mean + margin)
}

pub struct ReportCollector {
    run_id: String,
    scenarios: Vec<ScenarioReport>,
}

impl ReportCollector {
    pub fn new(run_id: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            scenarios: Vec::new(),
        }
    }

    pub fn begin_scenario(&mut self, scenario: &ScenarioConfig) {
        self.scenarios.push(ScenarioReport {
            name: scenario.name.clone(),
            deck: scenario.deck,
            hand: scenario.hand,
            colour: scenario.colour,
            arithmetic: scenario.arithmetic,
            points: Vec::new(),
        });
    }

    pub fn record(&mut self, row: &TargetRow) {
        let point = PointReport {
            target: row.target,
            exact: row.exact.as_ref().map(ToString::to_string),
            value: row.best_value(),
            terminal_mass: row.terminal_mass,
            drift: row.drift_approx,
            sample_mean: row.sampling.map(|s| s.mean),
            covers_reference: row.sampling.and_then(|s| s.covers_reference),
            elapsed_ms: row.elapsed_ms,
        };
        match self.scenarios.last_mut() {
            Some(report) if report.name == row.scenario => report.points.push(point),
            _ => self.scenarios.push(ScenarioReport {
                name: row.scenario.clone(),
                deck: row.deck,
                hand: row.hand,
                colour: row.colour,
                arithmetic: row.arithmetic,
                points: vec![point],
            }),
        }
    }

    pub fn finalize(self) -> SweepSummary {
        SweepSummary {
            run_id: self.run_id,
            scenarios: self.scenarios,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub deck: Deck,
    pub hand: Hand,
    pub colour: Colour,
    pub arithmetic: Arithmetic,
    pub points: Vec<PointReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PointReport {
    pub target: u32,
    pub exact: Option<String>,
    pub value: Option<f64>,
    pub terminal_mass: Option<f64>,
    pub drift: Option<f64>,
    pub sample_mean: Option<f64>,
    pub covers_reference: Option<bool>,
    pub elapsed_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct SweepSummary {
    pub run_id: String,
    pub scenarios: Vec<ScenarioReport>,
}

impl SweepSummary {
    /// Largest |f64 - exact| seen across the run, if both were computed anywhere.
    pub fn max_abs_drift(&self) -> Option<f64> {
        self.scenarios
            .iter()
            .flat_map(|scenario| scenario.points.iter())
            .filter_map(|point| point.drift)
            .map(f64::abs)
            .reduce(f64::max)
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let mut rows = String::new();
        rows.push_str(&format!("# Damage Sweep Summary ({})\n\n", self.run_id));
        if let Some(drift) = self.max_abs_drift() {
            rows.push_str(&format!("Largest f64 drift from exact: {drift:.3e}\n\n"));
        }

        for scenario in &self.scenarios {
            rows.push_str(&format!(
                "## {name}\n\nDeck {deck}, starting hand {hand:?}, arithmetic {arithmetic:?}\n\n",
                name = scenario.name,
                deck = scenario.deck,
                hand = scenario.hand.counts(),
                arithmetic = scenario.arithmetic,
            ));
            rows.push_str("| Target | Colour | Exact | Value | Terminal mass | f64 drift | Sample mean | CI covers | ms |\n");
            rows.push_str("|--------|--------|-------|-------|---------------|-----------|-------------|-----------|----|\n");

            for point in &scenario.points {
                rows.push_str(&format!(
                    "| {target} | {colour} | {exact} | {value} | {mass} | {drift} | {sample} | {covers} | {ms:.1} |\n",
                    target = point.target,
                    colour = scenario.colour,
                    exact = point.exact.as_deref().unwrap_or("-"),
                    value = fmt_opt(point.value, 6),
                    mass = fmt_opt(point.terminal_mass, 6),
                    drift = point
                        .drift
                        .map(|d| format!("{d:+.2e}"))
                        .unwrap_or_else(|| "-".to_string()),
                    sample = fmt_opt(point.sample_mean, 4),
                    covers = match point.covers_reference {
                        Some(true) => "Yes",
                        Some(false) => "No",
                        None => "-",
                    },
                    ms = point.elapsed_ms,
                ));
            }
            rows.push('\n');
        }

        fs::write(path.as_ref(), rows).map_err(|e| ReportError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }

    /// Line chart of expected damage against target, one series per scenario.
    pub fn render_plot(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ReportError> {
        let dir = dir.as_ref();
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| ReportError::Io {
                context: "creating plots directory",
                source: e,
            })?;
        }

        let series: Vec<(String, Vec<(u32, f64)>)> = self
            .scenarios
            .iter()
            .map(|scenario| {
                let points = scenario
                    .points
                    .iter()
                    .filter_map(|point| point.value.map(|value| (point.target, value)))
                    .collect();
                (scenario.name.clone(), points)
            })
            .collect();

        let max_target = series
            .iter()
            .flat_map(|(_, points)| points.iter().map(|(target, _)| *target))
            .max()
            .ok_or(ReportError::Empty)?;
        let max_value = series
            .iter()
            .flat_map(|(_, points)| points.iter().map(|(_, value)| *value))
            .fold(0.0f64, f64::max);

        let plot_path = dir.join("expected_damage.png");

        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        let plot_attempt = std::panic::catch_unwind(move || {
            let root = BitMapBackend::new(&plot_path, (800, 480)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| ReportError::Plot(e.to_string()))?;

            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .caption("Expected damage by target draws", ("sans-serif", 22))
                .set_label_area_size(LabelAreaPosition::Left, 50)
                .set_label_area_size(LabelAreaPosition::Bottom, 40)
                .build_cartesian_2d(0u32..max_target.max(1), 0.0..(max_value * 1.1).max(1.0))
                .map_err(|e| ReportError::Plot(e.to_string()))?;

            chart
                .configure_mesh()
                .y_desc("Expected damage")
                .x_desc("Target draws")
                .draw()
                .map_err(|e| ReportError::Plot(e.to_string()))?;

            for (idx, (_, points)) in series.iter().enumerate() {
                let color = Palette99::pick(idx);
                chart
                    .draw_series(LineSeries::new(points.iter().copied(), &color))
                    .map_err(|e| ReportError::Plot(e.to_string()))?;
            }

            drop(chart);

            root.present()
                .map_err(|e| ReportError::Plot(e.to_string()))?;

            drop(root);

            Ok(plot_path)
        });

        std::panic::set_hook(prev_hook);

        match plot_attempt {
            Ok(result) => result,
            Err(_) => Err(ReportError::Plot(
                "plotters panicked while rendering (missing font support?)".into(),
            )),
        }
    }
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:.precision$}"))
        .unwrap_or_else(|| "-".to_string())
}
