use std::path::PathBuf;

use clap::Parser;

use damage_bench::config::{ResolvedOutputs, SweepConfig};
use damage_bench::logging::init_logging;
use damage_bench::sweep::SweepRunner;

/// Expected-damage sweep harness.
#[derive(Debug, Parser)]
#[command(
    name = "damage-bench",
    author,
    version,
    about = "Exact expected-damage sweeps over draw targets"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/sweep.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the RNG seed used for Monte Carlo cross-checks.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Sample every scenario with this many simulated draws.
    #[arg(long, value_name = "TRIALS")]
    trials: Option<u64>,

    /// Run only the named scenario (repeatable).
    #[arg(long = "scenario", value_name = "NAME")]
    scenarios: Vec<String>,

    /// Exit after validating the configuration (no sweep is run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = SweepConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }

    if let Some(trials) = cli.trials {
        config.override_trials(trials);
    }

    config.retain_scenarios(&cli.scenarios)?;
    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let scenario_count = config.scenarios.len();
    let target_count: usize = config
        .scenarios
        .iter()
        .map(|scenario| scenario.targets.iter().count())
        .sum();

    println!(
        "Loaded configuration '{run_id}' with {scenario_count} scenario{} ({target_count} targets)",
        if scenario_count == 1 { "" } else { "s" }
    );

    if cli.validate_only {
        println!("Validation-only mode: sweep execution skipped.");
        return Ok(());
    }

    let _logging_guard = init_logging(&config, &outputs)?;
    let runner = SweepRunner::new(config, outputs)?;

    let summary = runner.run()?;
    println!(
        "Sweep complete for '{run_id}': {} scenarios → {} rows at {}",
        summary.scenarios,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(drift) = summary.max_abs_drift {
        println!("Largest f64 drift from exact: {drift:.3e}");
    }
    if let Some(plot_path) = summary.plot_path.as_ref() {
        println!("Expected damage plot: {}", plot_path.display());
    }
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
