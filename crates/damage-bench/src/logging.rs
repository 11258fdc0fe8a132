use std::fs::{self, File};

use anyhow::{Context, Result};
use tracing::Level;
use tracing::span::EnteredSpan;
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{ResolvedOutputs, SweepConfig};

/// Keeps the telemetry writer flushing and the run span open until dropped.
pub struct LoggingGuard {
    _run_span: EnteredSpan,
    _writer: WorkerGuard,
    pub telemetry_path: std::path::PathBuf,
}

/// Send `tracing` events for this sweep to a JSON log beside the JSONL rows.
///
/// Every event is nested in a `sweep` span carrying the run id, seed and
/// scenario count, so rows and log lines from one run can be joined.
pub fn init_logging(config: &SweepConfig, outputs: &ResolvedOutputs) -> Result<Option<LoggingGuard>> {
    let logging = &config.logging;
    if !logging.enable_structured {
        return Ok(None);
    }

    let telemetry_path = outputs.telemetry_path();
    if let Some(dir) = telemetry_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
    {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating telemetry directory at {}", dir.display()))?;
    }
    let file = File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;
    let (writer, guard) = NonBlockingBuilder::default().lossy(false).finish(file);

    let level = logging.level().unwrap_or(Level::INFO);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_writer(writer)
        .finish();

    // Tests may have installed a global subscriber already.
    let _ = tracing::subscriber::set_global_default(subscriber);

    let run_span = tracing::info_span!(
        "sweep",
        run_id = %config.run_id,
        seed = config.run_seed(),
        scenarios = config.scenarios.len(),
    )
    .entered();
    tracing::info!(path = %telemetry_path.display(), "structured logging enabled");

    Ok(Some(LoggingGuard {
        _run_span: run_span,
        _writer: guard,
        telemetry_path,
    }))
}
