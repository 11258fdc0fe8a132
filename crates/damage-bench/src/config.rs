use damage_core::{Colour, Deck, Hand};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_RUN_SEED: u64 = 20_240_129;
const NAME_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root sweep configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SweepConfig {
    pub run_id: String,
    #[serde(default)]
    pub seed: Option<u64>,
    pub scenarios: Vec<ScenarioConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SweepConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: SweepConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_name("run_id", &self.run_id)?;
        validate_scenarios(&self.scenarios)?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        Ok(())
    }

    pub fn run_seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_RUN_SEED)
    }

    /// Keep only the named scenarios, in their configured order.
    pub fn retain_scenarios(&mut self, names: &[String]) -> Result<(), ValidationError> {
        if names.is_empty() {
            return Ok(());
        }
        if let Some(missing) = names
            .iter()
            .find(|name| !self.scenarios.iter().any(|s| &s.name == *name))
        {
            return Err(ValidationError::InvalidField {
                field: "scenarios".to_string(),
                message: format!("scenario '{missing}' is not defined"),
            });
        }
        self.scenarios.retain(|s| names.contains(&s.name));
        Ok(())
    }

    /// Force every scenario to sample with `trials` play-outs.
    pub fn override_trials(&mut self, trials: u64) {
        for scenario in &mut self.scenarios {
            scenario.sampling = Some(SamplingConfig { trials });
        }
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
            plots_dir: resolve_template(&self.run_id, &self.outputs.plots_dir),
        }
    }
}

/// One deck/hand configuration swept over a range of targets.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScenarioConfig {
    pub name: String,
    pub deck: Deck,
    #[serde(default)]
    pub hand: Hand,
    pub targets: TargetRange,
    #[serde(default)]
    pub colour: Colour,
    #[serde(default)]
    pub arithmetic: Arithmetic,
    #[serde(default)]
    pub sampling: Option<SamplingConfig>,
}

impl ScenarioConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&format!("scenarios[{}].name", self.name), &self.name)?;

        if self.targets.from > self.targets.to {
            return Err(ValidationError::InvalidField {
                field: format!("scenarios[{}].targets", self.name),
                message: format!(
                    "range start {} is greater than end {}",
                    self.targets.from, self.targets.to
                ),
            });
        }

        if self.targets.from < self.hand.counted_size() {
            return Err(ValidationError::InvalidField {
                field: format!("scenarios[{}].targets", self.name),
                message: "targets must not be below the hand's counted draws".to_string(),
            });
        }

        if let Some(sampling) = &self.sampling {
            if sampling.trials == 0 {
                return Err(ValidationError::InvalidField {
                    field: format!("scenarios[{}].sampling.trials", self.name),
                    message: "trials must be greater than zero".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Inclusive range of target draw counts.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct TargetRange {
    pub from: u32,
    pub to: u32,
}

impl TargetRange {
    pub fn iter(&self) -> impl Iterator<Item = u32> {
        self.from..=self.to
    }
}

/// Which numeric variants of the engine a scenario runs.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Arithmetic {
    #[default]
    Exact,
    Approx,
    Single,
    All,
}

impl Arithmetic {
    pub fn runs_exact(self) -> bool {
        matches!(self, Arithmetic::Exact | Arithmetic::All)
    }

    pub fn runs_approx(self) -> bool {
        matches!(self, Arithmetic::Approx | Arithmetic::All)
    }

    pub fn runs_single(self) -> bool {
        matches!(self, Arithmetic::Single | Arithmetic::All)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct SamplingConfig {
    pub trials: u64,
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
    pub plots_dir: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
            ("outputs.plots_dir", &self.plots_dir),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_name(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: field.to_string(),
            message: "name must not be empty".to_string(),
        });
    }

    if !value.chars().all(|c| NAME_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: field.to_string(),
            message: "name may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn validate_scenarios(scenarios: &[ScenarioConfig]) -> Result<(), ValidationError> {
    if scenarios.is_empty() {
        return Err(ValidationError::InvalidField {
            field: "scenarios".to_string(),
            message: "at least one scenario must be specified".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for scenario in scenarios {
        scenario.validate()?;
        if !seen.insert(scenario.name.as_str()) {
            return Err(ValidationError::InvalidField {
                field: "scenarios".to_string(),
                message: format!("scenario name '{}' defined more than once", scenario.name),
            });
        }
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
    pub plots_dir: PathBuf,
}

impl ResolvedOutputs {
    /// Structured log file, kept beside the JSONL rows it annotates.
    pub fn telemetry_path(&self) -> PathBuf {
        self.jsonl
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
            .join("telemetry.jsonl")
    }
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
