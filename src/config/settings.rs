//! Settings file for the solver front end

use crate::sat::SolverOptions;
use crate::search::{Algorithm, Heuristic, SearchLimits};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub solver: SolverConfig,
    pub search: SearchConfig,
    pub planning: PlanningConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    /// Wall-clock budget per solver call, 0 disables it
    pub timeout_seconds: u64,
    /// Ask for a second Sudoku model to report whether the solution is unique
    pub check_uniqueness: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    Cadical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub algorithm: Algorithm,
    pub max_depth: Option<usize>,
    pub iddfs_ceiling: usize,
    pub heuristic: Heuristic,
}

/// Defaults for planning problems that leave out the horizon or the track length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningConfig {
    pub horizon: usize,
    pub track_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub output_directory: PathBuf,
    pub write_cnf: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Default for Settings {
    fn default() -> Self {
        Self {
            solver: SolverConfig {
                backend: SolverBackend::Cadical,
                timeout_seconds: 60,
                check_uniqueness: false,
            },
            search: SearchConfig {
                algorithm: Algorithm::Bfs,
                max_depth: None,
                iddfs_ceiling: 50,
                heuristic: Heuristic::Manhattan,
            },
            planning: PlanningConfig {
                horizon: 15,
                track_length: 11,
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                output_directory: PathBuf::from("output"),
                write_cnf: false,
            },
            logging: LoggingConfig {
                level: "warn".to_string(),
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content).with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.iddfs_ceiling == 0 {
            anyhow::bail!("IDDFS ceiling must be positive");
        }

        if self.planning.horizon == 0 {
            anyhow::bail!("Planning horizon must be positive");
        }

        if self.planning.track_length == 0 {
            anyhow::bail!("Track length must be positive");
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Unknown log level '{}', expected one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            );
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(timeout) = cli_overrides.timeout_seconds {
            self.solver.timeout_seconds = timeout;
        }
        if cli_overrides.check_uniqueness {
            self.solver.check_uniqueness = true;
        }
        if let Some(horizon) = cli_overrides.horizon {
            self.planning.horizon = horizon;
        }
        if let Some(algorithm) = cli_overrides.algorithm {
            self.search.algorithm = algorithm;
        }
        if let Some(heuristic) = cli_overrides.heuristic {
            self.search.heuristic = heuristic;
        }
        if let Some(max_depth) = cli_overrides.max_depth {
            self.search.max_depth = Some(max_depth);
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.output_directory = output_dir.clone();
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
        if cli_overrides.verbose {
            self.logging.level = "debug".to_string();
        }
    }

    pub fn solver_options(&self) -> SolverOptions {
        match self.solver.timeout_seconds {
            0 => SolverOptions::default(),
            seconds => SolverOptions::with_timeout(Duration::from_secs(seconds)),
        }
    }

    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            max_depth: self.search.max_depth,
            iddfs_ceiling: self.search.iddfs_ceiling,
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub timeout_seconds: Option<u64>,
    pub check_uniqueness: bool,
    pub horizon: Option<usize>,
    pub algorithm: Option<Algorithm>,
    pub heuristic: Option<Heuristic>,
    pub max_depth: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.planning.horizon, 15);
        assert_eq!(settings.planning.track_length, 11);
        assert_eq!(settings.solver_options().timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config").join("default.yaml");

        let mut settings = Settings::default();
        settings.search.algorithm = Algorithm::Astar;
        settings.search.heuristic = Heuristic::Euclidean;
        settings.output.format = OutputFormat::Json;
        settings.to_file(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("algorithm: astar"));
        assert!(content.contains("heuristic: euclidean"));
        assert_eq!(Settings::from_file(&path).unwrap(), settings);
    }

    #[test]
    fn test_validation_errors() {
        let mut settings = Settings::default();
        settings.planning.horizon = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.logging.level = "loud".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.search.iddfs_ceiling = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_invalid_file_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "solver: [1, 2]\n").unwrap();
        assert!(Settings::from_file(&path).is_err());
        assert!(Settings::from_file(&dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut settings = Settings::default();
        settings.merge_with_cli(&CliOverrides {
            timeout_seconds: Some(0),
            horizon: Some(10),
            algorithm: Some(Algorithm::Iddfs),
            max_depth: Some(7),
            verbose: true,
            ..Default::default()
        });

        assert_eq!(settings.solver_options().timeout, None);
        assert_eq!(settings.planning.horizon, 10);
        assert_eq!(settings.search.algorithm, Algorithm::Iddfs);
        assert_eq!(settings.search_limits().max_depth, Some(7));
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.output.output_directory, PathBuf::from("output"));
    }
}
