//! Configuration for the reduction and search front end

pub mod settings;

pub use settings::{
    CliOverrides, LoggingConfig, OutputConfig, OutputFormat, PlanningConfig, SearchConfig, Settings, SolverBackend,
    SolverConfig,
};
