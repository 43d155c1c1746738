//! Console and file output helpers

pub mod display;

pub use display::{save_outcome, Color, ColorOutput, OutcomeFormatter};
