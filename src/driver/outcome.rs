//! Serializable results of a driver run

use super::validator::ValidationResult;
use crate::error::PuzzleError;
use crate::reduction::{Coloring, Plan, ReductionStats, SudokuGrid};
use crate::sat::Cnf;
use crate::search::{Algorithm, Heuristic, SearchStats};
use serde::Serialize;

/// Decoded answer of a satisfiable reduction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Answer {
    GraphColoring(Coloring),
    Sudoku {
        grid: SudokuGrid,
        /// Present when uniqueness was checked
        #[serde(skip_serializing_if = "Option::is_none")]
        unique: Option<bool>,
    },
    Planning(Plan),
}

/// Result of encoding a puzzle and handing it to the solver
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveOutcome {
    pub problem: &'static str,
    pub solver: String,
    pub satisfiable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,
    pub stats: ReductionStats,
    pub solve_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
    /// Formula handed to the solver, kept for `--output` runs
    #[serde(skip)]
    pub cnf: Option<Cnf>,
}

/// Result of one search algorithm on a puzzle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchReport {
    pub problem: &'static str,
    pub algorithm: Algorithm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heuristic: Option<Heuristic>,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    /// Action names in order
    pub actions: Vec<String>,
    /// Text picture of the solved instance: maze with the path drawn, or
    /// the final corridor / board
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// 8-puzzle permutation parity agrees with the goal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solvable: Option<bool>,
    pub stats: SearchStats,
    pub elapsed_ms: u64,
}

/// Error as reported to the user: the stable kind plus the message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
}

impl From<&PuzzleError> for ErrorReport {
    fn from(error: &PuzzleError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Anything a run can end with
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Solved(SolveOutcome),
    Searched { reports: Vec<SearchReport> },
    Failed(ErrorReport),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl From<PuzzleError> for Outcome {
    fn from(error: PuzzleError) -> Self {
        Outcome::Failed(ErrorReport::from(&error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_error_outcome_json() {
        let outcome = Outcome::from(PuzzleError::SolverTimeout { seconds: 5 });
        assert!(outcome.is_failure());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "solver_timeout");
        assert_eq!(json["message"], "solver timed out after 5s");
    }

    #[test]
    fn test_solved_outcome_json() {
        let outcome = Outcome::Solved(SolveOutcome {
            problem: "graph_coloring",
            solver: "cadical".into(),
            satisfiable: false,
            answer: None,
            stats: ReductionStats {
                variables: 6,
                clauses: 15,
                details: BTreeMap::from([("nb_colors".to_string(), 2)]),
            },
            solve_time_ms: 0,
            validation: None,
            cnf: None,
        });
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "solved");
        assert_eq!(json["satisfiable"], false);
        assert_eq!(json["stats"]["nb_colors"], 2);
        assert!(json.get("answer").is_none());
    }
}
