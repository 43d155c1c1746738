//! Puzzle-to-SAT reductions
//!
//! Each reduction validates its input once at construction, then turns it
//! into a [`Cnf`] and reads a solver [`Assignment`] back into a domain
//! answer. [`solve_with`] glues the two halves to a [`SolverGateway`].

pub mod coloring;
pub mod planning;
pub mod sudoku;

pub use coloring::{Coloring, ColoringInput, GraphColoring};
pub use planning::{Plan, PlanStep, PlanningInput, PlanningReduction};
pub use sudoku::{SudokuGrid, SudokuReduction};

use crate::error::{PuzzleError, PuzzleResult};
use crate::sat::{Assignment, Cnf, SolverGateway, SolverOptions, Verdict};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// A puzzle expressed as a propositional formula
pub trait Reduction {
    /// Domain answer rebuilt from a model
    type Answer;

    /// Short name used in logs and DIMACS headers
    fn name(&self) -> &'static str;

    /// Build the formula. Calling this twice yields identical output.
    fn encode(&self) -> PuzzleResult<Cnf>;

    /// Rebuild the answer from a model of [`encode`](Self::encode)'s formula.
    /// A model that does not describe a complete answer is an
    /// `EncodingInternal` error.
    fn decode(&self, assignment: &Assignment) -> PuzzleResult<Self::Answer>;

    /// Problem-specific counters reported next to the variable and clause counts
    fn details(&self, answer: Option<&Self::Answer>) -> BTreeMap<String, usize>;
}

/// Size of an encoded instance plus problem-specific counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionStats {
    pub variables: usize,
    pub clauses: usize,
    #[serde(flatten)]
    pub details: BTreeMap<String, usize>,
}

impl std::fmt::Display for ReductionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} variables, {} clauses", self.variables, self.clauses)?;
        for (key, value) in &self.details {
            write!(f, ", {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Answer of one reduction run; unsatisfiable is a result, not an error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "answer", rename_all = "snake_case")]
pub enum ReductionOutcome<A> {
    Satisfiable(A),
    Unsatisfiable,
}

impl<A> ReductionOutcome<A> {
    pub fn is_satisfiable(&self) -> bool {
        matches!(self, ReductionOutcome::Satisfiable(_))
    }

    pub fn answer(&self) -> Option<&A> {
        match self {
            ReductionOutcome::Satisfiable(answer) => Some(answer),
            ReductionOutcome::Unsatisfiable => None,
        }
    }
}

/// Outcome, statistics and timing of a full encode, solve, decode cycle
#[derive(Debug, Clone)]
pub struct ReductionReport<A> {
    pub outcome: ReductionOutcome<A>,
    pub stats: ReductionStats,
    pub cnf: Cnf,
    pub solve_time: Duration,
}

/// Encode `reduction`, hand it to `gateway`, decode the model.
///
/// Solver errors are returned unchanged. An `Unknown` verdict becomes a
/// `SolverFailure` so it can never be mistaken for unsatisfiability.
pub fn solve_with<R, G>(
    reduction: &R,
    gateway: &mut G,
    options: &SolverOptions,
) -> PuzzleResult<ReductionReport<R::Answer>>
where
    R: Reduction + ?Sized,
    G: SolverGateway + ?Sized,
{
    let cnf = reduction.encode()?;
    tracing::debug!(
        reduction = reduction.name(),
        variables = cnf.variable_count(),
        clauses = cnf.clause_count(),
        "encoded instance"
    );

    let response = gateway.solve(&cnf, options)?;
    let outcome = match response.verdict {
        Verdict::Satisfiable => {
            let assignment = Assignment::from_literals(&response.literals);
            ReductionOutcome::Satisfiable(reduction.decode(&assignment)?)
        }
        Verdict::Unsatisfiable => ReductionOutcome::Unsatisfiable,
        Verdict::Unknown => {
            return Err(PuzzleError::solver_failure(format!(
                "{} returned UNKNOWN for {}",
                gateway.name(),
                reduction.name()
            )))
        }
    };

    tracing::info!(
        reduction = reduction.name(),
        satisfiable = outcome.is_satisfiable(),
        elapsed_ms = response.solve_time.as_millis() as u64,
        "reduction solved"
    );

    let stats = ReductionStats {
        variables: cnf.variable_count(),
        clauses: cnf.clause_count(),
        details: reduction.details(outcome.answer()),
    };
    Ok(ReductionReport {
        outcome,
        stats,
        cnf,
        solve_time: response.solve_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::solver::ScriptedGateway;

    fn triangle(colors: &[&str]) -> GraphColoring {
        let input = ColoringInput {
            vertices: vec!["A".into(), "B".into(), "C".into()],
            edges: vec![
                ("A".into(), "B".into()),
                ("B".into(), "C".into()),
                ("A".into(), "C".into()),
            ],
            colors: colors.iter().map(|c| c.to_string()).collect(),
        };
        GraphColoring::new(input).unwrap()
    }

    #[test]
    fn test_unknown_is_a_solver_failure() {
        let reduction = triangle(&["r", "v", "b"]);
        let mut gateway = ScriptedGateway::new(vec![ScriptedGateway::answer(Verdict::Unknown, vec![])]);

        let result = solve_with(&reduction, &mut gateway, &SolverOptions::default());
        assert!(matches!(result, Err(PuzzleError::SolverFailure { .. })));
    }

    #[test]
    fn test_timeout_propagates_verbatim() {
        let reduction = triangle(&["r", "v", "b"]);
        let mut gateway = ScriptedGateway::new(vec![Err(PuzzleError::SolverTimeout { seconds: 2 })]);

        let result = solve_with(&reduction, &mut gateway, &SolverOptions::default());
        assert_eq!(result.unwrap_err(), PuzzleError::SolverTimeout { seconds: 2 });
    }

    #[test]
    fn test_unsatisfiable_is_an_outcome() {
        let reduction = triangle(&["r", "v"]);
        let mut gateway = ScriptedGateway::new(vec![ScriptedGateway::answer(Verdict::Unsatisfiable, vec![])]);

        let report = solve_with(&reduction, &mut gateway, &SolverOptions::default()).unwrap();
        assert_eq!(report.outcome, ReductionOutcome::Unsatisfiable);
        assert_eq!(report.stats.variables, 6);
        assert_eq!(gateway.seen.len(), 1);
        assert_eq!(gateway.seen[0], report.cnf);
    }

    #[test]
    fn test_partial_model_is_internal_error() {
        let reduction = triangle(&["r", "v", "b"]);
        // Only A is colored
        let mut gateway = ScriptedGateway::new(vec![ScriptedGateway::answer(
            Verdict::Satisfiable,
            vec![1, -2, -3, -4, -5, -6, -7, -8, -9, 0],
        )]);

        let result = solve_with(&reduction, &mut gateway, &SolverOptions::default());
        assert!(matches!(result, Err(PuzzleError::EncodingInternal { .. })));
    }

    #[test]
    fn test_stats_display() {
        let mut details = BTreeMap::new();
        details.insert("nb_colors".to_string(), 3);
        let stats = ReductionStats {
            variables: 12,
            clauses: 31,
            details,
        };
        assert_eq!(stats.to_string(), "12 variables, 31 clauses, nb_colors=3");
    }
}
