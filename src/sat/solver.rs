//! Solver gateway: hands a CNF to a SAT backend and returns its verdict
//!
//! The reductions only see the [`SolverGateway`] trait. The shipped backend
//! wraps CaDiCaL through the `cadical` crate; a fresh solver is built for
//! every call so no state leaks between invocations.

use super::constraints::{Clause, Cnf};
use crate::error::{PuzzleError, PuzzleResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// Answer class reported by a solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Satisfiable,
    Unsatisfiable,
    Unknown,
}

/// Raw solver answer: verdict plus signed literals (one per variable when satisfiable)
#[derive(Debug, Clone)]
pub struct SolverResponse {
    pub verdict: Verdict,
    pub literals: Vec<i32>,
    pub solve_time: Duration,
}

/// Truth values decoded from a solver's literal list.
///
/// Only positive literals make a variable true; a variable that is absent
/// or only appears negated is false.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    true_variables: BTreeSet<i32>,
}

impl Assignment {
    /// Build from a literal list, dropping trailing sentinel zeros
    pub fn from_literals(literals: &[i32]) -> Self {
        let end = literals.iter().rposition(|&l| l != 0).map_or(0, |p| p + 1);
        let true_variables = literals[..end].iter().copied().filter(|&l| l > 0).collect();
        Self { true_variables }
    }

    pub fn is_true(&self, variable: i32) -> bool {
        self.true_variables.contains(&variable)
    }

    /// True variables in increasing order
    pub fn true_variables(&self) -> impl Iterator<Item = i32> + '_ {
        self.true_variables.iter().copied()
    }

    /// Clause excluding this assignment restricted to `projection`
    pub fn blocking_clause(&self, projection: &[i32]) -> Clause {
        Clause::new(
            projection
                .iter()
                .map(|&v| if self.is_true(v) { -v } else { v })
                .collect(),
        )
    }
}

/// Per-call solver configuration
#[derive(Debug, Clone, Default)]
pub struct SolverOptions {
    /// Wall-clock budget for one `solve` call
    pub timeout: Option<Duration>,
}

impl SolverOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout: Some(timeout) }
    }
}

/// Anything that can decide a CNF instance
pub trait SolverGateway {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Decide `cnf`. Timeouts and backend faults are errors; `Unknown` is
    /// returned only when the backend itself gives up without a reason.
    fn solve(&mut self, cnf: &Cnf, options: &SolverOptions) -> PuzzleResult<SolverResponse>;

    /// Collect up to `limit` models that differ on `projection`
    fn enumerate(
        &mut self,
        cnf: &Cnf,
        options: &SolverOptions,
        limit: usize,
        projection: &[i32],
    ) -> PuzzleResult<Vec<Assignment>> {
        if projection.is_empty() {
            return Err(PuzzleError::internal("enumeration needs a non-empty projection"));
        }

        let mut working = cnf.clone();
        let mut models = Vec::new();
        while models.len() < limit {
            let response = self.solve(&working, options)?;
            match response.verdict {
                Verdict::Satisfiable => {
                    let model = Assignment::from_literals(&response.literals);
                    working.push(model.blocking_clause(projection));
                    models.push(model);
                }
                Verdict::Unsatisfiable => break,
                Verdict::Unknown => {
                    return Err(PuzzleError::solver_failure(
                        "solver returned UNKNOWN during enumeration",
                    ))
                }
            }
        }
        Ok(models)
    }
}

/// Termination callback enforcing the wall-clock budget
struct Deadline {
    started: Instant,
    limit: Option<Duration>,
    expired: bool,
}

impl Deadline {
    fn new(limit: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            limit,
            expired: false,
        }
    }
}

impl cadical::Callbacks for Deadline {
    fn started(&mut self) {
        self.started = Instant::now();
    }

    fn terminate(&mut self) -> bool {
        if let Some(limit) = self.limit {
            if self.started.elapsed() >= limit {
                self.expired = true;
            }
        }
        self.expired
    }
}

/// CaDiCaL-backed gateway
#[derive(Debug, Default)]
pub struct CadicalGateway;

impl CadicalGateway {
    pub fn new() -> Self {
        Self
    }
}

impl SolverGateway for CadicalGateway {
    fn name(&self) -> &str {
        "cadical"
    }

    fn solve(&mut self, cnf: &Cnf, options: &SolverOptions) -> PuzzleResult<SolverResponse> {
        cnf.validate()?;

        let mut solver: cadical::Solver<Deadline> = cadical::Solver::new();
        solver.set_callbacks(Some(Deadline::new(options.timeout)));
        for clause in cnf.clauses() {
            solver.add_clause(clause.literals.iter().copied());
        }

        tracing::debug!(
            variables = cnf.variable_count(),
            clauses = cnf.clause_count(),
            "starting cadical"
        );
        let start_time = Instant::now();
        let result = solver.solve();
        let solve_time = start_time.elapsed();

        let expired = solver.get_callbacks().map_or(false, |d| d.expired);
        let verdict = match result {
            Some(true) => Verdict::Satisfiable,
            Some(false) => Verdict::Unsatisfiable,
            None if expired => {
                let seconds = options.timeout.map_or(0, |t| t.as_secs());
                tracing::warn!(seconds, "cadical hit the time limit");
                return Err(PuzzleError::SolverTimeout { seconds });
            }
            None => Verdict::Unknown,
        };

        let literals = if verdict == Verdict::Satisfiable {
            let known = solver.max_variable();
            (1..=cnf.variable_count() as i32)
                .map(|var| {
                    if var <= known && solver.value(var) == Some(true) {
                        var
                    } else {
                        -var
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        tracing::debug!(?verdict, elapsed_ms = solve_time.as_millis() as u64, "cadical finished");
        Ok(SolverResponse {
            verdict,
            literals,
            solve_time,
        })
    }
}

/// Gateway returning canned answers, for exercising the decoders
#[cfg(test)]
pub(crate) struct ScriptedGateway {
    pub responses: std::collections::VecDeque<PuzzleResult<SolverResponse>>,
    pub seen: Vec<Cnf>,
}

#[cfg(test)]
impl ScriptedGateway {
    pub fn new(responses: Vec<PuzzleResult<SolverResponse>>) -> Self {
        Self {
            responses: responses.into(),
            seen: Vec::new(),
        }
    }

    pub fn answer(verdict: Verdict, literals: Vec<i32>) -> PuzzleResult<SolverResponse> {
        Ok(SolverResponse {
            verdict,
            literals,
            solve_time: Duration::ZERO,
        })
    }
}

#[cfg(test)]
impl SolverGateway for ScriptedGateway {
    fn name(&self) -> &str {
        "scripted"
    }

    fn solve(&mut self, cnf: &Cnf, _options: &SolverOptions) -> PuzzleResult<SolverResponse> {
        self.seen.push(cnf.clone());
        self.responses
            .pop_front()
            .unwrap_or_else(|| Err(PuzzleError::solver_failure("script exhausted")))
    }
}
