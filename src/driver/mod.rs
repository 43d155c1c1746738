//! Boundary between problem files and the core.
//!
//! A [`Problem`] is matched once here and routed either to a reduction and
//! the solver gateway or to the search engine.

pub mod outcome;
pub mod problem;
pub mod validator;

pub use outcome::{Answer, ErrorReport, Outcome, SearchReport, SolveOutcome};
pub use problem::{Problem, ProblemFamily};
pub use validator::{replay_plan, validate_coloring, validate_sudoku, ValidationResult};

use crate::config::{Settings, SolverBackend, SolverConfig};
use crate::error::{PuzzleError, PuzzleResult};
use crate::reduction::{solve_with, Reduction, ReductionOutcome, ReductionReport};
use crate::sat::{CadicalGateway, Cnf, SolverGateway};
use crate::search::{search, Algorithm, Heuristic, SearchResult};
use rayon::prelude::*;
use std::fmt;
use std::time::Instant;

/// Build the solver gateway named in the settings
pub fn create_gateway(config: &SolverConfig) -> Box<dyn SolverGateway> {
    match config.backend {
        SolverBackend::Cadical => Box::new(CadicalGateway::new()),
    }
}

/// Route `problem` to whichever front end accepts it, reporting errors as outcomes
pub fn run<G: SolverGateway + ?Sized>(problem: &Problem, settings: &Settings, gateway: &mut G) -> Outcome {
    let result = match problem.family() {
        ProblemFamily::Reduction => solve(problem, settings, gateway).map(Outcome::Solved),
        ProblemFamily::Search => {
            search_problem(problem, settings, settings.search.algorithm).map(|report| Outcome::Searched {
                reports: vec![report],
            })
        }
    };
    result.unwrap_or_else(|e| {
        if e.is_user_error() {
            tracing::info!(kind = e.kind(), error = %e, problem = problem.kind(), "input rejected");
        } else {
            tracing::warn!(kind = e.kind(), error = %e, problem = problem.kind(), "run failed");
        }
        Outcome::from(e)
    })
}

/// DIMACS text of a reduction problem
pub fn encode(problem: &Problem, settings: &Settings) -> PuzzleResult<Cnf> {
    match problem {
        Problem::GraphColoring(input) => Problem::coloring(input)?.encode(),
        Problem::Sudoku { grid } => Problem::sudoku(grid)?.encode(),
        Problem::Planning { .. } => problem.planning(settings)?.encode(),
        _ => Err(not_a_reduction(problem)),
    }
}

/// Encode, solve, decode and validate a reduction problem
pub fn solve<G: SolverGateway + ?Sized>(
    problem: &Problem,
    settings: &Settings,
    gateway: &mut G,
) -> PuzzleResult<SolveOutcome> {
    let options = settings.solver_options();
    match problem {
        Problem::GraphColoring(input) => {
            let reduction = Problem::coloring(input)?;
            let report = solve_with(&reduction, gateway, &options)?;
            let validation = report.outcome.answer().map(|c| validate_coloring(input, c));
            Ok(assemble(problem, gateway.name(), report, Answer::GraphColoring, validation))
        }
        Problem::Sudoku { grid } => {
            let reduction = Problem::sudoku(grid)?;
            let report = solve_with(&reduction, gateway, &options)?;
            let unique = match (&report.outcome, settings.solver.check_uniqueness) {
                (ReductionOutcome::Satisfiable(_), true) => {
                    let models = gateway.enumerate(&report.cnf, &options, 2, &reduction.projection())?;
                    Some(models.len() == 1)
                }
                _ => None,
            };
            let validation = report.outcome.answer().map(|g| validate_sudoku(grid, g));
            Ok(assemble(
                problem,
                gateway.name(),
                report,
                |grid| Answer::Sudoku { grid, unique },
                validation,
            ))
        }
        Problem::Planning { .. } => {
            let reduction = problem.planning(settings)?;
            let report = solve_with(&reduction, gateway, &options)?;
            let validation = report.outcome.answer().map(|plan| replay_plan(reduction.input(), plan));
            Ok(assemble(problem, gateway.name(), report, Answer::Planning, validation))
        }
        _ => Err(not_a_reduction(problem)),
    }
}

fn assemble<A>(
    problem: &Problem,
    solver: &str,
    report: ReductionReport<A>,
    wrap: impl FnOnce(A) -> Answer,
    validation: Option<ValidationResult>,
) -> SolveOutcome {
    if let Some(check) = validation.as_ref().filter(|v| !v.is_valid) {
        tracing::warn!(problem = problem.kind(), %check, "decoded answer failed validation");
    }
    let satisfiable = report.outcome.is_satisfiable();
    let answer = match report.outcome {
        ReductionOutcome::Satisfiable(answer) => Some(wrap(answer)),
        ReductionOutcome::Unsatisfiable => None,
    };
    SolveOutcome {
        problem: problem.kind(),
        solver: solver.to_string(),
        satisfiable,
        answer,
        stats: report.stats,
        solve_time_ms: report.solve_time.as_millis() as u64,
        validation,
        cnf: Some(report.cnf),
    }
}

fn not_a_reduction(problem: &Problem) -> PuzzleError {
    PuzzleError::invalid(format!("{} is a search problem, not a SAT reduction", problem.kind()))
}

/// Run one search algorithm. Planning problems are searched as corridors.
pub fn search_problem(problem: &Problem, settings: &Settings, algorithm: Algorithm) -> PuzzleResult<SearchReport> {
    let limits = settings.search_limits();
    let start = Instant::now();
    match problem {
        Problem::Maze { rows } => {
            let maze = Problem::maze(rows)?;
            let result = search(&maze, algorithm, &limits, |p| maze.distance_to_goal(p));
            let picture = result
                .outcome
                .path()
                .map(|path| maze.render(&path.states().copied().collect::<Vec<_>>()));
            Ok(report(problem, algorithm, None, result, picture, None, start))
        }
        Problem::Corridor { .. } | Problem::Planning { .. } => {
            let corridor = problem.corridor(settings)?;
            let goals = corridor.goals().to_vec();
            let result = search(&corridor, algorithm, &limits, |_| 0.0);
            let picture = result.outcome.path().map(|path| path.last_state().render(&goals));
            Ok(report(problem, algorithm, None, result, picture, None, start))
        }
        Problem::EightPuzzle { initial, goal } => {
            let puzzle = Problem::sliding_puzzle(initial, goal);
            let heuristic = settings.search.heuristic;
            let solvable = puzzle.is_solvable();
            if !solvable {
                tracing::info!("8-puzzle parity differs from the goal, the search will exhaust");
            }
            let result = search(&puzzle, algorithm, &limits, |b| puzzle.estimate(heuristic, b));
            let picture = result.outcome.path().map(|path| path.last_state().to_string());
            let used = (algorithm == Algorithm::Astar).then_some(heuristic);
            Ok(report(problem, algorithm, used, result, picture, Some(solvable), start))
        }
        _ => Err(PuzzleError::invalid(format!(
            "{} is a SAT reduction, not a search problem",
            problem.kind()
        ))),
    }
}

fn report<S, A: fmt::Display>(
    problem: &Problem,
    algorithm: Algorithm,
    heuristic: Option<Heuristic>,
    result: SearchResult<S, A>,
    picture: Option<String>,
    solvable: Option<bool>,
    start: Instant,
) -> SearchReport {
    let path = result.outcome.path();
    SearchReport {
        problem: problem.kind(),
        algorithm,
        heuristic,
        found: path.is_some(),
        length: path.map(|p| p.len()),
        actions: path
            .map(|p| p.actions().map(|a| a.to_string()).collect())
            .unwrap_or_default(),
        picture,
        solvable,
        stats: result.stats,
        elapsed_ms: start.elapsed().as_millis() as u64,
    }
}

/// Run several algorithms on the same problem in parallel, in the order given
pub fn search_all(
    problem: &Problem,
    settings: &Settings,
    algorithms: &[Algorithm],
) -> Vec<PuzzleResult<SearchReport>> {
    algorithms
        .par_iter()
        .map(|&algorithm| search_problem(problem, settings, algorithm))
        .collect()
}
