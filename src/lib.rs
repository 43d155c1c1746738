//! Puzzle solving by SAT reduction and by state-space search
//!
//! Graph coloring, Sudoku and a bounded corridor planning task are encoded
//! as CNF and decided by a SAT solver. A grid maze, the corridor task and
//! the 8-puzzle are searched with BFS, DFS, IDDFS and A*.

pub mod config;
pub mod driver;
pub mod error;
pub mod reduction;
pub mod sat;
pub mod search;
pub mod utils;

pub use config::Settings;
pub use driver::{Outcome, Problem};
pub use error::{PuzzleError, PuzzleResult};

/// Solve or search `problem` with the backend and defaults from `settings`
pub fn run_problem(problem: &Problem, settings: &Settings) -> Outcome {
    let mut gateway = driver::create_gateway(&settings.solver);
    driver::run(problem, settings, gateway.as_mut())
}
