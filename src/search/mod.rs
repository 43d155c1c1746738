//! State-space search: the engine plus the maze, corridor and 8-puzzle problems

pub mod corridor;
pub mod engine;
pub mod maze;
pub mod puzzle;

pub use corridor::{CorridorAction, CorridorProblem, CorridorState};
pub use engine::{astar, bfs, dfs, iddfs, search, SearchLimits, SearchOutcome, SearchPath, SearchResult, SearchStats};
pub use maze::{Maze, MazeMove, Position};
pub use puzzle::{Board, Heuristic, PuzzleMove, SlidingPuzzle};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// A search space: where to start, how to move, when to stop.
///
/// `successors` must return actions in a fixed order; DFS and the A*
/// tie-break both depend on it.
pub trait SearchProblem {
    type State: Clone + Eq + Hash + fmt::Debug;
    type Action: Clone + fmt::Debug;

    fn initial_state(&self) -> Self::State;

    fn successors(&self, state: &Self::State) -> Vec<(Self::Action, Self::State)>;

    fn is_goal(&self, state: &Self::State) -> bool;
}

/// Search algorithm selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Bfs,
    Dfs,
    Iddfs,
    Astar,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [Algorithm::Bfs, Algorithm::Dfs, Algorithm::Iddfs, Algorithm::Astar];
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::Bfs => "bfs",
            Algorithm::Dfs => "dfs",
            Algorithm::Iddfs => "iddfs",
            Algorithm::Astar => "astar",
        };
        f.write_str(name)
    }
}
