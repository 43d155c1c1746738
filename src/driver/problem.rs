//! Problem files: one tagged variant per supported puzzle

use crate::config::Settings;
use crate::error::{PuzzleError, PuzzleResult};
use crate::reduction::{ColoringInput, GraphColoring, PlanningInput, PlanningReduction, SudokuGrid, SudokuReduction};
use crate::search::{Board, CorridorProblem, CorridorState, Maze, SlidingPuzzle};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A puzzle as read from a YAML or JSON problem file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Problem {
    GraphColoring(ColoringInput),
    Sudoku {
        grid: SudokuGrid,
    },
    /// Horizon and track length fall back to the `planning` settings
    Planning {
        worker: usize,
        boxes: Vec<usize>,
        goals: Vec<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        horizon: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        track_length: Option<usize>,
    },
    Maze {
        rows: Vec<String>,
    },
    Corridor {
        worker: usize,
        boxes: Vec<usize>,
        goals: Vec<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        track_length: Option<usize>,
    },
    EightPuzzle {
        initial: Board,
        #[serde(default = "solved_board")]
        goal: Board,
    },
}

fn solved_board() -> Board {
    Board::SOLVED
}

/// Problem family, decides which front end accepts it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemFamily {
    Reduction,
    Search,
}

impl Problem {
    /// Load a problem file; `.json` is read as JSON, anything else as YAML
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read problem file: {}", path.display()))?;

        let is_json = path.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        let problem = if is_json {
            serde_json::from_str(&content).with_context(|| format!("Failed to parse problem file: {}", path.display()))?
        } else {
            serde_yaml::from_str(&content).with_context(|| format!("Failed to parse problem file: {}", path.display()))?
        };
        Ok(problem)
    }

    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize problem")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(path, content).with_context(|| format!("Failed to write problem file: {}", path.display()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Problem::GraphColoring(_) => "graph_coloring",
            Problem::Sudoku { .. } => "sudoku",
            Problem::Planning { .. } => "planning",
            Problem::Maze { .. } => "maze",
            Problem::Corridor { .. } => "corridor",
            Problem::EightPuzzle { .. } => "eight_puzzle",
        }
    }

    pub fn family(&self) -> ProblemFamily {
        match self {
            Problem::GraphColoring(_) | Problem::Sudoku { .. } | Problem::Planning { .. } => ProblemFamily::Reduction,
            Problem::Maze { .. } | Problem::Corridor { .. } | Problem::EightPuzzle { .. } => ProblemFamily::Search,
        }
    }

    pub(crate) fn coloring(input: &ColoringInput) -> PuzzleResult<GraphColoring> {
        GraphColoring::new(input.clone())
    }

    pub(crate) fn sudoku(grid: &SudokuGrid) -> PuzzleResult<SudokuReduction> {
        SudokuReduction::new(*grid)
    }

    /// Planning input with the settings' defaults filled in
    pub fn planning_input(&self, settings: &Settings) -> Option<PlanningInput> {
        match self {
            Problem::Planning {
                worker,
                boxes,
                goals,
                horizon,
                track_length,
            } => Some(PlanningInput {
                worker: *worker,
                boxes: boxes.clone(),
                goals: goals.clone(),
                horizon: horizon.unwrap_or(settings.planning.horizon),
                track_length: track_length.unwrap_or(settings.planning.track_length),
            }),
            _ => None,
        }
    }

    pub(crate) fn planning(&self, settings: &Settings) -> PuzzleResult<PlanningReduction> {
        let input = self
            .planning_input(settings)
            .ok_or_else(|| PuzzleError::invalid(format!("{} is not a planning problem", self.kind())))?;
        PlanningReduction::new(input)
    }

    /// Corridor search problem; planning problems are searched without their horizon
    pub(crate) fn corridor(&self, settings: &Settings) -> PuzzleResult<CorridorProblem> {
        let (worker, boxes, goals, track_length) = match self {
            Problem::Corridor {
                worker,
                boxes,
                goals,
                track_length,
            }
            | Problem::Planning {
                worker,
                boxes,
                goals,
                track_length,
                ..
            } => (*worker, boxes, goals, track_length.unwrap_or(settings.planning.track_length)),
            _ => return Err(PuzzleError::invalid(format!("{} is not a corridor problem", self.kind()))),
        };
        CorridorProblem::new(CorridorState::new(worker, boxes.clone(), track_length)?, goals.clone())
    }

    pub(crate) fn maze(rows: &[String]) -> PuzzleResult<Maze> {
        Maze::parse(rows)
    }

    pub(crate) fn sliding_puzzle(initial: &Board, goal: &Board) -> SlidingPuzzle {
        SlidingPuzzle::new(*initial, *goal)
    }

    /// One instance of every kind, written out by `setup`
    pub fn samples() -> PuzzleResult<Vec<(&'static str, Problem)>> {
        let grid = SudokuGrid::from_rows(&[
            vec![5, 3, 0, 0, 7, 0, 0, 0, 0],
            vec![6, 0, 0, 1, 9, 5, 0, 0, 0],
            vec![0, 9, 8, 0, 0, 0, 0, 6, 0],
            vec![8, 0, 0, 0, 6, 0, 0, 0, 3],
            vec![4, 0, 0, 8, 0, 3, 0, 0, 1],
            vec![7, 0, 0, 0, 2, 0, 0, 0, 6],
            vec![0, 6, 0, 0, 0, 0, 2, 8, 0],
            vec![0, 0, 0, 4, 1, 9, 0, 0, 5],
            vec![0, 0, 0, 0, 8, 0, 0, 7, 9],
        ])?;
        let initial = Board::from_rows(&[vec![7, 2, 4], vec![5, 0, 6], vec![8, 3, 1]])?;

        Ok(vec![
            (
                "coloring.yaml",
                Problem::GraphColoring(ColoringInput {
                    vertices: ["A", "B", "C", "D"].iter().map(|v| v.to_string()).collect(),
                    edges: [("A", "B"), ("A", "C"), ("B", "C"), ("B", "D"), ("C", "D")]
                        .iter()
                        .map(|(u, v)| (u.to_string(), v.to_string()))
                        .collect(),
                    colors: ["r", "v", "b"].iter().map(|c| c.to_string()).collect(),
                }),
            ),
            (
                "planning.yaml",
                Problem::Planning {
                    worker: 6,
                    boxes: vec![2, 9],
                    goals: vec![1, 10],
                    horizon: Some(15),
                    track_length: Some(11),
                },
            ),
            (
                "maze.yaml",
                Problem::Maze {
                    rows: ["S...", ".#.#", ".#..", ".G.."].iter().map(|r| r.to_string()).collect(),
                },
            ),
            (
                "corridor.yaml",
                Problem::Corridor {
                    worker: 5,
                    boxes: vec![2, 8],
                    goals: vec![1, 9],
                    track_length: Some(11),
                },
            ),
            ("sudoku.yaml", Problem::Sudoku { grid }),
            (
                "eight_puzzle.yaml",
                Problem::EightPuzzle {
                    initial,
                    goal: Board::SOLVED,
                },
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_tagged_yaml() {
        let yaml = "kind: graph_coloring\nvertices: [A, B]\nedges: [[A, B]]\ncolors: [r, v]\n";
        let problem: Problem = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(problem.kind(), "graph_coloring");
        assert_eq!(problem.family(), ProblemFamily::Reduction);

        let yaml = "kind: eight_puzzle\ninitial: [[1, 2, 3], [4, 5, 6], [0, 7, 8]]\n";
        let problem: Problem = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            problem,
            Problem::EightPuzzle {
                initial: Board::from_rows(&[vec![1, 2, 3], vec![4, 5, 6], vec![0, 7, 8]]).unwrap(),
                goal: Board::SOLVED,
            }
        );
        assert_eq!(problem.family(), ProblemFamily::Search);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(serde_yaml::from_str::<Problem>("kind: chess\n").is_err());
        assert!(serde_yaml::from_str::<Problem>("kind: sudoku\ngrid: [[1, 2]]\n").is_err());
    }

    #[test]
    fn test_planning_defaults_from_settings() {
        let problem: Problem =
            serde_json::from_str(r#"{"kind":"planning","worker":6,"boxes":[2,9],"goals":[1,10]}"#).unwrap();
        let mut settings = Settings::default();
        settings.planning.horizon = 12;

        let input = problem.planning_input(&settings).unwrap();
        assert_eq!((input.horizon, input.track_length), (12, 11));
        assert!(problem.planning(&settings).is_ok());

        let corridor = problem.corridor(&settings).unwrap();
        assert_eq!(corridor.goals(), &[1, 10]);
    }

    #[test]
    fn test_wrong_family_accessors() {
        let settings = Settings::default();
        let maze = Problem::Maze { rows: vec!["SG".into()] };
        assert!(maze.planning_input(&settings).is_none());
        assert!(matches!(maze.corridor(&settings), Err(PuzzleError::InvalidInput { .. })));
    }

    #[test]
    fn test_samples_round_trip_through_files() {
        let dir = tempdir().unwrap();
        let samples = Problem::samples().unwrap();
        assert_eq!(samples.len(), 6);

        for (name, problem) in &samples {
            let path = dir.path().join(name);
            problem.to_file(&path).unwrap();
            assert_eq!(&Problem::from_file(&path).unwrap(), problem);
        }

        let json = dir.path().join("maze.json");
        std::fs::write(&json, r#"{"kind":"maze","rows":["S#","G."]}"#).unwrap();
        assert_eq!(Problem::from_file(&json).unwrap().kind(), "maze");
    }
}
