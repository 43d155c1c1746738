//! Grid maze: `.` free, `#` wall, `S` start, `G` goal

use super::SearchProblem;
use crate::error::{PuzzleError, PuzzleResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// (row, column), row 0 at the top
pub type Position = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MazeMove {
    Up,
    Right,
    Down,
    Left,
}

impl MazeMove {
    /// Expansion order
    pub const ORDER: [MazeMove; 4] = [MazeMove::Up, MazeMove::Right, MazeMove::Down, MazeMove::Left];

    fn delta(self) -> (isize, isize) {
        match self {
            MazeMove::Up => (-1, 0),
            MazeMove::Right => (0, 1),
            MazeMove::Down => (1, 0),
            MazeMove::Left => (0, -1),
        }
    }
}

impl fmt::Display for MazeMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MazeMove::Up => "up",
            MazeMove::Right => "right",
            MazeMove::Down => "down",
            MazeMove::Left => "left",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    walls: Vec<Vec<bool>>,
    start: Position,
    goal: Position,
}

impl Maze {
    /// Parse one string per row
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> PuzzleResult<Self> {
        if rows.is_empty() {
            return Err(PuzzleError::invalid("the maze has no rows"));
        }

        let width = rows[0].as_ref().chars().count();
        if width == 0 {
            return Err(PuzzleError::invalid("the maze has no columns"));
        }

        let mut walls = Vec::with_capacity(rows.len());
        let (mut start, mut goal) = (None, None);
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(PuzzleError::invalid(format!(
                    "maze row {} has {} cells, expected {}",
                    r,
                    row.chars().count(),
                    width
                )));
            }

            let mut line = Vec::with_capacity(width);
            for (c, cell) in row.chars().enumerate() {
                let marker = match cell {
                    '.' => None,
                    '#' => {
                        line.push(true);
                        continue;
                    }
                    'S' => Some(&mut start),
                    'G' => Some(&mut goal),
                    other => {
                        return Err(PuzzleError::invalid(format!(
                            "unexpected maze cell '{}' at ({}, {})",
                            other, r, c
                        )))
                    }
                };
                if let Some(slot) = marker {
                    if slot.replace((r, c)).is_some() {
                        return Err(PuzzleError::invalid(format!("second '{}' at ({}, {})", cell, r, c)));
                    }
                }
                line.push(false);
            }
            walls.push(line);
        }

        let start = start.ok_or_else(|| PuzzleError::invalid("the maze has no start 'S'"))?;
        let goal = goal.ok_or_else(|| PuzzleError::invalid("the maze has no goal 'G'"))?;
        Ok(Self { walls, start, goal })
    }

    pub fn rows(&self) -> usize {
        self.walls.len()
    }

    pub fn cols(&self) -> usize {
        self.walls[0].len()
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    /// Inside the grid and not a wall
    pub fn is_open(&self, (r, c): Position) -> bool {
        self.walls.get(r).and_then(|row| row.get(c)).map_or(false, |&wall| !wall)
    }

    /// Position reached by `step`, if it is open
    pub fn apply(&self, (r, c): Position, step: MazeMove) -> Option<Position> {
        let (dr, dc) = step.delta();
        let next = (r.checked_add_signed(dr)?, c.checked_add_signed(dc)?);
        self.is_open(next).then_some(next)
    }

    /// Manhattan distance to the goal, the A* heuristic for mazes
    pub fn distance_to_goal(&self, (r, c): &Position) -> f64 {
        (r.abs_diff(self.goal.0) + c.abs_diff(self.goal.1)) as f64
    }

    /// Draw the maze with `*` on every path cell that is not S or G
    pub fn render(&self, path: &[Position]) -> String {
        let on_path: HashSet<&Position> = path.iter().collect();
        let mut out = String::new();
        for r in 0..self.rows() {
            let cells: Vec<&str> = (0..self.cols())
                .map(|c| {
                    if (r, c) == self.start {
                        "S"
                    } else if (r, c) == self.goal {
                        "G"
                    } else if self.walls[r][c] {
                        "#"
                    } else if on_path.contains(&(r, c)) {
                        "*"
                    } else {
                        "."
                    }
                })
                .collect();
            out.push_str(&cells.join(" "));
            out.push('\n');
        }
        out
    }
}

impl SearchProblem for Maze {
    type State = Position;
    type Action = MazeMove;

    fn initial_state(&self) -> Position {
        self.start
    }

    fn successors(&self, &position: &Position) -> Vec<(MazeMove, Position)> {
        MazeMove::ORDER
            .iter()
            .filter_map(|&step| self.apply(position, step).map(|next| (step, next)))
            .collect()
    }

    fn is_goal(&self, position: &Position) -> bool {
        *position == self.goal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::engine::{astar, bfs, dfs, iddfs};

    fn example() -> Maze {
        Maze::parse(&["S...", ".#.#", ".#..", ".G.."]).unwrap()
    }

    #[test]
    fn test_parse() {
        let maze = example();
        assert_eq!((maze.rows(), maze.cols()), (4, 4));
        assert_eq!(maze.start(), (0, 0));
        assert_eq!(maze.goal(), (3, 1));
        assert!(!maze.is_open((1, 1)));
        assert!(!maze.is_open((4, 0)));
        assert!(maze.is_open((3, 3)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Maze::parse::<&str>(&[]).is_err());
        assert!(Maze::parse(&["S..", ".G"]).is_err());
        assert!(Maze::parse(&["S.x", "..G"]).is_err());
        assert!(Maze::parse(&["S..", "..."]).is_err());
        assert!(Maze::parse(&["S.S", "..G"]).is_err());
        assert!(matches!(Maze::parse(&["..", "..G"]), Err(PuzzleError::InvalidInput { .. })));
    }

    #[test]
    fn test_successor_order() {
        let maze = example();
        let moves: Vec<_> = maze.successors(&(2, 2)).into_iter().map(|(m, _)| m).collect();
        assert_eq!(moves, vec![MazeMove::Up, MazeMove::Right, MazeMove::Down]);
        assert_eq!(maze.successors(&(0, 0)).len(), 2);
    }

    #[test]
    fn test_bfs_shortest_path() {
        let result = bfs(&example());
        let path = result.outcome.path().unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(
            path.actions().copied().collect::<Vec<_>>(),
            vec![MazeMove::Down, MazeMove::Down, MazeMove::Down, MazeMove::Right]
        );
        assert_eq!(result.stats.nodes_explored, 10);
        assert_eq!(result.stats.nodes_generated, 11);
        assert_eq!(result.stats.max_frontier_size, 3);
    }

    #[test]
    fn test_dfs_takes_the_long_way() {
        let result = dfs(&example(), None);
        let path = result.outcome.path().unwrap();
        assert_eq!(
            path.states().copied().collect::<Vec<_>>(),
            vec![(0, 0), (0, 1), (0, 2), (1, 2), (2, 2), (2, 3), (3, 3), (3, 2), (3, 1)]
        );
        assert!(path.len() >= bfs(&example()).outcome.path().unwrap().len());
    }

    #[test]
    fn test_iddfs_matches_bfs() {
        let result = iddfs(&example(), 50);
        assert_eq!(result.outcome.path().unwrap().len(), 4);
        assert_eq!(result.stats.depth_limit, Some(4));

        assert_eq!(iddfs(&example(), 4).outcome.path(), None);
    }

    #[test]
    fn test_astar_manhattan() {
        let maze = example();
        let result = astar(&maze, |p| maze.distance_to_goal(p));
        assert_eq!(result.outcome.path().unwrap().len(), 4);
        assert_eq!(result.stats.nodes_explored, 6);
    }

    #[test]
    fn test_walled_off_goal() {
        let maze = Maze::parse(&["S#G"]).unwrap();
        assert!(!bfs(&maze).outcome.is_found());
        assert!(!iddfs(&maze, 10).outcome.is_found());
    }

    #[test]
    fn test_render() {
        let maze = example();
        let result = bfs(&maze);
        let path: Vec<_> = result.outcome.path().unwrap().states().copied().collect();
        assert_eq!(maze.render(&path), "S . . .\n* # . #\n* # . .\n* G . .\n");
    }
}
