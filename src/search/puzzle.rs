//! The 8-puzzle: a 3×3 board of tiles 1..=8 and a blank (0)

use super::SearchProblem;
use crate::error::{PuzzleError, PuzzleResult};
use serde::{Deserialize, Serialize};
use std::fmt;

const SIDE: usize = 3;
const CELLS: usize = SIDE * SIDE;

/// Row-major tiles, 0 is the blank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<i64>>", into = "Vec<Vec<u8>>")]
pub struct Board([u8; CELLS]);

impl Board {
    /// `1 2 3 / 4 5 6 / 7 8 _`
    pub const SOLVED: Board = Board([1, 2, 3, 4, 5, 6, 7, 8, 0]);

    pub fn from_rows(rows: &[Vec<i64>]) -> PuzzleResult<Self> {
        if rows.len() != SIDE || rows.iter().any(|row| row.len() != SIDE) {
            return Err(PuzzleError::invalid("an 8-puzzle board must be 3×3"));
        }

        let mut tiles = [0u8; CELLS];
        let mut seen = [false; CELLS];
        for (i, &value) in rows.iter().flatten().enumerate() {
            let tile = usize::try_from(value)
                .ok()
                .filter(|&t| t < CELLS)
                .ok_or_else(|| PuzzleError::invalid(format!("tile {} is not in 0..=8", value)))?;
            if std::mem::replace(&mut seen[tile], true) {
                return Err(PuzzleError::invalid(format!("tile {} appears twice", tile)));
            }
            tiles[i] = tile as u8;
        }
        Ok(Board(tiles))
    }

    pub fn tiles(&self) -> &[u8; CELLS] {
        &self.0
    }

    fn blank(&self) -> usize {
        self.0.iter().position(|&t| t == 0).unwrap_or(0)
    }

    /// Cell index of every tile value
    fn positions(&self) -> [usize; CELLS] {
        let mut at = [0; CELLS];
        for (i, &t) in self.0.iter().enumerate() {
            at[t as usize] = i;
        }
        at
    }

    /// Board after sliding the blank, or `None` at the edge
    pub fn apply(&self, step: PuzzleMove) -> Option<Board> {
        let blank = self.blank();
        let (r, c) = (blank / SIDE, blank % SIDE);
        let target = match step {
            PuzzleMove::Up => r.checked_sub(1).map(|r| r * SIDE + c),
            PuzzleMove::Right => (c + 1 < SIDE).then(|| blank + 1),
            PuzzleMove::Down => (r + 1 < SIDE).then(|| blank + SIDE),
            PuzzleMove::Left => c.checked_sub(1).map(|c| r * SIDE + c),
        }?;
        let mut tiles = self.0;
        tiles.swap(blank, target);
        Some(Board(tiles))
    }

    fn inversions(&self) -> usize {
        let tiles: Vec<u8> = self.0.iter().copied().filter(|&t| t != 0).collect();
        tiles
            .iter()
            .enumerate()
            .map(|(i, a)| tiles[i + 1..].iter().filter(|&b| b < a).count())
            .sum()
    }

    /// On an odd-width board, sliding never changes inversion parity
    pub fn is_solvable_towards(&self, goal: &Board) -> bool {
        self.inversions() % 2 == goal.inversions() % 2
    }
}

impl TryFrom<Vec<Vec<i64>>> for Board {
    type Error = PuzzleError;

    fn try_from(rows: Vec<Vec<i64>>) -> PuzzleResult<Self> {
        Board::from_rows(&rows)
    }
}

impl From<Board> for Vec<Vec<u8>> {
    fn from(board: Board) -> Self {
        board.0.chunks(SIDE).map(|row| row.to_vec()).collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.0.chunks(SIDE) {
            let cells: Vec<String> = row
                .iter()
                .map(|&t| if t == 0 { "_".to_string() } else { t.to_string() })
                .collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

/// Direction the blank slides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PuzzleMove {
    Up,
    Right,
    Down,
    Left,
}

impl PuzzleMove {
    pub const ORDER: [PuzzleMove; 4] = [PuzzleMove::Up, PuzzleMove::Right, PuzzleMove::Down, PuzzleMove::Left];
}

impl fmt::Display for PuzzleMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PuzzleMove::Up => "up",
            PuzzleMove::Right => "right",
            PuzzleMove::Down => "down",
            PuzzleMove::Left => "left",
        };
        f.write_str(name)
    }
}

/// A* estimates for the 8-puzzle. The blank is never counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    #[default]
    Manhattan,
    Misplaced,
    Euclidean,
}

impl Heuristic {
    pub fn evaluate(self, board: &Board, goal: &Board) -> f64 {
        let target = goal.positions();
        let tiles = board.0.iter().enumerate().filter(|(_, &t)| t != 0);
        match self {
            Heuristic::Misplaced => tiles.filter(|&(i, &t)| target[t as usize] != i).count() as f64,
            Heuristic::Manhattan => tiles
                .map(|(i, &t)| {
                    let (dr, dc) = offset(i, target[t as usize]);
                    (dr + dc) as f64
                })
                .sum(),
            Heuristic::Euclidean => tiles
                .map(|(i, &t)| {
                    let (dr, dc) = offset(i, target[t as usize]);
                    ((dr * dr + dc * dc) as f64).sqrt()
                })
                .sum(),
        }
    }
}

fn offset(from: usize, to: usize) -> (usize, usize) {
    ((from / SIDE).abs_diff(to / SIDE), (from % SIDE).abs_diff(to % SIDE))
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Heuristic::Manhattan => "manhattan",
            Heuristic::Misplaced => "misplaced",
            Heuristic::Euclidean => "euclidean",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlidingPuzzle {
    initial: Board,
    goal: Board,
}

impl SlidingPuzzle {
    pub fn new(initial: Board, goal: Board) -> Self {
        Self { initial, goal }
    }

    pub fn initial(&self) -> &Board {
        &self.initial
    }

    pub fn goal(&self) -> &Board {
        &self.goal
    }

    pub fn is_solvable(&self) -> bool {
        self.initial.is_solvable_towards(&self.goal)
    }

    pub fn estimate(&self, heuristic: Heuristic, board: &Board) -> f64 {
        heuristic.evaluate(board, &self.goal)
    }
}

impl SearchProblem for SlidingPuzzle {
    type State = Board;
    type Action = PuzzleMove;

    fn initial_state(&self) -> Board {
        self.initial
    }

    fn successors(&self, board: &Board) -> Vec<(PuzzleMove, Board)> {
        PuzzleMove::ORDER
            .iter()
            .filter_map(|&step| board.apply(step).map(|next| (step, next)))
            .collect()
    }

    fn is_goal(&self, board: &Board) -> bool {
        *board == self.goal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::engine::{astar, bfs};

    fn board(rows: [[i64; 3]; 3]) -> Board {
        Board::from_rows(&rows.iter().map(|r| r.to_vec()).collect::<Vec<_>>()).unwrap()
    }

    fn hard() -> SlidingPuzzle {
        SlidingPuzzle::new(board([[7, 2, 4], [5, 0, 6], [8, 3, 1]]), Board::SOLVED)
    }

    #[test]
    fn test_board_validation() {
        assert!(Board::from_rows(&[vec![1, 2, 3], vec![4, 5, 6]]).is_err());
        assert!(Board::from_rows(&[vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]).is_err());
        assert!(Board::from_rows(&[vec![1, 1, 3], vec![4, 5, 6], vec![7, 8, 0]]).is_err());
        assert!(Board::from_rows(&[vec![1, -2, 3], vec![4, 5, 6], vec![7, 8, 0]]).is_err());
        assert_eq!(board([[1, 2, 3], [4, 5, 6], [7, 8, 0]]), Board::SOLVED);
    }

    #[test]
    fn test_serde_rows() {
        let parsed: Board = serde_json::from_str("[[1,2,3],[4,5,6],[7,8,0]]").unwrap();
        assert_eq!(parsed, Board::SOLVED);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "[[1,2,3],[4,5,6],[7,8,0]]");
        assert!(serde_json::from_str::<Board>("[[1,2,3],[4,5,6],[7,8,8]]").is_err());
    }

    #[test]
    fn test_blank_moves() {
        let corner = Board::SOLVED;
        assert_eq!(corner.apply(PuzzleMove::Right), None);
        assert_eq!(corner.apply(PuzzleMove::Down), None);
        assert_eq!(corner.apply(PuzzleMove::Up), Some(board([[1, 2, 3], [4, 5, 0], [7, 8, 6]])));

        let p = hard();
        let moves: Vec<_> = p.successors(p.initial()).into_iter().map(|(m, _)| m).collect();
        assert_eq!(moves, PuzzleMove::ORDER.to_vec());
    }

    #[test]
    fn test_heuristic_values() {
        let p = hard();
        assert_eq!(p.estimate(Heuristic::Manhattan, p.initial()), 14.0);
        assert_eq!(p.estimate(Heuristic::Misplaced, p.initial()), 6.0);
        assert!((p.estimate(Heuristic::Euclidean, p.initial()) - 11.300563).abs() < 1e-5);
        for h in [Heuristic::Manhattan, Heuristic::Misplaced, Heuristic::Euclidean] {
            assert_eq!(h.evaluate(&Board::SOLVED, &Board::SOLVED), 0.0);
        }
    }

    #[test]
    fn test_parity() {
        assert!(hard().is_solvable());
        let odd = SlidingPuzzle::new(board([[5, 8, 7], [4, 0, 3], [6, 2, 1]]), Board::SOLVED);
        assert!(!odd.is_solvable());
    }

    #[test]
    fn test_short_instance() {
        let p = SlidingPuzzle::new(board([[1, 2, 3], [4, 5, 6], [0, 7, 8]]), Board::SOLVED);
        let result = astar(&p, |b| p.estimate(Heuristic::Manhattan, b));
        let moves: Vec<_> = result.outcome.path().unwrap().actions().copied().collect();
        assert_eq!(moves, vec![PuzzleMove::Right, PuzzleMove::Right]);
        assert_eq!(result.stats.nodes_explored, 3);
        assert_eq!(bfs(&p).outcome.path().unwrap().len(), 2);
    }

    #[test]
    fn test_heuristics_agree_on_length() {
        let p = hard();
        let explored: Vec<(usize, usize)> = [Heuristic::Manhattan, Heuristic::Misplaced, Heuristic::Euclidean]
            .iter()
            .map(|&h| {
                let result = astar(&p, |b| p.estimate(h, b));
                (result.outcome.path().unwrap().len(), result.stats.nodes_explored)
            })
            .collect();

        assert_eq!(explored, vec![(20, 283), (20, 3667), (20, 420)]);
        assert!(explored[1].1 >= explored[0].1);
    }

    #[test]
    fn test_odd_parity_exhausts() {
        let p = SlidingPuzzle::new(board([[5, 8, 7], [4, 0, 3], [6, 2, 1]]), Board::SOLVED);
        let result = astar(&p, |b| p.estimate(Heuristic::Manhattan, b));
        assert!(!result.outcome.is_found());
        // half of 9! boards share the start's parity
        assert_eq!(result.stats.nodes_explored, 181_440);
    }

    #[test]
    fn test_display() {
        assert_eq!(Board::SOLVED.to_string(), "1 2 3\n4 5 6\n7 8 _\n");
    }
}
