//! One-dimensional box pushing on a corridor of `track_length` cells.
//!
//! The worker walks left or right onto free cells and pushes a single box
//! one cell further when the cell behind it is free. Every cell `0..C` is
//! walkable.

use super::SearchProblem;
use crate::error::{PuzzleError, PuzzleResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorridorAction {
    MoveRight,
    PushRight,
    MoveLeft,
    PushLeft,
}

impl CorridorAction {
    /// Successor order used by the search engine
    pub const SEARCH_ORDER: [CorridorAction; 4] = [
        CorridorAction::MoveRight,
        CorridorAction::PushRight,
        CorridorAction::MoveLeft,
        CorridorAction::PushLeft,
    ];

    /// Action numbering inside the planning formula
    pub const PLANNING_ORDER: [CorridorAction; 4] = [
        CorridorAction::MoveRight,
        CorridorAction::MoveLeft,
        CorridorAction::PushRight,
        CorridorAction::PushLeft,
    ];

    pub fn planning_index(self) -> usize {
        match self {
            CorridorAction::MoveRight => 0,
            CorridorAction::MoveLeft => 1,
            CorridorAction::PushRight => 2,
            CorridorAction::PushLeft => 3,
        }
    }
}

impl fmt::Display for CorridorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CorridorAction::MoveRight => "move_right",
            CorridorAction::PushRight => "push_right",
            CorridorAction::MoveLeft => "move_left",
            CorridorAction::PushLeft => "push_left",
        };
        f.write_str(name)
    }
}

/// Worker position plus the sorted box positions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CorridorState {
    worker: usize,
    boxes: Vec<usize>,
    track_length: usize,
}

impl CorridorState {
    pub fn new(worker: usize, mut boxes: Vec<usize>, track_length: usize) -> PuzzleResult<Self> {
        if track_length == 0 {
            return Err(PuzzleError::invalid("the track has no cells"));
        }
        if worker >= track_length {
            return Err(PuzzleError::invalid(format!(
                "worker position {} is outside the track 0..{}",
                worker, track_length
            )));
        }
        boxes.sort_unstable();
        if let Some(&b) = boxes.iter().find(|&&b| b >= track_length) {
            return Err(PuzzleError::invalid(format!(
                "box position {} is outside the track 0..{}",
                b, track_length
            )));
        }
        if let Some(pair) = boxes.windows(2).find(|w| w[0] == w[1]) {
            return Err(PuzzleError::invalid(format!("two boxes on cell {}", pair[0])));
        }
        if boxes.binary_search(&worker).is_ok() {
            return Err(PuzzleError::invalid(format!("the worker starts on the box at {}", worker)));
        }

        Ok(Self {
            worker,
            boxes,
            track_length,
        })
    }

    pub fn worker(&self) -> usize {
        self.worker
    }

    pub fn boxes(&self) -> &[usize] {
        &self.boxes
    }

    pub fn track_length(&self) -> usize {
        self.track_length
    }

    fn has_box(&self, cell: usize) -> bool {
        self.boxes.binary_search(&cell).is_ok()
    }

    fn is_free(&self, cell: usize) -> bool {
        cell < self.track_length && !self.has_box(cell)
    }

    fn with(&self, worker: usize, moved_box: Option<(usize, usize)>) -> Self {
        let mut boxes = self.boxes.clone();
        if let Some((from, to)) = moved_box {
            if let Ok(i) = boxes.binary_search(&from) {
                boxes.remove(i);
            }
            let at = boxes.binary_search(&to).unwrap_or_else(|i| i);
            boxes.insert(at, to);
        }
        Self {
            worker,
            boxes,
            track_length: self.track_length,
        }
    }

    /// State after `action`, or `None` when its preconditions fail
    pub fn apply(&self, action: CorridorAction) -> Option<Self> {
        let w = self.worker;
        match action {
            CorridorAction::MoveRight => self.is_free(w + 1).then(|| self.with(w + 1, None)),
            CorridorAction::MoveLeft => {
                let left = w.checked_sub(1)?;
                self.is_free(left).then(|| self.with(left, None))
            }
            CorridorAction::PushRight => {
                (self.has_box(w + 1) && self.is_free(w + 2)).then(|| self.with(w + 1, Some((w + 1, w + 2))))
            }
            CorridorAction::PushLeft => {
                let (near, far) = (w.checked_sub(1)?, w.checked_sub(2)?);
                (self.has_box(near) && self.is_free(far)).then(|| self.with(near, Some((near, far))))
            }
        }
    }

    /// Text strip: `@` worker, `$` box, `*` box on a goal, `o` empty goal, `.` free
    pub fn render(&self, goals: &[usize]) -> String {
        (0..self.track_length)
            .map(|cell| {
                let goal = goals.contains(&cell);
                if cell == self.worker {
                    '@'
                } else if self.has_box(cell) {
                    if goal {
                        '*'
                    } else {
                        '$'
                    }
                } else if goal {
                    'o'
                } else {
                    '.'
                }
            })
            .collect()
    }
}

/// Push every box onto the goal cells
#[derive(Debug, Clone)]
pub struct CorridorProblem {
    initial: CorridorState,
    goals: Vec<usize>,
}

impl CorridorProblem {
    pub fn new(initial: CorridorState, mut goals: Vec<usize>) -> PuzzleResult<Self> {
        goals.sort_unstable();
        goals.dedup();
        if let Some(&g) = goals.iter().find(|&&g| g >= initial.track_length) {
            return Err(PuzzleError::invalid(format!(
                "goal position {} is outside the track 0..{}",
                g, initial.track_length
            )));
        }
        if goals.len() != initial.boxes.len() {
            return Err(PuzzleError::invalid(format!(
                "{} boxes but {} distinct goals",
                initial.boxes.len(),
                goals.len()
            )));
        }
        Ok(Self { initial, goals })
    }

    pub fn initial(&self) -> &CorridorState {
        &self.initial
    }

    pub fn goals(&self) -> &[usize] {
        &self.goals
    }
}

impl SearchProblem for CorridorProblem {
    type State = CorridorState;
    type Action = CorridorAction;

    fn initial_state(&self) -> CorridorState {
        self.initial.clone()
    }

    fn successors(&self, state: &CorridorState) -> Vec<(CorridorAction, CorridorState)> {
        CorridorAction::SEARCH_ORDER
            .iter()
            .filter_map(|&action| state.apply(action).map(|next| (action, next)))
            .collect()
    }

    fn is_goal(&self, state: &CorridorState) -> bool {
        state.boxes == self.goals
    }
}
