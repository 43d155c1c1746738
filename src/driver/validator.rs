//! Independent checks of decoded answers against the input puzzle

use crate::reduction::{Coloring, ColoringInput, Plan, PlanningInput, SudokuGrid};
use crate::search::CorridorState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of checking one answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Number of individual constraints looked at
    pub checks: usize,
    pub violations: Vec<String>,
}

impl ValidationResult {
    fn from_violations(checks: usize, violations: Vec<String>) -> Self {
        Self {
            is_valid: violations.is_empty(),
            checks,
            violations,
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid {
            return write!(f, "valid ({} checks)", self.checks);
        }
        write!(f, "invalid: {} of {} checks failed", self.violations.len(), self.checks)?;
        for violation in self.violations.iter().take(3) {
            write!(f, "\n  {}", violation)?;
        }
        if self.violations.len() > 3 {
            write!(f, "\n  ... and {} more", self.violations.len() - 3)?;
        }
        Ok(())
    }
}

/// Every vertex colored once from the palette, no edge monochromatic
pub fn validate_coloring(input: &ColoringInput, coloring: &Coloring) -> ValidationResult {
    let mut violations = Vec::new();
    let mut checks = 0;

    for vertex in &input.vertices {
        checks += 1;
        match coloring.color_of(vertex) {
            None => violations.push(format!("vertex {} has no color", vertex)),
            Some(color) if !input.colors.iter().any(|c| c == color) => {
                violations.push(format!("vertex {} uses unknown color {}", vertex, color))
            }
            Some(_) => {}
        }
    }

    for (u, v) in &input.edges {
        checks += 1;
        if let (Some(cu), Some(cv)) = (coloring.color_of(u), coloring.color_of(v)) {
            if cu == cv {
                violations.push(format!("edge {{{}, {}}} has both ends {}", u, v, cu));
            }
        }
    }

    ValidationResult::from_violations(checks, violations)
}

/// Grid complete and legal, every clue kept
pub fn validate_sudoku(clues: &SudokuGrid, grid: &SudokuGrid) -> ValidationResult {
    let mut violations = Vec::new();
    if !grid.is_solved() {
        violations.push("some row, column or box does not hold each of 1..9 once".to_string());
    }
    if !grid.preserves(clues) {
        violations.push("a pre-filled cell was changed".to_string());
    }
    ValidationResult::from_violations(2, violations)
}

/// Replay `plan` with the corridor transition rules.
///
/// Each action must be applicable where it is taken, the recorded worker
/// trace must match the replay, and the boxes must end on the goals.
pub fn replay_plan(input: &PlanningInput, plan: &Plan) -> ValidationResult {
    let mut state = match CorridorState::new(input.worker, input.boxes.clone(), input.track_length) {
        Ok(state) => state,
        Err(e) => return ValidationResult::from_violations(1, vec![e.to_string()]),
    };

    let mut violations = Vec::new();
    let mut checks = 0;
    for (i, step) in plan.steps.iter().enumerate() {
        checks += 1;
        if step.time != i {
            violations.push(format!("step {} is stamped t={}", i, step.time));
        }
        match state.apply(step.action) {
            Some(next) => state = next,
            None => {
                violations.push(format!(
                    "t={}: {} is not applicable with the worker at {}",
                    step.time,
                    step.action,
                    state.worker()
                ));
                break;
            }
        }
        if let Some(&recorded) = plan.worker_trace.get(i + 1) {
            checks += 1;
            if recorded != state.worker() {
                violations.push(format!(
                    "t={}: worker recorded at {} but replay puts it at {}",
                    i + 1,
                    recorded,
                    state.worker()
                ));
            }
        }
    }

    checks += 1;
    let mut goals = input.goals.clone();
    goals.sort_unstable();
    if state.boxes() != goals.as_slice() {
        violations.push(format!("boxes end on {:?}, goals are {:?}", state.boxes(), goals));
    }

    ValidationResult::from_violations(checks, violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduction::PlanStep;
    use crate::search::CorridorAction::*;

    fn path_graph() -> ColoringInput {
        ColoringInput {
            vertices: vec!["A".into(), "B".into(), "C".into()],
            edges: vec![("A".into(), "B".into()), ("B".into(), "C".into())],
            colors: vec!["r".into(), "v".into()],
        }
    }

    fn coloring(pairs: &[(&str, &str)]) -> Coloring {
        Coloring {
            phi: pairs.iter().map(|(v, c)| (v.to_string(), c.to_string())).collect(),
        }
    }

    #[test]
    fn test_proper_coloring() {
        let result = validate_coloring(&path_graph(), &coloring(&[("A", "r"), ("B", "v"), ("C", "r")]));
        assert!(result.is_valid);
        assert_eq!(result.checks, 5);
    }

    #[test]
    fn test_coloring_violations() {
        let result = validate_coloring(&path_graph(), &coloring(&[("A", "r"), ("B", "r"), ("C", "x")]));
        assert!(!result.is_valid);
        assert_eq!(result.violations.len(), 2);
        assert!(result.violations[0].contains("unknown color x"));
        assert!(result.violations[1].contains("{A, B}"));

        let missing = validate_coloring(&path_graph(), &coloring(&[("A", "r"), ("B", "v")]));
        assert_eq!(missing.violations, vec!["vertex C has no color".to_string()]);
    }

    fn plan(actions: &[crate::search::CorridorAction], trace: Vec<usize>) -> Plan {
        Plan {
            steps: actions
                .iter()
                .enumerate()
                .map(|(time, &action)| PlanStep { time, action })
                .collect(),
            worker_trace: trace,
        }
    }

    fn small_input() -> PlanningInput {
        PlanningInput {
            worker: 0,
            boxes: vec![1],
            goals: vec![2],
            horizon: 2,
            track_length: 4,
        }
    }

    #[test]
    fn test_replay_reaches_goal() {
        let result = replay_plan(&small_input(), &plan(&[PushRight, MoveLeft], vec![0, 1, 0]));
        assert!(result.is_valid, "{}", result);
        assert_eq!(result.checks, 5);
    }

    #[test]
    fn test_replay_rejects_illegal_action() {
        let result = replay_plan(&small_input(), &plan(&[MoveLeft, PushRight], vec![0, 0, 1]));
        assert!(!result.is_valid);
        assert!(result.violations[0].contains("move_left is not applicable"));
    }

    #[test]
    fn test_replay_rejects_wrong_trace_and_goal() {
        let result = replay_plan(&small_input(), &plan(&[MoveLeft], vec![0, 1]));
        assert!(!result.is_valid);

        let result = replay_plan(&small_input(), &plan(&[PushRight, PushRight], vec![0, 1, 3]));
        assert_eq!(result.violations.len(), 2);
        assert!(result.violations[0].contains("recorded at 3"));
        assert!(result.violations[1].contains("boxes end on [3]"));
    }

    #[test]
    fn test_display() {
        let result = ValidationResult::from_violations(4, vec!["a".into(), "b".into(), "c".into(), "d".into()]);
        assert_eq!(result.to_string(), "invalid: 4 of 4 checks failed\n  a\n  b\n  c\n  ... and 1 more");
    }
}
