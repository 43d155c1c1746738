//! Bounded box-pushing plan on a one-dimensional corridor, as SAT
//!
//! Three variable blocks, laid out in this order:
//!
//! * `worker(t, c)` for `t in 0..=T`, `c in 0..C`: the worker stands on `c` at time `t`
//! * `box(t, c)`, same shape: cell `c` holds a box at time `t`
//! * `action(t, a)` for `t in 0..T`: action `a` is taken between `t` and `t + 1`,
//!   with `a` numbered move_right, move_left, push_right, push_left
//!
//! Every time step takes exactly one action, so a plan has exactly `T` steps.

use super::Reduction;
use crate::error::{PuzzleError, PuzzleResult};
use crate::sat::{exactly_one, frame_axiom, Assignment, BlockId, Clause, Cnf, VariableSpace};
use crate::search::corridor::CorridorAction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Planning request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningInput {
    pub worker: usize,
    pub boxes: Vec<usize>,
    pub goals: Vec<usize>,
    pub horizon: usize,
    pub track_length: usize,
}

/// One step of a decoded plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub time: usize,
    pub action: CorridorAction,
}

/// Time-ordered actions plus the worker position at every time step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
    pub worker_trace: Vec<usize>,
}

impl Plan {
    pub fn actions(&self) -> impl Iterator<Item = CorridorAction> + '_ {
        self.steps.iter().map(|s| s.action)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "t={:<3} {}", step.time, step.action)?;
        }
        Ok(())
    }
}

/// Validated planning instance
#[derive(Debug, Clone)]
pub struct PlanningReduction {
    input: PlanningInput,
    space: VariableSpace,
    worker: BlockId,
    boxes: BlockId,
    action: BlockId,
}

fn position_set(kind: &str, positions: &[usize], track_length: usize) -> PuzzleResult<BTreeSet<usize>> {
    let mut set = BTreeSet::new();
    for &p in positions {
        if p >= track_length {
            return Err(PuzzleError::invalid(format!(
                "{} position {} is outside the track 0..{}",
                kind, p, track_length
            )));
        }
        if !set.insert(p) {
            return Err(PuzzleError::invalid(format!("{} position {} is listed twice", kind, p)));
        }
    }
    Ok(set)
}

impl PlanningReduction {
    pub fn new(input: PlanningInput) -> PuzzleResult<Self> {
        let track = input.track_length;
        if track == 0 {
            return Err(PuzzleError::invalid("the track has no cells"));
        }
        if input.horizon == 0 {
            return Err(PuzzleError::invalid(
                "horizon 0 leaves no action variables; use the search engine for a zero-step check",
            ));
        }
        if input.worker >= track {
            return Err(PuzzleError::invalid(format!(
                "worker position {} is outside the track 0..{}",
                input.worker, track
            )));
        }
        let boxes = position_set("box", &input.boxes, track)?;
        let goals = position_set("goal", &input.goals, track)?;
        if boxes.len() != goals.len() {
            return Err(PuzzleError::invalid(format!(
                "{} boxes but {} goals",
                boxes.len(),
                goals.len()
            )));
        }
        if boxes.contains(&input.worker) {
            return Err(PuzzleError::invalid(format!(
                "the worker starts on the box at {}",
                input.worker
            )));
        }

        let times = input.horizon + 1;
        let mut space = VariableSpace::new();
        let worker = space.add_block("worker", &[times, track])?;
        let boxes = space.add_block("box", &[times, track])?;
        let action = space.add_block("action", &[input.horizon, CorridorAction::PLANNING_ORDER.len()])?;

        Ok(Self {
            input,
            space,
            worker,
            boxes,
            action,
        })
    }

    pub fn input(&self) -> &PlanningInput {
        &self.input
    }

    fn w(&self, time: usize, cell: usize) -> PuzzleResult<i32> {
        self.space.var(self.worker, &[time, cell])
    }

    fn b(&self, time: usize, cell: usize) -> PuzzleResult<i32> {
        self.space.var(self.boxes, &[time, cell])
    }

    fn a(&self, time: usize, action: CorridorAction) -> PuzzleResult<i32> {
        self.space.var(self.action, &[time, action.planning_index()])
    }

    /// Box cells kept unchanged from `t` to `t + 1`, skipping `except`
    fn box_frame(&self, time: usize, except: &[usize]) -> PuzzleResult<Vec<(i32, i32)>> {
        (0..self.input.track_length)
            .filter(|cell| !except.contains(cell))
            .map(|cell| Ok((self.b(time, cell)?, self.b(time + 1, cell)?)))
            .collect()
    }

    fn header(&self, cnf: &mut Cnf) {
        let list = |v: &[usize]| v.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(",");
        cnf.comment("Corridor box pushing SAT encoding");
        cnf.comment(format!(
            "worker={} boxes={{{}}} goals={{{}}} T={} C={}",
            self.input.worker,
            list(self.input.boxes.as_slice()),
            list(self.input.goals.as_slice()),
            self.input.horizon,
            self.input.track_length
        ));
        cnf.comment("Variable encoding:");
        cnf.comment("  worker(t,c) = t*C + c + 1");
        cnf.comment("  box(t,c)    = (T+1)*C + t*C + c + 1");
        cnf.comment("  action(t,a) = 2*(T+1)*C + t*4 + a + 1, a in {mr=0, ml=1, pr=2, pl=3}");
        cnf.comment("");
    }

    fn encode_transitions(&self, cnf: &mut Cnf, t: usize, c: usize) -> PuzzleResult<()> {
        use CorridorAction::*;

        let track = self.input.track_length;
        let w = self.w(t, c)?;
        let (mr, ml, pr, pl) = (
            self.a(t, MoveRight)?,
            self.a(t, MoveLeft)?,
            self.a(t, PushRight)?,
            self.a(t, PushLeft)?,
        );

        // Actions that would leave the track
        if c + 2 >= track {
            cnf.push(Clause::binary(-w, -pr));
        }
        if c < 2 {
            cnf.push(Clause::binary(-w, -pl));
        }
        if c + 1 >= track {
            cnf.push(Clause::binary(-w, -mr));
        }
        if c == 0 {
            cnf.push(Clause::binary(-w, -ml));
        }

        if c + 1 < track {
            cnf.push(Clause::new(vec![-w, -mr, -self.b(t, c + 1)?]));
            cnf.push(Clause::new(vec![-w, -mr, self.w(t + 1, c + 1)?]));
            cnf.extend(frame_axiom(&[w, mr], &self.box_frame(t, &[])?));
        }

        if c >= 1 {
            cnf.push(Clause::new(vec![-w, -ml, -self.b(t, c - 1)?]));
            cnf.push(Clause::new(vec![-w, -ml, self.w(t + 1, c - 1)?]));
            cnf.extend(frame_axiom(&[w, ml], &self.box_frame(t, &[])?));
        }

        if c + 2 < track {
            cnf.push(Clause::new(vec![-w, -pr, self.b(t, c + 1)?]));
            cnf.push(Clause::new(vec![-w, -pr, -self.b(t, c + 2)?]));
            cnf.push(Clause::new(vec![-w, -pr, self.w(t + 1, c + 1)?]));
            cnf.push(Clause::new(vec![-w, -pr, -self.b(t + 1, c + 1)?]));
            cnf.push(Clause::new(vec![-w, -pr, self.b(t + 1, c + 2)?]));
            cnf.extend(frame_axiom(&[w, pr], &self.box_frame(t, &[c + 1, c + 2])?));
        }

        if c >= 2 {
            cnf.push(Clause::new(vec![-w, -pl, self.b(t, c - 1)?]));
            cnf.push(Clause::new(vec![-w, -pl, -self.b(t, c - 2)?]));
            cnf.push(Clause::new(vec![-w, -pl, self.w(t + 1, c - 1)?]));
            cnf.push(Clause::new(vec![-w, -pl, -self.b(t + 1, c - 1)?]));
            cnf.push(Clause::new(vec![-w, -pl, self.b(t + 1, c - 2)?]));
            cnf.extend(frame_axiom(&[w, pl], &self.box_frame(t, &[c - 1, c - 2])?));
        }

        Ok(())
    }
}

impl Reduction for PlanningReduction {
    type Answer = Plan;

    fn name(&self) -> &'static str {
        "planning"
    }

    fn encode(&self) -> PuzzleResult<Cnf> {
        let (horizon, track) = (self.input.horizon, self.input.track_length);
        let mut cnf = Cnf::new(self.space.variable_count());
        self.header(&mut cnf);

        // Initial state
        cnf.push(Clause::unit(self.w(0, self.input.worker)?));
        for &b in &self.input.boxes {
            cnf.push(Clause::unit(self.b(0, b)?));
        }
        for c in (0..track).filter(|c| !self.input.boxes.contains(c)) {
            cnf.push(Clause::unit(-self.b(0, c)?));
        }

        // Goal
        for &g in &self.input.goals {
            cnf.push(Clause::unit(self.b(horizon, g)?));
        }

        // One worker position per time step
        for t in 0..=horizon {
            let cells = (0..track).map(|c| self.w(t, c)).collect::<PuzzleResult<Vec<_>>>()?;
            cnf.extend(exactly_one(&cells)?);
        }

        // One action per step
        for t in 0..horizon {
            let actions = CorridorAction::PLANNING_ORDER
                .iter()
                .map(|&a| self.a(t, a))
                .collect::<PuzzleResult<Vec<_>>>()?;
            cnf.extend(exactly_one(&actions)?);
        }

        for t in 0..horizon {
            for c in 0..track {
                self.encode_transitions(&mut cnf, t, c)?;
            }
        }

        Ok(cnf)
    }

    fn decode(&self, assignment: &Assignment) -> PuzzleResult<Plan> {
        let (horizon, track) = (self.input.horizon, self.input.track_length);

        let mut worker_trace = Vec::with_capacity(horizon + 1);
        for t in 0..=horizon {
            let mut cells = Vec::new();
            for c in 0..track {
                if assignment.is_true(self.w(t, c)?) {
                    cells.push(c);
                }
            }
            match cells.as_slice() {
                [cell] => worker_trace.push(*cell),
                _ => {
                    tracing::warn!(time = t, positions = cells.len(), "model does not place the worker once");
                    return Err(PuzzleError::internal(format!(
                        "time {} decoded with {} worker positions",
                        t,
                        cells.len()
                    )));
                }
            }
        }

        let mut steps = Vec::with_capacity(horizon);
        for t in 0..horizon {
            let mut chosen = Vec::new();
            for &action in &CorridorAction::PLANNING_ORDER {
                if assignment.is_true(self.a(t, action)?) {
                    chosen.push(action);
                }
            }
            match chosen.as_slice() {
                [action] => steps.push(PlanStep {
                    time: t,
                    action: *action,
                }),
                _ => {
                    tracing::warn!(time = t, actions = chosen.len(), "model does not pick one action");
                    return Err(PuzzleError::internal(format!(
                        "time {} decoded with {} actions",
                        t,
                        chosen.len()
                    )));
                }
            }
        }

        Ok(Plan { steps, worker_trace })
    }

    fn details(&self, answer: Option<&Plan>) -> BTreeMap<String, usize> {
        let mut details = BTreeMap::new();
        details.insert("horizon".to_string(), self.input.horizon);
        details.insert("num_cells".to_string(), self.input.track_length);
        if let Some(plan) = answer {
            details.insert("plan_length".to_string(), plan.len());
        }
        details
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduction::{solve_with, ReductionOutcome};
    use crate::sat::{CadicalGateway, SolverOptions};
    use crate::search::corridor::CorridorState;

    fn example(horizon: usize) -> PlanningInput {
        PlanningInput {
            worker: 6,
            boxes: vec![2, 9],
            goals: vec![1, 10],
            horizon,
            track_length: 11,
        }
    }

    fn solve(input: PlanningInput) -> ReductionOutcome<Plan> {
        let reduction = PlanningReduction::new(input).unwrap();
        let mut solver = CadicalGateway::new();
        solve_with(&reduction, &mut solver, &SolverOptions::default())
            .unwrap()
            .outcome
    }

    #[test]
    fn test_variable_layout() {
        let reduction = PlanningReduction::new(example(15)).unwrap();
        let (t, c) = (15usize, 11usize);

        assert_eq!(reduction.w(0, 6).unwrap(), 7);
        assert_eq!(reduction.w(3, 4).unwrap(), (3 * c + 4 + 1) as i32);
        assert_eq!(reduction.b(2, 9).unwrap(), ((t + 1) * c + 2 * c + 9 + 1) as i32);
        assert_eq!(
            reduction.a(4, CorridorAction::PushRight).unwrap(),
            (2 * (t + 1) * c + 4 * 4 + 2 + 1) as i32
        );
        assert_eq!(
            reduction.encode().unwrap().variable_count(),
            2 * (t + 1) * c + t * 4
        );
    }

    #[test]
    fn test_leading_clauses() {
        let reduction = PlanningReduction::new(example(15)).unwrap();
        let cnf = reduction.encode().unwrap();
        let clauses = cnf.clauses();
        let box_base = 16 * 11;

        assert_eq!(clauses[0].literals, vec![7]);
        assert_eq!(clauses[1].literals, vec![box_base + 3]);
        assert_eq!(clauses[2].literals, vec![box_base + 10]);
        // 9 empty cells at t=0, then the two goals at T
        assert_eq!(clauses[3].literals, vec![-(box_base + 1)]);
        assert_eq!(clauses[12].literals, vec![box_base + 15 * 11 + 2]);
        assert_eq!(clauses[13].literals, vec![box_base + 15 * 11 + 11]);
        assert_eq!(clauses[14].literals, (1..=11).collect::<Vec<i32>>());
    }

    #[test]
    fn test_move_guards_at_track_ends() {
        let reduction = PlanningReduction::new(PlanningInput {
            worker: 0,
            boxes: vec![],
            goals: vec![],
            horizon: 1,
            track_length: 2,
        })
        .unwrap();
        let cnf = reduction.encode().unwrap();
        let (w0, w1) = (reduction.w(0, 0).unwrap(), reduction.w(0, 1).unwrap());
        let ml = reduction.a(0, CorridorAction::MoveLeft).unwrap();
        let mr = reduction.a(0, CorridorAction::MoveRight).unwrap();

        assert!(cnf.clauses().contains(&Clause::binary(-w0, -ml)));
        assert!(cnf.clauses().contains(&Clause::binary(-w1, -mr)));
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let reduction = PlanningReduction::new(example(15)).unwrap();
        assert_eq!(
            reduction.encode().unwrap().to_dimacs(),
            reduction.encode().unwrap().to_dimacs()
        );
    }

    #[test]
    fn test_invalid_inputs() {
        let reject = |input: PlanningInput| {
            assert!(matches!(
                PlanningReduction::new(input),
                Err(PuzzleError::InvalidInput { .. })
            ))
        };

        reject(PlanningInput { horizon: 0, ..example(0) });
        reject(PlanningInput { track_length: 0, ..example(15) });
        reject(PlanningInput { worker: 11, ..example(15) });
        reject(PlanningInput { worker: 2, ..example(15) });
        reject(PlanningInput { boxes: vec![2, 11], ..example(15) });
        reject(PlanningInput { goals: vec![1], ..example(15) });
        reject(PlanningInput { boxes: vec![2, 2], ..example(15) });
    }

    #[test]
    fn test_example_plan_replays_to_goal() {
        let plan = match solve(example(15)) {
            ReductionOutcome::Satisfiable(plan) => plan,
            ReductionOutcome::Unsatisfiable => panic!("the example has a 10-step plan"),
        };
        assert_eq!(plan.len(), 15);
        assert_eq!(plan.worker_trace.len(), 16);
        assert_eq!(plan.worker_trace[0], 6);

        let mut state = CorridorState::new(6, vec![2, 9], 11).unwrap();
        for (step, action) in plan.actions().enumerate() {
            state = state
                .apply(action)
                .unwrap_or_else(|| panic!("step {} ({}) is illegal from {:?}", step, action, state));
            assert_eq!(state.worker(), plan.worker_trace[step + 1]);
        }
        assert_eq!(state.boxes(), &[1, 10]);
    }

    #[test]
    fn test_horizon_too_short() {
        assert_eq!(solve(example(9)), ReductionOutcome::Unsatisfiable);
    }

    #[test]
    fn test_shortest_horizon() {
        assert!(solve(example(10)).is_satisfiable());
    }

    #[test]
    fn test_worker_cannot_walk_off_the_track() {
        // Without the end-of-track guards a model could pick move_left at cell 0
        // and teleport the worker anywhere.
        let input = PlanningInput {
            worker: 0,
            boxes: vec![3],
            goals: vec![4],
            horizon: 2,
            track_length: 5,
        };
        assert_eq!(solve(input), ReductionOutcome::Unsatisfiable);
    }
}
