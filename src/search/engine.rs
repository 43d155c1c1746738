//! Uninformed and informed graph search over a [`SearchProblem`]
//!
//! Every call owns its frontier, explored set and node arena. Nodes keep a
//! parent index into the arena; the path is rebuilt from those links only
//! once a goal is reached.

use super::{Algorithm, SearchProblem};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet, VecDeque};
use std::rc::Rc;

/// Counters gathered by one search call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Frontier entries taken out and goal tested
    pub nodes_explored: usize,
    /// Frontier insertions, the initial node excluded
    pub nodes_generated: usize,
    pub max_frontier_size: usize,
    /// Depth bound of the reported DFS iteration, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth_limit: Option<usize>,
}

impl std::fmt::Display for SearchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "explored {}, generated {}, max frontier {}",
            self.nodes_explored, self.nodes_generated, self.max_frontier_size
        )?;
        if let Some(limit) = self.depth_limit {
            write!(f, ", depth limit {}", limit)?;
        }
        Ok(())
    }
}

/// A path from the initial state: each step is the action taken and the state it leads to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPath<S, A> {
    pub start: S,
    pub steps: Vec<(A, S)>,
}

impl<S, A> SearchPath<S, A> {
    /// Number of actions; zero when the initial state is already a goal
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn actions(&self) -> impl Iterator<Item = &A> + '_ {
        self.steps.iter().map(|(a, _)| a)
    }

    /// Every state along the path, the start included
    pub fn states(&self) -> impl Iterator<Item = &S> + '_ {
        std::iter::once(&self.start).chain(self.steps.iter().map(|(_, s)| s))
    }

    pub fn last_state(&self) -> &S {
        self.steps.last().map_or(&self.start, |(_, s)| s)
    }
}

/// Found path or exhaustion of the bounded search space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "path", rename_all = "snake_case")]
pub enum SearchOutcome<S, A> {
    Found(SearchPath<S, A>),
    NoSolution,
}

impl<S, A> SearchOutcome<S, A> {
    pub fn path(&self) -> Option<&SearchPath<S, A>> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            SearchOutcome::NoSolution => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult<S, A> {
    pub outcome: SearchOutcome<S, A>,
    pub stats: SearchStats,
}

/// Bounds for the depth-first family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchLimits {
    /// DFS expansion bound; `None` is unbounded
    pub max_depth: Option<usize>,
    /// IDDFS tries depth limits `0..iddfs_ceiling`
    pub iddfs_ceiling: usize,
}

struct Node<S, A> {
    state: Rc<S>,
    parent: Option<usize>,
    action: Option<A>,
    depth: usize,
}

struct Arena<S, A> {
    nodes: Vec<Node<S, A>>,
}

impl<S: Clone, A: Clone> Arena<S, A> {
    fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn root(&mut self, state: Rc<S>) -> usize {
        self.nodes.push(Node {
            state,
            parent: None,
            action: None,
            depth: 0,
        });
        self.nodes.len() - 1
    }

    fn child(&mut self, parent: usize, action: A, state: Rc<S>) -> usize {
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(Node {
            state,
            parent: Some(parent),
            action: Some(action),
            depth,
        });
        self.nodes.len() - 1
    }

    fn path(&self, mut index: usize) -> SearchPath<S, A> {
        let mut steps = Vec::with_capacity(self.nodes[index].depth);
        while let (Some(parent), Some(action)) = (self.nodes[index].parent, &self.nodes[index].action) {
            steps.push((action.clone(), (*self.nodes[index].state).clone()));
            index = parent;
        }
        steps.reverse();
        SearchPath {
            start: (*self.nodes[index].state).clone(),
            steps,
        }
    }
}

fn expand<P: SearchProblem>(problem: &P, state: &P::State) -> Vec<(P::Action, Rc<P::State>)> {
    problem
        .successors(state)
        .into_iter()
        .map(|(action, next)| (action, Rc::new(next)))
        .collect()
}

/// Breadth-first search. States are marked explored when enqueued, so
/// each state enters the queue once and the first path found is shortest.
pub fn bfs<P: SearchProblem>(problem: &P) -> SearchResult<P::State, P::Action> {
    let mut stats = SearchStats::default();
    let mut arena = Arena::new();
    let start = Rc::new(problem.initial_state());

    let mut explored: HashSet<Rc<P::State>> = HashSet::new();
    explored.insert(Rc::clone(&start));
    let mut frontier = VecDeque::from([arena.root(start)]);

    loop {
        stats.max_frontier_size = stats.max_frontier_size.max(frontier.len());
        let Some(index) = frontier.pop_front() else { break };
        stats.nodes_explored += 1;

        let state = Rc::clone(&arena.nodes[index].state);
        if problem.is_goal(&*state) {
            return found(arena.path(index), stats);
        }

        for (action, next) in expand(problem, &*state) {
            if explored.insert(Rc::clone(&next)) {
                frontier.push_back(arena.child(index, action, next));
                stats.nodes_generated += 1;
            }
        }
    }

    exhausted(stats)
}

/// Depth-limited depth-first search.
///
/// States are marked explored when popped; a state pushed several times is
/// expanded once and its later copies are dropped. Successors go on the
/// stack in reverse so they come off in declared order. A node at depth
/// `d` is expanded only while `d < max_depth`.
pub fn dfs<P: SearchProblem>(problem: &P, max_depth: Option<usize>) -> SearchResult<P::State, P::Action> {
    let mut stats = SearchStats {
        depth_limit: max_depth,
        ..SearchStats::default()
    };
    let mut arena = Arena::new();
    let mut explored: HashSet<Rc<P::State>> = HashSet::new();
    let mut frontier = vec![arena.root(Rc::new(problem.initial_state()))];

    loop {
        stats.max_frontier_size = stats.max_frontier_size.max(frontier.len());
        let Some(index) = frontier.pop() else { break };

        let state = Rc::clone(&arena.nodes[index].state);
        if !explored.insert(Rc::clone(&state)) {
            continue;
        }
        stats.nodes_explored += 1;

        if problem.is_goal(&*state) {
            return found(arena.path(index), stats);
        }

        let depth = arena.nodes[index].depth;
        if max_depth.map_or(true, |limit| depth < limit) {
            for (action, next) in expand(problem, &*state).into_iter().rev() {
                if !explored.contains(&*next) {
                    frontier.push(arena.child(index, action, next));
                    stats.nodes_generated += 1;
                }
            }
        }
    }

    exhausted(stats)
}

/// Iterative deepening: DFS with limits `0, 1, ..` below `ceiling`.
///
/// The statistics are those of the last DFS run only (the successful one,
/// or the one at `ceiling - 1`), not a total over all iterations.
pub fn iddfs<P: SearchProblem>(problem: &P, ceiling: usize) -> SearchResult<P::State, P::Action> {
    let mut last = SearchStats::default();
    for limit in 0..ceiling {
        let result = dfs(problem, Some(limit));
        if result.outcome.is_found() {
            tracing::debug!(limit, "iddfs found a goal");
            return result;
        }
        last = result.stats;
    }
    exhausted(last)
}

/// A* with unit action costs.
///
/// The heap is ordered by `(g + h, insertion counter)` so equal-`f` nodes
/// come out first-in first-out. A state is final once popped; stale heap
/// entries for it are skipped when they surface.
pub fn astar<P, H>(problem: &P, heuristic: H) -> SearchResult<P::State, P::Action>
where
    P: SearchProblem,
    H: Fn(&P::State) -> f64,
{
    let mut stats = SearchStats::default();
    let mut arena = Arena::new();
    let mut explored: HashSet<Rc<P::State>> = HashSet::new();

    let start = Rc::new(problem.initial_state());
    let mut counter: u64 = 0;
    let mut frontier = BinaryHeap::new();
    let h0 = heuristic(&*start);
    frontier.push(Reverse((OrderedFloat(h0), counter, arena.root(start))));

    loop {
        stats.max_frontier_size = stats.max_frontier_size.max(frontier.len());
        let Some(Reverse((_, _, index))) = frontier.pop() else { break };

        let state = Rc::clone(&arena.nodes[index].state);
        if !explored.insert(Rc::clone(&state)) {
            continue;
        }
        stats.nodes_explored += 1;

        if problem.is_goal(&*state) {
            return found(arena.path(index), stats);
        }

        let g = (arena.nodes[index].depth + 1) as f64;
        for (action, next) in expand(problem, &*state) {
            if !explored.contains(&*next) {
                let f = g + heuristic(&*next);
                counter += 1;
                frontier.push(Reverse((OrderedFloat(f), counter, arena.child(index, action, next))));
                stats.nodes_generated += 1;
            }
        }
    }

    exhausted(stats)
}

/// Run the selected algorithm. The heuristic is only consulted by A*.
pub fn search<P, H>(
    problem: &P,
    algorithm: Algorithm,
    limits: &SearchLimits,
    heuristic: H,
) -> SearchResult<P::State, P::Action>
where
    P: SearchProblem,
    H: Fn(&P::State) -> f64,
{
    let result = match algorithm {
        Algorithm::Bfs => bfs(problem),
        Algorithm::Dfs => dfs(problem, limits.max_depth),
        Algorithm::Iddfs => iddfs(problem, limits.iddfs_ceiling),
        Algorithm::Astar => astar(problem, heuristic),
    };

    tracing::info!(
        %algorithm,
        found = result.outcome.is_found(),
        length = result.outcome.path().map(|p| p.len()),
        explored = result.stats.nodes_explored,
        "search finished"
    );
    result
}

fn found<S, A>(path: SearchPath<S, A>, stats: SearchStats) -> SearchResult<S, A> {
    SearchResult {
        outcome: SearchOutcome::Found(path),
        stats,
    }
}

fn exhausted<S, A>(stats: SearchStats) -> SearchResult<S, A> {
    SearchResult {
        outcome: SearchOutcome::NoSolution,
        stats,
    }
}
