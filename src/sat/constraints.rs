//! Clause generation primitives and the CNF container
//!
//! The cardinality helpers work on literals that the caller has already
//! numbered through a [`VariableSpace`](super::VariableSpace), so the same
//! helpers serve every reduction.

use crate::error::{PuzzleError, PuzzleResult};
use itertools::Itertools;

/// Represents a SAT clause (disjunction of literals)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clause {
    pub literals: Vec<i32>, // Positive for variable, negative for negation
}

impl Clause {
    /// Create a new clause from literals
    pub fn new(literals: Vec<i32>) -> Self {
        Self { literals }
    }

    /// Create a unit clause (single literal)
    pub fn unit(literal: i32) -> Self {
        Self { literals: vec![literal] }
    }

    /// Create a binary clause (two literals)
    pub fn binary(lit1: i32, lit2: i32) -> Self {
        Self { literals: vec![lit1, lit2] }
    }

    /// Check if clause is empty (unsatisfiable)
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Check if clause is unit
    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }
}

/// At least one of `literals` holds: a single clause with every literal.
///
/// An empty set would produce the empty clause, so it is rejected here;
/// reductions validate their domains before reaching this point.
pub fn at_least_one(literals: &[i32]) -> PuzzleResult<Clause> {
    if literals.is_empty() {
        return Err(PuzzleError::invalid("at-least-one over an empty domain"));
    }
    Ok(Clause::new(literals.to_vec()))
}

/// At most one of `literals` holds, pairwise encoding.
///
/// Emits `(¬i ∨ ¬j)` for every pair in input order, so the clause count is
/// `n(n-1)/2`. Fine for the small domains used here (at most nine values or
/// four actions); large domains would want a sequential counter instead.
pub fn at_most_one(literals: &[i32]) -> Vec<Clause> {
    literals
        .iter()
        .tuple_combinations()
        .map(|(&a, &b)| Clause::binary(-a, -b))
        .collect()
}

/// Exactly one of `literals` holds: the at-least-one clause followed by the pairwise exclusions
pub fn exactly_one(literals: &[i32]) -> PuzzleResult<Vec<Clause>> {
    let mut clauses = Vec::with_capacity(1 + literals.len() * literals.len().saturating_sub(1) / 2);
    clauses.push(at_least_one(literals)?);
    clauses.extend(at_most_one(literals));
    Ok(clauses)
}

/// `premises[0] ∧ … ∧ premises[n-1] → conclusion` as one clause
pub fn implication(premises: &[i32], conclusion: i32) -> Clause {
    let mut literals: Vec<i32> = premises.iter().map(|&p| -p).collect();
    literals.push(conclusion);
    Clause::new(literals)
}

/// Frame axiom: while every literal of `condition` holds, each `(now, next)`
/// pair keeps its value across the step.
///
/// For every pair emits `(¬C ∨ ¬now ∨ next)` then `(¬C ∨ now ∨ ¬next)`.
pub fn frame_axiom(condition: &[i32], pairs: &[(i32, i32)]) -> Vec<Clause> {
    let negated: Vec<i32> = condition.iter().map(|&c| -c).collect();
    let mut clauses = Vec::with_capacity(pairs.len() * 2);

    for &(now, next) in pairs {
        let mut keep_true = negated.clone();
        keep_true.extend([-now, next]);
        clauses.push(Clause::new(keep_true));

        let mut keep_false = negated.clone();
        keep_false.extend([now, -next]);
        clauses.push(Clause::new(keep_false));
    }

    clauses
}

/// A CNF instance: clauses in insertion order plus the declared variable count
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf {
    variable_count: usize,
    clauses: Vec<Clause>,
    comments: Vec<String>,
}

impl Cnf {
    pub fn new(variable_count: usize) -> Self {
        Self {
            variable_count,
            clauses: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    pub fn extend(&mut self, clauses: impl IntoIterator<Item = Clause>) {
        self.clauses.extend(clauses);
    }

    /// Add a header comment line (rendered before the `p cnf` line)
    pub fn comment(&mut self, line: impl Into<String>) {
        self.comments.push(line.into());
    }

    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Check that no clause is empty and every literal names a declared variable
    pub fn validate(&self) -> PuzzleResult<()> {
        if self.variable_count == 0 {
            return Err(PuzzleError::internal("CNF declares no variables"));
        }

        for (index, clause) in self.clauses.iter().enumerate() {
            if clause.is_empty() {
                return Err(PuzzleError::internal(format!("clause {} is empty", index)));
            }
            if let Some(&lit) = clause
                .literals
                .iter()
                .find(|&&lit| lit == 0 || lit.unsigned_abs() as usize > self.variable_count)
            {
                return Err(PuzzleError::internal(format!(
                    "clause {} holds literal {} outside 1..={}",
                    index, lit, self.variable_count
                )));
            }
        }
        Ok(())
    }

    /// Render in DIMACS format. Comments come first because some solvers
    /// reject comment lines after the problem line.
    pub fn to_dimacs(&self) -> String {
        let mut out = String::new();
        for comment in &self.comments {
            if comment.is_empty() {
                out.push_str("c\n");
            } else {
                out.push_str(&format!("c {}\n", comment));
            }
        }
        out.push_str(&format!("p cnf {} {}\n", self.variable_count, self.clauses.len()));
        for clause in &self.clauses {
            let literals: Vec<String> = clause.literals.iter().map(|lit| lit.to_string()).collect();
            out.push_str(&literals.join(" "));
            out.push_str(if literals.is_empty() { "0\n" } else { " 0\n" });
        }
        out
    }
}
