//! SAT building blocks shared by every reduction

pub mod constraints;
pub mod solver;
pub mod variables;

pub use constraints::{at_least_one, at_most_one, exactly_one, frame_axiom, implication, Clause, Cnf};
pub use solver::{Assignment, CadicalGateway, SolverGateway, SolverOptions, SolverResponse, Verdict};
pub use variables::{BlockId, VariableCodec, VariableSpace, VariableStatistics};
