//! Graph coloring as SAT
//!
//! Variable `x(v, c)` holds when vertex `v` takes color `c`; ids follow
//! `v_idx * |K| + c_idx + 1`.

use super::Reduction;
use crate::error::{PuzzleError, PuzzleResult};
use crate::sat::{at_least_one, at_most_one, Assignment, BlockId, Clause, Cnf, VariableSpace};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Raw coloring request: vertex names, undirected edges, color names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColoringInput {
    pub vertices: Vec<String>,
    pub edges: Vec<(String, String)>,
    pub colors: Vec<String>,
}

/// Color chosen for every vertex, in vertex declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coloring {
    pub phi: Vec<(String, String)>,
}

impl Coloring {
    pub fn color_of(&self, vertex: &str) -> Option<&str> {
        self.phi
            .iter()
            .find(|(v, _)| v == vertex)
            .map(|(_, c)| c.as_str())
    }

    /// Number of distinct colors actually used
    pub fn colors_used(&self) -> usize {
        self.phi.iter().map(|(_, c)| c).collect::<HashSet<_>>().len()
    }
}

/// Validated coloring instance
#[derive(Debug, Clone)]
pub struct GraphColoring {
    input: ColoringInput,
    edges: Vec<(usize, usize)>,
    space: VariableSpace,
    vertex_color: BlockId,
}

fn unique_index(kind: &str, names: &[String]) -> PuzzleResult<HashMap<String, usize>> {
    if names.is_empty() {
        return Err(PuzzleError::invalid(format!("the {} list is empty", kind)));
    }
    let mut index = HashMap::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        if index.insert(name.clone(), i).is_some() {
            return Err(PuzzleError::invalid(format!("{} '{}' is declared twice", kind, name)));
        }
    }
    Ok(index)
}

impl GraphColoring {
    pub fn new(input: ColoringInput) -> PuzzleResult<Self> {
        let vertex_index = unique_index("vertex", &input.vertices)?;
        unique_index("color", &input.colors)?;

        let mut edges = Vec::with_capacity(input.edges.len());
        for (u, v) in &input.edges {
            match (vertex_index.get(u), vertex_index.get(v)) {
                (Some(&a), Some(&b)) => edges.push((a, b)),
                _ => {
                    return Err(PuzzleError::invalid(format!(
                        "edge ({}, {}) names a vertex outside V",
                        u, v
                    )))
                }
            }
        }

        let mut space = VariableSpace::new();
        let vertex_color = space.add_block("vertex_color", &[input.vertices.len(), input.colors.len()])?;

        Ok(Self {
            input,
            edges,
            space,
            vertex_color,
        })
    }

    pub fn input(&self) -> &ColoringInput {
        &self.input
    }

    fn var(&self, vertex: usize, color: usize) -> PuzzleResult<i32> {
        self.space.var(self.vertex_color, &[vertex, color])
    }

    fn vertex_literals(&self, vertex: usize) -> PuzzleResult<Vec<i32>> {
        (0..self.input.colors.len()).map(|c| self.var(vertex, c)).collect()
    }

    fn header(&self, cnf: &mut Cnf) -> PuzzleResult<()> {
        let edges: Vec<String> = self
            .input
            .edges
            .iter()
            .map(|(u, v)| format!("{{{},{}}}", u, v))
            .collect();
        cnf.comment(format!(
            "Graph coloring for G = (V,E) with V={{{}}}, E={{{}}}",
            self.input.vertices.join(","),
            edges.join(",")
        ));
        cnf.comment(format!("Colors K = {{{}}}", self.input.colors.join(",")));
        cnf.comment("");
        cnf.comment("Variable mapping:");
        for (v, vertex) in self.input.vertices.iter().enumerate() {
            for (c, color) in self.input.colors.iter().enumerate() {
                cnf.comment(format!("{:2} = {}_{}", self.var(v, c)?, vertex, color));
            }
        }
        cnf.comment("");
        Ok(())
    }
}

impl Reduction for GraphColoring {
    type Answer = Coloring;

    fn name(&self) -> &'static str {
        "graph_coloring"
    }

    fn encode(&self) -> PuzzleResult<Cnf> {
        let mut cnf = Cnf::new(self.space.variable_count());
        self.header(&mut cnf)?;

        let vertices = 0..self.input.vertices.len();

        // Every vertex gets a color
        for v in vertices.clone() {
            cnf.push(at_least_one(&self.vertex_literals(v)?)?);
        }
        // and no more than one
        for v in vertices {
            cnf.extend(at_most_one(&self.vertex_literals(v)?));
        }
        // Adjacent vertices differ
        for &(u, v) in &self.edges {
            for c in 0..self.input.colors.len() {
                cnf.push(Clause::binary(-self.var(u, c)?, -self.var(v, c)?));
            }
        }

        Ok(cnf)
    }

    fn decode(&self, assignment: &Assignment) -> PuzzleResult<Coloring> {
        let mut phi = Vec::with_capacity(self.input.vertices.len());
        for (v, vertex) in self.input.vertices.iter().enumerate() {
            let mut chosen = Vec::new();
            for c in 0..self.input.colors.len() {
                if assignment.is_true(self.var(v, c)?) {
                    chosen.push(c);
                }
            }
            match chosen.as_slice() {
                [c] => phi.push((vertex.clone(), self.input.colors[*c].clone())),
                _ => {
                    tracing::warn!(vertex = %vertex, colors = chosen.len(), "model does not color vertex exactly once");
                    return Err(PuzzleError::internal(format!(
                        "vertex {} decoded with {} colors",
                        vertex,
                        chosen.len()
                    )));
                }
            }
        }
        Ok(Coloring { phi })
    }

    fn details(&self, answer: Option<&Coloring>) -> BTreeMap<String, usize> {
        let mut details = BTreeMap::new();
        details.insert("nb_vertices".to_string(), self.input.vertices.len());
        details.insert("nb_edges".to_string(), self.input.edges.len());
        details.insert("nb_colors".to_string(), self.input.colors.len());
        if let Some(coloring) = answer {
            details.insert("colors_used".to_string(), coloring.colors_used());
        }
        details
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduction::{solve_with, ReductionOutcome};
    use crate::sat::{CadicalGateway, SolverOptions};

    fn example(colors: &[&str]) -> ColoringInput {
        let edge = |u: &str, v: &str| (u.to_string(), v.to_string());
        ColoringInput {
            vertices: ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect(),
            edges: vec![
                edge("A", "B"),
                edge("A", "C"),
                edge("B", "C"),
                edge("B", "D"),
                edge("C", "D"),
            ],
            colors: colors.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_variable_numbering() {
        let reduction = GraphColoring::new(example(&["r", "v", "b"])).unwrap();
        assert_eq!(reduction.var(0, 0).unwrap(), 1);
        assert_eq!(reduction.var(1, 2).unwrap(), 6);
        assert_eq!(reduction.var(3, 2).unwrap(), 12);
    }

    #[test]
    fn test_clause_layout() {
        let reduction = GraphColoring::new(example(&["r", "v", "b"])).unwrap();
        let cnf = reduction.encode().unwrap();

        // 4 ALO + 4*3 AMO + 5 edges * 3 colors
        assert_eq!(cnf.variable_count(), 12);
        assert_eq!(cnf.clause_count(), 4 + 12 + 15);
        assert_eq!(cnf.clauses()[0].literals, vec![1, 2, 3]);
        assert_eq!(cnf.clauses()[3].literals, vec![10, 11, 12]);
        assert_eq!(cnf.clauses()[4].literals, vec![-1, -2]);
        // first edge (A,B), color r
        assert_eq!(cnf.clauses()[16].literals, vec![-1, -4]);
    }

    #[test]
    fn test_dimacs_header() {
        let reduction = GraphColoring::new(example(&["r", "v"])).unwrap();
        let dimacs = reduction.encode().unwrap().to_dimacs();
        let mut lines = dimacs.lines();

        assert_eq!(
            lines.next(),
            Some("c Graph coloring for G = (V,E) with V={A,B,C,D}, E={{A,B},{A,C},{B,C},{B,D},{C,D}}")
        );
        assert_eq!(lines.next(), Some("c Colors K = {r,v}"));
        assert!(dimacs.contains("c  1 = A_r\n"));
        assert!(dimacs.contains("c  8 = D_v\n"));
        assert!(dimacs.contains("p cnf 8 "));
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let reduction = GraphColoring::new(example(&["r", "v", "b"])).unwrap();
        assert_eq!(
            reduction.encode().unwrap().to_dimacs(),
            reduction.encode().unwrap().to_dimacs()
        );
    }

    #[test]
    fn test_invalid_inputs() {
        let mut no_vertices = example(&["r"]);
        no_vertices.vertices.clear();
        no_vertices.edges.clear();
        assert!(matches!(GraphColoring::new(no_vertices), Err(PuzzleError::InvalidInput { .. })));

        assert!(GraphColoring::new(example(&[])).is_err());

        let mut bad_edge = example(&["r", "v", "b"]);
        bad_edge.edges.push(("A".into(), "Z".into()));
        let err = GraphColoring::new(bad_edge).unwrap_err();
        assert!(err.to_string().contains("(A, Z)"));

        assert!(GraphColoring::new(example(&["r", "r"])).is_err());
    }

    #[test]
    fn test_decode_rejects_double_color() {
        let reduction = GraphColoring::new(example(&["r", "v", "b"])).unwrap();
        let assignment = Assignment::from_literals(&[1, 2, 4, 9, 10]);
        assert!(matches!(
            reduction.decode(&assignment),
            Err(PuzzleError::EncodingInternal { .. })
        ));
    }

    #[test]
    fn test_decode_proper_model() {
        let reduction = GraphColoring::new(example(&["r", "v", "b"])).unwrap();
        // A=r, B=v, C=b, D=r
        let assignment = Assignment::from_literals(&[1, 5, 9, 10]);
        let coloring = reduction.decode(&assignment).unwrap();
        assert_eq!(
            coloring.phi,
            vec![
                ("A".to_string(), "r".to_string()),
                ("B".to_string(), "v".to_string()),
                ("C".to_string(), "b".to_string()),
                ("D".to_string(), "r".to_string()),
            ]
        );
    }

    #[test]
    fn test_three_colors_satisfiable() {
        let reduction = GraphColoring::new(example(&["r", "v", "b"])).unwrap();
        let mut solver = CadicalGateway::new();
        let report = solve_with(&reduction, &mut solver, &SolverOptions::default()).unwrap();

        let coloring = match report.outcome {
            ReductionOutcome::Satisfiable(coloring) => coloring,
            ReductionOutcome::Unsatisfiable => panic!("expected a coloring"),
        };
        for (u, v) in &reduction.input().edges {
            assert_ne!(coloring.color_of(u), coloring.color_of(v), "edge ({}, {})", u, v);
        }
        assert_eq!(coloring.phi.len(), 4);
        assert_eq!(report.stats.details["colors_used"], 3);
        assert_eq!(report.stats.details["nb_edges"], 5);
    }

    #[test]
    fn test_two_colors_unsatisfiable() {
        let reduction = GraphColoring::new(example(&["r", "v"])).unwrap();
        let mut solver = CadicalGateway::new();
        let report = solve_with(&reduction, &mut solver, &SolverOptions::default()).unwrap();

        assert_eq!(report.outcome, ReductionOutcome::Unsatisfiable);
        assert!(!report.stats.details.contains_key("colors_used"));
    }
}
