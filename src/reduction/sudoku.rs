//! 9×9 Sudoku as SAT
//!
//! Variable `x(r, c, v)` (all 1-based) is `(r-1)*81 + (c-1)*9 + v`.

use super::Reduction;
use crate::error::{PuzzleError, PuzzleResult};
use crate::sat::{at_least_one, at_most_one, exactly_one, Assignment, BlockId, Clause, Cnf, VariableSpace};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const SIZE: usize = 9;
const BOX: usize = 3;

/// A 9×9 grid, 0 marks an empty cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<i64>>", into = "Vec<Vec<u8>>")]
pub struct SudokuGrid {
    cells: [[u8; SIZE]; SIZE],
}

impl SudokuGrid {
    /// Check dimensions and values (0..=9) of a raw grid
    pub fn from_rows(rows: &[Vec<i64>]) -> PuzzleResult<Self> {
        if rows.len() != SIZE {
            return Err(PuzzleError::invalid(format!(
                "the grid must be 9x9, got {} rows",
                rows.len()
            )));
        }

        let mut cells = [[0u8; SIZE]; SIZE];
        for (r, row) in rows.iter().enumerate() {
            if row.len() != SIZE {
                return Err(PuzzleError::invalid(format!(
                    "the grid must be 9x9, row {} has {} cells",
                    r + 1,
                    row.len()
                )));
            }
            for (c, &value) in row.iter().enumerate() {
                if !(0..=SIZE as i64).contains(&value) {
                    return Err(PuzzleError::invalid(format!(
                        "invalid value {} at ({}, {}): values must be between 0 (empty) and 9",
                        value,
                        r + 1,
                        c + 1
                    )));
                }
                cells[r][c] = value as u8;
            }
        }
        Ok(Self { cells })
    }

    /// Value at 0-based `(row, col)`, 0 when empty
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row][col]
    }

    pub fn row(&self, row: usize) -> [u8; SIZE] {
        self.cells[row]
    }

    pub fn filled_cells(&self) -> usize {
        self.cells.iter().flatten().filter(|&&v| v != 0).count()
    }

    /// Every row, column and box holds 1..=9 exactly once
    pub fn is_solved(&self) -> bool {
        (0..SIZE).all(|i| {
            let (br, bc) = (i / BOX * BOX, i % BOX * BOX);
            holds_each_value((0..SIZE).map(|j| self.cells[i][j]))
                && holds_each_value((0..SIZE).map(|j| self.cells[j][i]))
                && holds_each_value((0..SIZE).map(|j| self.cells[br + j / BOX][bc + j % BOX]))
        })
    }

    /// Every non-empty cell of `clues` holds the same value here
    pub fn preserves(&self, clues: &SudokuGrid) -> bool {
        (0..SIZE).all(|r| (0..SIZE).all(|c| clues.cells[r][c] == 0 || clues.cells[r][c] == self.cells[r][c]))
    }
}

fn holds_each_value(values: impl Iterator<Item = u8>) -> bool {
    let mut seen = [false; SIZE + 1];
    for v in values {
        if v == 0 || seen[v as usize] {
            return false;
        }
        seen[v as usize] = true;
    }
    true
}

impl TryFrom<Vec<Vec<i64>>> for SudokuGrid {
    type Error = PuzzleError;

    fn try_from(rows: Vec<Vec<i64>>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

impl From<SudokuGrid> for Vec<Vec<u8>> {
    fn from(grid: SudokuGrid) -> Self {
        grid.cells.iter().map(|row| row.to_vec()).collect()
    }
}

impl fmt::Display for SudokuGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.iter().enumerate() {
            if r > 0 && r % BOX == 0 {
                writeln!(f, "------+-------+------")?;
            }
            let mut line = String::new();
            for (c, &v) in row.iter().enumerate() {
                if c > 0 && c % BOX == 0 {
                    line.push_str("| ");
                }
                line.push(if v == 0 { '.' } else { char::from(b'0' + v) });
                line.push(' ');
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

/// Sudoku instance ready to encode
#[derive(Debug, Clone)]
pub struct SudokuReduction {
    clues: SudokuGrid,
    space: VariableSpace,
    cell_value: BlockId,
}

impl SudokuReduction {
    pub fn new(clues: SudokuGrid) -> PuzzleResult<Self> {
        let mut space = VariableSpace::new();
        let cell_value = space.add_block("cell_value", &[SIZE, SIZE, SIZE])?;
        Ok(Self {
            clues,
            space,
            cell_value,
        })
    }

    pub fn clues(&self) -> &SudokuGrid {
        &self.clues
    }

    /// Id of "cell (row, col) holds value", all 0-based
    fn var(&self, row: usize, col: usize, value: usize) -> PuzzleResult<i32> {
        self.space.var(self.cell_value, &[row, col, value])
    }

    fn literals(&self, cells: impl Iterator<Item = (usize, usize, usize)>) -> PuzzleResult<Vec<i32>> {
        cells.map(|(r, c, v)| self.var(r, c, v)).collect()
    }

    /// Every variable of the formula, for enumerating distinct solutions
    pub fn projection(&self) -> Vec<i32> {
        (1..=self.space.variable_count() as i32).collect()
    }

    fn header(&self, cnf: &mut Cnf) {
        cnf.comment("Sudoku SAT encoding");
        cnf.comment("");
        cnf.comment("Variable encoding: x_{r,c,v} = (r-1)*81 + (c-1)*9 + v");
        cnf.comment("  where r,c,v in {1..9}");
        cnf.comment("  x_{r,c,v} = true means cell (r,c) contains value v");
        cnf.comment("");
        cnf.comment("Initial grid:");
        for r in 0..SIZE {
            let row: Vec<String> = self
                .clues
                .row(r)
                .iter()
                .map(|&v| if v == 0 { ".".to_string() } else { v.to_string() })
                .collect();
            cnf.comment(format!("  Row {}: {}", r + 1, row.join(" ")));
        }
        cnf.comment("");
    }
}

impl Reduction for SudokuReduction {
    type Answer = SudokuGrid;

    fn name(&self) -> &'static str {
        "sudoku"
    }

    fn encode(&self) -> PuzzleResult<Cnf> {
        let mut cnf = Cnf::new(self.space.variable_count());
        self.header(&mut cnf);

        // Cells: one value each, all ALO clauses before the AMO clauses
        for r in 0..SIZE {
            for c in 0..SIZE {
                cnf.push(at_least_one(&self.literals((0..SIZE).map(|v| (r, c, v)))?)?);
            }
        }
        for r in 0..SIZE {
            for c in 0..SIZE {
                cnf.extend(at_most_one(&self.literals((0..SIZE).map(|v| (r, c, v)))?));
            }
        }

        // Rows
        for r in 0..SIZE {
            for v in 0..SIZE {
                cnf.extend(exactly_one(&self.literals((0..SIZE).map(|c| (r, c, v)))?)?);
            }
        }

        // Columns
        for c in 0..SIZE {
            for v in 0..SIZE {
                cnf.extend(exactly_one(&self.literals((0..SIZE).map(|r| (r, c, v)))?)?);
            }
        }

        // Boxes, cells row-major inside each box
        for box_row in 0..BOX {
            for box_col in 0..BOX {
                for v in 0..SIZE {
                    let cells = (0..BOX * BOX).map(|i| (box_row * BOX + i / BOX, box_col * BOX + i % BOX, v));
                    cnf.extend(exactly_one(&self.literals(cells)?)?);
                }
            }
        }

        // Clues
        for r in 0..SIZE {
            for c in 0..SIZE {
                let value = self.clues.get(r, c);
                if value != 0 {
                    cnf.push(Clause::unit(self.var(r, c, value as usize - 1)?));
                }
            }
        }

        Ok(cnf)
    }

    fn decode(&self, assignment: &Assignment) -> PuzzleResult<SudokuGrid> {
        let mut cells = [[0u8; SIZE]; SIZE];
        for r in 0..SIZE {
            for c in 0..SIZE {
                let mut values = Vec::new();
                for v in 0..SIZE {
                    if assignment.is_true(self.var(r, c, v)?) {
                        values.push(v as u8 + 1);
                    }
                }
                match values.as_slice() {
                    [value] => cells[r][c] = *value,
                    _ => {
                        tracing::warn!(row = r + 1, col = c + 1, values = values.len(), "model does not fill cell exactly once");
                        return Err(PuzzleError::internal(format!(
                            "cell ({}, {}) decoded with {} values",
                            r + 1,
                            c + 1,
                            values.len()
                        )));
                    }
                }
            }
        }
        Ok(SudokuGrid { cells })
    }

    fn details(&self, _answer: Option<&SudokuGrid>) -> BTreeMap<String, usize> {
        let filled = self.clues.filled_cells();
        let mut details = BTreeMap::new();
        details.insert("filled_cells".to_string(), filled);
        details.insert("empty_cells".to_string(), SIZE * SIZE - filled);
        details
    }
}
