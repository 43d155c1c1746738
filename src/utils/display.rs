//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::driver::{Answer, ErrorReport, Outcome, SearchReport, SolveOutcome};
use crate::sat::Cnf;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Format run outcomes for the console and for files
pub struct OutcomeFormatter;

impl OutcomeFormatter {
    pub fn format(outcome: &Outcome, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(Self::format_text(outcome)),
            OutputFormat::Json => serde_json::to_string_pretty(outcome).context("Failed to serialize outcome"),
        }
    }

    pub fn format_text(outcome: &Outcome) -> String {
        match outcome {
            Outcome::Solved(solved) => Self::format_solved(solved),
            Outcome::Searched { reports } => {
                let mut output = String::new();
                if reports.len() > 1 {
                    output.push_str(&Self::format_search_table(reports));
                    output.push('\n');
                }
                for report in reports {
                    output.push_str(&Self::format_search(report));
                }
                output
            }
            Outcome::Failed(error) => Self::format_error(error),
        }
    }

    pub fn format_solved(solved: &SolveOutcome) -> String {
        let mut output = String::new();

        output.push_str(&format!("=== {} ({}) ===\n", solved.problem, solved.solver));
        output.push_str(&format!(
            "Verdict: {}\n",
            if solved.satisfiable { "SATISFIABLE" } else { "UNSATISFIABLE" }
        ));
        output.push_str(&format!("Encoding: {}\n", solved.stats));
        output.push_str(&format!("Solve Time: {}ms\n", solved.solve_time_ms));

        if let Some(answer) = &solved.answer {
            output.push('\n');
            output.push_str(&Self::format_answer(answer));
        }
        if let Some(validation) = &solved.validation {
            output.push_str(&format!("\nValidation: {}\n", validation));
        }

        output
    }

    pub fn format_answer(answer: &Answer) -> String {
        let mut output = String::new();
        match answer {
            Answer::GraphColoring(coloring) => {
                output.push_str("Coloring:\n");
                for (vertex, color) in &coloring.phi {
                    output.push_str(&format!("  {} -> {}\n", vertex, color));
                }
                output.push_str(&format!("Colors used: {}\n", coloring.colors_used()));
            }
            Answer::Sudoku { grid, unique } => {
                output.push_str(&grid.to_string());
                match unique {
                    Some(true) => output.push_str("Solution is unique\n"),
                    Some(false) => output.push_str("Puzzle has more than one solution\n"),
                    None => {}
                }
            }
            Answer::Planning(plan) => {
                output.push_str(&format!("Plan ({} steps):\n", plan.len()));
                output.push_str(&plan.to_string());
                let trace: Vec<String> = plan.worker_trace.iter().map(|p| p.to_string()).collect();
                output.push_str(&format!("Worker trace: {}\n", trace.join(" ")));
            }
        }
        output
    }

    pub fn format_search(report: &SearchReport) -> String {
        let mut output = String::new();

        let label = match report.heuristic {
            Some(h) => format!("{} ({})", report.algorithm, h),
            None => report.algorithm.to_string(),
        };
        output.push_str(&format!("=== {} on {} ===\n", label, report.problem));

        if report.solvable == Some(false) {
            output.push_str("Start and goal have different parity, no path exists\n");
        }
        match report.length {
            Some(length) => {
                output.push_str(&format!("Found a path of {} actions\n", length));
                if !report.actions.is_empty() {
                    output.push_str(&format!("Actions: {}\n", report.actions.join(", ")));
                }
            }
            None => output.push_str("No solution within bounds\n"),
        }
        output.push_str(&format!("Search: {}\n", report.stats));
        output.push_str(&format!("Time: {}ms\n", report.elapsed_ms));

        if let Some(picture) = &report.picture {
            output.push('\n');
            output.push_str(picture);
            if !picture.ends_with('\n') {
                output.push('\n');
            }
        }
        output.push('\n');

        output
    }

    /// One row per algorithm, for comparing runs on the same problem
    pub fn format_search_table(reports: &[SearchReport]) -> String {
        let mut output = String::new();

        output.push_str("Algorithm | Length | Explored | Generated | Frontier\n");
        output.push_str("----------|--------|----------|-----------|---------\n");

        for report in reports {
            let length = report.length.map_or_else(|| "-".to_string(), |l| l.to_string());
            output.push_str(&format!(
                "{:9} | {:>6} | {:>8} | {:>9} | {:>8}\n",
                report.algorithm.to_string(),
                length,
                report.stats.nodes_explored,
                report.stats.nodes_generated,
                report.stats.max_frontier_size
            ));
        }

        output
    }

    pub fn format_error(error: &ErrorReport) -> String {
        format!("Error [{}]: {}\n", error.kind, error.message)
    }
}

/// Write `outcome` (and optionally the formula) into `output_dir`.
///
/// Returns the paths written.
pub fn save_outcome<P: AsRef<Path>>(
    outcome: &Outcome,
    name: &str,
    output_dir: P,
    format: OutputFormat,
    cnf: Option<&Cnf>,
) -> Result<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let extension = match format {
        OutputFormat::Text => "txt",
        OutputFormat::Json => "json",
    };
    let outcome_path = output_dir.join(format!("{}.{}", name, extension));
    std::fs::write(&outcome_path, OutcomeFormatter::format(outcome, format)?)
        .with_context(|| format!("Failed to write {}", outcome_path.display()))?;
    let mut written = vec![outcome_path];

    if let Some(cnf) = cnf {
        let cnf_path = output_dir.join(format!("{}.cnf", name));
        std::fs::write(&cnf_path, cnf.to_dimacs()).with_context(|| format!("Failed to write {}", cnf_path.display()))?;
        written.push(cnf_path);
    }

    Ok(written)
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}
