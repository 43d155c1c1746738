//! Command line front end for the puzzle solvers

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use puzzle_reductions::{
    config::{CliOverrides, OutputFormat, Settings},
    driver::{self, Outcome, Problem, ProblemFamily},
    search::{Algorithm, Heuristic},
    utils::{save_outcome, ColorOutput, OutcomeFormatter},
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "puzzle_reductions")]
#[command(about = "Solve puzzles by SAT reduction or state-space search")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a graph coloring, Sudoku or planning problem with the SAT solver
    Solve {
        /// Problem file (YAML or JSON)
        #[arg(short, long)]
        problem: PathBuf,

        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Solver time limit in seconds, 0 for none (overrides config)
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Planning horizon for planning problems without one (overrides config)
        #[arg(long)]
        horizon: Option<usize>,

        /// Check whether a Sudoku solution is unique
        #[arg(long)]
        unique: bool,

        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Save the outcome to this directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the DIMACS encoding of a SAT problem
    Cnf {
        /// Problem file (YAML or JSON)
        #[arg(short, long)]
        problem: PathBuf,

        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Write the DIMACS text here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Search a maze, corridor or 8-puzzle problem
    Search {
        /// Problem file (YAML or JSON)
        #[arg(short, long)]
        problem: PathBuf,

        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Algorithm to run, `all` runs every one in parallel (overrides config)
        #[arg(short, long, value_enum)]
        algorithm: Option<AlgorithmChoice>,

        /// 8-puzzle heuristic for A* (overrides config)
        #[arg(long, value_enum)]
        heuristic: Option<Heuristic>,

        /// Depth bound for DFS (overrides config)
        #[arg(short, long)]
        max_depth: Option<usize>,

        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Create a default configuration and one example problem of every kind
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AlgorithmChoice {
    Bfs,
    Dfs,
    Iddfs,
    Astar,
    All,
}

impl AlgorithmChoice {
    fn single(self) -> Option<Algorithm> {
        match self {
            AlgorithmChoice::Bfs => Some(Algorithm::Bfs),
            AlgorithmChoice::Dfs => Some(Algorithm::Dfs),
            AlgorithmChoice::Iddfs => Some(Algorithm::Iddfs),
            AlgorithmChoice::Astar => Some(Algorithm::Astar),
            AlgorithmChoice::All => None,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            problem,
            config,
            timeout,
            horizon,
            unique,
            format,
            output,
            verbose,
        } => {
            let overrides = CliOverrides {
                timeout_seconds: timeout,
                check_uniqueness: unique,
                horizon,
                output_dir: output.clone(),
                format,
                verbose,
                ..Default::default()
            };
            solve_command(problem, config, overrides, output.is_some())
        }
        Commands::Cnf {
            problem,
            config,
            output,
        } => cnf_command(problem, config, output),
        Commands::Search {
            problem,
            config,
            algorithm,
            heuristic,
            max_depth,
            format,
            verbose,
        } => {
            let overrides = CliOverrides {
                algorithm: algorithm.and_then(AlgorithmChoice::single),
                heuristic,
                max_depth,
                format,
                verbose,
                ..Default::default()
            };
            let run_all = algorithm == Some(AlgorithmChoice::All);
            search_command(problem, config, overrides, run_all)
        }
        Commands::Setup { directory, force } => setup_command(directory, force),
    }
}

/// Config file if present, defaults otherwise, then the command line on top
fn load_settings(config_path: &Path, overrides: &CliOverrides) -> Result<Settings> {
    let mut settings = if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        tracing::debug!(path = %config_path.display(), "config file not found, using defaults");
        Settings::default()
    };

    settings.merge_with_cli(overrides);
    settings.validate().context("Configuration validation failed")?;
    Ok(settings)
}

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    // a second init (tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_problem(path: &Path, family: ProblemFamily) -> Result<Problem> {
    let problem = Problem::from_file(path)?;
    if problem.family() != family {
        let command = match problem.family() {
            ProblemFamily::Reduction => "solve",
            ProblemFamily::Search => "search",
        };
        anyhow::bail!("{} problems are handled by the `{}` command", problem.kind(), command);
    }
    Ok(problem)
}

fn print_outcome(outcome: &Outcome, format: OutputFormat) -> Result<()> {
    let rendered = OutcomeFormatter::format(outcome, format)?;
    match (outcome, format) {
        (Outcome::Failed(_), OutputFormat::Text) => eprint!("{}", ColorOutput::error(&rendered)),
        _ => print!("{}", rendered),
    }
    Ok(())
}

fn solve_command(problem_path: PathBuf, config_path: PathBuf, overrides: CliOverrides, save: bool) -> Result<()> {
    let settings = load_settings(&config_path, &overrides)?;
    init_logging(&settings);

    let problem = load_problem(&problem_path, ProblemFamily::Reduction)?;
    let text = settings.output.format == OutputFormat::Text;
    if text {
        println!("{}", ColorOutput::info(&format!("Solving {} problem...", problem.kind())));
    }

    let start_time = Instant::now();
    let outcome = puzzle_reductions::run_problem(&problem, &settings);
    let total_time = start_time.elapsed();

    print_outcome(&outcome, settings.output.format)?;
    if text {
        match &outcome {
            Outcome::Solved(solved) if solved.satisfiable => println!(
                "{}",
                ColorOutput::success(&format!("Solved in {:.3}s", total_time.as_secs_f64()))
            ),
            Outcome::Solved(_) => println!("{}", ColorOutput::warning("No solution exists")),
            _ => {}
        }
    }

    if save || settings.output.write_cnf {
        let cnf = match &outcome {
            Outcome::Solved(solved) if settings.output.write_cnf => solved.cnf.as_ref(),
            Outcome::Failed(error) if settings.output.write_cnf => {
                tracing::warn!(kind = error.kind, "no formula to write for a failed run");
                None
            }
            _ => None,
        };
        let stem = file_stem(&problem_path);
        let written = save_outcome(
            &outcome,
            &stem,
            &settings.output.output_directory,
            settings.output.format,
            cnf,
        )
        .context("Failed to save outcome")?;
        for path in written {
            println!("Saved: {}", path.display());
        }
    }

    if let Outcome::Failed(error) = outcome {
        anyhow::bail!("{} ({})", error.message, error.kind);
    }
    Ok(())
}

fn cnf_command(problem_path: PathBuf, config_path: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let settings = load_settings(&config_path, &CliOverrides::default())?;
    init_logging(&settings);

    let problem = load_problem(&problem_path, ProblemFamily::Reduction)?;
    let cnf = driver::encode(&problem, &settings)
        .with_context(|| format!("Failed to encode {}", problem_path.display()))?;
    let dimacs = cnf.to_dimacs();

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
            std::fs::write(&path, dimacs).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{}",
                ColorOutput::success(&format!(
                    "Wrote {} variables, {} clauses to {}",
                    cnf.variable_count(),
                    cnf.clause_count(),
                    path.display()
                ))
            );
        }
        None => print!("{}", dimacs),
    }
    Ok(())
}

fn search_command(problem_path: PathBuf, config_path: PathBuf, overrides: CliOverrides, run_all: bool) -> Result<()> {
    let settings = load_settings(&config_path, &overrides)?;
    init_logging(&settings);

    let problem = load_problem(&problem_path, ProblemFamily::Search)?;
    let algorithms: Vec<Algorithm> = if run_all {
        Algorithm::ALL.to_vec()
    } else {
        vec![settings.search.algorithm]
    };

    let mut reports = Vec::with_capacity(algorithms.len());
    for result in driver::search_all(&problem, &settings, &algorithms) {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                let outcome = Outcome::from(e);
                print_outcome(&outcome, settings.output.format)?;
                anyhow::bail!("Search failed on {}", problem_path.display());
            }
        }
    }

    print_outcome(&Outcome::Searched { reports }, settings.output.format)
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let config_dir = directory.join("config");
    let problem_dir = directory.join("problems");
    let output_dir = directory.join("output");

    for dir in [&config_dir, &problem_dir, &output_dir] {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    write_unless_present(&config_path, force, |path| Settings::default().to_file(path))?;

    let mut json_settings = Settings::default();
    json_settings.output.format = OutputFormat::Json;
    json_settings.output.write_cnf = true;
    json_settings.solver.check_uniqueness = true;
    write_unless_present(&config_dir.join("json.yaml"), force, |path| json_settings.to_file(path))?;

    for (name, problem) in Problem::samples()? {
        write_unless_present(&problem_dir.join(name), force, |path| problem.to_file(path))?;
    }

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Run: puzzle_reductions solve --problem {}", problem_dir.join("sudoku.yaml").display());
    println!("3. Run: puzzle_reductions search --problem {} --algorithm all", problem_dir.join("maze.yaml").display());

    Ok(())
}

fn write_unless_present(path: &Path, force: bool, write: impl FnOnce(&Path) -> Result<()>) -> Result<()> {
    if path.exists() && !force {
        println!("Skipped: {} (already exists)", path.display());
        return Ok(());
    }
    write(path)?;
    println!("Created: {}", path.display());
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "outcome".to_string())
}
