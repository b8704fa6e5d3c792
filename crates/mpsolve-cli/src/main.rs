use clap::{Parser, Subcommand, ValueEnum};
use mpsolve::{
    CallbackControl, Engine, FileFormat, LpIterationEvent, MipNodeEvent, Problem, ProblemClass,
    SimplexEngine, SolveReport, SolverConfig, SolverHandle,
};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::error;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Solve, check and convert linear and mixed-integer problems"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Optimize a problem file and print the solution
    Solve(SolveArgs),
    /// Run the consistency check on a problem file
    Check(CheckArgs),
    /// Rewrite a problem file in another format
    Convert(ConvertArgs),
}

#[derive(Parser, Debug)]
struct SolveArgs {
    /// Input problem file
    #[arg(long)]
    input: PathBuf,

    /// Layout of the input file
    #[arg(long, value_enum, default_value = "mps")]
    input_format: InputFormat,

    /// JSON solver configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Time limit in seconds; overrides the configuration file
    #[arg(long)]
    time_limit: Option<f64>,

    /// Engine to optimize with
    #[arg(long, value_enum, default_value = "simplex")]
    engine: EngineChoice,

    /// Write the problem to this path after optimizing
    #[arg(long)]
    write: Option<PathBuf>,

    /// Format used with --write
    #[arg(long, value_enum, default_value = "mps", requires = "write")]
    write_format: OutputFileFormat,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Print solver messages and progress events to stderr
    #[arg(long)]
    progress: bool,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input problem file
    #[arg(long)]
    input: PathBuf,

    /// Layout of the input file
    #[arg(long, value_enum, default_value = "mps")]
    input_format: InputFormat,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input problem file
    #[arg(long)]
    input: PathBuf,

    /// Layout of the input file
    #[arg(long, value_enum, default_value = "mps")]
    input_format: InputFormat,

    /// Output problem file
    #[arg(long)]
    output: PathBuf,

    /// Format of the output file
    #[arg(long, value_enum)]
    format: OutputFileFormat,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum InputFormat {
    Mps,
    FreeMps,
}

impl From<InputFormat> for FileFormat {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Mps => FileFormat::Mps,
            InputFormat::FreeMps => FileFormat::FreeMps,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum OutputFileFormat {
    Mps,
    FreeMps,
    Lp,
}

impl From<OutputFileFormat> for FileFormat {
    fn from(format: OutputFileFormat) -> Self {
        match format {
            OutputFileFormat::Mps => FileFormat::Mps,
            OutputFileFormat::FreeMps => FileFormat::FreeMps,
            OutputFileFormat::Lp => FileFormat::Lp,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum EngineChoice {
    Simplex,
    Highs,
}

#[derive(Debug, Clone, Serialize)]
struct CheckReport {
    problem: String,
    columns: usize,
    rows: usize,
    nonzeros: usize,
    class: ProblemClass,
    issues: Vec<String>,
}

fn main() {
    if let Err(err) = mpsolve::enable_logging(None) {
        eprintln!("{err}");
    }
    if let Err(err) = run() {
        error!(
            component = "cli",
            operation = "run",
            status = "error",
            error = %err,
            "Command failed"
        );
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Solve(args) => solve_command(args),
        Command::Check(args) => check_command(args),
        Command::Convert(args) => convert_command(args),
    }
}

fn solve_command(args: SolveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args.config.as_deref(), args.time_limit)?;
    let problem = mpsolve::format::read_file(&args.input, args.input_format.into())?;
    let report = match args.engine {
        EngineChoice::Simplex => solve_with(problem, SimplexEngine::new(), config, &args)?,
        EngineChoice::Highs => solve_with_highs(problem, config, &args)?,
    };
    match args.format {
        OutputFormat::Table => print_report_table(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

#[cfg(feature = "highs")]
fn solve_with_highs(
    problem: Problem,
    config: SolverConfig,
    args: &SolveArgs,
) -> Result<SolveReport, Box<dyn std::error::Error>> {
    solve_with(problem, mpsolve::HighsEngine::new(), config, args)
}

#[cfg(not(feature = "highs"))]
fn solve_with_highs(
    _problem: Problem,
    _config: SolverConfig,
    _args: &SolveArgs,
) -> Result<SolveReport, Box<dyn std::error::Error>> {
    Err(boxed_input_error(
        "this build has no HiGHS engine (rebuild with --features highs)",
    ))
}

fn solve_with<E: Engine>(
    problem: Problem,
    engine: E,
    config: SolverConfig,
    args: &SolveArgs,
) -> Result<SolveReport, Box<dyn std::error::Error>> {
    let mut handle = SolverHandle::from_problem_with_engine(problem, engine);
    handle.set_config(config);
    if args.progress {
        register_progress(&mut handle);
    }
    if let Err(err) = handle.check() {
        if !err.is_recoverable() {
            return Err(err.into());
        }
        eprintln!("{err}");
    }
    handle.optimize()?;
    if let Some(path) = args.write.as_deref() {
        handle.write_file(args.write_format.into(), path)?;
    }
    let mut report = SolveReport::from_handle(&handle)?;
    report.written = args.write.clone();
    Ok(report)
}

fn register_progress<E: Engine>(handle: &mut SolverHandle<E>) {
    handle.set_message_log(|text: &str| {
        eprintln!("{text}");
        CallbackControl::Continue
    });
    match handle.problem().class() {
        ProblemClass::Linear => handle.set_lp_iteration_callback(|event: &LpIterationEvent| {
            eprintln!(
                "iter {:>6}  obj {:>16.6}  {}",
                event.iteration,
                event.objective_value,
                if event.is_feasible {
                    "feasible".to_string()
                } else {
                    format!("infeas {:.3e}", event.infeasibility)
                }
            );
            CallbackControl::Continue
        }),
        ProblemClass::Mixed => handle.set_mip_node_callback(|event: &MipNodeEvent| {
            eprintln!(
                "node {:>6}  iter {:>8}  bound {:>16.6}  best {:>16.6}{}",
                event.node,
                event.iteration,
                event.best_bound,
                event.best_integer,
                if event.is_improved { "  *" } else { "" }
            );
            CallbackControl::Continue
        }),
    }
}

fn check_command(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let problem = mpsolve::format::read_file(&args.input, args.input_format.into())?;
    let issues: Vec<String> = match problem.check() {
        Ok(()) => Vec::new(),
        Err(err) => err.issues.iter().map(ToString::to_string).collect(),
    };
    let report = CheckReport {
        problem: problem.name().to_string(),
        columns: problem.num_columns(),
        rows: problem.num_rows(),
        nonzeros: problem.num_nonzeros(),
        class: problem.class(),
        issues,
    };
    match args.format {
        OutputFormat::Table => print_check_table(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    if report.issues.is_empty() {
        Ok(())
    } else {
        Err(boxed_input_error(&format!(
            "{} consistency issue(s) found",
            report.issues.len()
        )))
    }
}

fn convert_command(args: ConvertArgs) -> Result<(), Box<dyn std::error::Error>> {
    let problem = mpsolve::format::read_file(&args.input, args.input_format.into())?;
    mpsolve::format::write_file(&problem, args.format.into(), &args.output)?;
    println!(
        "{} -> {} ({})",
        args.input.display(),
        args.output.display(),
        FileFormat::from(args.format)
    );
    Ok(())
}

fn load_config(
    path: Option<&Path>,
    time_limit: Option<f64>,
) -> Result<SolverConfig, Box<dyn std::error::Error>> {
    let mut config = match path {
        Some(path) => {
            let file = File::open(path)?;
            serde_json::from_reader::<_, SolverConfig>(BufReader::new(file))?
        }
        None => SolverConfig::new(),
    };
    if let Some(seconds) = time_limit {
        config = config.with_time_limit(seconds);
    }
    Ok(config)
}

fn print_report_table(report: &SolveReport) {
    println!("{:<12} {}", "problem", report.problem);
    println!("{:<12} {}", "engine", report.engine);
    println!(
        "{:<12} {} ({})",
        "status", report.status_text, report.status_code
    );
    println!("{:<12} {}", "objective", format_option_f64(report.objective_value));
    println!("{:<12} {}", "iterations", report.iterations);
    println!("{:<12} {}", "nodes", report.nodes);
    println!("{:<12} {:.3}", "time_ms", report.solve_time_seconds * 1000.0);
    if let Some(path) = report.written.as_ref() {
        println!("{:<12} {}", "written", path.display());
    }
    if !report.values.is_empty() {
        println!();
        println!("{:<24} {:>16}", "column", "value");
        for value in &report.values {
            println!("{:<24} {:>16.6}", value.name, value.value);
        }
    }
}

fn print_check_table(report: &CheckReport) {
    println!(
        "{:<16} {:>8} {:>8} {:>10} {:<8}",
        "problem", "columns", "rows", "nonzeros", "class"
    );
    println!(
        "{:<16} {:>8} {:>8} {:>10} {:<8}",
        report.problem,
        report.columns,
        report.rows,
        report.nonzeros,
        report.class.as_str()
    );
    for issue in &report.issues {
        println!("issue: {issue}");
    }
}

fn format_option_f64(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| format!("{value:.6}"))
}

fn boxed_input_error(message: &str) -> Box<dyn std::error::Error> {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        message.to_string(),
    ))
}
