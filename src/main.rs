//! Reload companion generator command-line interface.
//!
//! Build-step host for the generator: discovers C# sources, runs the pipeline and
//! writes the companion files.

use clap::{ArgAction, Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use reload_codegen::config::ConfigFile;
use reload_codegen::discovery;
use reload_codegen::{CompilationUnit, DirectorySink, Generator, JsonLinesTrace, MemorySink};

/// Generates static-state reset companions for C# partial classes
#[derive(Debug, Parser)]
#[command(name = "reload-codegen")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate companion files into an output directory
    Generate {
        #[command(flatten)]
        input: InputArgs,

        /// Directory receiving the generated `*_codegen.cs` files
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Print the generation report as JSON without writing files
    Scan {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Source directory, single `.cs` file, or syntax JSON with --syntax-json
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Treat PATH as a JSON syntax model produced by the host
    #[arg(long)]
    syntax_json: bool,

    /// Name of the assembly being compiled
    #[arg(long)]
    assembly: Option<String>,

    /// Configuration file (defaults to reload-codegen.json next to PATH)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write structured trace records (JSON lines) to this file
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Regex of paths to leave out; may be repeated
    #[arg(long)]
    exclude: Vec<String>,

    /// Do not emit the opt-out marker attribute
    #[arg(long)]
    no_marker: bool,

    /// Analyze classes on a single thread
    #[arg(long)]
    sequential: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Generate { input, out } => generate(&input, &out),
        Command::Scan { input } => scan(&input),
    }
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "reload_codegen=info",
        1 => "reload_codegen=debug",
        _ => "reload_codegen=trace",
    }
}

fn generate(input: &InputArgs, out: &Path) -> Result<()> {
    let (config, units) = load(input)?;
    let mut sink = DirectorySink::new(out).into_diagnostic()?;

    let report = run(input, config, &units, &mut sink)?;
    println!(
        "{} companion(s) for {} class(es): {} written, {} unchanged, {} removed -> {}",
        report.companions().count(),
        report.classes_scanned,
        sink.updated,
        sink.unchanged,
        sink.removed,
        sink.dir().display()
    );
    Ok(())
}

fn scan(input: &InputArgs) -> Result<()> {
    let (config, units) = load(input)?;
    let mut sink = MemorySink::new();

    let report = run(input, config, &units, &mut sink)?;
    let json = serde_json::to_string_pretty(&report).into_diagnostic()?;
    println!("{json}");
    Ok(())
}

fn run(
    input: &InputArgs,
    config: ConfigFile,
    units: &[CompilationUnit],
    sink: &mut dyn reload_codegen::SourceSink,
) -> Result<reload_codegen::GenerationReport> {
    let mut trace = match &input.trace {
        Some(path) => {
            let file = File::create(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("cannot create trace file {}", path.display()))?;
            Some(JsonLinesTrace::new(BufWriter::new(file)))
        }
        None => None,
    };

    let mut generator = Generator::new(config.generate);
    if let Some(trace) = trace.as_mut() {
        generator = generator.with_trace(trace);
    }
    generator
        .run(units, sink)
        .map_err(|e| miette::miette!("[{}] {}", e.code(), e))
}

/// Resolve configuration (file, then flags) and load the syntax units.
fn load(input: &InputArgs) -> Result<(ConfigFile, Vec<CompilationUnit>)> {
    let mut config = match &input.config {
        Some(path) => ConfigFile::load(path).into_diagnostic()?,
        None => {
            let dir = if input.path.is_dir() {
                input.path.as_path()
            } else {
                input.path.parent().unwrap_or(Path::new("."))
            };
            ConfigFile::discover(dir).into_diagnostic()?
        }
    };

    if let Some(assembly) = &input.assembly {
        config.generate.assembly_name = Some(assembly.clone());
    }
    if input.no_marker {
        config.generate.emit_marker = false;
    }
    if input.sequential {
        config.generate.parallel = false;
    }
    config.discovery.exclude.extend(input.exclude.iter().cloned());

    let units = if input.syntax_json {
        discovery::load_syntax_json(&input.path).into_diagnostic()?
    } else if input.path.is_file() {
        discovery::parse_files(std::slice::from_ref(&input.path)).into_diagnostic()?
    } else {
        discovery::discover_units(&input.path, &config.discovery)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to scan {}", input.path.display()))?
    };

    Ok((config, units))
}
