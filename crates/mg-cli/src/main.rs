//! CLI entry point for the mapgen mapping generator.
//!
//! This binary reads a generation manifest (type shapes, converters and
//! mapper declarations), resolves every mapping and writes the resulting
//! plans for a downstream code generator.
//!
//! # Usage
//!
//! ```bash
//! mapgen [OPTIONS] <COMMAND>
//!
//! # Resolve all mappers and print JSON plans
//! mapgen plan mappings.json
//!
//! # Human-readable overview, overriding an option
//! mapgen plan mappings.json --format summary --option enforceNotNull=true
//!
//! # List the converters a run would use
//! mapgen converters --manifest mappings.json
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod emit;
mod manifest;

use std::io::Write;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::eyre;
use mg_core::{EmitUnit, MappingResult, PlanEmitter};
use mg_resolver::{ConverterRegistry, MappingEngine, MappingFailure};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::emit::{JsonEmitter, SummaryEmitter};
use crate::manifest::{Manifest, MapperDecl};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Compile-time object mapping planner.
///
/// Resolves how every property of a target type is populated from a source
/// type, choosing converters and constructors.
#[derive(Parser)]
#[command(name = "mapgen", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Resolve every mapper in a manifest and write the plans.
    Plan {
        /// Path to the manifest.
        #[arg(env = "MAPGEN_MANIFEST")]
        manifest: Utf8PathBuf,

        /// Option assignment (`key=value`), applied over the manifest options.
        #[arg(short = 'O', long = "option", value_name = "KEY=VALUE")]
        options: Vec<String>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = PlanFormat::Json)]
        format: PlanFormat,

        /// Output file (defaults to stdout).
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },

    /// List registered converters in lookup order.
    Converters {
        /// Include the converters and options of this manifest.
        #[arg(short, long)]
        manifest: Option<Utf8PathBuf>,
    },
}

/// Plan output format.
#[derive(Clone, Copy, ValueEnum)]
enum PlanFormat {
    /// JSON format.
    Json,
    /// Indented text overview.
    Summary,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
/// Logs go to stderr so plans written to stdout stay machine-readable.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(level)
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Resolves a manifest and writes its plans.
///
/// Plans for successful mappings are written even when some mappings fail;
/// failures are listed on stderr and turn the exit status into an error.
///
/// # Errors
///
/// Returns an error if the manifest is invalid, a requested type is unknown,
/// writing fails, or any mapping could not be resolved.
fn run_plan(
    manifest_path: &Utf8Path,
    options: &[String],
    format: PlanFormat,
    output: Option<&Utf8Path>,
) -> color_eyre::Result<()> {
    let mut manifest = Manifest::load(manifest_path)?;
    let config = manifest.config(options)?;
    let registry = Arc::new(manifest.registry(&config)?);
    info!(
        manifest = %manifest_path,
        mappers = manifest.mappers.len(),
        converters = registry.len(),
        "Loaded manifest"
    );

    let requests = manifest.requests();
    let engine = MappingEngine::new(config, registry, std::mem::take(&mut manifest.types));
    let results = engine.resolve_all(&requests)?;

    let (units, failures) = group_by_mapper(&manifest.mappers, results);
    let units: Vec<_> = units
        .iter()
        .map(|(mapper, results)| EmitUnit {
            mapper: &mapper.name,
            namespace: &mapper.namespace,
            results,
            config: engine.config(),
        })
        .collect();

    let content = match format {
        PlanFormat::Json => {
            let rendered = render(&mut JsonEmitter, &units)?;
            let mut json = serde_json::to_string_pretty(&rendered)?;
            json.push('\n');
            json
        }
        PlanFormat::Summary => render(&mut SummaryEmitter, &units)?.join("\n"),
    };

    if let Some(output_path) = output {
        std::fs::write(output_path.as_std_path(), &content)?;
        info!(path = %output_path, "Plans written");
    } else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        write!(handle, "{content}")?;
    }

    if failures.is_empty() {
        return Ok(());
    }

    print_failures(&failures)?;
    Err(eyre!("{} mapping(s) could not be resolved", failures.len()))
}

/// Prints the converters a run would consult, in lookup order.
///
/// # Errors
///
/// Returns an error if the manifest is invalid.
fn run_converters(manifest_path: Option<&Utf8Path>) -> color_eyre::Result<()> {
    let registry = match manifest_path {
        Some(path) => {
            let manifest = Manifest::load(path)?;
            let config = manifest.config(&[])?;
            manifest.registry(&config)?
        }
        None => ConverterRegistry::standard(),
    };

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle, "{:<4} {:<24} PRIORITY", "#", "NAME")?;
    for converter in registry.iter() {
        writeln!(
            handle,
            "{:<4} {:<24} {}",
            converter.index, converter.name, converter.priority
        )?;
    }

    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Splits results, which follow mapper order, back into one group per
/// mapper and a list of failures.
fn group_by_mapper(
    mappers: &[MapperDecl],
    results: Vec<Result<MappingResult, MappingFailure>>,
) -> (Vec<(&MapperDecl, Vec<MappingResult>)>, Vec<MappingFailure>) {
    let mut results = results.into_iter();
    let mut failures = Vec::new();

    let units = mappers
        .iter()
        .map(|mapper| {
            let mut resolved = Vec::with_capacity(mapper.mappings.len());
            for result in results.by_ref().take(mapper.mappings.len()) {
                match result {
                    Ok(result) => resolved.push(result),
                    Err(failure) => failures.push(failure),
                }
            }
            let failed = mapper.mappings.len() - resolved.len();
            if failed > 0 {
                warn!(mapper = %mapper.name, failed, "Mapper rendered without its failed mappings");
            }
            (mapper, resolved)
        })
        .collect();

    (units, failures)
}

/// Renders every unit with `emitter`.
fn render<E: PlanEmitter>(
    emitter: &mut E,
    units: &[EmitUnit<'_>],
) -> Result<Vec<E::Output>, E::Error> {
    units.iter().map(|unit| emitter.emit(*unit)).collect()
}

/// Prints failed mappings with all of their errors.
fn print_failures(failures: &[MappingFailure]) -> std::io::Result<()> {
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();

    writeln!(handle)?;
    writeln!(handle, "Failed mappings ({}):", failures.len())?;
    for failure in failures {
        writeln!(
            handle,
            "  {} -> {}",
            failure.source_type, failure.target_type
        )?;
        for error in &failure.errors {
            writeln!(handle, "    - {error}")?;
        }
    }

    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Route to appropriate command
    match &cli.command {
        Commands::Plan {
            manifest,
            options,
            format,
            output,
        } => run_plan(manifest, options, *format, output.as_deref()),
        Commands::Converters { manifest } => run_converters(manifest.as_deref()),
    }
}
