//! Cargo subcommand for listing and targeting Kani harnesses
//!
//! Usage: cargo kani-harnesses <list|command|playback|report> [options]

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use kani_harness_parser::{
    detect_output_error, parse_verifier_output, scan_path, HarnessAction, ModulePathStrategy,
    ScanOptions, VerifierCommand, VerifierConfig,
};
use tracing_subscriber::EnvFilter;

// Include CLI modules (they're in src/bin/cli/)
mod cli;

/// Name cargo passes as the first argument when run as `cargo kani-harnesses`.
const CARGO_SUBCOMMAND: &str = "kani-harnesses";

#[derive(Parser)]
#[command(name = "cargo-kani-harnesses")]
#[command(about = "Find Kani proof harnesses and build verifier commands", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List harnesses in the given files and directories
    List {
        /// Files or directories to scan (default: current directory)
        paths: Vec<PathBuf>,

        /// Filter by harness name (supports * wildcards)
        #[arg(long)]
        name: Option<String>,

        /// How module paths are computed
        #[arg(long, default_value = "reverse-index")]
        module_paths: ModulePathStrategy,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Print the verifier command(s) for a harness, in retry order
    Command {
        /// Source file declaring the harness
        file: PathBuf,

        /// Harness function name
        harness: String,

        /// Package passed to cargo-kani with -p
        #[arg(short, long)]
        package: Option<String>,

        /// JSON verifier configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to the cargo-kani binary
        #[arg(long)]
        cargo_kani: Option<PathBuf>,

        /// How module paths are computed
        #[arg(long, default_value = "reverse-index")]
        module_paths: ModulePathStrategy,

        /// Generate a concrete playback test instead of only verifying
        #[arg(long)]
        playback: bool,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Print the command running a generated playback test
    Playback {
        /// Name of the generated test function
        test: String,

        /// Package passed to cargo-kani with --package
        #[arg(short, long)]
        package: Option<String>,

        /// JSON verifier configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to the cargo-kani binary
        #[arg(long)]
        cargo_kani: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Summarize verifier output read from a file or stdin
    Report {
        /// Captured stdout of a verifier run (default: stdin)
        file: Option<PathBuf>,

        /// Captured stderr of the same run
        #[arg(long)]
        stderr: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug)]
enum OutputFormat {
    Human,
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            "markdown" => Ok(OutputFormat::Markdown),
            _ => Err(format!("Unknown format: {}. Expected: human, json, markdown", s)),
        }
    }
}

fn main() {
    let args = std::env::args()
        .enumerate()
        .filter(|(i, arg)| !(*i == 1 && arg == CARGO_SUBCOMMAND))
        .map(|(_, arg)| arg);
    let cli = Cli::parse_from(args);

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::List {
            paths,
            name,
            module_paths,
            format,
        } => handle_list(paths, name.as_deref(), module_paths, format),
        Commands::Command {
            file,
            harness,
            package,
            config,
            cargo_kani,
            module_paths,
            playback,
            format,
        } => {
            let overrides = ConfigOverrides {
                config,
                package,
                cargo_kani,
            };
            let action = if playback {
                HarnessAction::ConcretePlayback
            } else {
                HarnessAction::Verify
            };
            handle_command(&file, &harness, overrides, module_paths, action, format)
        }
        Commands::Playback {
            test,
            package,
            config,
            cargo_kani,
            format,
        } => {
            let overrides = ConfigOverrides {
                config,
                package,
                cargo_kani,
            };
            handle_playback(&test, overrides, format)
        }
        Commands::Report {
            file,
            stderr,
            format,
        } => handle_report(file.as_deref(), stderr.as_deref(), format),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn handle_list(
    paths: Vec<PathBuf>,
    name: Option<&str>,
    module_paths: ModulePathStrategy,
    format: OutputFormat,
) -> Result<i32> {
    let roots = if paths.is_empty() {
        vec![std::env::current_dir().context("failed to read current directory")?]
    } else {
        paths
    };

    let mut discovery = cli::scan_sources(&roots, ScanOptions { module_paths });
    let scans = cli::filter_scans(std::mem::take(&mut discovery.scans), name);

    let output = match format {
        OutputFormat::Human => cli::format_list_human(&discovery, &scans),
        OutputFormat::Json => cli::format_list_json(&discovery, &scans),
        OutputFormat::Markdown => cli::format_list_markdown(&scans),
    };
    print!("{}", output);

    // Non-zero when any harness position no longer matches its file
    Ok(if scans.iter().any(|scan| scan.has_desyncs()) { 1 } else { 0 })
}

/// Command-line values layered over the configuration file.
struct ConfigOverrides {
    config: Option<PathBuf>,
    package: Option<String>,
    cargo_kani: Option<PathBuf>,
}

impl ConfigOverrides {
    fn resolve(self) -> Result<VerifierConfig> {
        let mut config = match &self.config {
            Some(path) => VerifierConfig::from_json_file(path)?,
            None => VerifierConfig::default(),
        };
        if let Some(package) = self.package {
            config.package = Some(package);
        }
        if let Some(cargo_kani) = self.cargo_kani {
            config.cargo_kani = cargo_kani;
        }
        Ok(config)
    }
}

fn handle_command(
    file: &Path,
    harness: &str,
    overrides: ConfigOverrides,
    module_paths: ModulePathStrategy,
    action: HarnessAction,
    format: OutputFormat,
) -> Result<i32> {
    let config = overrides.resolve()?;
    let scan = scan_path(file, ScanOptions { module_paths })?;

    let matches: Vec<_> = scan.harnesses.iter().filter(|h| h.name == harness).collect();
    if matches.is_empty() {
        if scan.desyncs.iter().any(|d| d.harness == harness) {
            bail!("harness '{}' in {} is desynced", harness, file.display());
        }
        bail!("no harness named '{}' in {}", harness, file.display());
    }

    let commands: Vec<VerifierCommand> = matches
        .into_iter()
        .flat_map(|h| VerifierCommand::for_harness(&config, h, file, action))
        .collect();

    print_commands(&commands, format)
}

fn handle_playback(test: &str, overrides: ConfigOverrides, format: OutputFormat) -> Result<i32> {
    let config = overrides.resolve()?;
    let commands = vec![VerifierCommand::playback_test(&config, test)];
    print_commands(&commands, format)
}

fn print_commands(commands: &[VerifierCommand], format: OutputFormat) -> Result<i32> {
    let output = match format {
        OutputFormat::Human => cli::format_commands_human(commands),
        OutputFormat::Json => cli::format_commands_json(commands),
        OutputFormat::Markdown => {
            eprintln!("Markdown format not supported for commands");
            return Ok(1);
        }
    };
    print!("{}", output);
    Ok(0)
}

fn handle_report(file: Option<&Path>, stderr: Option<&Path>, format: OutputFormat) -> Result<i32> {
    let stdout_text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read verifier output from stdin")?;
            text
        }
    };
    let stderr_text = match stderr {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => String::new(),
    };

    let report = parse_verifier_output(&stdout_text);
    let error = detect_output_error(&stdout_text, &stderr_text);

    let output = match format {
        OutputFormat::Human => cli::format_report_human(&report, error.as_ref()),
        OutputFormat::Json => cli::format_report_json(&report, error.as_ref()),
        OutputFormat::Markdown => {
            eprintln!("Markdown format not supported for reports");
            return Ok(1);
        }
    };
    print!("{}", output);

    Ok(if report.is_success() && error.is_none() { 0 } else { 1 })
}
