//! ParityGuard CLI - KiCad schematic vs. PCB parity checks from the command line.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use parityguard::{
    exit_codes, load_board, parse_export, BoardSnapshot, HostVersion, Outcome, ParityGuardCore,
    ParityGuardError, ParityOptions, ParityReport,
};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, error, Level};

#[derive(Parser)]
#[command(name = "parityguard")]
#[command(about = "KiCad schematic vs. PCB parity checker", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a schematic netlist export against a board
    Check {
        /// XML netlist export of the schematic
        #[arg(value_name = "EXPORT")]
        export: PathBuf,

        /// Board file (.kicad_pcb)
        #[arg(short, long, value_name = "BOARD")]
        board: PathBuf,

        /// TOML configuration with a `[preflight]` table
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Report discrepancies as warnings and exit successfully
        #[arg(long)]
        as_warnings: bool,

        /// Host KiCad version, overrides the one recorded in the board
        #[arg(long, value_name = "X.Y.Z")]
        kicad_version: Option<HostVersion>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Print what was parsed from an export (and optionally a board)
    Summary {
        /// XML netlist export of the schematic
        #[arg(value_name = "EXPORT")]
        export: PathBuf,

        /// Board file (.kicad_pcb)
        #[arg(short, long, value_name = "BOARD")]
        board: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: SummaryFormat,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON report for CI/CD
    Json,
    /// GitHub Actions annotations
    Github,
}

#[derive(Clone, ValueEnum)]
enum SummaryFormat {
    Human,
    Json,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                exit_codes::GENERIC_ERROR
            } else {
                0
            };
            let _ = e.print();
            process::exit(code);
        }
    };

    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Commands::Check {
            export,
            board,
            config,
            as_warnings,
            kicad_version,
            format,
        } => handle_check(&export, &board, config.as_deref(), as_warnings, kicad_version, format),
        Commands::Summary {
            export,
            board,
            format,
        } => handle_summary(&export, board.as_deref(), format),
    };

    process::exit(exit_code);
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

fn handle_check(
    export: &Path,
    board: &Path,
    config: Option<&Path>,
    as_warnings: bool,
    kicad_version: Option<HostVersion>,
    format: OutputFormat,
) -> i32 {
    let options = match resolve_options(config, as_warnings, kicad_version) {
        Ok(options) => options,
        Err(e) => return fatal(&e),
    };
    debug!("Effective options: {:?}", options);

    match ParityGuardCore::check_files(export, board, &options) {
        Ok(Some(report)) => {
            if !output_report(&report, board, &format) {
                exit_codes::GENERIC_ERROR
            } else if report.outcome.is_failure() {
                exit_codes::NETLIST_DIFF
            } else {
                0
            }
        }
        Ok(None) => {
            if matches!(format, OutputFormat::Human) {
                println!("PCB parity check disabled");
            }
            0
        }
        Err(e) => fatal(&e),
    }
}

/// Config file first, then command line overrides.
fn resolve_options(
    config: Option<&Path>,
    as_warnings: bool,
    kicad_version: Option<HostVersion>,
) -> Result<ParityOptions, ParityGuardError> {
    let mut options = match config {
        Some(path) => ParityOptions::load(path)?,
        None => ParityOptions::default(),
    };
    if as_warnings {
        options.as_warnings = true;
    }
    if kicad_version.is_some() {
        options.kicad_version = kicad_version;
    }
    Ok(options)
}

fn fatal(e: &ParityGuardError) -> i32 {
    error!("{}", e);
    e.exit_code()
}

/// `false` when the report could not be rendered.
fn output_report(report: &ParityReport, board: &Path, format: &OutputFormat) -> bool {
    match format {
        OutputFormat::Human => output_human(report),
        OutputFormat::Json => return print_json(report.to_json()),
        OutputFormat::Github => output_github(report, board),
    }
    true
}

fn output_human(report: &ParityReport) {
    let stats = &report.stats;
    println!(
        "Schematic: {} components, {} nets",
        stats.schematic_components, stats.schematic_nets
    );
    println!(
        "PCB:       {} components, {} nets",
        stats.pcb_components, stats.pcb_nets
    );

    if report.outcome == Outcome::Pass {
        println!("\nPCB and schematic are in sync");
        return;
    }

    println!("\nDiscrepancies:");
    for d in &report.discrepancies {
        println!("  - {}", d);
    }
    let status = match report.outcome {
        Outcome::Warn => "warning",
        _ => "failed",
    };
    println!(
        "\nParity {}: {} discrepancies",
        status,
        report.total_discrepancies()
    );
}

fn output_github(report: &ParityReport, board: &Path) {
    let level = match report.outcome {
        Outcome::Warn => "warning",
        _ => "error",
    };
    for d in &report.discrepancies {
        println!(
            "::{} file={}::{}",
            level,
            board.display(),
            d.message.replace('\n', " ")
        );
    }
}

fn handle_summary(export: &Path, board: Option<&Path>, format: SummaryFormat) -> i32 {
    let schematic = match parse_export(export) {
        Ok(s) => s,
        Err(e) => return fatal(&e),
    };
    let board = match board.map(load_board).transpose() {
        Ok(b) => b,
        Err(e) => return fatal(&e),
    };

    match format {
        SummaryFormat::Human => {
            println!("Export: {}", export.display());
            if let Some(source) = &schematic.source {
                println!("  Source:     {}", source);
            }
            println!("  Components: {}", schematic.components.len());
            println!("  Nets:       {}", schematic.nets.len());
            if let Some(board) = &board {
                println!("Board: {}", board.filename);
                match board.host_version() {
                    Some(v) => println!("  KiCad:      {}", v),
                    None => println!("  KiCad:      unknown"),
                }
                println!("  Components: {}", board.list_components().len());
                println!("  Nets:       {}", board.net_count());
            }
        }
        SummaryFormat::Json => {
            let board_json = board.as_ref().map(|b| {
                serde_json::json!({
                    "file": b.filename,
                    "kicad_version": b.host_version().map(|v| v.to_string()),
                    "components": b.list_components().len(),
                    "nets": b.net_count(),
                })
            });
            let summary = serde_json::json!({
                "export": {
                    "file": export.display().to_string(),
                    "version": schematic.version,
                    "source": schematic.source,
                    "components": schematic.components.len(),
                    "nets": schematic.nets.len(),
                },
                "board": board_json,
            });
            if !print_json(serde_json::to_string_pretty(&summary)) {
                return exit_codes::GENERIC_ERROR;
            }
        }
    }
    0
}

fn print_json(rendered: serde_json::Result<String>) -> bool {
    match rendered {
        Ok(text) => {
            println!("{}", text);
            true
        }
        Err(e) => {
            error!("Failed to serialize JSON: {}", e);
            false
        }
    }
}
