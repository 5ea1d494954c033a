//! CLI for bib-labelmaker - Rewrite BibTeX citation keys to author-year labels.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser};
use tracing::Level;

use bib_labelmaker::{
    bibfile::is_stdio, labelled_path, load_bib, relabel, summary_json, write_bib, LabelError,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Rewrite the citation keys of an exported .bib file to author-year labels
#[derive(Parser)]
#[command(name = "bib-labelmaker")]
#[command(version)]
#[command(after_help = "\
Examples:
  bib-labelmaker library.bib                 writes library_labelled.bib
  bib-labelmaker library.bib -o refs.bib
  cat library.bib | bib-labelmaker - > labelled.bib
  bib-labelmaker library.bib --json

Labels: smith2019, bassoperi2021 (two authors), rakosietal2020 (three or more).
Collisions get a letter suffix: doe2020, doe2020a, doe2020b, ...")]
struct Cli {
    /// Input .bib file (use '-' for stdin)
    input: PathBuf,

    /// Output file (default: <input>_labelled.bib next to the input; '-' for stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a JSON summary of key changes to stdout
    #[arg(long)]
    json: bool,

    /// Log more (-v for per-entry details, -vv for field scanning)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

// ---------------------------------------------------------------------------
// AppError — semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 2 — conflicting options
    Usage(String),
    /// Exit 10 — input file not found / unreadable
    InputFile(String),
    /// Exit 11 — some entries could not get a unique label
    LabelExhausted(Vec<LabelError>),
    /// Exit 12 — cannot write output file
    OutputFile(String),
    /// Exit 13 — cannot produce the JSON summary
    Summary(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::Usage(_) => 2,
            AppError::InputFile(_) => 10,
            AppError::LabelExhausted(_) => 11,
            AppError::OutputFile(_) => 12,
            AppError::Summary(_) => 13,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Usage(msg) => write!(f, "{}", msg),
            AppError::InputFile(msg) => {
                write!(f, "{}\n  hint: verify the file path is correct and the file is UTF-8", msg)
            }
            AppError::LabelExhausted(failures) => {
                for failure in failures {
                    writeln!(f, "{}", failure)?;
                }
                write!(
                    f,
                    "  hint: these entries kept their original keys in the output; \
                     check the input for duplicated records"
                )
            }
            AppError::OutputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the output directory exists and is writable",
                    msg
                )
            }
            AppError::Summary(msg) => write!(f, "{}", msg),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    let destination = match cli.output {
        Some(path) => path,
        None if is_stdio(&cli.input) => PathBuf::from("-"),
        None => labelled_path(&cli.input),
    };

    if cli.json && is_stdio(&destination) {
        return Err(AppError::Usage(
            "--json prints to stdout and cannot be combined with writing the bibliography to stdout"
                .to_string(),
        ));
    }

    relabel_command(&cli.input, &destination, cli.json)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Relabel one bibliography file.
fn relabel_command(input: &Path, destination: &Path, json: bool) -> Result<(), AppError> {
    tracing::info!(input = %input.display(), "relabelling");

    // 1. Read the whole file; nothing is written if this fails
    let content =
        load_bib(input).map_err(|e| AppError::InputFile(e.to_string()))?;

    // 2. Relabel every entry in file order
    let result = relabel(&content);

    // 3. Write the output, including entries that kept their keys
    write_bib(destination, &result.render())
        .map_err(|e| AppError::OutputFile(e.to_string()))?;
    if !is_stdio(destination) {
        tracing::info!(
            output = %destination.display(),
            relabelled = result.relabelled_count(),
            unchanged = result.unchanged_count(),
            "wrote labelled bibliography"
        );
    }

    // 4. Optional summary
    if json {
        let summary =
            summary_json(&result.entries).map_err(|e| AppError::Summary(e.to_string()))?;
        println!("{}", summary);
    }

    if !result.is_complete() {
        return Err(AppError::LabelExhausted(result.failures));
    }

    Ok(())
}
