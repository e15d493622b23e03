//! CLI tool for converting image cash letter files between X9, JSON, and CSV.
//!
//! # Usage
//!
//! ```bash
//! # Dump an X9 file as JSON
//! icl-convert --input sample.x9 --input-format x9 --output-format json --output sample.json
//!
//! # Build an X9 file from edited JSON, recomputing control totals
//! icl-convert -i sample.json --input-format json --output-format x9 -o sample.x9
//!
//! # List items as CSV
//! cat sample.x9 | icl-convert --input-format x9 --output-format csv > items.csv
//! ```

use std::fs::File;
use std::io::{Read, Write, stdin, stdout};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use icl::{Reader, WriteMode, Writer, model::ValidateOptions, report};
use tracing::{debug, info};

/// Convert image cash letter files between X9, JSON, and CSV.
///
/// Reads a file from input (file or stdin) and writes it
/// to output (file or stdout) in the specified format.
#[derive(Parser, Debug)]
#[command(name = "icl-convert")]
#[command(version, about)]
struct Args {
    /// Input file path. If not specified, reads from stdin.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Input format.
    #[arg(long, value_enum)]
    input_format: FormatArg,

    /// Output format.
    #[arg(long, value_enum)]
    output_format: FormatArg,

    /// Output file path. If not specified, writes to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write control records as they are instead of recomputing totals.
    #[arg(long)]
    preserve_totals: bool,

    /// Skip field validation of the input.
    #[arg(long)]
    no_validate: bool,

    /// Also check that control totals match the items.
    #[arg(long, conflicts_with = "no_validate")]
    strict: bool,
}

/// Supported file formats for CLI arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// X9.100-187 fixed-width records.
    X9,
    /// JSON snapshot of the file tree.
    Json,
    /// Item listing, one row per item (output only).
    Csv,
}

#[derive(Debug, Clone, Copy)]
struct Options {
    mode: WriteMode,
    validate: Option<ValidateOptions>,
}

impl From<&Args> for Options {
    fn from(args: &Args) -> Self {
        let validate = (!args.no_validate).then_some(ValidateOptions { strict_totals: args.strict });
        let mode = if args.preserve_totals { WriteMode::Preserve } else { WriteMode::Recompute };
        Self { mode, validate }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    // Open input source
    let input: Box<dyn Read> = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(stdin().lock()),
    };

    // Open output destination
    let output: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(stdout().lock()),
    };

    let count = convert(input, output, args.input_format, args.output_format, (&args).into())?;

    // Report result to stderr (so it doesn't interfere with stdout output)
    eprintln!("Converted {count} item(s)");

    Ok(())
}

/// Reads the whole file, validates it and writes it in the output format.
///
/// Returns the number of items converted.
fn convert<R: Read, W: Write>(
    input: R,
    mut output: W,
    input_format: FormatArg,
    output_format: FormatArg,
    options: Options,
) -> Result<usize> {
    let file = read_file(input, input_format)?;

    if let Some(validate) = options.validate {
        file.validate_with(validate).context("Input failed validation")?;
    }
    let count = file.items().count();
    info!(items = count, ?input_format, ?output_format, "converting");

    match output_format {
        FormatArg::X9 => {
            let mut writer = Writer::with_mode(output, options.mode);
            writer.write(&file).context("Failed to write X9 output")?;
            debug!(records = writer.records_written(), "x9 written");
            writer.flush().context("Failed to flush output")?;
        }
        FormatArg::Json => {
            serde_json::to_writer_pretty(&mut output, &file)
                .context("Failed to write JSON output")?;
            writeln!(output)?;
            output.flush().context("Failed to flush output")?;
        }
        FormatArg::Csv => {
            report::write_items_csv(&file, &mut output).context("Failed to write CSV output")?;
            output.flush().context("Failed to flush output")?;
        }
    }

    Ok(count)
}

fn read_file<R: Read>(input: R, format: FormatArg) -> Result<icl::File> {
    match format {
        FormatArg::X9 => Reader::new(input).read().context("Failed to read X9 input"),
        FormatArg::Json => serde_json::from_reader(input).context("Failed to read JSON input"),
        FormatArg::Csv => bail!("CSV is an output-only format"),
    }
}
