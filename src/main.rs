//! # mimecharset CLI
//!
//! Decodes a file (or stdin) from a named charset into UTF-8 using the same
//! backend a message parser would, and lists the codepage table used on Windows.

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use serde::Serialize;
#[cfg(feature = "cli")]
use tracing::debug;
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
use mimecharset::codepage::{self, CodePage};
#[cfg(feature = "cli")]
use mimecharset::{Decoder, DecoderOptions};

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features disabled. Enable with --features cli");
    std::process::exit(1);
}

/// mimecharset: decode charset-labelled text into UTF-8
#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "mimecharset")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Decode input from a charset into UTF-8
    Decode(DecodeArgs),

    /// List the encoding names of the codepage table
    List,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct DecodeArgs {
    /// Source charset, e.g. GB18030
    #[arg(short, long)]
    charset: String,

    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Decoder options as JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial output buffer as a multiple of the input size
    #[arg(long)]
    initial_ratio: Option<usize>,

    /// Refuse to produce more than this many bytes
    #[arg(long)]
    max_output: Option<usize>,
}

#[cfg(feature = "cli")]
#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct DecodeSummary<'a> {
    charset: &'a str,
    bytes_in: usize,
    bytes_out: usize,
    processing_time_ms: u64,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct TableEntry {
    name: &'static str,
    codepage: CodePage,
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Decode(ref args) => decode_command(args, &cli)?,
        Commands::List => list_command(&cli)?,
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn load_options(args: &DecodeArgs) -> Result<DecoderOptions> {
    let mut options = match args.config {
        Some(ref path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Invalid decoder config: {}", path.display()))?
        }
        None => DecoderOptions::default(),
    };
    if let Some(ratio) = args.initial_ratio {
        options.initial_ratio = ratio;
    }
    if let Some(max) = args.max_output {
        options.max_output = max;
    }
    Ok(options)
}

#[cfg(feature = "cli")]
fn decode_command(args: &DecodeArgs, cli: &Cli) -> Result<()> {
    let start_time = std::time::Instant::now();

    let options = load_options(args)?;
    debug!(?options, "decoder options");
    let decoder = Decoder::new(options)?;

    let input_data = if let Some(ref input_path) = args.input {
        debug!(path = %input_path.display(), "reading input");
        fs::read(input_path)
            .with_context(|| format!("Failed to read input file: {}", input_path.display()))?
    } else {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    };

    let output_data = decoder
        .decode(args.charset.as_str(), &input_data)
        .with_context(|| format!("Failed to decode input as {}", args.charset))?;

    if let Some(ref output_path) = args.output {
        fs::write(output_path, &output_data)
            .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;
    } else {
        io::stdout()
            .write_all(&output_data)
            .context("Failed to write to stdout")?;
    }

    let processing_time = start_time.elapsed();
    debug!(
        bytes_in = input_data.len(),
        bytes_out = output_data.len(),
        ?processing_time,
        "decoded"
    );

    if let OutputFormat::Json = cli.format {
        let summary = DecodeSummary {
            charset: &args.charset,
            bytes_in: input_data.len(),
            bytes_out: output_data.len(),
            processing_time_ms: processing_time.as_millis() as u64,
        };
        // stdout may carry the decoded text
        eprintln!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn list_command(cli: &Cli) -> Result<()> {
    let entries: Vec<TableEntry> = codepage::entries()
        .map(|(name, codepage)| TableEntry { name, codepage })
        .collect();

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => {
            println!("Codepage table ({} names):", entries.len());
            for entry in &entries {
                println!("  {:15} {}", entry.name, entry.codepage);
            }
        }
    }

    Ok(())
}
