//! Command-line converter between the binary (x86/x64) and JSON dialects.
use std::fmt;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use aep::{Architecture, Project};

/// Convert AEP project files between the x86, x64 and JSON dialects.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The input file to read.
    #[arg(long)]
    input: PathBuf,

    /// The dialect to decode the input as.
    #[arg(long, value_enum)]
    input_format: Format,

    /// The output file to write.
    #[arg(long)]
    output: PathBuf,

    /// The dialect to encode the output as.
    #[arg(long, value_enum)]
    output_format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Format {
    X86,
    X64,
    Json,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::X86 => write!(f, "x86"),
            Format::X64 => write!(f, "x64"),
            Format::Json => write!(f, "json"),
        }
    }
}

fn decode(format: Format, bytes: &[u8]) -> aep::Result<Project> {
    match format {
        Format::X86 => aep::decode_binary(bytes, Architecture::X86),
        Format::X64 => aep::decode_binary(bytes, Architecture::X64),
        Format::Json => aep::decode_json(bytes),
    }
}

fn encode(format: Format, project: &Project) -> aep::Result<Vec<u8>> {
    match format {
        Format::X86 => aep::encode_binary(project, Architecture::X86),
        Format::X64 => aep::encode_binary(project, Architecture::X64),
        Format::Json => aep::encode_json(project),
    }
}

fn main() -> Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .context("failed to initialize logger")?;

    let cli = Cli::parse();

    log::info!(
        "converting {:?} ({}) -> {:?} ({})",
        cli.input,
        cli.input_format,
        cli.output,
        cli.output_format
    );

    let input = fs::read(&cli.input)
        .with_context(|| format!("failed to read input file {:?}", cli.input))?;

    let project = decode(cli.input_format, &input)
        .with_context(|| format!("failed to decode {} input", cli.input_format))?;

    let output = encode(cli.output_format, &project)
        .with_context(|| format!("failed to encode {} output", cli.output_format))?;

    fs::write(&cli.output, output)
        .with_context(|| format!("failed to write output file {:?}", cli.output))?;

    Ok(())
}
