//! Dtforge CLI - Command-line tool for engine DataTable containers.
//!
//! This is the main entry point for the Dtforge command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};
use walkdir::WalkDir;

use dtforge::prelude::*;
use dtforge::{paired_payload_path, METADATA_EXTENSION};

/// Dtforge - DataTable container inspection and editing tool
#[derive(Parser)]
#[command(name = "dtforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// A metadata file and its payload file.
#[derive(Args)]
struct Input {
    /// Path to the metadata (.uasset) file
    #[arg(short = 'a', long, env = "DTFORGE_UASSET")]
    uasset: PathBuf,

    /// Path to the payload (.uexp) file, defaults to the one next to the metadata
    #[arg(short = 'e', long, env = "DTFORGE_UEXP")]
    uexp: Option<PathBuf>,
}

impl Input {
    fn payload(&self) -> PathBuf {
        self.uexp.clone().unwrap_or_else(|| paired_payload_path(&self.uasset))
    }

    fn load(&self) -> Result<DataTable> {
        let payload = self.payload();
        DataTable::load(&self.uasset, &payload)
            .with_context(|| format!("Failed to load {} / {}", self.uasset.display(), payload.display()))
    }
}

/// Where to write an encoded container.
#[derive(Args)]
struct Output {
    /// Output metadata file (defaults to overwriting the input)
    #[arg(long)]
    out_uasset: Option<PathBuf>,

    /// Output payload file (defaults to overwriting the input)
    #[arg(long)]
    out_uexp: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show table name, row count and columns
    Info {
        #[command(flatten)]
        input: Input,
    },

    /// Dump the table as JSON
    Dump {
        #[command(flatten)]
        input: Input,

        /// Output JSON file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List name table entries
    Names {
        /// Path to the metadata (.uasset) file
        #[arg(short = 'a', long, env = "DTFORGE_UASSET")]
        uasset: PathBuf,

        /// Compare stored hashes with computed ones
        #[arg(long)]
        verify: bool,
    },

    /// Print the validation hash of a name
    Hash {
        /// The name to hash
        name: String,
    },

    /// Load and re-encode a container, reporting byte identity
    Roundtrip {
        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        output: Output,
    },

    /// Set one scalar cell and save
    Set {
        #[command(flatten)]
        input: Input,

        /// Row key
        #[arg(short, long)]
        row: String,

        /// Column name
        #[arg(short, long)]
        column: String,

        /// New value, parsed according to the cell's kind
        #[arg(long)]
        value: String,

        #[command(flatten)]
        output: Output,
    },

    /// Round-trip every container under a directory in memory
    VerifyDir {
        /// Directory to scan
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Info { input } => cmd_info(&input)?,
        Commands::Dump { input, output } => cmd_dump(&input, output.as_deref())?,
        Commands::Names { uasset, verify } => cmd_names(&uasset, verify)?,
        Commands::Hash { name } => cmd_hash(&name),
        Commands::Roundtrip { input, output } => cmd_roundtrip(&input, &output)?,
        Commands::Set {
            input,
            row,
            column,
            value,
            output,
        } => cmd_set(&input, &row, &column, &value, &output)?,
        Commands::VerifyDir { input } => cmd_verify_dir(&input)?,
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn cmd_info(input: &Input) -> Result<()> {
    let start = Instant::now();
    let table = input.load()?;

    println!("Table:   {}", table.name);
    println!("Rows:    {}", table.len());
    println!("Header:  {} bytes", table.header_bytes.len());
    println!("Footer:  {} bytes", table.footer_bytes.len());
    println!("Loaded in {:?}", start.elapsed());

    let columns = table.columns();
    if !columns.is_empty() {
        println!();
        println!("{:<32} KIND", "COLUMN");
        for column in columns {
            println!("{:<32} {}", column.name, column.kind);
        }
    }
    Ok(())
}

fn cmd_dump(input: &Input, output: Option<&Path>) -> Result<()> {
    let table = input.load()?;
    let json = serde_json::to_string_pretty(&table).context("Failed to serialize table")?;

    match output {
        Some(path) => {
            fs::write(path, json).context("Failed to write output file")?;
            println!("Wrote {} rows to {}", table.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_names(uasset: &Path, verify: bool) -> Result<()> {
    let data = fs::read(uasset).context("Failed to read metadata file")?;
    let names = NameTable::parse(&data).context("Failed to parse name table")?;

    let mut mismatches = 0;
    for (index, entry) in names.iter().enumerate() {
        let marker = if verify && !entry.hash_matches() {
            mismatches += 1;
            format!("  (expected {})", NameHash::compute(&entry.text))
        } else {
            String::new()
        };
        println!("{index:>6}  {}  {}{marker}", entry.hash, entry.text);
    }

    println!();
    println!("{} names, name list ends at {:#x}", names.len(), names.end_offset());
    if verify {
        if mismatches > 0 {
            bail!("{mismatches} stored hashes do not match");
        }
        println!("All hashes match");
    }
    Ok(())
}

fn cmd_hash(name: &str) {
    println!("{}  {}", NameHash::compute(name), name);
}

fn cmd_roundtrip(input: &Input, output: &Output) -> Result<()> {
    let table = input.load()?;
    let metadata = fs::read(&input.uasset).context("Failed to read metadata file")?;
    let payload = fs::read(input.payload()).context("Failed to read payload file")?;

    let encoded = table
        .encode(&metadata, payload.len())
        .context("Failed to encode table")?;

    let identical = encoded.metadata == metadata && encoded.payload == payload;
    println!("Rows:      {}", table.len());
    println!("Metadata:  {} -> {} bytes", metadata.len(), encoded.metadata.len());
    println!("Payload:   {} -> {} bytes", payload.len(), encoded.payload.len());
    println!("Identical: {}", if identical { "yes" } else { "no" });

    if let Some(path) = &output.out_uasset {
        fs::write(path, &encoded.metadata).context("Failed to write metadata file")?;
    }
    if let Some(path) = &output.out_uexp {
        fs::write(path, &encoded.payload).context("Failed to write payload file")?;
    }

    if !identical {
        bail!("re-encoded container differs from the input");
    }
    Ok(())
}

fn cmd_set(input: &Input, row: &str, column: &str, value: &str, output: &Output) -> Result<()> {
    let mut table = input.load()?;
    let cell = table
        .row_mut(row)
        .with_context(|| format!("No row {row:?}"))?
        .cell_mut(column)
        .with_context(|| format!("No column {column:?} in row {row:?}"))?;

    let old = cell.value.to_string();
    cell.value = parse_value(&cell.value, value)
        .with_context(|| format!("Invalid value for {} column {column:?}", cell.kind()))?;
    println!("{row}.{column}: {old} -> {}", cell.value);

    table
        .save(output.out_uasset.as_deref(), output.out_uexp.as_deref())
        .context("Failed to save table")?;
    Ok(())
}

/// Parse `text` as a value of the same kind as `current`.
fn parse_value(current: &CellValue, text: &str) -> Result<CellValue> {
    let value = match current {
        CellValue::Bool(_) => CellValue::Bool(text.parse()?),
        CellValue::Byte(_) => CellValue::Byte(text.parse()?),
        CellValue::Enum(_) => CellValue::Enum(text.to_string()),
        CellValue::Float(_) => CellValue::Float(text.parse()?),
        CellValue::Int(_) => CellValue::Int(text.parse()?),
        CellValue::UInt32(_) => CellValue::UInt32(text.parse()?),
        CellValue::Name(_) => CellValue::Name(text.to_string()),
        CellValue::Object(_) => CellValue::Object(text.parse()?),
        CellValue::SoftObject(_) => CellValue::SoftObject(text.to_string()),
        CellValue::Str(_) => CellValue::Str(text.to_string()),
        // A text cell without a source string has nowhere to put one.
        CellValue::Text(None) => bail!("text cell has no source string"),
        CellValue::Text(Some(_)) => CellValue::Text(Some(text.to_string())),
        CellValue::Struct(_) | CellValue::Array(_) => bail!("only scalar cells can be set"),
    };
    Ok(value)
}

fn cmd_verify_dir(input: &Path) -> Result<()> {
    println!("Scanning {}", input.display());
    let start = Instant::now();

    let mut checked = 0;
    let mut failed = Vec::new();
    for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some(METADATA_EXTENSION) {
            continue;
        }
        let payload_path = paired_payload_path(path);
        if !payload_path.exists() {
            debug!("Skipping {}: no payload file", path.display());
            continue;
        }

        checked += 1;
        if let Err(err) = verify_pair(path, &payload_path) {
            warn!("{}: {err:#}", path.display());
            failed.push(path.to_path_buf());
        }
    }

    println!("Checked {checked} containers in {:?}", start.elapsed());
    if !failed.is_empty() {
        for path in &failed {
            println!("  FAILED {}", path.display());
        }
        bail!("{} of {checked} containers did not round-trip", failed.len());
    }
    println!("All containers round-trip");
    Ok(())
}

fn verify_pair(metadata_path: &Path, payload_path: &Path) -> Result<()> {
    let metadata = fs::read(metadata_path).context("Failed to read metadata file")?;
    let payload = fs::read(payload_path).context("Failed to read payload file")?;

    let name = metadata_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let table = DataTable::from_bytes(name, &metadata, &payload).context("Failed to decode")?;
    let encoded = table.encode(&metadata, payload.len()).context("Failed to encode")?;

    if encoded.payload != payload {
        bail!("payload differs after re-encoding");
    }
    if encoded.metadata != metadata {
        bail!("metadata differs after re-encoding");
    }
    Ok(())
}
