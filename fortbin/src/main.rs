//! fortbin - inspect Fortran unformatted sequential files
//!
//! Prints record structure information for a file written with
//! `form='unformatted'` sequential I/O.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use fortbin_engine::{
    Endianness, ErrorKind, FormatConfig, FortranBinaryFile, FortranError, MarkerWidth, OpenMode,
};

mod config;

use config::FileConfig;

/// Inspect a Fortran unformatted sequential file
#[derive(Parser, Debug)]
#[command(name = "fortbin")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to inspect
    path: PathBuf,

    /// Print the byte length of every record
    #[arg(long)]
    records: bool,

    /// Print the number of records
    #[arg(long)]
    count: bool,

    /// Print offset and length of the first record equal to TEXT
    #[arg(long, value_name = "TEXT")]
    find: Option<String>,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Record marker width in bytes (4 or 8)
    #[arg(long, value_parser = parse_marker_width)]
    marker_width: Option<MarkerWidth>,

    /// Byte order of markers and data (native, little, big)
    #[arg(long)]
    byte_order: Option<Endianness>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn parse_marker_width(s: &str) -> Result<MarkerWidth, String> {
    let width: u8 = s
        .parse()
        .map_err(|_| format!("marker width must be 4 or 8, got {}", s))?;
    MarkerWidth::try_from(width)
}

/// Format values as a tuple: `()`, `(16,)`, `(16, 24, 24)`
fn format_tuple(values: &[u64]) -> String {
    match values {
        [] => "()".to_string(),
        [only] => format!("({},)", only),
        _ => {
            let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            format!("({})", items.join(", "))
        }
    }
}

fn init_logging(level: &str) -> Result<()> {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Exit code for a failed run
fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<FortranError>().map(FortranError::kind) {
        Some(ErrorKind::OpenFailure) => 2,
        Some(ErrorKind::Framing) => 3,
        _ => 1,
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let file_config = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    let level = args
        .log_level
        .as_deref()
        .or(file_config.log_level.as_deref())
        .unwrap_or("warn");
    init_logging(level)?;

    let mut format = file_config.format;
    if let Some(width) = args.marker_width {
        format = format.with_marker_width(width);
    }
    if let Some(order) = args.byte_order {
        format = format.with_byte_order(order);
    }

    let stdout = io::stdout();
    let code = inspect(&args, format, &mut stdout.lock())?;
    Ok(ExitCode::from(code))
}

/// Open `args.path` and print what the action flags ask for
///
/// Returns the process exit code for a completed run.
fn inspect<W: Write>(args: &Args, format: FormatConfig, out: &mut W) -> Result<u8> {
    info!("Inspecting {}", args.path.display());
    debug!("Format: {:?}", format);

    let mut file = FortranBinaryFile::open_with(&args.path, OpenMode::Read, format)?;
    file.scoped(|file| {
        if args.records {
            writeln!(out, "{}", format_tuple(&file.record_byte_lengths()?))?;
        }

        if args.count {
            writeln!(out, "{}", file.record_count()?)?;
        }

        if let Some(label) = &args.find {
            match file.find(label.as_str())? {
                Some(record) => writeln!(out, "{} {}", record.offset(), record.len())?,
                None => {
                    eprintln!("No record equal to {:?} in {}", label, args.path.display());
                    return Ok(1);
                }
            }
        }

        Ok(0)
    })
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}
