mod info;
mod scan;

use std::io::stderr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use smarttrak::{DecoderConfig, Layout};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the logbook header and dives in an .asd file.
    Info {
        /// Input .asd file
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Record layout written by the dive computer firmware.
        #[arg(short, long, value_enum, default_value_t = LayoutArg::Tagged)]
        layout: LayoutArg,

        /// Include profile samples in text output.
        #[arg(short, long, action)]
        profile: bool,
    },
    /// Locate dive records by device id and decode them in parallel.
    ///
    /// Useful for files where the header or a record is damaged and stream decoding
    /// stops early.
    Scan {
        /// Input .asd file
        input: PathBuf,

        /// Device id, decimal or 0x prefixed hex.
        #[arg(short, long, value_parser = parse_device_id)]
        device_id: u32,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub(crate) enum Format {
    Json,
    Text,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum LayoutArg {
    /// Summary, tagged timeseries block, footer
    Tagged,
    /// Older fixed 316 byte records
    Legacy,
}

impl From<LayoutArg> for Layout {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::Tagged => Layout::Tagged,
            LayoutArg::Legacy => Layout::Legacy,
        }
    }
}

fn parse_device_id(s: &str) -> Result<u32, String> {
    let zult = match s.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse::<u32>(),
    };
    zult.map_err(|err| format!("invalid device id: {err}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("ASD_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Info {
            input,
            format,
            layout,
            profile,
        } => {
            let config = DecoderConfig::builder().layout((*layout).into()).build();
            info::info(input, *format, config, *profile)
                .with_context(|| format!("failed to decode {input:?}"))
        }
        Commands::Scan {
            input,
            device_id,
            format,
        } => scan::scan(input, *device_id, *format),
    }
}
