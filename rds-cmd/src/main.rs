mod decode;
mod info;

use std::io::stderr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use rds::{InputType, Options};
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
    /// Decode RDS groups from demodulated bitstreams.
    ///
    /// Each group is written on its own line. Multiple inputs are decoded in parallel
    /// and written in the order given.
    Decode {
        /// Encoding of the input bits, ascii-bits or packed-bits.
        #[arg(short, long, default_value = "ascii-bits", value_parser = parse_input_type)]
        input_type: InputType,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: decode::Format,

        /// Also write groups missing one or more blocks.
        #[arg(short, long, action)]
        partial: bool,

        /// Input bitstream files. Reads stdin if none are given or the input is "-".
        inputs: Vec<PathBuf>,
    },
    /// Show decoding statistics for a bitstream.
    Info {
        /// Encoding of the input bits, ascii-bits or packed-bits.
        #[arg(short, long, default_value = "ascii-bits", value_parser = parse_input_type)]
        input_type: InputType,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: info::Format,

        /// Input bitstream file. Reads stdin if not given or "-".
        input: Option<PathBuf>,
    },
}

fn parse_input_type(s: &str) -> Result<InputType, String> {
    InputType::from_str(s).map_err(|err| err.to_string())
}

/// Returns `None` if `path` indicates stdin.
fn input_path(path: Option<&PathBuf>) -> Option<&PathBuf> {
    path.filter(|p| p.as_os_str() != "-")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("RDS_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Decode {
            input_type,
            format,
            partial,
            inputs,
        } => {
            let opts = Options::builder().input_type(*input_type).build();
            match inputs.as_slice() {
                [] => decode::decode_stdin(&opts, format, *partial),
                [input] if input_path(Some(input)).is_none() => {
                    decode::decode_stdin(&opts, format, *partial)
                }
                _ => {
                    if inputs.iter().any(|p| input_path(Some(p)).is_none()) {
                        bail!("stdin cannot be combined with other inputs");
                    }
                    decode::decode_files(inputs, &opts, format, *partial)
                }
            }
        }
        Commands::Info {
            input_type,
            format,
            input,
        } => {
            let opts = Options::builder().input_type(*input_type).build();
            info::info(input_path(input.as_ref()), &opts, format)
        }
    }
}
