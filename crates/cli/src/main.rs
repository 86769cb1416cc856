//! Offline developer tool for smart card messages
//!
//! Builds and parses command APDUs, frames them for a CCID reader, unframes
//! reader replies and decodes card-resident TLV data. Every input is hex.

use clap::{Parser, Subcommand};
use std::error::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

mod commands;
mod utils;

use commands::*;
use utils::{HexBytes, parse_byte};

#[derive(Parser)]
#[command(version, about = "Build, frame and decode smart card messages")]
struct Cli {
    /// Debug level output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a command APDU
    Build {
        /// Class byte
        #[arg(long, value_parser = parse_byte, default_value = "00")]
        cla: u8,

        /// Instruction byte
        #[arg(long, value_parser = parse_byte)]
        ins: u8,

        /// First parameter byte
        #[arg(long, value_parser = parse_byte, default_value = "00")]
        p1: u8,

        /// Second parameter byte
        #[arg(long, value_parser = parse_byte, default_value = "00")]
        p2: u8,

        /// Command data (hex)
        #[arg(long)]
        data: Option<HexBytes>,

        /// Expected response length, 0 for the maximum
        #[arg(long)]
        le: Option<u16>,
    },

    /// Encode SELECT by DF name for an application identifier
    Select {
        /// Application identifier (hex)
        aid: HexBytes,
    },

    /// Show the fields of an encoded command APDU
    Parse {
        /// Command APDU (hex)
        apdu: HexBytes,
    },

    /// Split a response APDU into payload and status word
    Response {
        /// Response APDU (hex)
        response: HexBytes,
    },

    /// Wrap a command APDU into a PC_to_RDR_XfrBlock message
    Frame {
        /// Command APDU (hex)
        apdu: HexBytes,

        /// Sequence number
        #[arg(short, long, default_value_t = 0)]
        sequence: u8,

        /// Slot number
        #[arg(long, default_value_t = 0)]
        slot: u8,

        /// Block waiting time integer, 0 disables wait extension
        #[arg(long, default_value_t = 1)]
        block_wait: u8,
    },

    /// Parse a CCID message and interpret it as a reader reply
    Unframe {
        /// CCID message (hex)
        message: HexBytes,
    },

    /// Dump the TLV structure of a buffer
    Tlv {
        /// TLV data (hex)
        data: HexBytes,
    },

    /// Decode a record (EF.COM, FCP) chosen by its outer tag
    Decode {
        /// Record (hex)
        data: HexBytes,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match cli.command {
        Commands::Build {
            cla,
            ins,
            p1,
            p2,
            data,
            le,
        } => build_command(cla, ins, p1, p2, data.map(HexBytes::into_inner), le)?,
        Commands::Select { aid } => select_command(aid.into_inner())?,
        Commands::Parse { apdu } => parse_command(&apdu)?,
        Commands::Response { response } => response_command(&response)?,
        Commands::Frame {
            apdu,
            sequence,
            slot,
            block_wait,
        } => frame_command(&apdu, sequence, slot, block_wait)?,
        Commands::Unframe { message } => unframe_command(&message)?,
        Commands::Tlv { data } => tlv_command(&data)?,
        Commands::Decode { data } => decode_command(&data)?,
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_ansi(true)
        .init();
}

/// `RUST_LOG` directives on top of the level chosen by `-v`
fn log_filter(verbose: bool) -> EnvFilter {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };

    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}
