//! fstore - move captured video segments in and out of the uvcvideo framestore.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use framestore_core::constants::{geometry, DEFAULT_CAPTURE_DEVICE, DEFAULT_FRAMESTORE_DIR};
use tracing_subscriber::EnvFilter;

/// fstore - userspace <-> kernelspace framestore converter.
#[derive(Parser)]
#[command(name = "fstore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Framestore directory exposed by the driver
    #[arg(long, env = "FRAMESTORE_DIR", default_value = DEFAULT_FRAMESTORE_DIR, global = true)]
    store: PathBuf,

    /// Print the transfer report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a segment tree into the framestore (user -> kernel)
    Export {
        /// Root of the segment tree (`00/frame_0000.mjpg`, ...)
        dir: PathBuf,

        /// Arena capacity in bytes, if it differs from the driver default
        #[arg(long)]
        capacity: Option<u64>,

        /// Only scan the tree and print the layout it would produce
        #[arg(long)]
        dry_run: bool,
    },

    /// Recreate a segment tree from the framestore (kernel -> user)
    Import {
        /// Target directory; replaced if it exists
        dir: PathBuf,

        /// Fail instead of warning when a raw frame declares more than its slot
        #[arg(long)]
        strict: bool,

        /// Mirror every raw-planar frame horizontally after it is written
        #[arg(long)]
        mirror: bool,
    },

    /// Print the segment table currently held by the framestore
    Inspect,

    /// Capture a segment tree from a camera with v4l2-ctl
    Capture {
        /// Target directory; replaced if it exists
        dir: PathBuf,

        /// Segments to capture, e.g. `3y,2m`
        plan: String,

        /// Video device node
        #[arg(short, long, default_value = DEFAULT_CAPTURE_DEVICE)]
        device: PathBuf,

        /// Mirror every raw-planar frame horizontally after capture
        #[arg(long)]
        mirror: bool,
    },

    /// Mirror one packed YUYV frame horizontally
    Mirror {
        /// Packed YUYV frame file
        input: PathBuf,

        /// Where to write the mirrored frame
        output: PathBuf,

        #[arg(long, default_value_t = geometry::YUYV.0)]
        width: u32,

        #[arg(long, default_value_t = geometry::YUYV.1)]
        height: u32,
    },
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // RUST_LOG wins when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Export { dir, capacity, dry_run } => {
            commands::transfer::export(&cli.store, &dir, capacity, dry_run, cli.json)
        }
        Commands::Import { dir, strict, mirror } => {
            commands::transfer::import(&cli.store, &dir, strict, mirror, cli.json)
        }
        Commands::Inspect => commands::transfer::inspect(&cli.store, cli.json),
        Commands::Capture { dir, plan, device, mirror } => {
            commands::capture::capture(&dir, &plan, &device, mirror)
        }
        Commands::Mirror { input, output, width, height } => {
            commands::capture::mirror(&input, &output, width, height)
        }
    }
}
