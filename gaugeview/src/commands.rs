use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gaugeview", version, about = "Marine gauge dashboard viewer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a dashboard and validate it
    Check { dashboard: PathBuf },
    /// Print the subscription request of every gauge as JSON
    Subscriptions { dashboard: PathBuf },
    /// Play a recorded event stream against a dashboard and write SVG snapshots
    Replay {
        dashboard: PathBuf,
        events: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Snapshot period in recording time; only the final state when absent
        #[arg(long)]
        every_ms: Option<u64>,
    },
    /// Read events as JSON lines from stdin and report gauge states
    Live {
        dashboard: PathBuf,
        #[arg(long, default_value_t = 10)]
        ticks: u64,
        /// Write the final frame of every gauge as SVG here
        #[arg(long)]
        out: Option<PathBuf>,
    },
}
