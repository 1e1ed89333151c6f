//! Thump CLI - inspect waveforms and drive the synthesis engine offline.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "thump")]
#[command(author, version, about = "Thump synthesis engine CLI", long_about = None)]
struct Cli {
    /// Log engine activity to stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Engine config file (TOML); command-line flags override it
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a periodic waveform
    Wave(commands::wave::WaveArgs),

    /// Play one note on an offline clock and print the gain automation
    Trigger(commands::trigger::TriggerArgs),

    /// Print the nodes, edges, and sources of the demo voice
    Graph(commands::graph::GraphArgs),
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(fallback)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = commands::common::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Wave(args) => commands::wave::run(args, config),
        Commands::Trigger(args) => commands::trigger::run(args, config),
        Commands::Graph(args) => commands::graph::run(args, config),
    }
}
