//! HEXFILL CLI - Command-line interface
//!
//! Commands:
//! - play: Play a match between two robots
//! - list: Show the robot roster
//! - init: Write a settings file with the defaults

mod match_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hexfill_core::{RobotKind, Settings};

#[derive(Parser)]
#[command(name = "hexfill")]
#[command(about = "HEXFILL hex territory game robots")]
struct Cli {
    /// Seed for reproducible matches
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a match between two robots
    Play(match_cmd::MatchArgs),
    /// List the available robots
    List,
    /// Write default settings to a JSON file
    Init {
        #[arg(long, default_value = "hexfill.json")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => match_cmd::run(args, cli.seed),
        Commands::List => {
            for kind in RobotKind::ALL {
                let needs = if kind.uses_distances() { " (distances)" } else { "" };
                println!("{}{}", kind, needs);
            }
            Ok(())
        }
        Commands::Init { output } => {
            Settings::default().save(&output)?;
            println!("Wrote {}", output.display());
            Ok(())
        }
    }
}
