//! Thicket CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thicket_core::LayoutAlgorithm;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Log targets of this binary and its library crates.
const CRATES: [&str; 6] = [
    "thicket",
    "thicket_core",
    "thicket_builder",
    "thicket_analysis",
    "thicket_layout",
    "thicket_scanner",
];

#[derive(Parser)]
#[command(name = "thicket")]
#[command(about = "Dependency graph analysis: cycles, change impact, metrics and layout", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Repository root path (defaults to current directory)
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan, analyze and lay out the repository, then print the report
    Analyze {
        /// Layout mode: force-directed, hierarchical, circular or grid
        #[arg(short, long)]
        layout: Option<LayoutAlgorithm>,

        /// Seed for the force-directed layout
        #[arg(long)]
        seed: Option<u64>,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the circular dependencies of the repository
    Cycles,
    /// Print everything affected by changing the given nodes
    Impact {
        /// Node ids (normalized paths) of the changed artifacts
        #[arg(required = true)]
        ids: Vec<String>,

        /// Treat the change as breaking for every dependent
        #[arg(short, long)]
        breaking: bool,

        /// Free-form note carried into the result
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Clear the cache
    Clear,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON
    let log_level = if cli.verbose { "debug" } else { "info" };
    let directives = CRATES
        .iter()
        .map(|krate| format!("{}={}", krate, log_level))
        .collect::<Vec<_>>()
        .join(",");
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(directives))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Thicket v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Repository root: {}", cli.root.display());

    match cli.command {
        Commands::Analyze { layout, seed, output } => {
            commands::analyze(cli.root, layout, seed, output).await
        }
        Commands::Cycles => {
            commands::cycles(cli.root).await
        }
        Commands::Impact { ids, breaking, description } => {
            commands::impact(cli.root, ids, breaking, description).await
        }
        Commands::Clear => {
            commands::clear(cli.root)
        }
        Commands::Version => {
            println!("Thicket v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
