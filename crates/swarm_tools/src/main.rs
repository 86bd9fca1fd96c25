//! Swarm Bot - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use swarm_core::catalog::Catalog;
use swarm_core::config::BotConfig;
use swarm_core::orchestrator::SwarmBot;
use swarm_tools::error::Result;
use swarm_tools::inspect::{decide, load_snapshot, render_report, tech_order};
use swarm_tools::validate::validate_config_file;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "swarm-tools")]
#[command(about = "Development tools for the swarm bot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a bot config
    Validate {
        /// Path to the RON config
        #[arg(default_value = "config/swarm.ron")]
        path: PathBuf,
    },
    /// Print the tech tree in build order
    TechOrder,
    /// Run one tick on a saved snapshot and print the report
    Decide {
        /// Path to a RON snapshot
        snapshot: PathBuf,
        /// Bot config; defaults are used when omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Validate { path } => {
            tracing::info!("Validating config: {}", path.display());
            let summary = validate_config_file(&path)?;
            tracing::info!(
                seed = summary.seed,
                thresholds = summary.thresholds,
                "Validation passed"
            );
        }
        Commands::TechOrder => {
            for line in tech_order(&Catalog::standard()?) {
                println!("{line}");
            }
        }
        Commands::Decide { snapshot, config } => {
            let config = match config {
                Some(path) => BotConfig::load(path)?,
                None => BotConfig::default(),
            };
            let bot = SwarmBot::new(config)?;
            let snapshot = load_snapshot(&snapshot)?;
            println!("{}", render_report(&decide(&bot, &snapshot))?);
        }
    }
    Ok(())
}
