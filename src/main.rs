use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use league_scheduler::config::AppConfig;
use league_scheduler::models::{FlightId, Roster};
use league_scheduler::render::ScheduleView;
use league_scheduler::session::{Gesture, SchedulingSession, StepResult};
use league_scheduler::sync::{DryRunGateway, HttpGateway, SyncGateway};

#[derive(Parser)]
#[command(name = "league-scheduler")]
#[command(about = "Court and timeslot assignment engine for league flights")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./league.toml")]
    config: PathBuf,

    /// League server base URL (overrides the config file)
    #[arg(long)]
    server: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a flight and print its metrics, warnings and conflicts
    Report {
        /// Flight to load
        #[arg(long)]
        flight: i64,

        /// Roster JSON (players, timeslots, courts)
        #[arg(long)]
        roster: PathBuf,

        /// Print the full view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load a flight and replay a JSON list of gestures against it
    Replay {
        /// Flight to load
        #[arg(long)]
        flight: i64,

        /// Roster JSON (players, timeslots, courts)
        #[arg(long)]
        roster: PathBuf,

        /// Gesture script JSON
        #[arg(long)]
        script: PathBuf,

        /// Read from the server but do not write to it
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(server) = &cli.server {
        config.server.base_url = server.clone();
        config.validate()?;
    }

    // Initialize tracing
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting league-scheduler v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Report {
            flight,
            roster,
            json,
        } => {
            let gateway: Arc<dyn SyncGateway> = Arc::new(HttpGateway::new(&config.server)?);
            let roster = read_roster(&roster)?;
            let session = SchedulingSession::load(gateway, FlightId(flight), roster, config).await;

            if json {
                println!("{}", serde_json::to_string_pretty(session.view())?);
            } else {
                print_report(session.view());
            }
        }

        Commands::Replay {
            flight,
            roster,
            script,
            dry_run,
        } => {
            let mut gateway: Arc<dyn SyncGateway> = Arc::new(HttpGateway::new(&config.server)?);
            if dry_run {
                gateway = Arc::new(DryRunGateway::new(gateway));
            }

            let roster = read_roster(&roster)?;
            let gestures: Vec<Gesture> = serde_json::from_str(
                &std::fs::read_to_string(&script)
                    .with_context(|| format!("reading {}", script.display()))?,
            )
            .with_context(|| format!("parsing {}", script.display()))?;

            let mut session =
                SchedulingSession::load(gateway, FlightId(flight), roster, config).await;
            let results = session.replay(&gestures).await;

            let failed = results
                .iter()
                .filter(|r| matches!(r, StepResult::Failed { .. }))
                .count();
            println!("{}", serde_json::to_string_pretty(&results)?);
            println!();
            print_report(session.view());

            if failed > 0 {
                anyhow::bail!("{} of {} gestures failed", failed, gestures.len());
            }
        }
    }

    Ok(())
}

fn read_roster(path: &Path) -> Result<Roster> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Roster::from_json(&contents).with_context(|| format!("parsing {}", path.display()))
}

fn print_report(view: &ScheduleView) {
    println!(
        "{:<16} {:>6} {:>9} {:>9}  FLAGS",
        "PLAYER", "GAMES", "CAPTAIN", "LOW-PREF"
    );
    for entry in &view.legend {
        let mut flags = Vec::new();
        if entry.warnings.games {
            flags.push("games");
        }
        if entry.warnings.captained {
            flags.push("captain");
        }
        if entry.warnings.low_preference {
            flags.push("low-pref");
        }
        println!(
            "{:<16} {:>6} {:>9} {:>9}  {}",
            entry.display_name,
            entry.game_count,
            entry.captain_count,
            entry.low_preference,
            flags.join(",")
        );
    }

    println!();
    if view.warnings.is_empty() {
        println!("All cells hold complete events.");
    } else {
        for cell in &view.warnings {
            println!("Incomplete: {}", cell);
        }
    }
    for cell in &view.duplicates {
        println!("Repeated player on court: {}", cell);
    }
}
