//! Tsunami Agents CLI.
//!
//! Commands:
//! - run: join the game with every agent that has a key and play until Ctrl+C
//! - roster: print the configured agents
//! - decide: replay a saved observation through one agent's state machine

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use tsunami_agents::{AgentRunner, ChatLog, GameClient, Roster};
use tsunami_kernel::{AgentMachine, Observation, WorldSnapshot};

/// Delay between starting consecutive agents.
const STAGGER: Duration = Duration::from_millis(500);
/// How long each agent gets to finish its cycle after Ctrl+C.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

#[derive(Parser)]
#[command(name = "tsunami-agents")]
#[command(version)]
#[command(about = "Autonomous collector bots for the tsunami game")]
struct Cli {
    /// Game API root
    #[arg(long, env = "TSUNAMI_API_BASE", default_value = "http://localhost:8080/api/v1")]
    api_base: String,

    /// Game to join
    #[arg(long, env = "TSUNAMI_GAME_ID")]
    game_id: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every agent until Ctrl+C
    Run {
        /// Roster file (TOML). Default: built-in roster
        #[arg(long)]
        roster: Option<PathBuf>,
    },
    /// Print the agent roster
    Roster {
        /// Roster file (TOML). Default: built-in roster
        #[arg(long)]
        roster: Option<PathBuf>,
    },
    /// Show what one agent would do for a saved observation
    Decide {
        /// Observation JSON, as returned by the observe endpoint
        #[arg(long)]
        snapshot: PathBuf,
        /// Agent name from the roster
        #[arg(long)]
        agent: String,
        /// Roster file (TOML). Default: built-in roster
        #[arg(long)]
        roster: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Commands::Run { roster } => {
            let game_id = cli
                .game_id
                .context("--game-id (or TSUNAMI_GAME_ID) is required to run")?;
            let roster = Roster::load_or_default(roster.as_deref())?;
            run_agents(&cli.api_base, &game_id, roster).await
        }
        Commands::Roster { roster } => {
            print_roster(&Roster::load_or_default(roster.as_deref())?);
            Ok(())
        }
        Commands::Decide {
            snapshot,
            agent,
            roster,
        } => decide(&snapshot, &agent, &Roster::load_or_default(roster.as_deref())?),
    }
}

async fn run_agents(api_base: &str, game_id: &str, roster: Roster) -> Result<()> {
    let mut agents = Vec::new();
    for entry in &roster.agents {
        match entry.resolve_key() {
            Some(key) => agents.push((entry.config.clone(), key)),
            None => warn!(
                agent = %entry.config.name,
                env = %entry.key_env_var(),
                "No api key, skipping agent"
            ),
        }
    }
    if agents.is_empty() {
        bail!("No agent has an api key; set api_key in the roster or TSUNAMI_KEY_<NAME>");
    }

    let client = Arc::new(GameClient::new(api_base, game_id));
    let chat_log = ChatLog::shared();
    let (stop_tx, stop_rx) = watch::channel(false);

    info!(game = %game_id, agents = agents.len(), "Starting agents");

    let mut running = Vec::with_capacity(agents.len());
    for (i, (config, key)) in agents.into_iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(STAGGER).await;
        }
        if let Err(e) = client.join(&key).await {
            warn!(agent = %config.name, kind = e.kind(), error = %e, "Join failed, playing anyway");
        }
        let runner = AgentRunner::new(
            config,
            key.clone(),
            roster.constants.clone(),
            client.clone(),
            client.clone(),
            Arc::clone(&chat_log),
            stop_rx.clone(),
        )
        .with_config(roster.runner.clone());
        let name = runner.name().to_string();
        running.push((name, key, tokio::spawn(runner.run())));
    }

    info!("All agents running, Ctrl+C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    info!("Stopping agents");
    let _ = stop_tx.send(true);

    for (name, key, handle) in running {
        match tokio::time::timeout(SHUTDOWN_GRACE, handle).await {
            Ok(Ok(summary)) => info!(
                agent = %name,
                cycles = summary.cycles,
                errors = summary.errors,
                chats = summary.notifications,
                "Agent finished"
            ),
            Ok(Err(e)) => warn!(agent = %name, error = %e, "Agent task failed"),
            Err(_) => warn!(agent = %name, "Agent did not stop in time"),
        }
        if let Err(e) = client.leave(&key).await {
            warn!(agent = %name, error = %e, "Leave failed");
        }
    }

    info!(chat_lines = chat_log.len(), "Done");
    Ok(())
}

fn print_roster(roster: &Roster) {
    println!(
        "{:<14} {:<8} {:>6} {:>5} {:>8} {:>4}  KEY",
        "NAME", "TYPE", "SAFETY", "CHAT", "VENTURE", "MIN"
    );
    for entry in &roster.agents {
        let c = &entry.config;
        let key = if entry.resolve_key().is_some() {
            "ok"
        } else {
            "missing"
        };
        println!(
            "{:<14} {:<8} {:>6.2} {:>5} {:>8.0} {:>4}  {}",
            c.name,
            c.archetype.name(),
            c.safety_modifier,
            c.chat_interval,
            c.venture_limit_x,
            c.min_rarity_priority,
            key
        );
    }
}

fn decide(path: &Path, agent: &str, roster: &Roster) -> Result<()> {
    let entry = roster
        .find(agent)
        .with_context(|| format!("No agent named {} in roster", agent))?;

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let observation: Observation =
        serde_json::from_str(&text).context("Failed to parse observation")?;
    let snapshot = WorldSnapshot::from_observation(&observation, &roster.constants);

    let mut machine = AgentMachine::new(entry.config.clone(), roster.constants.clone());
    let step = machine.step(&snapshot);

    println!("agent:     {} ({})", entry.config.name, entry.config.archetype);
    println!(
        "player:    ({:.1}, {:.1}, {:.1}) money {:.0} speed {} carrying {}/{}",
        snapshot.player.position.x,
        snapshot.player.position.y,
        snapshot.player.position.z,
        snapshot.player.money,
        snapshot.player.speed_level,
        snapshot.player.carried,
        snapshot.player.capacity
    );
    println!(
        "hazard:    x={:.1} ({})",
        snapshot.hazard.x,
        if snapshot.hazard.is_active(&roster.constants) {
            "active"
        } else {
            "inactive"
        }
    );
    println!(
        "to base:   {:.1} (planar {:.1})",
        snapshot.player.distance_to_base(),
        snapshot
            .player
            .position
            .planar_distance(&snapshot.player.base_center)
    );
    println!("resources: {}", snapshot.resources.len());
    println!("rule:      {:?}", step.rule);
    if let Some(decision) = &step.decision {
        println!(
            "decision:  {}{}",
            decision.event,
            if decision.risky { " (risky)" } else { "" }
        );
    }
    if step.actions.is_empty() {
        println!("actions:   none (wait)");
    }
    for action in &step.actions {
        println!("action:    {}", serde_json::to_string(action)?);
    }
    Ok(())
}
