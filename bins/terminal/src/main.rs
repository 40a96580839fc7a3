mod sim;

use anyhow::{Context, Result};
use clap::Parser;
use sim::Simulator;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tessera_config::TesseraConfig;
use tessera_icc::{Capacities, Terminal, default_shm_dir};
use tessera_records::now_ns;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Simulated trading terminal feeding a tessera region.
#[derive(Parser, Debug)]
#[command(name = "tessera-terminal")]
struct Args {
    /// TOML config file; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many seconds instead of running forever
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Account id stamped on positions and snapshots
    #[arg(long, default_value = "SIM-001")]
    account: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => TesseraConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TesseraConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let caps = config.capacities;
    let capacities = Capacities::new(caps.tick, caps.position, caps.command, caps.account);
    let dir = config.shm_dir.clone().unwrap_or_else(default_shm_dir);

    let mut terminal = Terminal::new();
    terminal
        .open_or_create_in(&dir, &config.region_name, capacities)
        .with_context(|| format!("opening region {}", config.region_name))?;
    info!(
        region = %config.region_name,
        dir = %dir.display(),
        "terminal started"
    );

    run(&terminal, &config, &args);

    terminal.close();
    info!("terminal stopped");
    Ok(())
}

fn run(terminal: &Terminal, config: &TesseraConfig, args: &Args) {
    let mut sim = Simulator::new(&args.account);
    let deadline = args
        .duration_secs
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let mut last_beat: Option<Instant> = None;
    let mut dropped_ticks = 0u64;

    while deadline.is_none_or(|d| Instant::now() < d) {
        let now = now_ns();

        for tick in sim.next_ticks(now) {
            if !terminal.send_tick(&tick) {
                dropped_ticks += 1;
            }
        }

        while let Some(cmd) = terminal.get_command() {
            debug!(code = cmd.command_type, ticket = cmd.ticket, "command received");
            let Some(position) = sim.handle_command(&cmd, now) else {
                continue;
            };
            if !terminal.send_position(&position) {
                warn!(id = position.id, "position channel full, report dropped");
            }
        }

        if last_beat.is_none_or(|t| t.elapsed() >= config.heartbeat_interval()) {
            terminal.heartbeat(now);
            if !terminal.send_account(&sim.account_snapshot(now)) {
                warn!("account channel full, snapshot dropped");
            }
            if dropped_ticks > 0 {
                warn!(dropped_ticks, "tick channel full, controller is not draining");
                dropped_ticks = 0;
            }
            last_beat = Some(Instant::now());
        }

        std::thread::sleep(config.poll_interval());
    }
}
