use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tessera_config::TesseraConfig;
use tessera_icc::{Capacities, Controller, default_shm_dir};
use tessera_records::now_ns;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const BATCH: usize = 256;

/// Controller-side monitor: prints what the terminal publishes and watches
/// its heartbeat.
#[derive(Parser, Debug)]
#[command(name = "tessera-monitor")]
struct Args {
    /// TOML config file; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many seconds instead of running forever
    #[arg(long)]
    duration_secs: Option<u64>,
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

    let controller = Controller::open_or_create_in(&dir, &config.region_name, capacities)
        .with_context(|| format!("attaching region {}", config.region_name))?;
    info!(region = %config.region_name, dir = %dir.display(), "monitor attached");

    let deadline = args
        .duration_secs
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let mut stats = Stats::default();
    let mut last_report = Instant::now();
    let mut alive = true;

    while deadline.is_none_or(|d| Instant::now() < d) {
        poll(&controller, &mut stats);

        if last_report.elapsed() >= config.heartbeat_interval() {
            let now = now_ns();
            let is_alive = controller.is_alive(now, config.heartbeat_timeout());
            match (alive, is_alive) {
                (true, false) => warn!(
                    age = ?controller.heartbeat_age(now),
                    "terminal heartbeat is stale"
                ),
                (false, true) => info!("terminal heartbeat resumed"),
                _ => {}
            }
            alive = is_alive;

            info!(
                ticks = stats.ticks,
                positions = stats.positions,
                accounts = stats.accounts,
                pending_ticks = controller.region().ticks().len(),
                "monitor stats"
            );
            stats = Stats::default();
            last_report = Instant::now();
        }

        std::thread::sleep(config.poll_interval());
    }

    controller.close();
    Ok(())
}

#[derive(Default)]
struct Stats {
    ticks: u64,
    positions: u64,
    accounts: u64,
}

fn poll(controller: &Controller, stats: &mut Stats) {
    for tick in controller.read_ticks(BATCH) {
        debug!(
            symbol = %tick.symbol,
            bid = tick.bid,
            ask = tick.ask,
            time_ns = tick.time_ns,
            "tick"
        );
        stats.ticks += 1;
    }

    for pos in controller.read_positions(BATCH) {
        info!(
            id = pos.id,
            symbol = %pos.symbol,
            side = ?pos.direction(),
            kind = ?pos.kind(),
            volume = pos.volume,
            price = pos.price,
            strategy = pos.strategy_id,
            "position"
        );
        stats.positions += 1;
    }

    for acct in controller.read_accounts(BATCH) {
        info!(
            account = %acct.account,
            balance = acct.balance,
            equity = acct.equity,
            free_margin = acct.free_margin(),
            "account"
        );
        stats.accounts += 1;
    }
}
