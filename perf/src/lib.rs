use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Instant;
use tessera_icc::{Capacities, Region};
use tessera_records::{Command, CommandKind, Side, Tick};

/// Latency distribution of one measured operation, in nanoseconds.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LatencySummary {
    pub count: usize,
    pub mean: f64,
    pub min: u64,
    pub p50: u64,
    pub p99: u64,
    pub p999: u64,
    pub max: u64,
}

impl LatencySummary {
    /// Summarizes `samples`, or `None` if there are none.
    pub fn from_samples(mut samples: Vec<u64>) -> Option<Self> {
        samples.sort_unstable();
        let (&min, &max) = (samples.first()?, samples.last()?);
        let count = samples.len();
        // nearest-rank percentile, in integer per-mille to avoid float rounding
        let rank = |per_mille: usize| samples[(count * per_mille).div_ceil(1000).max(1) - 1];

        Some(Self {
            count,
            mean: samples.iter().sum::<u64>() as f64 / count as f64,
            min,
            p50: rank(500),
            p99: rank(990),
            p999: rank(999),
            max,
        })
    }
}

/// One row of the report: a named operation and its latency.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OpResult {
    pub name: String,
    pub unit: &'static str,
    pub latency: LatencySummary,
}

/// Runs `op` in `rounds` timed rounds of `ops_per_round` calls, after one
/// untimed warmup round, and reports the mean cost per call of each round.
///
/// # Panics
/// If `rounds` is zero.
pub fn time_per_op<F: FnMut()>(
    name: &str,
    rounds: usize,
    ops_per_round: u32,
    mut op: F,
) -> OpResult {
    let mut round = || {
        let start = Instant::now();
        for _ in 0..ops_per_round {
            op();
        }
        (start.elapsed().as_nanos() / u128::from(ops_per_round.max(1))) as u64
    };
    round();

    let samples = (0..rounds).map(|_| round().max(1)).collect();
    OpResult {
        name: name.to_string(),
        unit: "ns/op",
        latency: LatencySummary::from_samples(samples).expect("rounds must be non-zero"),
    }
}

/// Nanoseconds since the first call in this process. Monotonic, so safe for
/// cross-thread latency within one process.
#[inline(always)]
pub fn mono_now_ns() -> i64 {
    static BASE: OnceLock<Instant> = OnceLock::new();
    BASE.get_or_init(Instant::now).elapsed().as_nanos() as i64
}

/// Scratch directory for bench regions, unique per process.
pub fn temp_region_dir(label: &str) -> PathBuf {
    let pid = std::process::id();
    std::env::temp_dir().join(format!("tessera_bench_{label}_{pid}"))
}

/// File-backed region with `capacity` slots in every channel.
///
/// # Panics
/// If the region cannot be created; benches have no way to recover.
pub fn bench_region(label: &str, capacity: u32) -> (PathBuf, Region) {
    let dir = temp_region_dir(label);
    std::fs::create_dir_all(&dir).expect("failed to create bench dir");
    let caps = Capacities::new(capacity, capacity, capacity, capacity);
    let region = Region::open_or_create_in(&dir, "BENCH", caps).expect("failed to create region");
    (dir, region)
}

pub fn make_test_tick() -> Tick {
    Tick::new("EURUSD", 1.08512, 1.08519, mono_now_ns())
}

pub fn make_test_command() -> Command {
    Command {
        side: Side::Buy.as_raw(),
        volume: 0.25,
        price: 1.0850,
        take_profit: 1.0900,
        stop_loss: 1.0800,
        ticket: 4_200_001,
        strategy_id: 7,
        account: "BENCH-ACCT".into(),
        reason: "mean reversion entry".into(),
        time_ns: mono_now_ns(),
        ..Command::new(CommandKind::Open, "EURUSD")
    }
}

pub fn print_table_header() {
    println!(
        "  {:<32} {:>8} {:>8} {:>8} {:>8} {:>8}  unit",
        "Operation", "min", "p50", "p99", "p99.9", "max",
    );
    println!("  {}", "─".repeat(86));
}

pub fn print_result_row(r: &OpResult) {
    let l = &r.latency;
    println!(
        "  {:<32} {:>8} {:>8} {:>8} {:>8} {:>8}  {}",
        r.name, l.min, l.p50, l.p99, l.p999, l.max, r.unit,
    );
}

pub fn section_header(title: &str) {
    println!("\n{}", "─".repeat(90));
    println!("  {title}");
    println!("{}\n", "─".repeat(90));
}
