use std::hint::black_box;
use std::sync::{Arc, Barrier};

use tessera_icc::layout::HEADER_SIZE;
use tessera_icc::{Capacities, Region};
use tessera_perf::*;
use tessera_records::{Account, Command, Position, Record, RecordKind, Tick};

const XTHREAD_EVENTS: usize = 200_000;
const XTHREAD_CAPACITY: u32 = 65536;

fn main() {
    print_banner();
    section_layout();

    let mut results = Vec::new();
    section_channel_ops(&mut results);
    let cross = section_cross_thread(&mut results);

    save_results(&results, cross.as_ref());
}

fn print_banner() {
    let bar = "\u{2550}".repeat(90);
    println!("\n{bar}");
    println!("  TESSERA PERFORMANCE REPORT");
    println!("  single-thread channel ops + cross-thread transfer latency");
    println!("{bar}");
}

fn section_layout() {
    section_header("Record Layout");
    println!("  {:<12} {:>8}", "header", format!("{HEADER_SIZE} B"));
    for kind in RecordKind::ALL {
        println!("  {:<12} {:>8}", kind.name(), format!("{} B", kind.record_size()));
    }
    debug_assert_eq!(Tick::SIZE, RecordKind::Tick.record_size());
    debug_assert_eq!(Position::SIZE, RecordKind::Position.record_size());
    debug_assert_eq!(Command::SIZE, RecordKind::Command.record_size());
    debug_assert_eq!(Account::SIZE, RecordKind::Account.record_size());
}

fn section_channel_ops(results: &mut Vec<OpResult>) {
    section_header("Channel Operations (single thread)");
    print_table_header();

    let (dir, region) = bench_region("report_ops", 1024);
    let ticks = region.ticks();
    let commands = region.commands();
    let tick = make_test_tick();
    let cmd = make_test_command();

    let rows = [
        time_per_op("tick send+receive", 2_000, 512, || {
            ticks.try_send(black_box(&tick));
            black_box(ticks.try_receive());
        }),
        time_per_op("command send+receive", 2_000, 512, || {
            commands.try_send(black_box(&cmd));
            black_box(commands.try_receive());
        }),
        time_per_op("try_receive (empty)", 2_000, 512, || {
            black_box(ticks.try_receive());
        }),
        time_per_op("set_heartbeat", 2_000, 512, || {
            region.set_heartbeat(black_box(1));
        }),
    ];

    for row in rows {
        print_result_row(&row);
        results.push(row);
    }

    drop(region);
    let _ = std::fs::remove_dir_all(&dir);
}

/// Producer thread stamps each tick with the monotonic clock; the consumer
/// measures how long the tick took to become visible through its own handle.
fn section_cross_thread(results: &mut Vec<OpResult>) -> Option<LatencySummary> {
    section_header("Cross-Thread Transfer (two handles, one region file)");

    let (dir, consumer_region) = bench_region("report_xthread", XTHREAD_CAPACITY);
    let caps = Capacities::new(
        XTHREAD_CAPACITY,
        XTHREAD_CAPACITY,
        XTHREAD_CAPACITY,
        XTHREAD_CAPACITY,
    );
    let producer_region = match Region::open_or_create_in(&dir, "BENCH", caps) {
        Ok(region) => region,
        Err(e) => {
            println!("  skipped: {e}");
            return None;
        }
    };

    let barrier = Arc::new(Barrier::new(2));
    let b2 = barrier.clone();

    let producer = std::thread::spawn(move || {
        let ticks = producer_region.ticks();
        let mut full_spins = 0u64;
        b2.wait();
        let mut sent = 0usize;
        while sent < XTHREAD_EVENTS {
            let tick = Tick::new("EURUSD", 1.0, 1.0001, mono_now_ns());
            if ticks.try_send(&tick) {
                sent += 1;
            } else {
                full_spins += 1;
                std::hint::spin_loop();
            }
        }
        full_spins
    });

    let ticks = consumer_region.ticks();
    let mut samples = Vec::with_capacity(XTHREAD_EVENTS);
    barrier.wait();
    while samples.len() < XTHREAD_EVENTS {
        match ticks.try_receive() {
            Some(tick) => samples.push((mono_now_ns() - tick.time_ns).max(0) as u64),
            None => std::hint::spin_loop(),
        }
    }
    let full_spins = producer.join().unwrap_or(0);

    let latency = LatencySummary::from_samples(samples)?;
    let row = OpResult {
        name: "tick transfer".to_string(),
        unit: "ns",
        latency: latency.clone(),
    };
    print_table_header();
    print_result_row(&row);
    println!("\n  producer full-channel spins: {full_spins}");
    results.push(row);

    drop(consumer_region);
    let _ = std::fs::remove_dir_all(&dir);
    Some(latency)
}

fn save_results(results: &[OpResult], cross: Option<&LatencySummary>) {
    let results_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/results");
    let _ = std::fs::create_dir_all(results_dir);
    let json_path = format!("{results_dir}/{}_report.json", tessera_records::now_ns());

    let output = serde_json::json!({
        "report_type": "channel",
        "benchmarks": results,
        "cross_thread": cross,
    });

    let bar = "\u{2550}".repeat(90);
    let written = serde_json::to_string_pretty(&output)
        .map_err(std::io::Error::other)
        .and_then(|json| std::fs::write(&json_path, json));
    match written {
        Ok(()) => {
            println!("\n{bar}");
            println!("  Results saved to: {json_path}");
            println!("{bar}\n");
        }
        Err(e) => eprintln!("  failed to save results: {e}"),
    }
}
