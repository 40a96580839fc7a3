use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::time::{Duration, Instant};
use tessera_perf::{bench_region, make_test_command, make_test_tick};

const CAPACITY: u32 = 65536;

fn bench_try_send(c: &mut Criterion) {
    let (dir, region) = bench_region("crit_send", CAPACITY);
    let ticks = region.ticks();
    let tick = make_test_tick();

    let mut group = c.benchmark_group("channel");
    group.throughput(Throughput::Elements(1));

    group.bench_function("try_send (tick)", |b| {
        b.iter_custom(|iters| {
            let mut elapsed = Duration::ZERO;
            let mut left = iters;
            while left > 0 {
                let n = left.min(CAPACITY as u64);
                let start = Instant::now();
                for _ in 0..n {
                    black_box(ticks.try_send(black_box(&tick)));
                }
                elapsed += start.elapsed();
                // Drain untimed so the next chunk finds free slots
                while ticks.try_receive().is_some() {}
                left -= n;
            }
            elapsed
        });
    });

    drop(group);
    drop(region);
    let _ = std::fs::remove_dir_all(&dir);
}

fn bench_try_receive_data(c: &mut Criterion) {
    let (dir, region) = bench_region("crit_recv", CAPACITY);
    let commands = region.commands();
    let cmd = make_test_command();

    let mut group = c.benchmark_group("channel");
    group.throughput(Throughput::Elements(1));

    group.bench_function("try_receive (command)", |b| {
        b.iter_custom(|iters| {
            let mut elapsed = Duration::ZERO;
            let mut left = iters;
            while left > 0 {
                let n = left.min(CAPACITY as u64);
                for _ in 0..n {
                    commands.try_send(&cmd);
                }
                let start = Instant::now();
                for _ in 0..n {
                    black_box(commands.try_receive());
                }
                elapsed += start.elapsed();
                left -= n;
            }
            elapsed
        });
    });

    drop(group);
    drop(region);
    let _ = std::fs::remove_dir_all(&dir);
}

fn bench_try_receive_empty(c: &mut Criterion) {
    let (dir, region) = bench_region("crit_empty", CAPACITY);
    let ticks = region.ticks();

    let mut group = c.benchmark_group("channel");
    group.throughput(Throughput::Elements(1));

    group.bench_function("try_receive (empty)", |b| {
        b.iter(|| black_box(ticks.try_receive()));
    });

    drop(group);
    drop(region);
    let _ = std::fs::remove_dir_all(&dir);
}

fn bench_round_trip(c: &mut Criterion) {
    let (dir, region) = bench_region("crit_rt", CAPACITY);
    let ticks = region.ticks();
    let commands = region.commands();
    let tick = make_test_tick();
    let cmd = make_test_command();

    let mut group = c.benchmark_group("channel");
    group.throughput(Throughput::Elements(1));

    group.bench_function("round_trip (tick)", |b| {
        b.iter(|| {
            ticks.try_send(black_box(&tick));
            black_box(ticks.try_receive());
        });
    });

    group.bench_function("round_trip (command)", |b| {
        b.iter(|| {
            commands.try_send(black_box(&cmd));
            black_box(commands.try_receive());
        });
    });

    group.bench_function("heartbeat", |b| {
        let mut ts = 0i64;
        b.iter(|| {
            ts += 1;
            region.set_heartbeat(black_box(ts));
        });
    });

    drop(group);
    drop(region);
    let _ = std::fs::remove_dir_all(&dir);
}

fn bench_round_trip_capacities(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel_capacity");
    group.throughput(Throughput::Elements(1));

    for &cap in &[64u32, 1024, 16384, 65536] {
        let (dir, region) = bench_region(&format!("crit_cap_{cap}"), cap);
        let ticks = region.ticks();
        let tick = make_test_tick();

        group.bench_function(format!("round_trip_cap_{cap}"), |b| {
            b.iter(|| {
                ticks.try_send(black_box(&tick));
                black_box(ticks.try_receive());
            });
        });

        drop(region);
        let _ = std::fs::remove_dir_all(&dir);
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_try_send,
    bench_try_receive_data,
    bench_try_receive_empty,
    bench_round_trip,
    bench_round_trip_capacities,
);
criterion_main!(benches);
