//! End-to-end two-process test for a shared region.
//!
//! # Overview
//!
//! Spawns a terminal process and a controller process that attach the same
//! file-backed region **concurrently** and stream records both ways:
//!
//! ```text
//!                    Time -->
//!
//! [Parent]      --[create region]--[spawn]---------------------[wait]
//!                                    |
//! [Terminal]    ------[attach]--[ticks →]--[← commands]--------[done]
//!                         |          |           ^
//!                         v          v           |
//!                     [region file: tick ring, command ring]
//!                         ^          |           |
//!                         |          v           |
//! [Controller]  ------[attach]--[← ticks]--[commands →]--------[done]
//! ```
//!
//! Both rings are much smaller than the record counts, so both sides hit
//! `full` repeatedly and must retry. Each side checks that it received every
//! record exactly once and in production order.
//!
//! # Running the Test
//!
//! ```bash
//! cargo test -p tessera-icc --test e2e_region -- --nocapture
//! ```

use std::env;
use std::io::Write;
use std::path::Path;
use std::process::{Command as Process, Stdio};
use std::time::{Duration, Instant};
use tessera_icc::{Capacities, Controller, Region, Terminal};
use tessera_records::{Command, CommandKind, Tick};

/// Writes to stderr with immediate flush to bypass test output capture.
macro_rules! log {
    ($($arg:tt)*) => {{
        let _ = writeln!(std::io::stderr(), $($arg)*);
        let _ = std::io::stderr().flush();
    }};
}

const ENV_ROLE: &str = "TESSERA_E2E_ROLE";
const ENV_DIR: &str = "TESSERA_E2E_DIR";

const ROLE_TERMINAL: &str = "terminal";
const ROLE_CONTROLLER: &str = "controller";

const REGION_NAME: &str = "TESSERA_E2E";
const TICK_COUNT: i64 = 50_000;
const COMMAND_COUNT: i64 = 5_000;

const CAPS: Capacities = Capacities {
    tick: 256,
    position: 16,
    command: 32,
    account: 8,
};

const DEADLINE: Duration = Duration::from_secs(20);

/// Terminal side: publishes ticks `0..TICK_COUNT` while draining commands.
fn run_terminal(dir: &Path) {
    let mut terminal = Terminal::new();
    terminal
        .open_or_create_in(dir, REGION_NAME, CAPS)
        .expect("terminal: failed to attach region");
    log!("[TERMINAL] Attached, publishing {TICK_COUNT} ticks");

    let deadline = Instant::now() + DEADLINE;
    let mut next_tick = 0i64;
    let mut next_ticket = 0i64;
    let mut full_retries = 0u64;

    while (next_tick < TICK_COUNT || next_ticket < COMMAND_COUNT) && Instant::now() < deadline {
        if next_tick < TICK_COUNT {
            let tick = Tick::new("EURUSD", 1.0, 1.0001, next_tick);
            if terminal.send_tick(&tick) {
                next_tick += 1;
            } else {
                full_retries += 1;
                std::hint::spin_loop();
            }
        }

        while let Some(cmd) = terminal.get_command() {
            assert_eq!(cmd.ticket, next_ticket, "[TERMINAL] command out of order");
            assert_eq!(cmd.kind(), Some(CommandKind::Open));
            next_ticket += 1;
        }
        terminal.heartbeat(next_tick.max(1));
    }

    log!("[TERMINAL] Complete");
    log!("[TERMINAL]   ticks sent: {next_tick}");
    log!("[TERMINAL]   commands received: {next_ticket}");
    log!("[TERMINAL]   full retries: {full_retries}");
    terminal.close();

    assert_eq!(next_tick, TICK_COUNT, "terminal did not send every tick");
    assert_eq!(next_ticket, COMMAND_COUNT, "terminal missed commands");
}

/// Controller side: sends commands `0..COMMAND_COUNT` while reading ticks.
fn run_controller(dir: &Path) {
    let controller = Controller::open_or_create_in(dir, REGION_NAME, CAPS)
        .expect("controller: failed to attach region");
    log!("[CONTROLLER] Attached, sending {COMMAND_COUNT} commands");

    let deadline = Instant::now() + DEADLINE;
    let mut next_tick = 0i64;
    let mut next_ticket = 0i64;

    while (next_tick < TICK_COUNT || next_ticket < COMMAND_COUNT) && Instant::now() < deadline {
        if next_ticket < COMMAND_COUNT {
            let mut cmd = Command::new(CommandKind::Open, "EURUSD");
            cmd.ticket = next_ticket;
            if controller.send_command(&cmd) {
                next_ticket += 1;
            }
        }

        for tick in controller.read_ticks(64) {
            assert_eq!(tick.time_ns, next_tick, "[CONTROLLER] tick out of order");
            next_tick += 1;
        }
    }

    log!("[CONTROLLER] Complete");
    log!("[CONTROLLER]   ticks received: {next_tick}");
    log!("[CONTROLLER]   commands sent: {next_ticket}");
    log!("[CONTROLLER]   last heartbeat: {:?}", controller.last_heartbeat());
    controller.close();

    assert_eq!(next_tick, TICK_COUNT, "controller missed ticks");
    assert_eq!(next_ticket, COMMAND_COUNT, "controller did not send every command");
}

#[test]
fn e2e_two_process_region() {
    if let Ok(role) = env::var(ENV_ROLE) {
        let dir = env::var(ENV_DIR).expect("TESSERA_E2E_DIR not set");
        match role.as_str() {
            ROLE_TERMINAL => run_terminal(Path::new(&dir)),
            ROLE_CONTROLLER => run_controller(Path::new(&dir)),
            other => panic!("Unknown role: {other}"),
        }
        return;
    }

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let exe = env::current_exe().expect("Failed to get current executable path");

    log!("[ORCHESTRATOR] Region dir: {}", dir.path().display());
    log!("[ORCHESTRATOR] Ticks: {TICK_COUNT}, commands: {COMMAND_COUNT}");

    // Create the region up front so neither child races the initial reset
    Region::open_or_create_in(dir.path(), REGION_NAME, CAPS)
        .expect("Failed to create region")
        .close();

    let spawn = |role: &str| {
        Process::new(&exe)
            .arg("--exact")
            .arg("e2e_two_process_region")
            .env(ENV_ROLE, role)
            .env(ENV_DIR, dir.path())
            .stderr(Stdio::inherit())
            .spawn()
            .unwrap_or_else(|e| panic!("Failed to spawn {role} process: {e}"))
    };

    let mut terminal = spawn(ROLE_TERMINAL);
    let mut controller = spawn(ROLE_CONTROLLER);

    let terminal_status = terminal.wait().expect("Failed to wait for terminal");
    let controller_status = controller.wait().expect("Failed to wait for controller");

    log!("[ORCHESTRATOR] Terminal exit status: {terminal_status}");
    log!("[ORCHESTRATOR] Controller exit status: {controller_status}");

    assert!(
        terminal_status.success(),
        "Terminal process failed with status: {terminal_status}"
    );
    assert!(
        controller_status.success(),
        "Controller process failed with status: {controller_status}"
    );

    // Both sides are gone; the counters they left behind persist
    let region = Region::open_or_create_in(dir.path(), REGION_NAME, CAPS).unwrap();
    assert_eq!(region.ticks().produced(), TICK_COUNT as u64);
    assert_eq!(region.ticks().consumed(), TICK_COUNT as u64);
    assert_eq!(region.commands().produced(), COMMAND_COUNT as u64);
    assert!(region.read_heartbeat() > 0);
}
