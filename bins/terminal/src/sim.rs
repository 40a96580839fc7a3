use tessera_records::{Account, AccountId, Command, CommandKind, Position, PositionKind, Tick};
use tracing::{info, warn};

const MARGIN_PER_LOT: f64 = 1_000.0;

/// A synthetic terminal: a few drifting quotes, one account, and the
/// positions opened by controller commands.
pub struct Simulator {
    quotes: Vec<Quote>,
    step: u64,
    next_position_id: i64,
    account: AccountId,
    balance: f64,
    open_volume: f64,
}

struct Quote {
    symbol: &'static str,
    mid: f64,
    half_spread: f64,
}

impl Simulator {
    pub fn new(account: &str) -> Self {
        Self {
            quotes: vec![
                Quote {
                    symbol: "EURUSD",
                    mid: 1.0850,
                    half_spread: 0.00005,
                },
                Quote {
                    symbol: "GBPUSD",
                    mid: 1.2700,
                    half_spread: 0.00008,
                },
                Quote {
                    symbol: "XAUUSD",
                    mid: 2350.0,
                    half_spread: 0.15,
                },
            ],
            step: 0,
            next_position_id: 1,
            account: AccountId::new(account),
            balance: 10_000.0,
            open_volume: 0.0,
        }
    }

    /// One tick per symbol, each quote nudged along a fixed zigzag.
    pub fn next_ticks(&mut self, now_ns: i64) -> Vec<Tick> {
        self.step += 1;
        let step = self.step;
        self.quotes
            .iter_mut()
            .enumerate()
            .map(|(i, q)| {
                let nudge = ((step * 7 + i as u64 * 3) % 5) as f64 - 2.0;
                q.mid += nudge * q.half_spread;
                Tick::new(q.symbol, q.mid - q.half_spread, q.mid + q.half_spread, now_ns)
            })
            .collect()
    }

    pub fn account_snapshot(&self, now_ns: i64) -> Account {
        let margin = self.open_volume * MARGIN_PER_LOT;
        Account {
            account: self.account,
            balance: self.balance,
            equity: self.balance,
            margin,
            time_ns: now_ns,
        }
    }

    /// Applies a controller command. Returns the position an `Open` created.
    pub fn handle_command(&mut self, cmd: &Command, now_ns: i64) -> Option<Position> {
        match cmd.kind() {
            Some(CommandKind::Open) => {
                let (price, kind) = if cmd.price != 0.0 {
                    (cmd.price, PositionKind::Pending)
                } else {
                    (self.mid(cmd.symbol.as_bytes())?, PositionKind::Market)
                };
                let position = Position {
                    id: self.next_position_id,
                    symbol: cmd.symbol,
                    side: cmd.direction().as_raw(),
                    order_type: kind.as_raw(),
                    volume: cmd.volume,
                    price,
                    time_ns: now_ns,
                    strategy_id: cmd.strategy_id,
                    account: self.account,
                };
                self.next_position_id += 1;
                self.open_volume += cmd.volume;
                info!(
                    id = position.id,
                    symbol = %position.symbol,
                    side = ?position.direction(),
                    volume = position.volume,
                    price,
                    "opened position"
                );
                Some(position)
            }
            Some(CommandKind::CloseAll) => {
                info!(reason = %cmd.reason, "closing all positions");
                self.open_volume = 0.0;
                None
            }
            Some(kind) => {
                info!(?kind, ticket = cmd.ticket, symbol = %cmd.symbol, "command acknowledged");
                None
            }
            None => {
                warn!(code = cmd.command_type, "unknown command code");
                None
            }
        }
    }

    fn mid(&self, symbol: &[u8]) -> Option<f64> {
        let quote = self.quotes.iter().find(|q| q.symbol.as_bytes() == symbol);
        if quote.is_none() {
            warn!(symbol = %String::from_utf8_lossy(symbol), "open for unquoted symbol");
        }
        quote.map(|q| q.mid)
    }
}
