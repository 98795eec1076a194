// src/report.rs
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::info;

use crate::state::quote::Quote;
use crate::state::Shared;

pub fn log_quote(key: &str, q: &Quote) {
    info!(
        instrument = %key,
        symbol = ?q.symbol,
        ltp = ?q.ltp,
        change_pct = ?q.percent_change,
        volume = ?q.volume,
        best_bid = ?q.best_bid(),
        best_ask = ?q.best_ask(),
        updates = q.updates,
        "quote snapshot"
    );
}

/// Logs the whole board every `every_ms`. Runs until the task is aborted.
pub async fn run_report(shared: Shared, every_ms: u64) {
    let mut ticker = interval(Duration::from_millis(every_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        for (key, q) in shared.snapshot() {
            log_quote(&key, &q);
        }
    }
}
