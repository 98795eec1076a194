use chrono::{DateTime, Utc};
use jainam_rs::websocket::models::{Depth, DepthLevel, Tick};

/// Latest known state of one instrument.
///
/// The feed only sends changed fields after the first snapshot, so every update is
/// merged over what is already here.
#[derive(Debug, Clone, Default)]
pub struct Quote {
    pub symbol: Option<String>,
    pub ltp: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub percent_change: Option<f64>,

    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,

    pub updates: u64,
    pub last_update: Option<DateTime<Utc>>,
}

impl Quote {
    pub fn apply_tick(&mut self, tick: &Tick) {
        merge_text(&mut self.symbol, tick.symbol.as_deref());
        merge(&mut self.ltp, tick.ltp.as_deref());
        merge(&mut self.open, tick.open.as_deref());
        merge(&mut self.high, tick.high.as_deref());
        merge(&mut self.low, tick.low.as_deref());
        merge(&mut self.close, tick.close.as_deref());
        merge(&mut self.volume, tick.volume.as_deref());
        merge(&mut self.percent_change, tick.percent_change.as_deref());
        self.updates += 1;
        self.last_update = Some(Utc::now());
    }

    pub fn apply_depth(&mut self, depth: &Depth) {
        self.apply_tick(&depth.quote);
        merge_levels(&mut self.bids, depth.bids());
        merge_levels(&mut self.asks, depth.asks());
    }

    pub fn best_bid(&self) -> Option<f64> {
        self.bids.first().and_then(|l| l.price)
    }

    pub fn best_ask(&self) -> Option<f64> {
        self.asks.first().and_then(|l| l.price)
    }
}

fn merge(slot: &mut Option<f64>, incoming: Option<&str>) {
    if let Some(v) = incoming.and_then(|s| s.trim().parse::<f64>().ok()) {
        *slot = Some(v);
    }
}

fn merge_text(slot: &mut Option<String>, incoming: Option<&str>) {
    if let Some(v) = incoming.filter(|s| !s.is_empty()) {
        *slot = Some(v.to_string());
    }
}

// level by level: a missing price/qty/orders keeps the previous value
fn merge_levels(slot: &mut Vec<DepthLevel>, incoming: Vec<DepthLevel>) {
    if slot.len() < incoming.len() {
        slot.resize(incoming.len(), DepthLevel::default());
    }
    for (old, new) in slot.iter_mut().zip(incoming) {
        if new.price.is_some() {
            old.price = new.price;
        }
        if new.quantity.is_some() {
            old.quantity = new.quantity;
        }
        if new.orders.is_some() {
            old.orders = new.orders;
        }
    }
}
