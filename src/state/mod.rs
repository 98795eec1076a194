pub mod quote;

use dashmap::DashMap;
use std::sync::Arc;

use jainam_rs::websocket::models::{Depth, Tick};

use quote::Quote;

/// Quote board shared between the stream task and the reporter, keyed by
/// `EXCHANGE|TOKEN`.
#[derive(Clone, Debug, Default)]
pub struct Shared {
    pub quotes: Arc<DashMap<String, Quote>>,
}

impl Shared {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a tick into its quote. Ticks without exchange/token are dropped.
    pub fn apply_tick(&self, tick: &Tick) -> bool {
        let Some(key) = tick.key() else { return false; };
        self.quotes.entry(key).or_default().apply_tick(tick);
        true
    }

    pub fn apply_depth(&self, depth: &Depth) -> bool {
        let Some(key) = depth.quote.key() else { return false; };
        self.quotes.entry(key).or_default().apply_depth(depth);
        true
    }

    /// Forget an instrument after it is unsubscribed.
    pub fn remove(&self, key: &str) {
        self.quotes.remove(key);
    }

    pub fn snapshot(&self) -> Vec<(String, Quote)> {
        let mut out: Vec<(String, Quote)> = self
            .quotes
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}
