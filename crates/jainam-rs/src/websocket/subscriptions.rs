use std::collections::HashSet;
use std::str::FromStr;

use derive_more::Display;

use crate::errors::JainamError;


/// An `(exchange, token)` pair. The exchange is kept upper-cased so `nse|26000`
/// and `NSE|26000` are the same instrument.
#[derive(Display, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("{exchange}|{token}")]
pub struct Instrument {
    exchange: String,
    token: String,
}


impl Instrument {
    pub fn new(exchange: impl AsRef<str>, token: impl Into<String>) -> Self {
        Self {
            exchange: exchange.as_ref().trim().to_ascii_uppercase(),
            token: token.into().trim().to_string(),
        }
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Parse a `#` separated list such as `NSE|26000#NFO|54957`.
    pub fn parse_list(s: &str) -> Result<Vec<Instrument>, JainamError> {
        s.split('#')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Instrument::from_str)
            .collect()
    }
}


impl FromStr for Instrument {
    type Err = JainamError;

    /// `EXCHANGE|TOKEN`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('|') {
            Some((exchange, token)) if !exchange.trim().is_empty() && !token.trim().is_empty() => {
                Ok(Instrument::new(exchange, token))
            }
            _ => Err(JainamError::Validation(format!(
                "invalid instrument `{s}`, expected EXCHANGE|TOKEN"
            ))),
        }
    }
}


/// Feed granularity of a subscription.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum FeedMode {
    /// LTP, OHLC, volume.
    #[default]
    #[display("tick")]
    Tick,
    /// Five level bid/ask.
    #[display("depth")]
    Depth,
}


impl FeedMode {
    pub(crate) fn subscribe_tag(self) -> &'static str {
        match self {
            FeedMode::Tick => "t",
            FeedMode::Depth => "d",
        }
    }

    pub(crate) fn unsubscribe_tag(self) -> &'static str {
        match self {
            FeedMode::Tick => "u",
            FeedMode::Depth => "ud",
        }
    }
}


#[derive(Display, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("{instrument} ({mode})")]
pub struct Subscription {
    pub instrument: Instrument,
    pub mode: FeedMode,
}


/// Active subscriptions of one connection, unique per `(exchange, token, mode)`.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionSet {
    active: HashSet<Subscription>,
}


impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the instruments and return the ones that were not already active, in
    /// input order and without duplicates.
    pub fn insert(&mut self, instruments: &[Instrument], mode: FeedMode) -> Vec<Instrument> {
        let mut added = Vec::new();
        for instrument in instruments {
            let sub = Subscription { instrument: instrument.clone(), mode };
            if self.active.insert(sub) {
                added.push(instrument.clone());
            }
        }
        added
    }

    /// Remove the instruments and return the ones that were active.
    pub fn remove(&mut self, instruments: &[Instrument], mode: FeedMode) -> Vec<Instrument> {
        let mut removed = Vec::new();
        for instrument in instruments {
            let sub = Subscription { instrument: instrument.clone(), mode };
            if self.active.remove(&sub) {
                removed.push(instrument.clone());
            }
        }
        removed
    }

    pub fn contains(&self, instrument: &Instrument, mode: FeedMode) -> bool {
        self.active.contains(&Subscription { instrument: instrument.clone(), mode })
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Snapshot, sorted for stable output.
    pub fn to_vec(&self) -> Vec<Subscription> {
        let mut subs: Vec<Subscription> = self.active.iter().cloned().collect();
        subs.sort();
        subs
    }
}
