use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use jainam_rs::websocket::subscriptions::{FeedMode, Instrument};

/// Runtime settings for the feed application.
///
/// Every field has a default; `from_env` overrides them from `JAINAM_*` variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Where the cached session lives. None => $HOME/.jainam_session.json
    pub session_file: Option<PathBuf>,

    // A cached session older than this forces a fresh SSO login.
    pub session_max_age_hours: i64,

    // Instruments to stream on startup, `NSE|26000#NFO|54957`.
    pub instruments: Vec<Instrument>,

    // Depth (5 level book) instead of plain ticks.
    pub depth: bool,

    // Replay the tracked subscriptions after a reconnect.
    pub resubscribe_on_reconnect: bool,

    // Pause between a closed connection and the next attempt.
    pub reconnect_delay_ms: u64,

    // How often the quote board is written to the log.
    pub report_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_file: None,
            session_max_age_hours: 8,
            instruments: vec![Instrument::new("NSE", "26000")],
            depth: false,
            resubscribe_on_reconnect: true,
            reconnect_delay_ms: 2_000,
            report_ms: 10_000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Some(path) = var("JAINAM_SESSION_FILE") {
            cfg.session_file = Some(PathBuf::from(path));
        }
        if let Some(hours) = var("JAINAM_SESSION_MAX_AGE_HOURS") {
            cfg.session_max_age_hours = hours
                .parse()
                .with_context(|| format!("JAINAM_SESSION_MAX_AGE_HOURS={hours}"))?;
        }
        if let Some(list) = var("JAINAM_INSTRUMENTS") {
            cfg.instruments =
                Instrument::parse_list(&list).with_context(|| format!("JAINAM_INSTRUMENTS={list}"))?;
        }
        if let Some(flag) = var("JAINAM_DEPTH") {
            cfg.depth = parse_flag("JAINAM_DEPTH", &flag)?;
        }
        if let Some(flag) = var("JAINAM_RESUBSCRIBE") {
            cfg.resubscribe_on_reconnect = parse_flag("JAINAM_RESUBSCRIBE", &flag)?;
        }
        if let Some(ms) = var("JAINAM_RECONNECT_DELAY_MS") {
            cfg.reconnect_delay_ms = ms
                .parse()
                .with_context(|| format!("JAINAM_RECONNECT_DELAY_MS={ms}"))?;
        }
        if let Some(ms) = var("JAINAM_REPORT_MS") {
            cfg.report_ms = ms.parse().with_context(|| format!("JAINAM_REPORT_MS={ms}"))?;
        }

        Ok(cfg)
    }

    pub fn feed_mode(&self) -> FeedMode {
        if self.depth { FeedMode::Depth } else { FeedMode::Tick }
    }

    pub fn session_max_age(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_max_age_hours)
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("{name}: expected a boolean, got {other:?}"),
    }
}
