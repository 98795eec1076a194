use anyhow::Result;
use tokio::sync::mpsc;

use std::io::BufRead;
use tracing::warn;

use jainam_rs::websocket::subscriptions::{FeedMode, Instrument};

use crate::types::StreamCommand;

/// Turn one console line into a stream command.
///
/// `sub NSE|2885#NFO|54957`, `depth NSE|2885`, `unsub NSE|2885`, `undepth NSE|2885`, `quit`.
pub fn parse_command(line: &str) -> Result<Option<StreamCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let instruments = || -> Result<Vec<Instrument>> {
        let list = Instrument::parse_list(rest.trim())?;
        anyhow::ensure!(!list.is_empty(), "{verb}: no instruments given");
        Ok(list)
    };

    let cmd = match verb.to_ascii_lowercase().as_str() {
        "sub" => StreamCommand::Subscribe { instruments: instruments()?, mode: FeedMode::Tick },
        "depth" => StreamCommand::Subscribe { instruments: instruments()?, mode: FeedMode::Depth },
        "unsub" => StreamCommand::Unsubscribe { instruments: instruments()?, mode: FeedMode::Tick },
        "undepth" => StreamCommand::Unsubscribe { instruments: instruments()?, mode: FeedMode::Depth },
        "quit" | "exit" => StreamCommand::Shutdown,
        other => anyhow::bail!("unknown command {other:?}"),
    };
    Ok(Some(cmd))
}

/// Forward console commands to the stream task until stdin closes or `quit`.
///
/// Blocking; runs on its own thread so a pending read never holds up runtime shutdown.
pub fn run_console(tx: mpsc::Sender<StreamCommand>) -> Result<()> {
    for line in std::io::stdin().lock().lines() {
        match parse_command(&line?) {
            Ok(Some(cmd)) => {
                let stop = matches!(cmd, StreamCommand::Shutdown);
                if tx.blocking_send(cmd).is_err() || stop {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("{e}"),
        }
    }
    Ok(())
}
