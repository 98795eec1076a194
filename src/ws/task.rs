use anyhow::Result;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use tokio::sync::mpsc;

use jainam_rs::websocket::models::StreamMessage;
use jainam_rs::websocket::subscriptions::{FeedMode, Instrument, SubscriptionSet};
use jainam_rs::ws_client::StreamEvent;
use jainam_rs::{JainamWebsocketClient, Session};

use crate::config::Config;
use crate::state::Shared;
use crate::types::StreamCommand;

/// Why an inner connection loop ended.
enum Exit {
    Reconnect,
    Shutdown,
}

pub async fn run_ws(
    session: Session,
    cfg: Config,
    shared: Shared,
    mut ctl_rx: mpsc::Receiver<StreamCommand>,
) -> Result<()> {
    // Track subscriptions locally; every connection starts with an empty set on the feed side.
    let mut tracked = SubscriptionSet::new();
    tracked.insert(&cfg.instruments, cfg.feed_mode());

    let delay = Duration::from_millis(cfg.reconnect_delay_ms);
    let mut first = true;

    loop {
        // Commands that arrived while disconnected only touch the local view.
        while let Ok(cmd) = ctl_rx.try_recv() {
            if !apply_ctl_local(&mut tracked, &shared, &cmd) {
                return Ok(());
            }
        }

        let ws = JainamWebsocketClient::new(&session);
        let mut events = match ws.connect().await {
            Ok(rx) => rx,
            // a rejected token will not get better by retrying
            Err(e) if e.is_authentication() => return Err(e.into()),
            Err(e) => {
                warn!("ws connect failed {e}");
                sleep(delay).await;
                continue;
            }
        };

        if !first && !cfg.resubscribe_on_reconnect && !tracked.is_empty() {
            warn!("resubscribe disabled; dropping {} subscriptions", tracked.len());
            drop_subscriptions(&mut tracked, &shared);
        }
        first = false;

        if let Err(e) = subscribe_all(&ws, &tracked).await {
            warn!("ws subscribe failed: {e}");
            let _ = ws.disconnect().await;
            sleep(delay).await;
            continue;
        }
        info!("ws connected+subscribed to {} instruments", tracked.len());

        let exit = loop {
            tokio::select! {
                ev = events.recv() => {
                    match ev {
                        Some(StreamEvent::Open) => debug!("stream open"),
                        Some(StreamEvent::Message(msg)) => handle_message(&shared, msg),
                        Some(StreamEvent::Error(e)) => warn!("stream error: {e}"),
                        Some(StreamEvent::Close(reason)) => {
                            warn!("stream closed ({}); reconnecting", reason.as_deref().unwrap_or("no reason"));
                            break Exit::Reconnect;
                        }
                        None => break Exit::Reconnect,
                    }
                }

                cmd = ctl_rx.recv() => {
                    let Some(cmd) = cmd else { break Exit::Shutdown; };

                    if !apply_ctl_local(&mut tracked, &shared, &cmd) {
                        break Exit::Shutdown;
                    }
                    if let Err(e) = apply_ctl_remote(&ws, &cmd).await {
                        warn!("ws subscription update failed: {e}");
                    }
                }
            }
        };

        match exit {
            Exit::Shutdown => {
                if let Err(e) = ws.disconnect().await {
                    warn!("ws disconnect failed: {e}");
                }
                info!("stream task stopped");
                return Ok(());
            }
            Exit::Reconnect => sleep(delay).await,
        }
    }
}

fn handle_message(shared: &Shared, msg: StreamMessage) {
    match msg {
        StreamMessage::TickAck(t) | StreamMessage::TickFeed(t) => {
            shared.apply_tick(&t);
        }
        StreamMessage::DepthAck(d) | StreamMessage::DepthFeed(d) => {
            shared.apply_depth(&d);
        }
        StreamMessage::Unparseable(raw) => debug!("unhandled frame: {raw}"),
        _ => {}
    }
}

/// Forget every tracked subscription along with its quote.
fn drop_subscriptions(tracked: &mut SubscriptionSet, shared: &Shared) {
    for s in tracked.to_vec() {
        shared.remove(&s.instrument.to_string());
    }
    tracked.clear();
}

/// Returns false on shutdown.
fn apply_ctl_local(tracked: &mut SubscriptionSet, shared: &Shared, cmd: &StreamCommand) -> bool {
    match cmd {
        StreamCommand::Subscribe { instruments, mode } => {
            tracked.insert(instruments, *mode);
        }
        StreamCommand::Unsubscribe { instruments, mode } => {
            for i in tracked.remove(instruments, *mode) {
                shared.remove(&i.to_string());
            }
        }
        StreamCommand::Shutdown => return false,
    }
    true
}

async fn apply_ctl_remote(ws: &JainamWebsocketClient, cmd: &StreamCommand) -> Result<()> {
    match cmd {
        StreamCommand::Subscribe { instruments, mode } => ws.subscribe(instruments, *mode).await?,
        StreamCommand::Unsubscribe { instruments, mode } => ws.unsubscribe(instruments, *mode).await?,
        StreamCommand::Shutdown => {}
    }
    Ok(())
}

/// One subscribe frame per feed mode.
async fn subscribe_all(ws: &JainamWebsocketClient, tracked: &SubscriptionSet) -> Result<()> {
    for mode in [FeedMode::Tick, FeedMode::Depth] {
        let instruments: Vec<Instrument> = tracked
            .to_vec()
            .into_iter()
            .filter(|s| s.mode == mode)
            .map(|s| s.instrument)
            .collect();
        if !instruments.is_empty() {
            ws.subscribe(&instruments, mode).await?;
        }
    }
    Ok(())
}
