use futures_util::SinkExt;
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use crate::auth::create_susertoken;
use crate::errors::JainamError;
use crate::websocket::subscriptions::{FeedMode, Instrument};
use crate::JainamWebsocketClient;

impl JainamWebsocketClient {
    /// Subscribe to `instruments` in `mode`.
    ///
    /// One frame is sent for the instruments not already active in that mode; if
    /// all of them are active nothing is sent.
    pub async fn subscribe(
        &self,
        instruments: &[Instrument],
        mode: FeedMode,
    ) -> Result<(), JainamError> {
        self.ensure_connected()?;
        // the sender lock orders set updates and frames across concurrent callers
        let mut sender = self.shared.sender.lock().await;
        let Some(sink) = sender.as_mut() else {
            return Err(not_connected());
        };
        let added = self.shared.subscriptions().insert(instruments, mode);
        if added.is_empty() {
            return Ok(());
        }
        let msg = subscribe_message(&added, mode);
        if let Err(e) = sink.send(Message::text(msg)).await {
            self.shared.subscriptions().remove(&added, mode);
            return Err(JainamError::WebSocket(format!("send failed: {e}")));
        }
        debug!(%mode, instruments = %format_instruments(&added), "subscribed");
        Ok(())
    }

    /// Unsubscribe the active ones among `instruments`; the rest are ignored.
    pub async fn unsubscribe(
        &self,
        instruments: &[Instrument],
        mode: FeedMode,
    ) -> Result<(), JainamError> {
        self.ensure_connected()?;
        let mut sender = self.shared.sender.lock().await;
        let Some(sink) = sender.as_mut() else {
            return Err(not_connected());
        };
        let removed = self.shared.subscriptions().remove(instruments, mode);
        if removed.is_empty() {
            return Ok(());
        }
        let msg = unsubscribe_message(&removed, mode);
        if let Err(e) = sink.send(Message::text(msg)).await {
            self.shared.subscriptions().insert(&removed, mode);
            return Err(JainamError::WebSocket(format!("send failed: {e}")));
        }
        debug!(%mode, instruments = %format_instruments(&removed), "unsubscribed");
        Ok(())
    }

    /// LTP, OHLC and volume.
    pub async fn subscribe_tick(&self, instruments: &[Instrument]) -> Result<(), JainamError> {
        self.subscribe(instruments, FeedMode::Tick).await
    }

    /// Five level bid/ask.
    pub async fn subscribe_depth(&self, instruments: &[Instrument]) -> Result<(), JainamError> {
        self.subscribe(instruments, FeedMode::Depth).await
    }

    fn ensure_connected(&self) -> Result<(), JainamError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(JainamError::WebSocket(format!(
                "stream is not connected ({})",
                self.state()
            )))
        }
    }
}

fn not_connected() -> JainamError {
    JainamError::WebSocket("stream is not connected. call connect first".into())
}

/// The feed's user id for API sessions.
pub fn stream_uid(user_id: &str) -> String {
    format!("{user_id}_API")
}

/// `NSE|26000#NFO|54957`
pub fn format_instruments(instruments: &[Instrument]) -> String {
    instruments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("#")
}

pub(crate) fn connect_frame(user_id: &str, access_token: &str) -> String {
    let uid = stream_uid(user_id);
    json!({
        "susertoken": create_susertoken(access_token),
        "t": "c",
        "actid": uid,
        "uid": uid,
        "source": "API",
    })
    .to_string()
}

pub(crate) fn heartbeat_frame() -> String {
    json!({"k": "", "t": "h"}).to_string()
}

fn subscribe_message(instruments: &[Instrument], mode: FeedMode) -> String {
    json!({"k": format_instruments(instruments), "t": mode.subscribe_tag()}).to_string()
}

fn unsubscribe_message(instruments: &[Instrument], mode: FeedMode) -> String {
    json!({"k": format_instruments(instruments), "t": mode.unsubscribe_tag()}).to_string()
}
