use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Duration;

use derive_more::Display;
use futures_util::{SinkExt, StreamExt, stream};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::http;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, trace, warn};

use crate::auth::Session;
use crate::errors::JainamError;
use crate::websocket::endpoints::{connect_frame, heartbeat_frame};
use crate::websocket::models::StreamMessage;
use crate::websocket::subscriptions::{Subscription, SubscriptionSet};

pub(crate) const JAINAM_WS: &str = "wss://ws.jainam.in/NorenWSTP/";

pub(crate) type WsSink = stream::SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = stream::SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;


/// Stream connection settings.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub url: String,
    /// The feed drops idle connections; the vendor asks for one heartbeat every 50 s.
    pub heartbeat_interval: Duration,
    /// Upper bound on TCP/TLS setup plus the `cf` acknowledgement.
    pub connect_timeout: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            url: JAINAM_WS.to_string(),
            heartbeat_interval: Duration::from_secs(50),
            connect_timeout: Duration::from_secs(10),
        }
    }
}


#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    /// Connected, no active subscriptions.
    Idle,
    /// Connected with at least one active subscription.
    Subscribed,
    Closing,
    /// Terminal. A new client is needed to connect again.
    Closed,
}


/// What the background listener hands to the caller, in arrival order.
#[derive(Debug)]
pub enum StreamEvent {
    /// Handshake acknowledged.
    Open,
    Message(StreamMessage),
    /// Undecodable frame or transport failure. A transport failure is followed by `Close`.
    Error(JainamError),
    /// Last event of a connection, with the close reason when one is known.
    Close(Option<String>),
}


/// Connection-scoped state shared with the listener task.
pub(crate) struct Shared {
    pub(crate) state: StdMutex<ConnectionState>,
    pub(crate) subscriptions: StdMutex<SubscriptionSet>,
    pub(crate) sender: Mutex<Option<WsSink>>,
}

impl Shared {
    pub(crate) fn state(&self) -> MutexGuard<'_, ConnectionState> {
        // a panic while holding the lock leaves plain data behind; keep going
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn subscriptions(&self) -> MutexGuard<'_, SubscriptionSet> {
        self.subscriptions.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state() = state;
    }
}


struct Listener {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}


/// Market data stream for one session.
///
/// `connect` performs the handshake and returns the event receiver; a background
/// task then reads frames and sends heartbeats until `disconnect` or until the
/// feed closes the socket. Subscriptions last as long as the connection.
pub struct JainamWebsocketClient {
    user_id: String,
    access_token: String,
    config: StreamConfig,
    pub(crate) shared: Arc<Shared>,
    listener: Mutex<Option<Listener>>,
}

impl JainamWebsocketClient {
    pub fn new(session: &Session) -> Self {
        Self::new_with_config(session, StreamConfig::default())
    }

    pub fn new_with_config(session: &Session, config: StreamConfig) -> Self {
        JainamWebsocketClient {
            user_id: session.user_id.clone(),
            access_token: session.access_token.clone(),
            config,
            shared: Arc::new(Shared {
                state: StdMutex::new(ConnectionState::Disconnected),
                subscriptions: StdMutex::new(SubscriptionSet::new()),
                sender: Mutex::new(None),
            }),
            listener: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        let state = *self.shared.state();
        match state {
            ConnectionState::Idle | ConnectionState::Subscribed => {
                if self.shared.subscriptions().is_empty() {
                    ConnectionState::Idle
                } else {
                    ConnectionState::Subscribed
                }
            }
            other => other,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state(), ConnectionState::Idle | ConnectionState::Subscribed)
    }

    /// Snapshot of the active subscriptions.
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.shared.subscriptions().to_vec()
    }

    /// Open the socket, authenticate and start the listener.
    ///
    /// Fails with `Authentication` when the feed rejects the token, and with
    /// `WebSocket` on transport failure or when the handshake does not finish within
    /// `connect_timeout`. Either way the client ends up `Closed`.
    pub async fn connect(&self) -> Result<mpsc::UnboundedReceiver<StreamEvent>, JainamError> {
        {
            let mut state = self.shared.state();
            if *state != ConnectionState::Disconnected {
                return Err(JainamError::WebSocket(format!(
                    "connect called while {}",
                    *state
                )));
            }
            *state = ConnectionState::Connecting;
        }

        let handshake = tokio::time::timeout(self.config.connect_timeout, self.handshake()).await;
        let (sender, receiver, pending) = match handshake {
            Ok(Ok(parts)) => parts,
            Ok(Err(e)) => {
                self.shared.set_state(ConnectionState::Closed);
                return Err(e);
            }
            Err(_) => {
                self.shared.set_state(ConnectionState::Closed);
                return Err(JainamError::WebSocket(format!(
                    "handshake did not complete within {:?}",
                    self.config.connect_timeout
                )));
            }
        };

        *self.shared.sender.lock().await = Some(sender);
        self.shared.set_state(ConnectionState::Idle);
        info!(user_id = %self.user_id, url = %self.config.url, "stream connected");

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let _ = events_tx.send(StreamEvent::Open);
        for msg in pending {
            let _ = events_tx.send(StreamEvent::Message(msg));
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run_listener(
            receiver,
            Arc::clone(&self.shared),
            events_tx,
            shutdown_rx,
            self.config.heartbeat_interval,
        ));
        *self.listener.lock().await = Some(Listener { shutdown: shutdown_tx, handle });

        Ok(events_rx)
    }

    /// Connect, send the auth frame and wait for `cf`. Frames that arrive before the
    /// acknowledgement are returned so they can be delivered after `Open`.
    async fn handshake(&self) -> Result<(WsSink, WsSource, Vec<StreamMessage>), JainamError> {
        let (ws_stream, response) = connect_async(self.config.url.as_str())
            .await
            .map_err(|e| JainamError::WebSocket(format!("error forming ws connection: {e}")))?;
        if response.status() != http::StatusCode::SWITCHING_PROTOCOLS {
            return Err(JainamError::WebSocket(format!(
                "not switching protocols, failed with status code: {:?}",
                response.status()
            )));
        }
        let (mut sender, mut receiver) = ws_stream.split();
        sender
            .send(Message::text(connect_frame(&self.user_id, &self.access_token)))
            .await?;

        let mut pending = Vec::new();
        loop {
            match receiver.next().await {
                Some(Ok(Message::Text(text))) => {
                    match StreamMessage::from_textual_message(text.to_string())? {
                        StreamMessage::ConnectAck(ack) if ack.is_ok() => break,
                        StreamMessage::ConnectAck(ack) => {
                            return Err(JainamError::Authentication(format!(
                                "stream handshake rejected: {}",
                                ack.status.as_deref().unwrap_or("no status")
                            )));
                        }
                        other => pending.push(other),
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    return Err(JainamError::WebSocket(format!(
                        "connection closed during handshake: {}",
                        close_reason(frame.as_ref()).unwrap_or_default()
                    )));
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
                None => {
                    return Err(JainamError::WebSocket(
                        "connection closed during handshake".into(),
                    ));
                }
            }
        }
        Ok((sender, receiver, pending))
    }

    /// Stop the listener and release the socket. Safe to call in any state; a
    /// client that never connected goes straight to `Closed`.
    pub async fn disconnect(&self) -> Result<(), JainamError> {
        let listener = self.listener.lock().await.take();
        let Some(listener) = listener else {
            let mut state = self.shared.state();
            if *state == ConnectionState::Disconnected {
                *state = ConnectionState::Closed;
            }
            return Ok(());
        };
        {
            let mut state = self.shared.state();
            if *state != ConnectionState::Closed {
                *state = ConnectionState::Closing;
            }
        }
        // the listener may already be gone if the feed closed first
        let _ = listener.shutdown.send(());
        if let Err(e) = listener.handle.await {
            warn!("stream listener ended abnormally: {e}");
        }
        Ok(())
    }
}


async fn run_listener(
    mut receiver: WsSource,
    shared: Arc<Shared>,
    events: mpsc::UnboundedSender<StreamEvent>,
    mut shutdown: oneshot::Receiver<()>,
    heartbeat_interval: Duration,
) {
    let mut heartbeat = tokio::time::interval_at(Instant::now() + heartbeat_interval, heartbeat_interval);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let reason = loop {
        tokio::select! {
            _ = &mut shutdown => {
                break Some("disconnect requested".to_string());
            }
            _ = heartbeat.tick() => {
                let mut lock = shared.sender.lock().await;
                let Some(sender) = lock.as_mut() else {
                    break None;
                };
                if let Err(e) = sender.send(Message::text(heartbeat_frame())).await {
                    let _ = events.send(StreamEvent::Error(e.into()));
                    break Some("heartbeat failed".to_string());
                }
                trace!("heartbeat sent");
            }
            frame = receiver.next() => match frame {
                Some(Ok(Message::Close(frame))) => {
                    break close_reason(frame.as_ref());
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {
                    trace!("control frame");
                }
                Some(Ok(msg)) => match StreamMessage::try_from(msg) {
                    Ok(msg) => {
                        let _ = events.send(StreamEvent::Message(msg));
                    }
                    Err(e) => {
                        debug!("undecodable frame: {e}");
                        let _ = events.send(StreamEvent::Error(e));
                    }
                },
                Some(Err(e)) => {
                    let _ = events.send(StreamEvent::Error(e.into()));
                    break Some("transport error".to_string());
                }
                None => break None,
            }
        }
    };

    shared.set_state(ConnectionState::Closing);
    {
        let mut lock = shared.sender.lock().await;
        if let Some(mut sender) = lock.take() {
            let _ = sender.close().await;
        }
        shared.subscriptions().clear();
    }
    shared.set_state(ConnectionState::Closed);
    info!(reason = reason.as_deref().unwrap_or("closed by peer"), "stream closed");
    let _ = events.send(StreamEvent::Close(reason));
}


fn close_reason(frame: Option<&tokio_tungstenite::tungstenite::protocol::CloseFrame>) -> Option<String> {
    frame.map(|f| format!("{} {}", u16::from(f.code), f.reason))
}
