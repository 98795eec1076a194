use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use jainam_rs::auth::create_susertoken;
use jainam_rs::websocket::models::StreamMessage;
use jainam_rs::websocket::subscriptions::{FeedMode, Instrument};
use jainam_rs::ws_client::{ConnectionState, StreamConfig, StreamEvent};
use jainam_rs::{JainamError, JainamWebsocketClient};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::common::{test_session, MockFeed, TOKEN};

const WAIT: Duration = Duration::from_secs(5);

fn setup_ws_client(feed: &MockFeed) -> JainamWebsocketClient {
    setup_ws_client_with(feed, Duration::from_secs(50))
}

fn setup_ws_client_with(feed: &MockFeed, heartbeat_interval: Duration) -> JainamWebsocketClient {
    let config = StreamConfig {
        url: feed.url.clone(),
        heartbeat_interval,
        connect_timeout: Duration::from_secs(2),
    };
    JainamWebsocketClient::new_with_config(&test_session(), config)
}

/// Next text frame the server receives, as JSON.
async fn next_frame(ws: &mut WebSocketStream<TcpStream>) -> Value {
    loop {
        let msg = timeout(WAIT, ws.next()).await.unwrap().unwrap().unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn next_event(events: &mut UnboundedReceiver<StreamEvent>) -> StreamEvent {
    timeout(WAIT, events.recv()).await.unwrap().unwrap()
}

async fn send(ws: &mut WebSocketStream<TcpStream>, frame: &str) {
    ws.send(Message::text(frame.to_string())).await.unwrap();
}

/// Connect the client and play the server side of the handshake.
async fn connect(
    client: &JainamWebsocketClient,
    feed: &mut MockFeed,
) -> (UnboundedReceiver<StreamEvent>, WebSocketStream<TcpStream>, Value) {
    let server = async {
        let mut ws = feed.accept().await;
        let hello = next_frame(&mut ws).await;
        send(&mut ws, r#"{"t":"cf","s":"OK","uid":"DK2200295_API"}"#).await;
        (ws, hello)
    };
    let (events, (ws, hello)) = tokio::join!(client.connect(), server);
    (events.unwrap(), ws, hello)
}

#[tokio::test]
async fn test_connect_sends_auth_frame_and_emits_open() {
    let mut feed = MockFeed::start().await;
    let client = setup_ws_client(&feed);
    assert_eq!(client.state(), ConnectionState::Disconnected);

    let (mut events, _ws, hello) = connect(&client, &mut feed).await;
    assert_eq!(hello["t"], "c");
    assert_eq!(hello["uid"], "DK2200295_API");
    assert_eq!(hello["actid"], "DK2200295_API");
    assert_eq!(hello["source"], "API");
    assert_eq!(hello["susertoken"], create_susertoken(TOKEN).as_str());

    assert!(matches!(next_event(&mut events).await, StreamEvent::Open));
    assert_eq!(client.state(), ConnectionState::Idle);
    assert!(client.is_connected());
}

#[tokio::test]
async fn test_tick_frames_delivered_in_order() {
    let mut feed = MockFeed::start().await;
    let client = setup_ws_client(&feed);
    let (mut events, mut ws, _) = connect(&client, &mut feed).await;
    next_event(&mut events).await;

    send(&mut ws, r#"{"t":"tk","e":"NFO","tk":"54957","lp":"84.00","ts":"NIFTY25NOV24000CE"}"#).await;
    send(&mut ws, r#"{"t":"tf","e":"NFO","tk":"54957","lp":"84.20","v":"1200"}"#).await;

    let StreamEvent::Message(StreamMessage::TickAck(ack)) = next_event(&mut events).await else {
        panic!("expected tick acknowledgement");
    };
    assert_eq!(ack.symbol.as_deref(), Some("NIFTY25NOV24000CE"));

    let StreamEvent::Message(StreamMessage::TickFeed(tick)) = next_event(&mut events).await else {
        panic!("expected tick feed");
    };
    assert_eq!(tick.exchange.as_deref(), Some("NFO"));
    assert_eq!(tick.token.as_deref(), Some("54957"));
    assert_eq!(tick.ltp.as_deref(), Some("84.20"));
    assert_eq!(tick.volume.as_deref(), Some("1200"));
}

#[tokio::test]
async fn test_invalid_json_is_error_event_and_stream_continues() {
    let mut feed = MockFeed::start().await;
    let client = setup_ws_client(&feed);
    let (mut events, mut ws, _) = connect(&client, &mut feed).await;
    next_event(&mut events).await;

    send(&mut ws, "{broken").await;
    send(&mut ws, r#"{"t":"om","k":"1"}"#).await;
    send(&mut ws, r#"{"t":"df","e":"NSE","tk":"2885","bp1":"2500.05"}"#).await;

    assert!(matches!(next_event(&mut events).await, StreamEvent::Error(JainamError::ParseError(_))));
    assert!(matches!(
        next_event(&mut events).await,
        StreamEvent::Message(StreamMessage::Unparseable(_))
    ));
    let StreamEvent::Message(StreamMessage::DepthFeed(depth)) = next_event(&mut events).await else {
        panic!("expected depth feed");
    };
    assert_eq!(depth.bids()[0].price, Some(2500.05));
    assert!(client.is_connected());
}

#[tokio::test]
async fn test_subscribe_sends_only_new_instruments() {
    let mut feed = MockFeed::start().await;
    let client = setup_ws_client(&feed);
    let (_events, mut ws, _) = connect(&client, &mut feed).await;

    let nifty = Instrument::new("NSE", "26000");
    let option = Instrument::new("nfo", "54957");
    client.subscribe_tick(&[nifty.clone(), option.clone()]).await.unwrap();
    assert_eq!(next_frame(&mut ws).await, json!({"k": "NSE|26000#NFO|54957", "t": "t"}));
    assert_eq!(client.state(), ConnectionState::Subscribed);

    // already active: no frame
    client.subscribe_tick(&[nifty.clone()]).await.unwrap();
    client
        .subscribe_tick(&[nifty.clone(), Instrument::new("BSE", "1")])
        .await
        .unwrap();
    assert_eq!(next_frame(&mut ws).await, json!({"k": "BSE|1", "t": "t"}));

    client.subscribe_depth(&[nifty.clone()]).await.unwrap();
    assert_eq!(next_frame(&mut ws).await, json!({"k": "NSE|26000", "t": "d"}));
    assert_eq!(client.subscriptions().len(), 4);
}

#[tokio::test]
async fn test_unsubscribe_sends_only_active_instruments() {
    let mut feed = MockFeed::start().await;
    let client = setup_ws_client(&feed);
    let (_events, mut ws, _) = connect(&client, &mut feed).await;

    let nifty = Instrument::new("NSE", "26000");
    client.subscribe(&[nifty.clone()], FeedMode::Tick).await.unwrap();
    next_frame(&mut ws).await;

    // nothing active in depth mode: no frame
    client.unsubscribe(&[nifty.clone()], FeedMode::Depth).await.unwrap();
    client
        .unsubscribe(&[nifty.clone(), Instrument::new("MCX", "999")], FeedMode::Tick)
        .await
        .unwrap();
    assert_eq!(next_frame(&mut ws).await, json!({"k": "NSE|26000", "t": "u"}));
    assert!(client.subscriptions().is_empty());
    assert_eq!(client.state(), ConnectionState::Idle);

    client.subscribe_depth(&[nifty.clone()]).await.unwrap();
    next_frame(&mut ws).await;
    client.unsubscribe(&[nifty], FeedMode::Depth).await.unwrap();
    assert_eq!(next_frame(&mut ws).await, json!({"k": "NSE|26000", "t": "ud"}));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_subscribe_and_unsubscribe_keep_frames_in_set_order() {
    let mut feed = MockFeed::start().await;
    let client = setup_ws_client(&feed);
    let (_events, mut ws, _) = connect(&client, &mut feed).await;
    let client = Arc::new(client);
    let nifty = Instrument::new("NSE", "26000");
    let sub_frame = json!({"k": "NSE|26000", "t": "t"});
    let unsub_frame = json!({"k": "NSE|26000", "t": "u"});

    for _ in 0..200 {
        let (a, b) = (Arc::clone(&client), Arc::clone(&client));
        let (x, y) = (nifty.clone(), nifty.clone());
        let sub = tokio::spawn(async move { a.subscribe_tick(&[x]).await });
        let unsub = tokio::spawn(async move { b.unsubscribe(&[y], FeedMode::Tick).await });
        sub.await.unwrap().unwrap();
        unsub.await.unwrap().unwrap();

        // the subscribe frame always goes out; an unsubscribe frame only follows it
        assert_eq!(next_frame(&mut ws).await, sub_frame);
        if client.subscriptions().is_empty() {
            assert_eq!(next_frame(&mut ws).await, unsub_frame);
        } else {
            client.unsubscribe(&[nifty.clone()], FeedMode::Tick).await.unwrap();
            assert_eq!(next_frame(&mut ws).await, unsub_frame);
        }
        assert!(client.subscriptions().is_empty());
    }
}

#[tokio::test]
async fn test_heartbeat_is_sent_periodically() {
    let mut feed = MockFeed::start().await;
    let client = setup_ws_client_with(&feed, Duration::from_millis(100));
    let (_events, mut ws, _) = connect(&client, &mut feed).await;

    assert_eq!(next_frame(&mut ws).await, json!({"k": "", "t": "h"}));
    assert_eq!(next_frame(&mut ws).await, json!({"k": "", "t": "h"}));
}

#[tokio::test]
async fn test_server_close_clears_subscriptions() {
    let mut feed = MockFeed::start().await;
    let client = setup_ws_client(&feed);
    let (mut events, mut ws, _) = connect(&client, &mut feed).await;
    next_event(&mut events).await;
    client.subscribe_tick(&[Instrument::new("NSE", "26000")]).await.unwrap();
    next_frame(&mut ws).await;

    ws.close(None).await.unwrap();
    loop {
        if let StreamEvent::Close(_) = next_event(&mut events).await {
            break;
        }
    }
    assert_eq!(client.state(), ConnectionState::Closed);
    assert!(client.subscriptions().is_empty());
    assert!(client.subscribe_tick(&[Instrument::new("NSE", "26000")]).await.is_err());
    client.disconnect().await.unwrap();
    assert_eq!(client.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn test_disconnect_stops_listener() {
    let mut feed = MockFeed::start().await;
    let client = setup_ws_client(&feed);
    let (mut events, mut ws, _) = connect(&client, &mut feed).await;
    next_event(&mut events).await;
    client.subscribe_tick(&[Instrument::new("NSE", "26000")]).await.unwrap();
    next_frame(&mut ws).await;

    client.disconnect().await.unwrap();
    assert_eq!(client.state(), ConnectionState::Closed);
    assert!(client.subscriptions().is_empty());
    let StreamEvent::Close(reason) = next_event(&mut events).await else {
        panic!("expected close");
    };
    assert_eq!(reason.as_deref(), Some("disconnect requested"));
    // channel ends with the listener
    assert!(timeout(WAIT, events.recv()).await.unwrap().is_none());
    // a second disconnect is harmless
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_disconnect_before_connect_closes() {
    let feed = MockFeed::start().await;
    let client = setup_ws_client(&feed);
    client.disconnect().await.unwrap();
    assert_eq!(client.state(), ConnectionState::Closed);
    assert!(client.connect().await.is_err());
}

#[tokio::test]
async fn test_subscribe_before_connect_fails() {
    let feed = MockFeed::start().await;
    let client = setup_ws_client(&feed);
    let err = client
        .subscribe_tick(&[Instrument::new("NSE", "26000")])
        .await
        .unwrap_err();
    assert!(matches!(err, JainamError::WebSocket(_)));
    assert!(client.subscriptions().is_empty());
}

#[tokio::test]
async fn test_rejected_handshake_is_authentication_error() {
    let mut feed = MockFeed::start().await;
    let client = setup_ws_client(&feed);
    let server = async {
        let mut ws = feed.accept().await;
        next_frame(&mut ws).await;
        send(&mut ws, r#"{"t":"cf","s":"NOT_OK"}"#).await;
        ws
    };
    let (result, _ws) = tokio::join!(client.connect(), server);
    assert!(result.unwrap_err().is_authentication());
    assert_eq!(client.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn test_handshake_timeout() {
    let mut feed = MockFeed::start().await;
    let config = StreamConfig {
        url: feed.url.clone(),
        connect_timeout: Duration::from_millis(200),
        ..Default::default()
    };
    let client = JainamWebsocketClient::new_with_config(&test_session(), config);
    let server = async {
        let mut ws = feed.accept().await;
        next_frame(&mut ws).await;
        // never acknowledge
        ws
    };
    let (result, _ws) = tokio::join!(client.connect(), server);
    assert!(matches!(result.unwrap_err(), JainamError::WebSocket(_)));
    assert_eq!(client.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn test_unreachable_feed() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let config = StreamConfig {
        url: format!("ws://{addr}/"),
        ..Default::default()
    };
    let client = JainamWebsocketClient::new_with_config(&test_session(), config);
    assert!(matches!(client.connect().await.unwrap_err(), JainamError::WebSocket(_)));
    assert_eq!(client.state(), ConnectionState::Closed);
}
