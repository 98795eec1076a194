use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_tungstenite::tungstenite;

use crate::errors::JainamError;

#[derive(Debug)]
pub enum StreamMessage {
    // == TEXTUAL MESSAGES ==
    // answer to the connect frame
    ConnectAck(ConnectAck),
    // tick subscription acknowledged, carries a full snapshot
    TickAck(Tick),
    // tick update, only changed fields are present
    TickFeed(Tick),
    // depth subscription acknowledged, carries a full snapshot
    DepthAck(Depth),
    // depth update
    DepthFeed(Depth),
    // valid JSON that is not one of the above
    Unparseable(String),
    // == CONTROL FRAMES ==
    Ping,
    Pong,
    // == UNEXPECTED FROM THE FEED ==
    Binary(tungstenite::Bytes),
    Frame(tungstenite::protocol::frame::Frame),
    Close(Option<tungstenite::protocol::frame::CloseFrame>),
}

impl TryFrom<tungstenite::Message> for StreamMessage {
    type Error = JainamError;
    fn try_from(msg: tungstenite::Message) -> Result<StreamMessage, Self::Error> {
        match msg {
            tungstenite::Message::Text(text) => Self::from_textual_message(text.to_string()),
            tungstenite::Message::Ping(_) => Ok(Self::Ping),
            tungstenite::Message::Pong(_) => Ok(Self::Pong),
            tungstenite::Message::Binary(b) => Ok(Self::Binary(b)),
            tungstenite::Message::Close(c) => Ok(Self::Close(c)),
            tungstenite::Message::Frame(f) => Ok(Self::Frame(f)),
        }
    }
}

impl StreamMessage {
    /// Decode one text frame. Invalid JSON is an error; a frame with an unknown or
    /// missing `t` tag, or one that does not fit its tag, is `Unparseable`.
    pub fn from_textual_message(s: String) -> Result<StreamMessage, JainamError> {
        let value = Value::from_str(&s)?;
        let Some(msg_type) = determine_type(&value) else {
            return Ok(StreamMessage::Unparseable(s));
        };
        let socket_message = match msg_type.as_str() {
            "cf" => match serde_json::from_value::<ConnectAck>(value) {
                Ok(res) => StreamMessage::ConnectAck(res),
                Err(_) => StreamMessage::Unparseable(s),
            },
            "tk" => match serde_json::from_value::<Tick>(value) {
                Ok(res) => StreamMessage::TickAck(res),
                Err(_) => StreamMessage::Unparseable(s),
            },
            "tf" => match serde_json::from_value::<Tick>(value) {
                Ok(res) => StreamMessage::TickFeed(res),
                Err(_) => StreamMessage::Unparseable(s),
            },
            "dk" => match serde_json::from_value::<Depth>(value) {
                Ok(res) => StreamMessage::DepthAck(res),
                Err(_) => StreamMessage::Unparseable(s),
            },
            "df" => match serde_json::from_value::<Depth>(value) {
                Ok(res) => StreamMessage::DepthFeed(res),
                Err(_) => StreamMessage::Unparseable(s),
            },
            _ => StreamMessage::Unparseable(s),
        };

        Ok(socket_message)
    }

    /// Tick carried by a tick or depth frame.
    pub fn quote(&self) -> Option<&Tick> {
        match self {
            StreamMessage::TickAck(t) | StreamMessage::TickFeed(t) => Some(t),
            StreamMessage::DepthAck(d) | StreamMessage::DepthFeed(d) => Some(&d.quote),
            _ => None,
        }
    }
}

fn determine_type(value: &Value) -> Option<String> {
    value.as_object()?.get("t")?.as_str().map(str::to_string)
}


/// `{"t":"cf","s":"OK",...}`
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ConnectAck {
    #[serde(rename = "t")]
    pub msg_type: String,
    #[serde(default, rename = "s")]
    pub status: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub actid: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl ConnectAck {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref().is_some_and(|s| s.eq_ignore_ascii_case("OK"))
    }
}


/// Tick fields. Prices and quantities are kept as the text the feed sent; the feed
/// omits unchanged fields on updates, so every field is optional.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Tick {
    #[serde(rename = "t")]
    pub msg_type: String,
    #[serde(default, rename = "e")]
    pub exchange: Option<String>,
    #[serde(default, rename = "tk", deserialize_with = "crate::response::string_or_number")]
    pub token: Option<String>,
    #[serde(default, rename = "lp", deserialize_with = "crate::response::string_or_number")]
    pub ltp: Option<String>,
    #[serde(default, rename = "pc", deserialize_with = "crate::response::string_or_number")]
    pub percent_change: Option<String>,
    #[serde(default, rename = "cv", deserialize_with = "crate::response::string_or_number")]
    pub change_value: Option<String>,
    #[serde(default, rename = "v", deserialize_with = "crate::response::string_or_number")]
    pub volume: Option<String>,
    #[serde(default, rename = "o", deserialize_with = "crate::response::string_or_number")]
    pub open: Option<String>,
    #[serde(default, rename = "h", deserialize_with = "crate::response::string_or_number")]
    pub high: Option<String>,
    #[serde(default, rename = "l", deserialize_with = "crate::response::string_or_number")]
    pub low: Option<String>,
    #[serde(default, rename = "c", deserialize_with = "crate::response::string_or_number")]
    pub close: Option<String>,
    #[serde(default, rename = "ap", deserialize_with = "crate::response::string_or_number")]
    pub average_price: Option<String>,
    #[serde(default, rename = "ts")]
    pub symbol: Option<String>,
    #[serde(default, rename = "oi", deserialize_with = "crate::response::string_or_number")]
    pub open_interest: Option<String>,
    #[serde(default, rename = "ltq", deserialize_with = "crate::response::string_or_number")]
    pub last_traded_qty: Option<String>,
    #[serde(default, rename = "ltt", deserialize_with = "crate::response::string_or_number")]
    pub last_traded_time: Option<String>,
    #[serde(default, rename = "tbq", deserialize_with = "crate::response::string_or_number")]
    pub total_buy_qty: Option<String>,
    #[serde(default, rename = "tsq", deserialize_with = "crate::response::string_or_number")]
    pub total_sell_qty: Option<String>,
    #[serde(default, rename = "uc", deserialize_with = "crate::response::string_or_number")]
    pub upper_circuit: Option<String>,
    #[serde(default, rename = "lc", deserialize_with = "crate::response::string_or_number")]
    pub lower_circuit: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Tick {
    /// `EXCHANGE|TOKEN`, when both are present.
    pub fn key(&self) -> Option<String> {
        Some(format!("{}|{}", self.exchange.as_deref()?, self.token.as_deref()?))
    }

    pub fn last_price(&self) -> Option<f64> {
        parse_number(self.ltp.as_deref())
    }

    pub fn volume_f64(&self) -> Option<f64> {
        parse_number(self.volume.as_deref())
    }
}


/// One side of one depth level.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DepthLevel {
    pub price: Option<f64>,
    pub quantity: Option<f64>,
    pub orders: Option<f64>,
}


/// Depth frame: the tick fields plus `bp1..5`, `bq1..5`, `bo1..5` for bids and
/// `sp1..5`, `sq1..5`, `so1..5` for asks, which land in `quote.extra`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Depth {
    #[serde(flatten)]
    pub quote: Tick,
}

impl Depth {
    pub const LEVELS: usize = 5;

    pub fn bids(&self) -> Vec<DepthLevel> {
        self.side("bp", "bq", "bo")
    }

    pub fn asks(&self) -> Vec<DepthLevel> {
        self.side("sp", "sq", "so")
    }

    fn side(&self, price: &str, quantity: &str, orders: &str) -> Vec<DepthLevel> {
        (1..=Self::LEVELS)
            .map(|i| DepthLevel {
                price: self.field(&format!("{price}{i}")),
                quantity: self.field(&format!("{quantity}{i}")),
                orders: self.field(&format!("{orders}{i}")),
            })
            .collect()
    }

    fn field(&self, name: &str) -> Option<f64> {
        match self.quote.extra.get(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_number(Some(s)),
            _ => None,
        }
    }
}


fn parse_number(s: Option<&str>) -> Option<f64> {
    s?.trim().parse::<f64>().ok()
}
