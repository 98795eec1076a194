//! Orders module models.
//!
//! This module contains data structures for order management functionality.
//! Optional request fields are sent as empty strings when unset, which is what the
//! vendor expects.

use std::collections::HashMap;

use derive_more::Display;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::errors::JainamError;


#[derive(Serialize, Deserialize, Display, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    #[display("NSE")]
    Nse,
    #[display("BSE")]
    Bse,
    #[display("NFO")]
    Nfo,
    #[display("BFO")]
    Bfo,
    #[display("MCX")]
    Mcx,
    #[display("CDS")]
    Cds,
    #[display("BCD")]
    Bcd,
    #[display("NCO")]
    Nco,
    #[display("BCO")]
    Bco,
}


#[derive(Serialize, Deserialize, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    #[display("BUY")]
    Buy,
    #[display("SELL")]
    Sell,
}


impl TransactionType {
    /// Direction that closes a position opened with `self`.
    pub fn opposite(self) -> TransactionType {
        match self {
            TransactionType::Buy => TransactionType::Sell,
            TransactionType::Sell => TransactionType::Buy,
        }
    }
}


#[derive(Serialize, Deserialize, Display, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    #[default]
    #[display("LIMIT")]
    Limit,
    #[display("MARKET")]
    Market,
    /// Stop loss limit.
    #[display("SL")]
    Sl,
    /// Stop loss market.
    #[display("SLM")]
    Slm,
}


#[derive(Serialize, Deserialize, Display, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Product {
    /// Squared off the same day.
    #[display("INTRADAY")]
    Intraday,
    /// Delivery.
    #[default]
    #[display("LONGTERM")]
    Longterm,
    /// Margin trading facility.
    #[display("MTF")]
    Mtf,
}


#[derive(Serialize, Deserialize, Display, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderComplexity {
    #[default]
    #[display("REGULAR")]
    Regular,
    /// After market order.
    #[display("AMO")]
    Amo,
    #[display("BO")]
    Bo,
    #[display("CO")]
    Co,
}


#[derive(Serialize, Deserialize, Display, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Validity {
    #[default]
    #[display("DAY")]
    Day,
    #[display("IOC")]
    Ioc,
}


const MAX_ALGO_ID_LEN: usize = 12;
const MAX_ORDER_TAG_LEN: usize = 50;


fn empty_if_none<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    match value {
        Some(v) => v.serialize(serializer),
        None => serializer.serialize_str(""),
    }
}


/// Request model for placing one order.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub exchange: Exchange,
    pub instrument_id: String,
    pub transaction_type: TransactionType,
    pub quantity: u64,
    pub product: Product,
    pub order_complexity: OrderComplexity,
    pub order_type: OrderType,
    pub validity: Validity,
    #[serde(serialize_with = "empty_if_none")]
    pub price: Option<String>,
    #[serde(serialize_with = "empty_if_none")]
    pub sl_trigger_price: Option<String>,
    #[serde(serialize_with = "empty_if_none")]
    pub trailing_sl_amount: Option<String>,
    #[serde(serialize_with = "empty_if_none")]
    pub disclosed_quantity: Option<u64>,
    #[serde(serialize_with = "empty_if_none")]
    pub market_protection_percent: Option<String>,
    #[serde(serialize_with = "empty_if_none")]
    pub api_order_source: Option<String>,
    #[serde(serialize_with = "empty_if_none")]
    pub algo_id: Option<String>,
    #[serde(serialize_with = "empty_if_none")]
    pub order_tag: Option<String>,
}


impl PlaceOrderRequest {
    /// Limit order, delivery product, day validity.
    pub fn new(
        exchange: Exchange,
        instrument_id: impl Into<String>,
        transaction_type: TransactionType,
        quantity: u64,
    ) -> Self {
        Self {
            exchange,
            instrument_id: instrument_id.into(),
            transaction_type,
            quantity,
            product: Product::default(),
            order_complexity: OrderComplexity::default(),
            order_type: OrderType::default(),
            validity: Validity::default(),
            price: None,
            sl_trigger_price: None,
            trailing_sl_amount: None,
            disclosed_quantity: None,
            market_protection_percent: None,
            api_order_source: None,
            algo_id: None,
            order_tag: None,
        }
    }

    pub fn market(mut self) -> Self {
        self.order_type = OrderType::Market;
        self
    }

    pub fn limit(mut self, price: impl Into<String>) -> Self {
        self.order_type = OrderType::Limit;
        self.price = Some(price.into());
        self
    }

    pub fn stop_loss(mut self, price: impl Into<String>, trigger: impl Into<String>) -> Self {
        self.order_type = OrderType::Sl;
        self.price = Some(price.into());
        self.sl_trigger_price = Some(trigger.into());
        self
    }

    pub fn product(mut self, product: Product) -> Self {
        self.product = product;
        self
    }

    pub fn validity(mut self, validity: Validity) -> Self {
        self.validity = validity;
        self
    }

    pub fn complexity(mut self, complexity: OrderComplexity) -> Self {
        self.order_complexity = complexity;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.order_tag = Some(tag.into());
        self
    }

    /// Checks that can be made without the vendor. Anything deeper (lot sizes,
    /// price bands, segment rules) is left to the API.
    pub fn validate(&self) -> Result<(), JainamError> {
        if self.instrument_id.trim().is_empty() {
            return Err(JainamError::Validation("instrument_id cannot be empty".into()));
        }
        if self.quantity == 0 {
            return Err(JainamError::Validation("quantity should be a positive number".into()));
        }
        let has = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        if matches!(self.order_type, OrderType::Limit | OrderType::Sl) && !has(&self.price) {
            return Err(JainamError::Validation(format!(
                "price is required for {} orders",
                self.order_type
            )));
        }
        if matches!(self.order_type, OrderType::Sl | OrderType::Slm) && !has(&self.sl_trigger_price) {
            return Err(JainamError::Validation(format!(
                "sl_trigger_price is required for {} orders",
                self.order_type
            )));
        }
        if let Some(disclosed) = self.disclosed_quantity {
            if disclosed > self.quantity {
                return Err(JainamError::Validation(
                    "disclosed_quantity cannot exceed quantity".into(),
                ));
            }
        }
        if self.algo_id.as_deref().is_some_and(|a| a.chars().count() > MAX_ALGO_ID_LEN) {
            return Err(JainamError::Validation(format!(
                "algo_id should not exceed {MAX_ALGO_ID_LEN} characters"
            )));
        }
        if self.order_tag.as_deref().is_some_and(|t| t.chars().count() > MAX_ORDER_TAG_LEN) {
            return Err(JainamError::Validation(format!(
                "order_tag should not exceed {MAX_ORDER_TAG_LEN} characters"
            )));
        }
        Ok(())
    }
}


/// Request model for modifying an open order. Unset fields are left unchanged.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModifyOrderRequest {
    pub broker_order_id: String,
    #[serde(serialize_with = "empty_if_none")]
    pub quantity: Option<u64>,
    #[serde(serialize_with = "empty_if_none")]
    pub order_type: Option<OrderType>,
    #[serde(serialize_with = "empty_if_none")]
    pub price: Option<String>,
    #[serde(serialize_with = "empty_if_none")]
    pub sl_trigger_price: Option<String>,
    #[serde(serialize_with = "empty_if_none")]
    pub validity: Option<Validity>,
    #[serde(serialize_with = "empty_if_none")]
    pub disclosed_quantity: Option<u64>,
    #[serde(serialize_with = "empty_if_none")]
    pub market_protection_percent: Option<String>,
    // the modify endpoint spells this one with an upper case SL
    #[serde(rename = "trailingSLAmount", serialize_with = "empty_if_none")]
    pub trailing_sl_amount: Option<String>,
}


impl ModifyOrderRequest {
    pub fn new(broker_order_id: impl Into<String>) -> Self {
        Self {
            broker_order_id: broker_order_id.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), JainamError> {
        validate_order_id(&self.broker_order_id)?;
        if self.quantity == Some(0) {
            return Err(JainamError::Validation("quantity should be a positive number".into()));
        }
        Ok(())
    }
}


pub(crate) fn validate_order_id(broker_order_id: &str) -> Result<(), JainamError> {
    if broker_order_id.trim().is_empty() {
        return Err(JainamError::Validation("broker_order_id cannot be empty".into()));
    }
    Ok(())
}


#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BrokerOrderIdRequest<'a> {
    pub broker_order_id: &'a str,
}


/// Request model for the margin calculator.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MarginRequest {
    pub exchange: Exchange,
    pub instrument_id: String,
    pub transaction_type: TransactionType,
    pub quantity: u64,
    pub product: Product,
    pub order_complexity: OrderComplexity,
    pub order_type: OrderType,
    #[serde(serialize_with = "empty_if_none")]
    pub price: Option<String>,
    pub validity: Validity,
    #[serde(serialize_with = "empty_if_none")]
    pub sl_trigger_price: Option<String>,
}


impl MarginRequest {
    /// Market order margin, regular complexity, day validity.
    pub fn new(
        exchange: Exchange,
        instrument_id: impl Into<String>,
        transaction_type: TransactionType,
        quantity: u64,
        product: Product,
    ) -> Self {
        Self {
            exchange,
            instrument_id: instrument_id.into(),
            transaction_type,
            quantity,
            product,
            order_complexity: OrderComplexity::Regular,
            order_type: OrderType::Market,
            price: None,
            validity: Validity::Day,
            sl_trigger_price: None,
        }
    }

    pub fn validate(&self) -> Result<(), JainamError> {
        if self.instrument_id.trim().is_empty() {
            return Err(JainamError::Validation("instrument_id cannot be empty".into()));
        }
        if self.quantity == 0 {
            return Err(JainamError::Validation("quantity should be a positive number".into()));
        }
        Ok(())
    }
}


#[derive(Deserialize, Serialize, Display, Debug, Clone)]
#[display("order {broker_order_id} at {request_time:?}")]
#[serde(rename_all = "camelCase")]


/// Acknowledgement returned by place, modify, cancel and square-off.
///
pub struct OrderAck {
    pub broker_order_id: String,
    #[serde(default)]
    pub request_time: Option<String>,
}


#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]


/// Order book entry.
///
pub struct Order {
    #[serde(default)]
    pub broker_order_id: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub instrument_id: Option<String>,
    #[serde(default)]
    pub trading_symbol: Option<String>,
    #[serde(default)]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub order_type: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default, deserialize_with = "crate::response::string_or_number")]
    pub quantity: Option<String>,
    #[serde(default, deserialize_with = "crate::response::string_or_number")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "crate::response::string_or_number")]
    pub filled_quantity: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}


#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]


/// One state transition of an order.
///
pub struct OrderHistoryEntry {
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default)]
    pub broker_order_id: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}


#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]


/// Trade book entry.
///
pub struct Trade {
    #[serde(default)]
    pub broker_order_id: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub trading_symbol: Option<String>,
    #[serde(default)]
    pub transaction_type: Option<String>,
    #[serde(default, deserialize_with = "crate::response::string_or_number")]
    pub filled_quantity: Option<String>,
    #[serde(default, deserialize_with = "crate::response::string_or_number")]
    pub average_traded_price: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}


#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]


/// Margin calculator result.
///
pub struct Margin {
    #[serde(default, deserialize_with = "crate::response::string_or_number")]
    pub total_cash_available: Option<String>,
    #[serde(default, deserialize_with = "crate::response::string_or_number")]
    pub pre_order_margin: Option<String>,
    #[serde(default, deserialize_with = "crate::response::string_or_number")]
    pub post_order_margin: Option<String>,
    #[serde(default, deserialize_with = "crate::response::string_or_number")]
    pub current_order_margin: Option<String>,
    #[serde(default, deserialize_with = "crate::response::string_or_number")]
    pub fund_short: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}
