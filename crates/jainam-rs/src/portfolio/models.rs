//! Portfolio module models.
//!
//! This module contains data structures for positions, holdings and account data.
//! Response models name the fields callers usually read and keep everything else in
//! `extra`.

use std::collections::HashMap;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::JainamError;
use crate::orders::models::{
    Exchange, OrderComplexity, OrderType, Product, TransactionType, Validity,
};


/// Holdings product filter, used in the endpoint path.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoldingsProduct {
    /// LONGTERM holdings.
    #[default]
    #[display("cnc")]
    Cnc,
    #[display("mtf")]
    Mtf,
    /// INTRADAY, usually empty since those are squared off.
    #[display("mis")]
    Mis,
}


#[derive(Deserialize, Serialize, Display, Debug, Clone)]
#[display("{trading_symbol:?} net {net_quantity:?} @ {net_average_price:?}")]
#[serde(rename_all = "camelCase")]


/// Open position (day and carry forward).
///
pub struct Position {
    #[serde(default)]
    pub instrument_id: Option<String>,
    #[serde(default)]
    pub trading_symbol: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub net_quantity: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub net_average_price: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub buy_quantity: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub sell_quantity: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub realized_pnl: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub previous_day_close: Option<f64>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}


impl Position {
    /// The order that would close this position at market, if it is open.
    pub fn square_off_request(&self, exchange: Exchange) -> Option<SquareOffRequest> {
        let net = self.net_quantity?;
        if net == 0.0 {
            return None;
        }
        let instrument_id = self.instrument_id.clone()?;
        let transaction_type = if net > 0.0 {
            TransactionType::Sell
        } else {
            TransactionType::Buy
        };
        let product = match self.product.as_deref().map(str::to_ascii_uppercase).as_deref() {
            Some("INTRADAY") => Product::Intraday,
            Some("MTF") => Product::Mtf,
            _ => Product::Longterm,
        };
        Some(SquareOffRequest::market(
            exchange,
            instrument_id,
            transaction_type,
            net.abs() as u64,
            product,
        ))
    }
}


/// One opposite-direction order in a square-off batch.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SquareOffRequest {
    pub exchange: Exchange,
    pub instrument_id: String,
    pub transaction_type: TransactionType,
    pub quantity: u64,
    pub product: Product,
    pub order_complexity: OrderComplexity,
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    pub validity: Validity,
}


impl SquareOffRequest {
    pub fn market(
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


#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]


/// Demat holding.
///
pub struct Holding {
    #[serde(default)]
    pub isin: Option<String>,
    #[serde(default)]
    pub nse_instrument_id: Option<String>,
    #[serde(default)]
    pub bse_instrument_id: Option<String>,
    #[serde(default)]
    pub nse_trading_symbol: Option<String>,
    #[serde(default)]
    pub bse_trading_symbol: Option<String>,
    #[serde(default)]
    pub formatted_instrument_name: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub average_traded_price: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub total_quantity: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub dp_quantity: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub t1_quantity: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub collateral_quantity: Option<f64>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}


#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]


/// Funds and RMS limits.
///
pub struct Limits {
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub trading_limit: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub opening_cash_limit: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub intraday_payin: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub collateral_margin: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub credit_for_sell: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub adhoc_margin: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub utilized_margin: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub blocked_for_payout: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub utilized_span_margin: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub utilized_exposure_margin: Option<f64>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}


#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]


/// User profile.
///
pub struct Profile {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub email_id: Option<String>,
    #[serde(default)]
    pub exchanges: Option<Value>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}
