//! Contract master models.
//!
//! The contract master is a JSON array of instruments, refreshed daily by the
//! vendor and served either as is or as a zip holding one JSON file. Only the
//! columns used for lookups are named here.

use std::collections::HashMap;
use std::io::Cursor;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::JainamError;


/// Segment file of the contract master. The display form is the path segment.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractExchange {
    #[display("nse")]
    Nse,
    #[display("nfo")]
    Nfo,
    #[display("bse")]
    Bse,
    #[display("bfo")]
    Bfo,
    #[display("mcx")]
    Mcx,
    #[display("cds")]
    Cds,
    #[display("bcd")]
    Bcd,
    #[display("indices")]
    Indices,
}


impl ContractExchange {
    pub const ALL: [ContractExchange; 8] = [
        ContractExchange::Nse,
        ContractExchange::Nfo,
        ContractExchange::Bse,
        ContractExchange::Bfo,
        ContractExchange::Mcx,
        ContractExchange::Cds,
        ContractExchange::Bcd,
        ContractExchange::Indices,
    ];
}


impl std::str::FromStr for ContractExchange {
    type Err = JainamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ContractExchange::ALL
            .into_iter()
            .find(|ex| ex.to_string() == lower)
            .ok_or_else(|| {
                JainamError::Validation(format!(
                    "invalid exchange: {s}, expected one of nse, nfo, bse, bfo, mcx, cds, bcd, indices"
                ))
            })
    }
}


#[derive(Deserialize, Serialize, Display, Debug, Clone, Default)]
#[display("{symbol:?}")]
#[serde(rename_all = "camelCase")]


/// One instrument row.
///
/// Some segment files name the token column `instrumentId`; use [`Contract::token`].
pub struct Contract {
    #[serde(default, rename = "token", deserialize_with = "crate::response::string_or_number")]
    pub raw_token: Option<String>,
    #[serde(default, deserialize_with = "crate::response::string_or_number")]
    pub instrument_id: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub trading_symbol: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default, deserialize_with = "crate::response::string_or_number")]
    pub expiry: Option<String>,
    #[serde(default)]
    pub option_type: Option<String>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub strike_price: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub lot_size: Option<f64>,
    #[serde(default, deserialize_with = "crate::response::lenient_f64")]
    pub tick_size: Option<f64>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}


impl Contract {
    /// `token`, falling back to `instrumentId`.
    pub fn token(&self) -> Option<&str> {
        self.raw_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.instrument_id.as_deref())
    }
}


/// Filter for [`search_symbol`](crate::JainamClient::search_symbol).
///
/// `symbol` and `expiry` match as case-insensitive substrings, `option_type`
/// (CE/PE) case-insensitively in full, and `strike_price` exactly.
#[derive(Debug, Clone, Default)]
pub struct SymbolQuery {
    pub symbol: String,
    pub expiry: Option<String>,
    pub option_type: Option<String>,
    pub strike_price: Option<f64>,
}


impl SymbolQuery {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    pub fn expiry(mut self, expiry: impl Into<String>) -> Self {
        self.expiry = Some(expiry.into());
        self
    }

    pub fn option_type(mut self, option_type: impl Into<String>) -> Self {
        self.option_type = Some(option_type.into());
        self
    }

    pub fn strike_price(mut self, strike_price: f64) -> Self {
        self.strike_price = Some(strike_price);
        self
    }

    pub fn matches(&self, contract: &Contract) -> bool {
        let needle = self.symbol.to_lowercase();
        let symbol_ok = contract
            .symbol
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains(&needle));
        if !symbol_ok {
            return false;
        }
        if let Some(expiry) = &self.expiry {
            let expiry = expiry.to_lowercase();
            if !contract
                .expiry
                .as_deref()
                .is_some_and(|e| e.to_lowercase().contains(&expiry))
            {
                return false;
            }
        }
        if let Some(option_type) = &self.option_type {
            if !contract
                .option_type
                .as_deref()
                .is_some_and(|o| o.eq_ignore_ascii_case(option_type))
            {
                return false;
            }
        }
        if let Some(strike) = self.strike_price {
            if contract.strike_price != Some(strike) {
                return false;
            }
        }
        true
    }
}


const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";


/// Decode a downloaded contract master, unpacking the first archive entry when the
/// body is a zip.
pub fn parse_contract_master(body: &[u8]) -> Result<Vec<Contract>, JainamError> {
    if !body.starts_with(ZIP_SIGNATURE) {
        return Ok(serde_json::from_slice(body)?);
    }
    let mut archive = zip::ZipArchive::new(Cursor::new(body))
        .map_err(|e| JainamError::Other(format!("invalid contract master archive: {e}")))?;
    let entry = archive
        .by_index(0)
        .map_err(|e| JainamError::Other(format!("empty contract master archive: {e}")))?;
    Ok(serde_json::from_reader(entry)?)
}


/// Contracts matching `query`, in file order.
pub fn filter_contracts(contracts: &[Contract], query: &SymbolQuery) -> Vec<Contract> {
    contracts
        .iter()
        .filter(|c| query.matches(c))
        .cloned()
        .collect()
}


/// Token of the first contract whose symbol equals `symbol` exactly.
pub fn find_token(contracts: &[Contract], symbol: &str) -> Option<String> {
    contracts
        .iter()
        .find(|c| c.symbol.as_deref() == Some(symbol))
        .and_then(|c| c.token().map(str::to_string))
}
