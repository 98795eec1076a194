//! Contract master endpoints.
//!
//! These downloads are public and carry no bearer token.

use tracing::info;

use crate::client::JainamClient;
use crate::contract_master::models::{
    filter_contracts, find_token, parse_contract_master, Contract, ContractExchange, SymbolQuery,
};
use crate::errors::JainamError;
use crate::helpers::{build_url, download};


const CONTRACT_MASTER: &str = "contract/json/{}";


impl JainamClient {

    /// Contract master for one segment.
    ///
    /// **Endpoint:** `GET contract/json/{exchange}`
    pub async fn contract_master(
        &self,
        exchange: ContractExchange,
    ) -> Result<Vec<Contract>, JainamError> {
        let path = CONTRACT_MASTER.replace("{}", &exchange.to_string());
        let url = build_url(&self.base_url, &path);
        let body = download(&self.http_client, &url).await?;
        let contracts = parse_contract_master(&body)?;
        info!(%exchange, count = contracts.len(), "contract master loaded");
        Ok(contracts)
    }


    /// Download the segment and filter it in memory.
    pub async fn search_symbol(
        &self,
        exchange: ContractExchange,
        query: &SymbolQuery,
    ) -> Result<Vec<Contract>, JainamError> {
        let contracts = self.contract_master(exchange).await?;
        Ok(filter_contracts(&contracts, query))
    }


    /// Token for an exact symbol, `None` when the segment has no such symbol.
    pub async fn instrument_token(
        &self,
        exchange: ContractExchange,
        symbol: &str,
    ) -> Result<Option<String>, JainamError> {
        let contracts = self.contract_master(exchange).await?;
        Ok(find_token(&contracts, symbol))
    }
}
