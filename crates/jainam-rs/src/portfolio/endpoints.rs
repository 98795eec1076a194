//! Portfolio module endpoints.
//!
//! This module implements API endpoints for portfolio and account operations.

use crate::client::JainamClient;
use crate::errors::JainamError;
use crate::helpers::decode_result;
use crate::orders::models::OrderAck;
use crate::portfolio::models::{
    Holding, HoldingsProduct, Limits, Position, Profile, SquareOffRequest,
};


const HOLDINGS: &str = "omt/api-order-rest/v1/holdings/{}";
const POSITIONS: &str = "omt/api-order-rest/v1/positions";
const SQUARE_OFF: &str = "omt/api-order-rest/v1/orders/positions/sqroff";
const LIMITS: &str = "omt/api-order-rest/v1/limits/";
const PROFILE: &str = "omt/api-order-rest/v1/profile/";


impl JainamClient {

    /// Positions.
    ///
    /// **Endpoint:** `GET omt/api-order-rest/v1/positions`
    pub async fn positions(&self) -> Result<Vec<Position>, JainamError> {
        let resp = self.authenticated_get(POSITIONS).await?;
        decode_result(resp)
    }


    /// Square Off. Each request is an opposite-direction order closing a position.
    ///
    /// **Endpoint:** `POST omt/api-order-rest/v1/orders/positions/sqroff`
    pub async fn square_off(
        &self,
        positions: &[SquareOffRequest],
    ) -> Result<Vec<OrderAck>, JainamError> {
        if positions.is_empty() {
            return Err(JainamError::Validation("no positions to square off".into()));
        }
        for p in positions {
            p.validate()?;
        }
        let resp = self.authenticated_post(SQUARE_OFF, positions).await?;
        decode_result(resp)
    }


    /// Holdings.
    ///
    /// **Endpoint:** `GET omt/api-order-rest/v1/holdings/{cnc|mtf|mis}`
    pub async fn holdings(&self, product: HoldingsProduct) -> Result<Vec<Holding>, JainamError> {
        let url = HOLDINGS.replace("{}", &product.to_string());
        let resp = self.authenticated_get(&url).await?;
        decode_result(resp)
    }


    /// Limits (funds).
    ///
    /// **Endpoint:** `GET omt/api-order-rest/v1/limits/`
    pub async fn limits(&self) -> Result<Vec<Limits>, JainamError> {
        let resp = self.authenticated_get(LIMITS).await?;
        decode_result(resp)
    }


    /// Profile.
    ///
    /// **Endpoint:** `GET omt/api-order-rest/v1/profile/`
    pub async fn profile(&self) -> Result<Vec<Profile>, JainamError> {
        let resp = self.authenticated_get(PROFILE).await?;
        decode_result(resp)
    }
}
