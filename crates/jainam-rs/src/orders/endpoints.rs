//! Orders module endpoints.
//!
//! This module implements API endpoints for order management.

use tracing::info;

use crate::client::JainamClient;
use crate::errors::JainamError;
use crate::helpers::decode_result;
use crate::orders::models::{
    validate_order_id, BrokerOrderIdRequest, Exchange, Margin, MarginRequest,
    ModifyOrderRequest, Order, OrderAck, OrderHistoryEntry, PlaceOrderRequest, Product,
    Trade, TransactionType,
};


const PLACE_ORDER: &str = "omt/api-order-rest/v1/orders/placeorder";
const ORDER_BOOK: &str = "omt/api-order-rest/v1/orders/book";
const ORDER_HISTORY: &str = "omt/api-order-rest/v1/orders/history";
const MODIFY_ORDER: &str = "omt/api-order-rest/v1/orders/modify";
const CANCEL_ORDER: &str = "omt/api-order-rest/v1/orders/cancel";
const TRADE_BOOK: &str = "omt/api-order-rest/v1/orders/trades";
const CHECK_MARGIN: &str = "omt/od-rest-api/v1/orders/checkMargin";


impl JainamClient {

    /// Place Order.
    ///
    /// **Endpoint:** `POST omt/api-order-rest/v1/orders/placeorder`
    ///
    /// The endpoint takes an array; a single order is sent as a one element batch.
    pub async fn place_order(
        &self,
        order: &PlaceOrderRequest,
    ) -> Result<Vec<OrderAck>, JainamError> {
        self.place_orders(std::slice::from_ref(order)).await
    }


    /// Place several orders in one request.
    ///
    /// **Endpoint:** `POST omt/api-order-rest/v1/orders/placeorder`
    pub async fn place_orders(
        &self,
        orders: &[PlaceOrderRequest],
    ) -> Result<Vec<OrderAck>, JainamError> {
        if orders.is_empty() {
            return Err(JainamError::Validation("no orders to place".into()));
        }
        for order in orders {
            order.validate()?;
        }
        let resp = self.authenticated_post(PLACE_ORDER, orders).await?;
        let acks: Vec<OrderAck> = decode_result(resp)?;
        for ack in &acks {
            info!(broker_order_id = %ack.broker_order_id, "order placed");
        }
        Ok(acks)
    }


    pub async fn place_market_order(
        &self,
        exchange: Exchange,
        instrument_id: &str,
        transaction_type: TransactionType,
        quantity: u64,
        product: Product,
    ) -> Result<Vec<OrderAck>, JainamError> {
        let order = PlaceOrderRequest::new(exchange, instrument_id, transaction_type, quantity)
            .product(product)
            .market();
        self.place_order(&order).await
    }


    pub async fn place_limit_order(
        &self,
        exchange: Exchange,
        instrument_id: &str,
        transaction_type: TransactionType,
        quantity: u64,
        price: &str,
        product: Product,
    ) -> Result<Vec<OrderAck>, JainamError> {
        let order = PlaceOrderRequest::new(exchange, instrument_id, transaction_type, quantity)
            .product(product)
            .limit(price);
        self.place_order(&order).await
    }


    /// Stop loss limit order.
    pub async fn place_sl_order(
        &self,
        exchange: Exchange,
        instrument_id: &str,
        transaction_type: TransactionType,
        quantity: u64,
        price: &str,
        trigger_price: &str,
        product: Product,
    ) -> Result<Vec<OrderAck>, JainamError> {
        let order = PlaceOrderRequest::new(exchange, instrument_id, transaction_type, quantity)
            .product(product)
            .stop_loss(price, trigger_price);
        self.place_order(&order).await
    }


    /// Modify Order.
    ///
    /// **Endpoint:** `POST omt/api-order-rest/v1/orders/modify`
    pub async fn modify_order(
        &self,
        body: &ModifyOrderRequest,
    ) -> Result<Vec<OrderAck>, JainamError> {
        body.validate()?;
        let resp = self.authenticated_post(MODIFY_ORDER, body).await?;
        decode_result(resp)
    }


    pub async fn modify_price(
        &self,
        broker_order_id: &str,
        price: &str,
    ) -> Result<Vec<OrderAck>, JainamError> {
        let mut body = ModifyOrderRequest::new(broker_order_id);
        body.price = Some(price.to_string());
        self.modify_order(&body).await
    }


    pub async fn modify_quantity(
        &self,
        broker_order_id: &str,
        quantity: u64,
    ) -> Result<Vec<OrderAck>, JainamError> {
        let mut body = ModifyOrderRequest::new(broker_order_id);
        body.quantity = Some(quantity);
        self.modify_order(&body).await
    }


    /// Cancel Order.
    ///
    /// **Endpoint:** `POST omt/api-order-rest/v1/orders/cancel`
    pub async fn cancel_order(
        &self,
        broker_order_id: &str,
    ) -> Result<Vec<OrderAck>, JainamError> {
        validate_order_id(broker_order_id)?;
        let body = BrokerOrderIdRequest { broker_order_id };
        let resp = self.authenticated_post(CANCEL_ORDER, &body).await?;
        info!(broker_order_id, "order cancel requested");
        decode_result(resp)
    }


    /// Order Report (order book).
    ///
    /// **Endpoint:** `GET omt/api-order-rest/v1/orders/book`
    pub async fn order_report(&self) -> Result<Vec<Order>, JainamError> {
        let resp = self.authenticated_get(ORDER_BOOK).await?;
        decode_result(resp)
    }


    /// Order History. Newest state first, as returned by the vendor.
    ///
    /// **Endpoint:** `POST omt/api-order-rest/v1/orders/history`
    pub async fn order_history(
        &self,
        broker_order_id: &str,
    ) -> Result<Vec<OrderHistoryEntry>, JainamError> {
        validate_order_id(broker_order_id)?;
        let body = BrokerOrderIdRequest { broker_order_id };
        let resp = self.authenticated_post(ORDER_HISTORY, &body).await?;
        decode_result(resp)
    }


    /// Trade Report (trade book).
    ///
    /// **Endpoint:** `GET omt/api-order-rest/v1/orders/trades`
    pub async fn trade_report(&self) -> Result<Vec<Trade>, JainamError> {
        let resp = self.authenticated_get(TRADE_BOOK).await?;
        decode_result(resp)
    }


    /// Margin Required.
    ///
    /// **Endpoint:** `POST omt/od-rest-api/v1/orders/checkMargin`
    pub async fn margin_required(
        &self,
        body: &MarginRequest,
    ) -> Result<Vec<Margin>, JainamError> {
        body.validate()?;
        let resp = self.authenticated_post(CHECK_MARGIN, body).await?;
        decode_result(resp)
    }
}
