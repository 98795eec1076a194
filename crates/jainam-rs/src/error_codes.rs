//! Vendor error codes.
//!
//! The API reports failures as `{"status": "Not_Ok", "errorCode": "EC9xx", ...}`.
//! When the body carries no human readable message the text below is used instead.

/// Session expired. Treated as an authentication failure.
pub const SESSION_EXPIRED: &str = "EC087";


/// Human readable text for a vendor error code.
pub fn describe_error_code(code: &str) -> &'static str {
    match code {
        "EC003" => "An error occurred. Please try again later.",
        "EC082" => "Invalid parameter: 'deviceId' cannot be empty or null.",
        "EC086" => "You are a read-only user and are not allowed to place, modify, or cancel orders.",
        "EC087" => "Session Expired",
        "EC088" => "Single order slicing limit exceeded",
        "EC089" => "'disclosedQuantity' cannot be same as the total order 'quantity'.",
        "EC090" => "'exchange' should be one of the following values: { 'NSE', 'BSE', 'MCX', 'NFO', 'BFO'}.",
        "EC091" => "'orderComplexity' should be one of the following values: {'REGULAR', 'AMO'}.",
        "EC092" => "'product' should be one of the following values: {'INTRADAY', 'LONGTERM', 'MTF'}.",
        "EC900" => "'exchange' cannot be empty or null.",
        "EC902" => "'tradingSymbol' cannot be empty or null.",
        "EC903" => "'quantity' cannot be empty or null.",
        "EC904" => "'quantity' should be a positive number.",
        "EC906" => "'product' cannot be empty or null.",
        "EC907" => "'transactionType' cannot be empty or null.",
        "EC908" => "'token' cannot be empty or null.",
        "EC910" => "'price' cannot be empty or null.",
        "EC911" => "'triggerPrice' cannot be empty or null.",
        "EC912" => "Failed to place the order.",
        "EC913" => "Failed to retrieve user details.",
        "EC915" => "Failed to retrieve the order book.",
        "EC916" => "No orders found for this user.",
        "EC917" => "Failed to retrieve order history.",
        "EC918" => "No order history found for the given order ID.",
        "EC919" => "Failed to retrieve the position book.",
        "EC920" => "No positions found for this user.",
        "EC921" => "Failed to retrieve holdings.",
        "EC922" => "No holdings found for this user.",
        "EC923" => "Failed to retrieve profile details.",
        "EC924" => "Failed to retrieve RMS limits.",
        "EC925" => "'nestOrderNo' cannot be empty or null.",
        "EC926" => "No trades found for this user.",
        "EC927" => "Failed to retrieve the trade book.",
        "EC929" => "'transactionType' should be one of the following values: {'BUY', 'SELL'}.",
        "EC930" => "'orderType' should be one of the following values: {'LIMIT', 'MARKET', 'SL', 'SLM'}.",
        "EC932" => "'validity' should be one of the following values: {'DAY', 'IOC'}.",
        "EC935" => "Failed to retrieve the single order margin.",
        "EC937" => "Failed to cancel all orders.",
        "EC938" => "No open orders to cancel from the order book.",
        "EC941" => "'instrumentId' cannot be empty or null.",
        "EC945" => "'brokerOrderId' cannot be empty or null.",
        "EC946" => "Invalid 'instrumentId'. It must contain only numeric characters.",
        "EC947" => "'instrumentId' does not exist.",
        "EC948" => "'quantity' cannot exceed 50,000,000.",
        "EC954" | "EC990" => "'quantity' should be a multiple of the lot size.",
        "EC957" => "Invalid 'price'.",
        "EC958" => "'price' cannot be zero or negative.",
        "EC971" => "'orderTag' should not exceed 50 characters.",
        "EC972" => "'algoId' should not exceed 12 characters.",
        "EC973" => "For a buy order, 'slTriggerPrice' should be less than the 'price'.",
        "EC974" => "For a sell order, 'slTriggerPrice' should be greater than the 'price'.",
        "EC979" | "EC815" => "Invalid 'brokerOrderId'.",
        "EC992" => "Unable to modify the given order. 'brokerOrderId' is invalid.",
        "EC993" => "Provided 'brokerOrderId' is not in a valid state to modify the order.",
        "EC994" => "The given 'brokerOrderId' is not in your order book.",
        "EC997" => "The specified order is not available in the order book and cannot be canceled.",
        "EC998" => "The specified order is not available in the order book, and order history cannot be retrieved.",
        "EC999" => "The specified order is not available in the order book and cannot be modified.",
        "EC868" => "Position not found for the specified instrument.",
        "EC873" => "Failed to convert positions.",
        _ => "Unknown error",
    }
}
