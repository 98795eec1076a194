use jainam_rs::contract_master::models::{ContractExchange, SymbolQuery};
use jainam_rs::JainamError;
use serde_json::json;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::common::MockApi;

fn nfo_master() -> String {
    json!([
        {"token": "54957", "symbol": "NIFTY", "expiry": "27-NOV-2025", "optionType": "CE", "strikePrice": "24000"},
        {"token": "54958", "symbol": "NIFTY", "expiry": "27-NOV-2025", "optionType": "PE", "strikePrice": "24000"},
        {"token": "60001", "symbol": "BANKNIFTY", "expiry": "25-NOV-2025", "optionType": "CE", "strikePrice": "52000"}
    ])
    .to_string()
}

#[tokio::test]
async fn test_contract_master_is_public_download() {
    let api = MockApi::fixed(200, &nfo_master()).await;
    let contracts = api.client().contract_master(ContractExchange::Nfo).await.unwrap();
    assert_eq!(contracts.len(), 3);
    assert_eq!(contracts[2].token(), Some("60001"));

    let request = &api.requests()[0];
    assert_eq!(request.method, "GET");
    assert_eq!(request.path, "/contract/json/nfo");
    assert_eq!(request.authorization, None);
}

fn zipped(name: &str, body: &str, method: CompressionMethod) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(name, SimpleFileOptions::default().compression_method(method))
        .unwrap();
    writer.write_all(body.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn test_zipped_master_is_unpacked() {
    for method in [CompressionMethod::Stored, CompressionMethod::Deflated] {
        let api = MockApi::fixed_bytes(200, zipped("NFO.json", &nfo_master(), method)).await;
        let client = api.client();
        let contracts = client.contract_master(ContractExchange::Nfo).await.unwrap();
        assert_eq!(contracts.len(), 3);
        assert_eq!(contracts[0].token(), Some("54957"));
        assert_eq!(
            client.instrument_token(ContractExchange::Nfo, "BANKNIFTY").await.unwrap().as_deref(),
            Some("60001")
        );
    }
}

#[tokio::test]
async fn test_plain_json_master_bytes() {
    let api = MockApi::fixed_bytes(200, nfo_master().into_bytes()).await;
    let contracts = api.client().contract_master(ContractExchange::Nfo).await.unwrap();
    assert_eq!(contracts[1].token(), Some("54958"));
}

#[tokio::test]
async fn test_corrupt_archive_is_error() {
    let api = MockApi::fixed_bytes(200, b"PK\x03\x04not really a zip".to_vec()).await;
    let err = api.client().contract_master(ContractExchange::Nfo).await.unwrap_err();
    assert!(matches!(err, JainamError::Other(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_search_symbol() {
    let api = MockApi::fixed(200, &nfo_master()).await;
    let client = api.client();
    let all_nifty = client
        .search_symbol(ContractExchange::Nfo, &SymbolQuery::new("nifty"))
        .await
        .unwrap();
    assert_eq!(all_nifty.len(), 3);

    let query = SymbolQuery::new("NIFTY").option_type("pe").strike_price(24000.0);
    let hits = client.search_symbol(ContractExchange::Nfo, &query).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].token(), Some("54958"));
}

#[tokio::test]
async fn test_instrument_token() {
    let api = MockApi::fixed(200, &nfo_master()).await;
    let client = api.client();
    assert_eq!(
        client.instrument_token(ContractExchange::Nfo, "BANKNIFTY").await.unwrap().as_deref(),
        Some("60001")
    );
    assert_eq!(client.instrument_token(ContractExchange::Nfo, "FINNIFTY").await.unwrap(), None);
}

#[tokio::test]
async fn test_missing_master_is_vendor_error() {
    let api = MockApi::fixed(404, "not found").await;
    let err = api.client().contract_master(ContractExchange::Cds).await.unwrap_err();
    assert!(matches!(err, JainamError::Vendor { status: Some(404), .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_non_json_master_is_parse_error() {
    let api = MockApi::fixed(200, "<html>maintenance</html>").await;
    let err = api.client().contract_master(ContractExchange::Nse).await.unwrap_err();
    assert!(matches!(err, JainamError::ParseError(_)));
}
