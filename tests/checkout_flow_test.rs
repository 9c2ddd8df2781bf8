use httpmock::prelude::*;
use shipquote::{
    Address, LeadTimeStatus, Level, PartialResolution, ResolutionOutcome, ResolutionState,
    ServiceConfig,
};
use std::time::Duration;

fn config_for(server: &MockServer, lead_time_timeout: u64) -> ServiceConfig {
    let content = format!(
        r#"
[taxonomy]
endpoint = "{}"
token = "test-token"
timeout_seconds = 2

[lead_time]
endpoint = "{}"
token = "test-token"
timeout_seconds = {}
service_id = 53320
max_in_flight = 4

[origin]
district_code = "1442"
ward_code = "20109"
"#,
        server.url("/master-data"),
        server.url("/leadtime"),
        lead_time_timeout
    );
    ServiceConfig::from_toml_str(&content).unwrap()
}

fn mock_taxonomy(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/master-data/provinces");
        then.status(200).json_body(serde_json::json!([
            {"code": 1, "name": "Hà Nội"},
            {"code": 74, "name": "Bình Dương"}
        ]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/master-data/districts")
            .query_param("provinceCode", "74");
        then.status(200).json_body(serde_json::json!([
            {"code": 1538, "name": "Thị xã Dĩ An"},
            {"code": 1540, "name": "Thành phố Thủ Dầu Một"}
        ]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/master-data/wards")
            .query_param("districtCode", "1538");
        then.status(200).json_body(serde_json::json!([
            {"code": "440504", "name": "Phường Tân Đông Hiệp"},
            {"code": "440505", "name": "Phường Đông Hòa"}
        ]));
    });
}

fn di_an(id: &str) -> Address {
    Address::new(id, "tinh binh duong", "Thị xã Dĩ An", "Phường Tân Đông Hiệp")
        .with_street_line("Số 1 Trần Hưng Đạo")
}

#[tokio::test]
async fn test_checkout_quote_over_http() {
    let server = MockServer::start();
    mock_taxonomy(&server);
    let lead_time_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/leadtime")
            .header("Token", "test-token")
            .json_body_partial(r#"{"fromDistrictCode": "1442", "toDistrictCode": "1538", "toWardCode": "440504"}"#);
        then.status(200).json_body(serde_json::json!({
            "leadtimeSeconds": 172800,
            "etaFrom": "2024-06-03T00:00:00Z",
            "etaTo": "2024-06-05T00:00:00Z"
        }));
    });

    let config = config_for(&server, 2);
    let orchestrator = config.build_orchestrator().unwrap();

    let result = orchestrator.resolve(&di_an("home")).await.unwrap();

    lead_time_mock.assert();
    assert_eq!(result.state, ResolutionState::Resolved);
    match &result.resolution {
        ResolutionOutcome::Resolved(triple) => {
            assert_eq!(triple.province_code, "74");
            assert_eq!(triple.district_code, "1538");
            assert_eq!(triple.ward_code, "440504");
            assert_eq!(triple.canonical_province_name, "Bình Dương");
        }
        other => panic!("expected full resolution, got {:?}", other),
    }
    assert_eq!(result.quote.fee.fee_minor_units, 20000);
    assert_eq!(
        result.quote.lead_time.window().map(|w| w.leadtime_seconds),
        Some(172800)
    );
}

#[tokio::test]
async fn test_lead_time_timeout_still_quotes_fee() {
    let server = MockServer::start();
    mock_taxonomy(&server);
    server.mock(|when, then| {
        when.method(POST).path("/leadtime");
        then.status(200)
            .delay(Duration::from_secs(3))
            .json_body(serde_json::json!({}));
    });

    let config = config_for(&server, 1);
    let orchestrator = config.build_orchestrator().unwrap();

    let result = orchestrator.resolve(&di_an("home")).await.unwrap();

    assert_eq!(result.state, ResolutionState::PartiallyResolved);
    assert_eq!(result.quote.fee.fee_minor_units, 20000);
    assert!(matches!(
        result.quote.lead_time,
        LeadTimeStatus::Unavailable { .. }
    ));
    assert!(!result.blocks_checkout());
}

#[tokio::test]
async fn test_renamed_ward_is_partial_and_skips_lead_time() {
    let server = MockServer::start();
    mock_taxonomy(&server);
    let lead_time_mock = server.mock(|when, then| {
        when.method(POST).path("/leadtime");
        then.status(500);
    });

    let config = config_for(&server, 2);
    let orchestrator = config.build_orchestrator().unwrap();
    let address = Address::new("old", "Bình Dương", "Thị xã Dĩ An", "Xã An Bình");

    let result = orchestrator.resolve(&address).await.unwrap();

    lead_time_mock.assert_hits(0);
    assert_eq!(
        result.resolution,
        ResolutionOutcome::Partial(PartialResolution {
            failed_level: Level::Ward,
            province_code: Some("74".to_string()),
            district_code: Some("1538".to_string()),
            canonical_province_name: Some("Bình Dương".to_string()),
        })
    );
    assert_eq!(result.quote.fee.fee_minor_units, 20000);
    assert_eq!(result.quote.lead_time, LeadTimeStatus::NotRequested);
}

#[tokio::test]
async fn test_saved_address_list_fetches_each_level_once() {
    let server = MockServer::start();
    let provinces = server.mock(|when, then| {
        when.method(GET).path("/master-data/provinces");
        then.status(200).json_body(serde_json::json!([
            {"code": 74, "name": "Bình Dương"}
        ]));
    });
    let districts = server.mock(|when, then| {
        when.method(GET).path("/master-data/districts");
        then.status(200).json_body(serde_json::json!([
            {"code": 1538, "name": "Thị xã Dĩ An"}
        ]));
    });
    let wards = server.mock(|when, then| {
        when.method(GET).path("/master-data/wards");
        then.status(200).json_body(serde_json::json!([
            {"code": "440504", "name": "Phường Tân Đông Hiệp"}
        ]));
    });
    server.mock(|when, then| {
        when.method(POST).path("/leadtime");
        then.status(200).json_body(serde_json::json!({
            "leadtimeSeconds": 86400,
            "etaFrom": "2024-06-03T00:00:00Z",
            "etaTo": "2024-06-04T00:00:00Z"
        }));
    });

    let config = config_for(&server, 2);
    let orchestrator = config.build_orchestrator().unwrap();

    // Sequential first pass fills the cache; the list view then re-resolves
    // every saved address concurrently.
    orchestrator.resolve(&di_an("a0")).await.unwrap();
    let addresses: Vec<Address> = (1..=6).map(|i| di_an(&format!("a{}", i))).collect();
    let results = orchestrator.resolve_all(&addresses).await;

    assert!(results
        .iter()
        .all(|r| r.as_ref().map(|r| r.state) == Some(ResolutionState::Resolved)));
    provinces.assert_hits(1);
    districts.assert_hits(1);
    wards.assert_hits(1);
}
