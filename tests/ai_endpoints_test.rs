use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;
use wealthtrack::api;
use wealthtrack::config::{AiMode, Config};
use wealthtrack::datasource::MockAiEngine;
use wealthtrack::db::init_db;

struct TestApp {
    app: axum::Router,
    _temp: TempDir,
}

async fn setup_test_app(ai: MockAiEngine) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(wealthtrack::Repository::new(pool));

    let config = Config {
        port: 0,
        database_path: db_path,
        default_profile: "default".to_string(),
        ai_mode: AiMode::Mock,
        ai_api_url: String::new(),
        ai_api_key: String::new(),
        ai_model: String::new(),
    };

    let state = api::AppState::new(repo, config, Arc::new(ai));
    TestApp {
        app: api::create_router(state),
        _temp: temp_dir,
    }
}

async fn request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = axum::http::Request::builder().method(method).uri(uri);
    let req = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

const EXTRACTION_REPLY: &str = r#"{
    "trades": [
        {
            "ticker": "MARA",
            "direction": "sell",
            "assetType": "option",
            "optionType": "PUT",
            "expiry": "2026-01-16",
            "strike": 9.5,
            "quantity": 2,
            "price": 0.59,
            "time": "2025-12-23",
            "rawName": "MARA PUT 260116 9.5"
        },
        {
            "direction": "buy",
            "price": 1.0,
            "quantity": 1
        }
    ]
}"#;

#[tokio::test]
async fn test_ocr_extract_then_commit() {
    let test_app =
        setup_test_app(MockAiEngine::new().with_extraction_reply(EXTRACTION_REPLY)).await;

    let (status, body) = request(
        &test_app.app,
        "POST",
        "/v1/ocr/extract",
        Some(json!({"imageBase64": "aGVsbG8=", "mime": "image/png"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // The ticker-less entry was dropped during parsing.
    let candidates = body["candidates"].as_array().unwrap().clone();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0]["stockName"], "MARA");
    assert_eq!(candidates[0]["kind"], "Short Put");

    let (status, report) = request(
        &test_app.app,
        "POST",
        "/v1/ocr/commit",
        Some(json!({"candidates": candidates})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["imported"].as_array().unwrap().len(), 1);
    assert_eq!(report["failures"].as_array().unwrap().len(), 0);

    let (_, positions) = request(&test_app.app, "GET", "/v1/positions", None).await;
    assert_eq!(positions["lots"].as_array().unwrap().len(), 1);
    assert_eq!(positions["lots"][0]["symbol"], "MARA");
}

#[tokio::test]
async fn test_ocr_commit_partial_batch() {
    let test_app = setup_test_app(MockAiEngine::new()).await;

    let good = json!({
        "stockName": "AAPL",
        "kind": "Buy Stock",
        "openPrice": 150.0,
        "totalQuantity": 10,
        "broker": "",
        "openDate": "2026-01-02",
        "confidence": "high",
        "fingerprint": "a",
        "rawText": ""
    });
    let bad = json!({
        "stockName": "MSFT",
        "kind": "Buy Stock",
        "openPrice": 100.0,
        "totalQuantity": 0,
        "broker": "",
        "openDate": "2026-01-02",
        "confidence": "low",
        "fingerprint": "b",
        "rawText": ""
    });
    let ticker_less = json!({
        "stockName": "  ",
        "kind": "Buy Stock",
        "openPrice": 1.0,
        "totalQuantity": 1,
        "broker": "",
        "openDate": "2026-01-02",
        "confidence": "low",
        "fingerprint": "c",
        "rawText": ""
    });

    let (status, report) = request(
        &test_app.app,
        "POST",
        "/v1/ocr/commit",
        Some(json!({"candidates": [good, bad, ticker_less]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["imported"].as_array().unwrap().len(), 1);
    assert_eq!(report["failures"].as_array().unwrap().len(), 1);
    assert_eq!(report["skippedMissingTicker"], 1);

    // The good candidate landed despite its neighbors.
    let (_, positions) = request(&test_app.app, "GET", "/v1/positions", None).await;
    assert_eq!(positions["stockPortfolio"]["AAPL"]["quantity"], 10);
}

#[tokio::test]
async fn test_market_sync_merges_cache() {
    let test_app = setup_test_app(
        MockAiEngine::new().with_quote_reply("AAPL: 150.25, Vol: 1000, Time: 15:45"),
    )
    .await;

    let (status, body) = request(
        &test_app.app,
        "POST",
        "/v1/market/sync",
        Some(json!({"identifiers": ["AAPL"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prices"]["AAPL"]["price"], 150.25);
    assert_eq!(body["prices"]["AAPL"]["volume"], 1000);
}

#[tokio::test]
async fn test_market_sync_upstream_failure_is_bad_gateway() {
    let test_app = setup_test_app(MockAiEngine::new().failing("model offline")).await;

    let (status, body) = request(
        &test_app.app,
        "POST",
        "/v1/market/sync",
        Some(json!({"identifiers": ["AAPL"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("model offline"));
}

#[tokio::test]
async fn test_risk_degrades_without_analysis() {
    let test_app = setup_test_app(MockAiEngine::new().failing("model offline")).await;
    request(
        &test_app.app,
        "POST",
        "/v1/trades",
        Some(json!({
            "kind": "Short Put",
            "symbol": "MARA",
            "openDate": "2025-12-23",
            "openPrice": 0.59,
            "totalQuantity": 2,
            "expiryDate": "2026-01-16",
            "strikePrice": 9.5
        })),
    )
    .await;

    let (status, body) = request(&test_app.app, "GET", "/v1/risk", None).await;
    assert_eq!(status, StatusCode::OK);
    // Exposure is computed locally even when the collaborator is down.
    assert_eq!(body["exposure"]["byTicker"]["MARA"]["optionNominal"], 1900.0);
    assert!(body.get("analysis").is_none());
}

#[tokio::test]
async fn test_risk_includes_analysis_when_available() {
    let test_app =
        setup_test_app(MockAiEngine::new().with_analysis_reply("Concentrated in MARA puts."))
            .await;

    let (status, body) = request(&test_app.app, "GET", "/v1/risk", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"], "Concentrated in MARA puts.");
}
