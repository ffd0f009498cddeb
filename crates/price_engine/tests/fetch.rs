use std::time::Duration;

use price_core::{FetchFailure, RequestKey};
use price_engine::{CancellationToken, FetchSettings, PriceFetcher, ReqwestFetcher, API_KEY_HEADER};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher_for(server: &MockServer, settings: FetchSettings) -> ReqwestFetcher {
    ReqwestFetcher::new(FetchSettings {
        base_url: format!("{}/v1/exchangerate", server.uri()),
        ..settings
    })
    .expect("client")
}

#[tokio::test]
async fn fetcher_returns_payload_unchanged() {
    let server = MockServer::start().await;
    let body = json!({
        "asset_id_base": "BTC",
        "asset_id_quote": "USD",
        "rate": 50000,
    });
    Mock::given(method("GET"))
        .and(path("/v1/exchangerate/BTC/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, FetchSettings::default());
    let payload = fetcher
        .fetch(&RequestKey::new("btc"), &CancellationToken::new())
        .await
        .expect("fetch ok");
    assert_eq!(payload, body);
}

#[tokio::test]
async fn fetcher_sends_api_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/exchangerate/ETH/EUR"))
        .and(header(API_KEY_HEADER, "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "rate": 3000 })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(
        &server,
        FetchSettings {
            api_key: Some("secret".to_string()),
            quote: "EUR".to_string(),
            ..FetchSettings::default()
        },
    );
    let payload = fetcher
        .fetch(&RequestKey::new("ETH"), &CancellationToken::new())
        .await
        .expect("fetch ok");
    assert_eq!(payload["rate"], 3000);
}

#[tokio::test]
async fn fetcher_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/exchangerate/NOPE/USD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, FetchSettings::default());
    let err = fetcher
        .fetch(&RequestKey::new("NOPE"), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err, FetchFailure::Status(404));
    assert_eq!(err.message(), "HTTP 404");
}

#[tokio::test]
async fn fetcher_reports_unparseable_body_as_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/exchangerate/BTC/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, FetchSettings::default());
    let err = fetcher
        .fetch(&RequestKey::new("BTC"), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchFailure::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/exchangerate/BTC/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"rate\": 123456789}"))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(
        &server,
        FetchSettings {
            max_bytes: 8,
            ..FetchSettings::default()
        },
    );
    let err = fetcher
        .fetch(&RequestKey::new("BTC"), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        FetchFailure::Decode("response larger than 8 bytes".to_string())
    );
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/exchangerate/BTC/USD"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({ "rate": 1 })),
        )
        .mount(&server)
        .await;

    let fetcher = fetcher_for(
        &server,
        FetchSettings {
            request_timeout: Duration::from_millis(50),
            ..FetchSettings::default()
        },
    );
    let err = fetcher
        .fetch(&RequestKey::new("BTC"), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err, FetchFailure::Transport("request timed out".to_string()));
}

#[tokio::test]
async fn fetcher_aborts_when_cancelled_mid_flight() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/exchangerate/BTC/USD"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(json!({ "rate": 1 })),
        )
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, FetchSettings::default());
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let started = std::time::Instant::now();
    let err = fetcher
        .fetch(&RequestKey::new("BTC"), &token)
        .await
        .unwrap_err();
    assert_eq!(err, FetchFailure::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn fetcher_does_not_send_when_already_cancelled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "rate": 1 })))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, FetchSettings::default());
    let token = CancellationToken::new();
    token.cancel();

    let err = fetcher
        .fetch(&RequestKey::new("BTC"), &token)
        .await
        .unwrap_err();
    assert!(err.is_cancellation());
}
