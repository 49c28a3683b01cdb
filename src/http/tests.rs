//! Tests for the HTTP client module

use super::*;
use crate::error::{Error, ErrorKind};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn default_client() -> HttpClient {
    HttpClient::with_config(HttpClientConfig::default()).unwrap()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(config.proxy.is_none());
    assert!(config.user_agent.starts_with("account-api/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .timeout(Duration::from_secs(60))
        .proxy("http://proxy.local:3128")
        .build();

    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.proxy, Some("http://proxy.local:3128".to_string()));
}

#[tokio::test]
async fn test_http_client_get() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/account"))
        .and(query_param("page[number]", "2"))
        .and(query_param("filter[country]", "GB,AU"))
        .and(header(
            "user-agent",
            format!("account-api/{}", env!("CARGO_PKG_VERSION")).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": []
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!(
        "{}/v1/account?page%5Bnumber%5D=2&filter%5Bcountry%5D=GB%2CAU",
        mock_server.uri()
    );
    let response = default_client().get(&url).await.unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_http_client_post() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/account"))
        .and(body_json(serde_json::json!({"name": "test"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 123
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = default_client()
        .post(
            &format!("{}/v1/account", mock_server.uri()),
            serde_json::json!({"name": "test"}),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
    let body: serde_json::Value = read_json(response).await.unwrap();
    assert_eq!(body["id"], 123);
}

#[tokio::test]
async fn test_http_client_returns_error_statuses() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/account/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let response = default_client()
        .delete(&format!("{}/v1/account/missing", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_read_json_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/garbage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&mock_server)
        .await;

    let response = default_client()
        .get(&format!("{}/api/garbage", mock_server.uri()))
        .await
        .unwrap();
    let err = read_json::<serde_json::Value>(response).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnexpectedResponse);
}

#[tokio::test]
async fn test_http_client_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .timeout(Duration::from_millis(100))
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let err = client
        .get(&format!("{}/api/slow", mock_server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }));
    assert_eq!(err.kind(), ErrorKind::Connectivity);
}

#[tokio::test]
async fn test_http_client_connection_refused() {
    // Reserve a free port, then release it so nothing listens there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = default_client()
        .get(&format!("http://{addr}/v1/account"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connectivity);
}

#[test]
fn test_http_client_invalid_proxy() {
    let config = HttpClientConfig::builder().proxy("ftp://proxy.local:21").build();
    let err = HttpClient::with_config(config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_http_client_debug() {
    let debug = format!("{:?}", default_client());
    assert!(debug.contains("HttpClient"));
    assert!(debug.contains("timeout"));
}
