//! Unit tests for client module.

use super::*;

// ============================================================================
// ClientConfig Tests
// ============================================================================

#[test]
fn test_client_config_default() {
    let config = ClientConfig::default();

    assert_eq!(config.base_url, "http://localhost:8080");
    assert_eq!(config.timeout, Duration::from_secs(30));
}

// ============================================================================
// TaClient Creation Tests
// ============================================================================

#[test]
fn test_ta_client_new() {
    let config = ClientConfig {
        base_url: "http://localhost:8080".to_string(),
        timeout: Duration::from_secs(5),
    };

    assert!(TaClient::new(config).is_ok());
}

#[test]
fn test_ta_client_base_url_trimmed() {
    let client = TaClient::with_base_url("http://localhost:8080/").unwrap();

    assert_eq!(client.base_url(), "http://localhost:8080");
}

// ============================================================================
// Request Building Tests
// ============================================================================

#[test]
fn test_as_user_sets_header() {
    let client = TaClient::with_base_url("http://localhost:8080").unwrap();
    let request = client
        .as_user(client.client.get("http://localhost:8080/watchlist"), "alice")
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(
        request.headers().get(USER_ID_HEADER).unwrap().to_str().unwrap(),
        "alice"
    );
}

#[test]
fn test_as_user_rejects_empty_user() {
    let client = TaClient::with_base_url("http://localhost:8080").unwrap();
    let result = client.as_user(client.client.get("http://localhost:8080/watchlist"), " ");

    assert!(matches!(result, Err(Error::InvalidRequest(_))));
}

#[tokio::test]
async fn test_empty_user_fails_without_network() {
    // Nothing listens here; the call must fail before connecting.
    let client = TaClient::with_base_url("http://127.0.0.1:9").unwrap();

    let err = client.list_watchlist("").await.unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
}
