//! Watchlist endpoint tests.

use std::collections::HashSet;
use ta_client::{Error, USER_ID_HEADER};
use ta_tests::{TestServer, unique_user};

#[tokio::test]
async fn test_add_list_remove_flow() {
    let server = TestServer::start().await;
    let client = server.client();
    let user = unique_user("flow");

    let added = client
        .add_ticker(&user, "TSLA", true)
        .await
        .expect("add failed");
    assert_eq!(added.symbol, "TSLA");
    assert!(added.on_hand);
    assert!(!added.created_at.is_empty());

    let items = client.list_watchlist(&user).await.expect("list failed");
    assert_eq!(items, vec![added]);

    client
        .remove_ticker(&user, "TSLA")
        .await
        .expect("remove failed");

    let items = client.list_watchlist(&user).await.expect("list failed");
    assert!(items.is_empty());
    server.shutdown().await;
}

#[tokio::test]
async fn test_remove_returns_no_content() {
    let server = TestServer::start().await;
    let user = unique_user("nocontent");

    let resp = reqwest::Client::new()
        .delete(format!("{}/watchlist/AAPL", server.base_url()))
        .header(USER_ID_HEADER, &user)
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status().as_u16(), 204);
    server.shutdown().await;
}

#[tokio::test]
async fn test_remove_missing_symbol_is_idempotent() {
    let server = TestServer::start().await;
    let client = server.client();
    let user = unique_user("idempotent");

    client.add_ticker(&user, "MSFT", false).await.expect("add failed");
    client.remove_ticker(&user, "NVDA").await.expect("remove failed");
    client.remove_ticker(&user, "NVDA").await.expect("remove failed");

    let items = client.list_watchlist(&user).await.expect("list failed");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].symbol, "MSFT");
    server.shutdown().await;
}

#[tokio::test]
async fn test_add_replaces_existing_entry() {
    let server = TestServer::start().await;
    let client = server.client();
    let user = unique_user("replace");

    client.add_ticker(&user, "AAPL", false).await.expect("add failed");
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let replaced = client.add_ticker(&user, "AAPL", true).await.expect("add failed");

    let items = client.list_watchlist(&user).await.expect("list failed");
    assert_eq!(items.len(), 1);
    assert!(items[0].on_hand);
    assert_eq!(items[0].created_at, replaced.created_at);
    server.shutdown().await;
}

#[tokio::test]
async fn test_users_are_isolated() {
    let server = TestServer::start().await;
    let client = server.client();
    let alice = unique_user("alice");
    let bob = unique_user("bob");

    client.add_ticker(&alice, "AAPL", true).await.expect("add failed");
    client.add_ticker(&alice, "TSLA", false).await.expect("add failed");
    client.add_ticker(&bob, "NVDA", true).await.expect("add failed");

    let symbols: HashSet<String> = client
        .list_watchlist(&alice)
        .await
        .expect("list failed")
        .into_iter()
        .map(|item| item.symbol)
        .collect();
    assert_eq!(
        symbols,
        HashSet::from(["AAPL".to_string(), "TSLA".to_string()])
    );

    let bob_items = client.list_watchlist(&bob).await.expect("list failed");
    assert_eq!(bob_items.len(), 1);
    assert_eq!(bob_items[0].symbol, "NVDA");

    let stranger = client
        .list_watchlist(&unique_user("stranger"))
        .await
        .expect("list failed");
    assert!(stranger.is_empty());
    server.shutdown().await;
}

#[tokio::test]
async fn test_missing_user_header_is_bad_request() {
    let server = TestServer::start().await;

    let resp = reqwest::get(format!("{}/watchlist", server.base_url()))
        .await
        .expect("request failed");
    assert_eq!(resp.status().as_u16(), 400);

    let body: serde_json::Value = resp.json().await.expect("invalid json");
    assert_eq!(body["code"], "INVALID_REQUEST");
    server.shutdown().await;
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let server = TestServer::start().await;
    let client = server.client();
    let user = unique_user("malformed");
    let http = reqwest::Client::new();
    let url = format!("{}/watchlist", server.base_url());

    for body in [r#"{"symbol": "AAPL""#, r#"{"symbol": "AAPL"}"#, r#"{"on_hand": true}"#] {
        let resp = http
            .post(&url)
            .header(USER_ID_HEADER, &user)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("request failed");
        assert_eq!(resp.status().as_u16(), 400, "body {body}");
    }

    let items = client.list_watchlist(&user).await.expect("list failed");
    assert!(items.is_empty());
    server.shutdown().await;
}

#[tokio::test]
async fn test_empty_symbol_is_bad_request() {
    let server = TestServer::start().await;
    let client = server.client();
    let user = unique_user("empty");

    let err = client.add_ticker(&user, "", true).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Api { status: 400, ref code, .. } if code.as_deref() == Some("INVALID_REQUEST")
    ));

    let items = client.list_watchlist(&user).await.expect("list failed");
    assert!(items.is_empty());
    server.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_adds_are_all_kept() {
    let server = TestServer::start().await;
    let client = server.client();
    let user = unique_user("concurrent");

    let mut tasks = Vec::new();
    for i in 0..20 {
        let client = client.clone();
        let user = user.clone();
        tasks.push(tokio::spawn(async move {
            client
                .add_ticker(&user, &format!("SYM{i}"), i % 2 == 0)
                .await
        }));
    }
    for task in tasks {
        task.await.expect("task panicked").expect("add failed");
    }

    let items = client.list_watchlist(&user).await.expect("list failed");
    assert_eq!(items.len(), 20);
    server.shutdown().await;
}
