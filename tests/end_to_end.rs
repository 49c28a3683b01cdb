//! End-to-end tests against the companion server
//!
//! Starts the axum server on an ephemeral port with an in-memory store and
//! drives it through `AccountClient`: create → list (cursor and stream) →
//! fetch → delete.

use account_api::server::{serve_with_listener, AccountStore};
use account_api::{
    AccountAttributes, AccountClient, AccountClientConfig, AccountFilter, Error, ErrorKind,
    FilterDimension, PageDescriptor,
};
use futures::StreamExt;
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::net::TcpListener;

const ORG: &str = "eb0bd6f5-c3f5-44b2-b677-acd23cdde73c";

fn account_id(n: u32) -> String {
    format!("10000000-0000-4000-8000-{n:012}")
}

async fn start_server() -> AccountClient {
    let store = AccountStore::in_memory().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_with_listener(listener, store));

    let config = AccountClientConfig::new(format!("http://{addr}/v1/account"))
        .with_timeout(Duration::from_secs(5));
    AccountClient::new(config).unwrap()
}

async fn seed(client: &AccountClient, count: u32) {
    for n in 0..count {
        let country = if n % 2 == 0 { "GB" } else { "FR" };
        let attributes = AccountAttributes::new(country, vec![format!("Holder {n}")]);
        client
            .create(&account_id(n), ORG, attributes)
            .await
            .unwrap();
    }
}

// ============================================================================
// Single Account Lifecycle
// ============================================================================

#[tokio::test]
async fn test_create_fetch_delete() {
    let client = start_server().await;
    let id = account_id(1);

    let mut attributes = AccountAttributes::new("GB", vec!["Samantha Holder".to_string()]);
    attributes.bank_id = Some("400300".to_string());
    attributes.bank_id_code = Some("GBDSC".to_string());

    let created = client.create(&id, ORG, attributes.clone()).await.unwrap();
    assert_eq!(created.id, id);
    assert_eq!(created.version, 0);

    let fetched = client.fetch(&id).await.unwrap();
    assert_eq!(fetched.attributes, Some(attributes.clone()));

    let err = client.create(&id, ORG, attributes).await.unwrap_err();
    assert_eq!(err, Error::AccountExists { id: id.clone() });

    let err = client.delete(&id, 1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    assert!(client.delete(&id, 0).await.unwrap());
    assert!(!client.delete(&id, 0).await.unwrap());

    let err = client.fetch(&id).await.unwrap_err();
    assert_eq!(err, Error::AccountNotFound { id });
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_cursor_walks_all_pages() {
    let client = start_server().await;
    seed(&client, 7).await;

    let mut cursor = client.list(PageDescriptor::new(0, 3));
    let mut sizes = Vec::new();
    let mut ids = Vec::new();
    while cursor.advance().await {
        let batch = cursor.read().unwrap();
        sizes.push(batch.len());
        ids.extend(batch.iter().map(|a| a.id.clone()));
    }

    assert_eq!(sizes, vec![3, 3, 1]);
    assert_eq!(ids, (0..7).map(account_id).collect::<Vec<_>>());
    assert_eq!(cursor.terminal_error(), Some(Error::NoMoreData));
}

#[tokio::test]
async fn test_stream_with_filter() {
    let client = start_server().await;
    seed(&client, 10).await;

    let page = PageDescriptor::new(0, 2)
        .with_filter(AccountFilter::new().with(FilterDimension::Country, ["FR"]));
    let ids: Vec<String> = client.list_all(page).map(|a| a.id).collect().await;

    assert_eq!(
        ids,
        [1, 3, 5, 7, 9].into_iter().map(account_id).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_stream_on_empty_collection() {
    let client = start_server().await;

    let mut stream = client.list_all(PageDescriptor::first());
    assert!(stream.next_item().await.is_none());

    let cursor = stream.finish().await.unwrap();
    assert_eq!(cursor.page().page_number, 0);
    assert_eq!(cursor.terminal_error(), Some(Error::NoMoreData));
}

#[tokio::test]
async fn test_stream_dropped_early() {
    let client = start_server().await;
    seed(&client, 12).await;

    let mut stream = client.list_all(PageDescriptor::new(0, 2));
    let first = stream.next_item().await.unwrap();
    assert_eq!(first.id, account_id(0));
    drop(stream);

    // The server is still usable after the consumer went away
    let account = client.fetch(&account_id(11)).await.unwrap();
    assert_eq!(account.version, 0);
}
