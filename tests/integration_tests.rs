//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: service → windower → HTTP store → mock store

use docstore_pager::http::HttpClientConfig;
use docstore_pager::types::BackoffType;
use docstore_pager::{
    count_all, windowed_fetch, Error, HttpStore, ItemUpdate, Operation, PageRequest, Range,
    RangeRequest, RawRange, StoreService,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

/// A store response holding items `ids`, linked to page `next` if given
fn page_body(ids: std::ops::Range<i64>, next: Option<u64>) -> Value {
    let items: Vec<Value> = ids.map(|id| json!({"pk": "user#1", "id": id})).collect();
    let mut body = json!({
        "Items": items,
        "Count": items.len(),
        "ScannedCount": items.len(),
    });
    if let Some(next) = next {
        body["LastEvaluatedKey"] = json!({"page": next});
    }
    body
}

/// Mount a three-page scan of items 0..9; each page expects `calls[i]` hits
async fn mount_three_pages(server: &MockServer, target: &str, calls: [u64; 3]) {
    Mock::given(method("POST"))
        .and(header("X-Amz-Target", target))
        .and(body_partial_json(json!({"ExclusiveStartKey": {"page": 1}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(3..6, Some(2))))
        .with_priority(1)
        .expect(calls[1])
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(header("X-Amz-Target", target))
        .and(body_partial_json(json!({"ExclusiveStartKey": {"page": 2}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(6..9, None)))
        .with_priority(1)
        .expect(calls[2])
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(header("X-Amz-Target", target))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0..3, Some(1))))
        .with_priority(10)
        .expect(calls[0])
        .mount(server)
        .await;
}

fn store(server: &MockServer) -> HttpStore {
    let config = HttpClientConfig::builder()
        .max_retries(2)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(1),
            Duration::from_millis(1),
        )
        .no_rate_limit()
        .build();
    HttpStore::with_config(server.uri(), config).unwrap()
}

fn ids(items: &[docstore_pager::Item]) -> Vec<i64> {
    items.iter().map(|i| i["id"].as_i64().unwrap()).collect()
}

// ============================================================================
// Windowed Reads
// ============================================================================

#[tokio::test]
async fn test_window_spanning_page_boundary() {
    let server = MockServer::start().await;
    mount_three_pages(&server, "DynamoDB_20120810.Scan", [1, 1, 0]).await;

    let store = store(&server);
    let range = Range::new(2, 4).unwrap();
    let result = windowed_fetch(&store, Operation::Scan, range, PageRequest::new("events"))
        .await
        .unwrap();

    assert_eq!(ids(&result.items), vec![2, 3]);
    assert_eq!(result.last_evaluated_key.map(|c| c.into_value()), Some(json!({"page": 2})));
}

#[tokio::test]
async fn test_window_exactly_one_page() {
    let server = MockServer::start().await;
    mount_three_pages(&server, "DynamoDB_20120810.Query", [1, 1, 0]).await;

    let service = StoreService::new(Arc::new(store(&server)));
    let request = PageRequest::new("events")
        .key_condition("pk = :pk")
        .value(":pk", "user#1");
    let result = service
        .query_range(RangeRequest::new(RawRange::new(3, 6), request))
        .await
        .unwrap();

    assert_eq!(ids(&result.items), vec![3, 4, 5]);
    assert_eq!(result.pages_fetched, 2);
}

#[tokio::test]
async fn test_window_past_end_returns_suffix() {
    let server = MockServer::start().await;
    mount_three_pages(&server, "DynamoDB_20120810.Scan", [1, 1, 1]).await;

    let service = StoreService::new(Arc::new(store(&server)));
    let result = service
        .operate_with_range(
            "scan",
            RangeRequest::new(RawRange::new(5, 100), PageRequest::new("events")),
        )
        .await
        .unwrap();

    assert_eq!(ids(&result.items), vec![5, 6, 7, 8]);
    assert!(result.last_evaluated_key.is_none());
}

#[tokio::test]
async fn test_invalid_input_sends_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0..3, None)))
        .expect(0)
        .mount(&server)
        .await;

    let service = StoreService::new(Arc::new(store(&server)));

    let err = service
        .scan_range(RangeRequest::new(RawRange::new(4, 4), PageRequest::new("events")))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRange { .. }));

    let err = service
        .operate_with_range(
            "put",
            RangeRequest::new(RawRange::new(0, 4), PageRequest::new("events")),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidOperation { .. }));
}

#[tokio::test]
async fn test_transport_retry_is_invisible_to_window() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"ExclusiveStartKey": {"page": 1}})))
        .respond_with(ResponseTemplate::new(500).set_body_string("busy"))
        .with_priority(1)
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_three_pages(&server, "DynamoDB_20120810.Scan", [1, 1, 0]).await;

    let store = store(&server);
    let result = windowed_fetch(
        &store,
        Operation::Scan,
        Range::new(1, 5).unwrap(),
        PageRequest::new("events"),
    )
    .await
    .unwrap();

    assert_eq!(ids(&result.items), vec![1, 2, 3, 4]);
    assert_eq!(result.pages_fetched, 2);
}

#[tokio::test]
async fn test_store_error_propagates_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"ExclusiveStartKey": {"page": 1}})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "com.amazonaws.dynamodb.v20120810#ValidationException",
            "message": "The provided starting key is invalid"
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0..3, Some(1))))
        .with_priority(10)
        .mount(&server)
        .await;

    let service = StoreService::new(Arc::new(store(&server)));
    let err = service
        .scan_range(RangeRequest::new(RawRange::new(1, 5), PageRequest::new("events")))
        .await
        .unwrap_err();

    match err {
        Error::Store { code, message } => {
            assert_eq!(code, "ValidationException");
            assert_eq!(message, "The provided starting key is invalid");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_throttled_page_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("X-Amz-Target", "DynamoDB_20120810.Scan"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "com.amazonaws.dynamodb.v20120810#ProvisionedThroughputExceededException",
            "message": "slow down"
        })))
        .with_priority(1)
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("X-Amz-Target", "DynamoDB_20120810.Scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0..3, None)))
        .with_priority(10)
        .expect(1)
        .mount(&server)
        .await;

    let config = HttpClientConfig::builder()
        .max_retries(3)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(1),
            Duration::from_millis(1),
        )
        .no_rate_limit()
        .build();
    let store = HttpStore::with_config(server.uri(), config).unwrap();
    let result = windowed_fetch(
        &store,
        Operation::Scan,
        Range::new(0, 2).unwrap(),
        PageRequest::new("events"),
    )
    .await
    .unwrap();

    assert_eq!(ids(&result.items), vec![0, 1]);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_item_returns_new_attributes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("X-Amz-Target", "DynamoDB_20120810.UpdateItem"))
        .and(body_json(json!({
            "TableName": "users",
            "Key": {"id": 1},
            "UpdateExpression": "SET #s = :s",
            "ExpressionAttributeValues": {":s": "closed"},
            "ExpressionAttributeNames": {"#s": "status"},
            "ReturnValues": "ALL_NEW"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Attributes": {"id": 1, "status": "closed"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = StoreService::new(Arc::new(store(&server)));
    let key = json!({"id": 1}).as_object().cloned().unwrap();
    let update = ItemUpdate::new(key, "SET #s = :s")
        .value(":s", "closed")
        .name("#s", "status");
    let item = service.update_item("users", &update).await.unwrap().unwrap();

    assert_eq!(Value::Object(item), json!({"id": 1, "status": "closed"}));
}

// ============================================================================
// Exhaustive Reads
// ============================================================================

#[tokio::test]
async fn test_scan_all_follows_every_cursor() {
    let server = MockServer::start().await;
    mount_three_pages(&server, "DynamoDB_20120810.Scan", [1, 1, 1]).await;

    let service = StoreService::new(Arc::new(store(&server)));
    let items = service.scan_all(PageRequest::new("events")).await.unwrap();

    assert_eq!(ids(&items), (0..9).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_count_all_requests_count_select() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("X-Amz-Target", "DynamoDB_20120810.Query"))
        .and(body_partial_json(json!({"Select": "COUNT", "ExclusiveStartKey": {"page": 1}})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"Count": 4, "ScannedCount": 4})),
        )
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("X-Amz-Target", "DynamoDB_20120810.Query"))
        .and(body_partial_json(json!({"Select": "COUNT"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Count": 5,
            "ScannedCount": 5,
            "LastEvaluatedKey": {"page": 1}
        })))
        .with_priority(10)
        .expect(1)
        .mount(&server)
        .await;

    let store = store(&server);
    let request = PageRequest::new("events")
        .key_condition("pk = :pk")
        .value(":pk", "user#1");
    let total = count_all(&store, Operation::Query, request).await.unwrap();

    assert_eq!(total, 9);
}
