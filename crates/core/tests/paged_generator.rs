//! Lazy multi-page traversal

mod support;

use std::sync::Arc;

use extraction_core::{OffsetPaging, PagedExtractionGenerator, ScrollToken, ServiceError};
use extraction_domain::{ApiResponse, ExtractionStatus, Request, RequestMethod};
use futures::{pin_mut, StreamExt};
use serde_json::{json, Value};
use support::{Harness, MockExtractionStore, MockTokenCache, MockTokenProvider, MockTransport};

/// Serves `total` items in pages, reporting paging metadata.
fn paged_api(total: i64) -> MockTransport {
    MockTransport::responding(move |request| {
        let offset = request.param("offset").and_then(Value::as_i64).unwrap_or(0);
        let limit = request.param("limit").and_then(Value::as_i64).unwrap_or(10);
        let items: Vec<i64> = (offset..(offset + limit).min(total)).collect();
        Ok(ApiResponse::new(
            200,
            json!({"items": items, "paging": {"offset": offset, "limit": limit, "total": total}}),
        ))
    })
}

fn start_request() -> Request {
    Request::builder(RequestMethod::Get, "https://api.example.com/orders")
        .param("limit", 10)
        .param("offset", 0)
        .build()
}

#[tokio::test]
async fn three_pages_then_done() {
    let harness = Harness::with_transport(paged_api(25));
    let mut pages =
        PagedExtractionGenerator::new(harness.service.clone(), Arc::new(OffsetPaging::default()), start_request());

    let mut offsets = Vec::new();
    while let Some(page) = pages.next().await {
        let page = page.unwrap();
        offsets.push(page.request().param("offset").cloned().unwrap());
    }

    assert_eq!(offsets, vec![json!(0), json!(10), json!(20)]);
    assert_eq!(pages.pages(), 3);
    assert!(pages.is_exhausted());
    assert!(pages.next().await.is_none());
    assert_eq!(harness.transport.call_count(), 3);
    assert_eq!(harness.store.saved().len(), 3);
}

#[tokio::test]
async fn single_page_when_first_response_covers_total() {
    let harness = Harness::with_transport(paged_api(10));
    let pages = PagedExtractionGenerator::offset_paging(harness.service.clone(), start_request(), "paging");

    let collected: Vec<_> = pages.into_stream().collect().await;

    assert_eq!(collected.len(), 1);
    assert_eq!(harness.transport.call_count(), 1);
}

#[tokio::test]
async fn scroll_traversal_follows_tokens() {
    let harness = Harness::with_transport(MockTransport::scripted(vec![
        Ok(ApiResponse::new(200, json!({"scroll_id": "s1", "hits": [1, 2]}))),
        Ok(ApiResponse::new(200, json!({"scroll_id": "s2", "hits": [3, 4]}))),
        Ok(ApiResponse::new(200, json!({"hits": [5]}))),
    ]));
    let start = Request::post("https://api.example.com/search", json!({"match_all": {}}));
    let stream = PagedExtractionGenerator::new(harness.service.clone(), Arc::new(ScrollToken::default()), start)
        .into_stream();
    pin_mut!(stream);

    let mut hits = Vec::new();
    while let Some(page) = stream.next().await {
        hits.push(page.unwrap().data()["hits"].clone());
    }

    assert_eq!(hits, vec![json!([1, 2]), json!([3, 4]), json!([5])]);
    let sent = harness.transport.sent();
    assert_eq!(sent[0].header("scroll_id"), None);
    assert_eq!(sent[1].header("scroll_id"), Some("s1"));
    assert_eq!(sent[2].header("scroll_id"), Some("s2"));
}

#[tokio::test]
async fn failed_page_is_yielded_then_traversal_ends() {
    let harness = Harness::with_transport(MockTransport::scripted(vec![
        Ok(ApiResponse::new(200, json!({"paging": {"offset": 0, "limit": 10, "total": 50}}))),
        Ok(ApiResponse::new(500, json!({"error": "boom"}))),
    ]));
    let start = Request::builder(RequestMethod::Get, "https://x").param("limit", 10).retries(1).build();
    let mut pages = PagedExtractionGenerator::offset_paging(harness.service.clone(), start, "paging");

    let first = pages.next().await.unwrap().unwrap();
    let second = pages.next().await.unwrap().unwrap();

    assert_eq!(first.status(), ExtractionStatus::Success);
    assert_eq!(second.status(), ExtractionStatus::Error);
    assert!(pages.next().await.is_none());
    assert_eq!(harness.store.saved().len(), 2);
}

#[tokio::test]
async fn error_ends_traversal() {
    let harness = Harness::new(
        MockTokenProvider::new(),
        MockTokenCache::new(),
        paged_api(100),
        MockExtractionStore::failing(),
    );
    let mut pages = PagedExtractionGenerator::offset_paging(harness.service.clone(), start_request(), "paging");

    let first = pages.next().await.unwrap();

    assert!(matches!(first, Err(ServiceError::Persistence { .. })));
    assert!(pages.is_exhausted());
    assert!(pages.next().await.is_none());
    assert_eq!(harness.transport.call_count(), 1);
}

#[tokio::test]
async fn early_stop_fetches_no_further_pages() {
    let harness = Harness::with_transport(paged_api(1_000));
    let stream =
        PagedExtractionGenerator::offset_paging(harness.service.clone(), start_request(), "paging").into_stream();

    let first_two: Vec<_> = stream.take(2).collect().await;

    assert_eq!(first_two.len(), 2);
    assert_eq!(harness.transport.call_count(), 2);
}

#[tokio::test]
async fn new_generator_restarts_from_the_start_request() {
    let harness = Harness::with_transport(paged_api(15));
    let start = start_request();

    for _ in 0..2 {
        let pages: Vec<_> =
            PagedExtractionGenerator::offset_paging(harness.service.clone(), start.clone(), "paging")
                .into_stream()
                .collect()
                .await;
        assert_eq!(pages.len(), 2);
    }
    assert_eq!(harness.transport.call_count(), 4);
}
