//! Offset/limit paging

use extraction_domain::constants::DEFAULT_PAGING_KEY_PATH;
use extraction_domain::{Extraction, Request};
use serde_json::{Map, Value};

use super::{coerce_int, lookup, ContinuationBuilder};

/// Advances `offset`/`limit` query parameters using a paging object found in
/// the response body.
///
/// The paging object may carry `limit`, `offset`, `next_offset` and `total`.
/// Values missing from the payload fall back to the parameters of the
/// request that produced it. The traversal ends when:
///
/// - the last extraction did not succeed;
/// - the key path is missing, not an object, or an empty object;
/// - neither `next_offset` nor a limit is known;
/// - the next offset equals the current one (for example `limit: 0`);
/// - `total` is known and the current or next offset is `>= total`.
#[derive(Debug, Clone)]
pub struct OffsetPaging {
    key_path: String,
}

impl OffsetPaging {
    pub fn new(key_path: impl Into<String>) -> Self {
        Self { key_path: key_path.into() }
    }

    pub fn key_path(&self) -> &str {
        &self.key_path
    }
}

impl Default for OffsetPaging {
    fn default() -> Self {
        Self::new(DEFAULT_PAGING_KEY_PATH)
    }
}

impl ContinuationBuilder for OffsetPaging {
    fn build(&self, last: &Extraction) -> Option<Request> {
        let content = last.successful_content()?;
        let paging = lookup(content, &self.key_path)?.as_object().filter(|p| !p.is_empty())?;
        next_page(last.request(), paging)
    }
}

fn next_page(request: &Request, paging: &Map<String, Value>) -> Option<Request> {
    let field = |name: &str| paging.get(name).and_then(coerce_int);
    let param = |name: &str| request.param(name).and_then(coerce_int);

    let limit = field("limit").or_else(|| param("limit"));
    let offset = field("offset").or_else(|| param("offset")).unwrap_or(0);
    let next_offset = match field("next_offset") {
        Some(next) => next,
        None => offset.checked_add(limit?)?,
    };
    if next_offset == offset {
        return None;
    }

    if let Some(total) = field("total") {
        if offset >= total || next_offset >= total {
            return None;
        }
    }

    let mut params = request.params().clone();
    if let Some(limit) = limit {
        params.insert("limit".to_owned(), Value::from(limit));
    }
    params.insert("offset".to_owned(), Value::from(next_offset));

    Some(request.with_params(params))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use extraction_domain::{ApiResponse, Attempt, RequestMethod};
    use serde_json::json;

    use super::*;

    fn page_request(limit: i64, offset: i64) -> Request {
        Request::builder(RequestMethod::Get, "https://api.example.com/items")
            .param("limit", limit)
            .param("offset", offset)
            .param("q", "open")
            .header("Accept", "application/json")
            .build()
    }

    fn extraction(request: Request, status: u16, body: Value) -> Extraction {
        Extraction::new(request, vec![Attempt::new(Utc::now(), ApiResponse::new(status, body))])
    }

    #[test]
    fn advances_by_limit_when_total_not_reached() {
        let last = extraction(page_request(50, 0), 200, json!({"paging": {"total": 120}}));

        let next = OffsetPaging::default().build(&last).unwrap();

        assert_eq!(next.param("offset"), Some(&json!(50)));
        assert_eq!(next.param("limit"), Some(&json!(50)));
        assert_eq!(next.param("q"), Some(&json!("open")));
        assert_eq!(next.header("Accept"), Some("application/json"));
        assert_eq!(next.url(), last.request().url());
        assert_eq!(next.id(), last.request().id());
    }

    #[test]
    fn single_page_when_limit_covers_total() {
        let last = extraction(page_request(50, 0), 200, json!({"paging": {"total": 50}}));
        assert!(OffsetPaging::default().build(&last).is_none());
    }

    #[test]
    fn next_offset_equal_to_total_stops() {
        let last = extraction(page_request(50, 50), 200, json!({"paging": {"total": 100}}));
        assert!(OffsetPaging::default().build(&last).is_none());
    }

    #[test]
    fn payload_values_take_precedence() {
        let last = extraction(
            page_request(10, 0),
            200,
            json!({"paging": {"limit": "25", "offset": 25, "total": 200}}),
        );

        let next = OffsetPaging::default().build(&last).unwrap();

        assert_eq!(next.param("offset"), Some(&json!(50)));
        assert_eq!(next.param("limit"), Some(&json!(25)));
    }

    #[test]
    fn explicit_next_offset_is_used() {
        let last = extraction(page_request(10, 0), 200, json!({"paging": {"next_offset": 7}}));
        assert_eq!(OffsetPaging::default().build(&last).unwrap().param("offset"), Some(&json!(7)));
    }

    #[test]
    fn next_offset_without_limit_keeps_limit_absent() {
        let request = Request::get("https://x");
        let last = extraction(request, 200, json!({"paging": {"next_offset": 3, "total": 10}}));

        let next = OffsetPaging::default().build(&last).unwrap();

        assert_eq!(next.param("offset"), Some(&json!(3)));
        assert_eq!(next.param("limit"), None);
    }

    #[test]
    fn missing_limit_and_next_offset_stops() {
        let last = extraction(Request::get("https://x"), 200, json!({"paging": {"total": 10}}));
        assert!(OffsetPaging::default().build(&last).is_none());
    }

    #[test]
    fn unusable_paging_objects_stop() {
        for body in [
            json!({}),
            json!({"paging": {}}),
            json!({"paging": "page 2"}),
            json!({"paging": [1, 2]}),
            json!({"data": []}),
        ] {
            let last = extraction(page_request(50, 0), 200, body.clone());
            assert!(OffsetPaging::default().build(&last).is_none(), "body {body}");
        }
    }

    #[test]
    fn failed_extraction_stops() {
        let last = extraction(page_request(50, 0), 500, json!({"paging": {"total": 120}}));
        assert!(OffsetPaging::default().build(&last).is_none());
    }

    #[test]
    fn nested_key_path() {
        let last = extraction(page_request(5, 0), 200, json!({"meta": {"page": {"total": 12}}}));
        let next = OffsetPaging::new("meta.page").build(&last).unwrap();
        assert_eq!(next.param("offset"), Some(&json!(5)));
    }

    #[test]
    fn reads_first_successful_attempt() {
        let request = page_request(50, 0);
        let last = Extraction::new(
            request,
            vec![
                Attempt::new(Utc::now(), ApiResponse::new(503, json!({}))),
                Attempt::new(Utc::now(), ApiResponse::new(200, json!({"paging": {"total": 120}}))),
            ],
        );
        assert_eq!(OffsetPaging::default().build(&last).unwrap().param("offset"), Some(&json!(50)));
    }

    #[test]
    fn stalled_offset_stops_without_total() {
        for body in [
            json!({"paging": {"limit": 0}}),
            json!({"paging": {"next_offset": 20}}),
            json!({"paging": {"offset": 20, "limit": "0"}}),
        ] {
            let last = extraction(page_request(10, 20), 200, body.clone());
            assert!(OffsetPaging::default().build(&last).is_none(), "body {body}");
        }
    }

    #[test]
    fn offset_past_total_stops_even_with_next_offset() {
        let last = extraction(
            page_request(50, 0),
            200,
            json!({"paging": {"offset": 130, "next_offset": 10, "total": 120}}),
        );
        assert!(OffsetPaging::default().build(&last).is_none());
    }
}
