//! Scroll-token paging

use extraction_domain::constants::DEFAULT_SCROLL_KEY_PATH;
use extraction_domain::{Extraction, Request};
use serde_json::Value;

use super::{lookup, ContinuationBuilder};

/// Carries an opaque scroll token from the response body into a header of
/// the next request.
///
/// The header is named after the key path. Numbers and booleans are sent in
/// their text form; a missing, null, empty or structured token ends the
/// traversal, as does a failed extraction.
#[derive(Debug, Clone)]
pub struct ScrollToken {
    key_path: String,
}

impl ScrollToken {
    pub fn new(key_path: impl Into<String>) -> Self {
        Self { key_path: key_path.into() }
    }

    pub fn key_path(&self) -> &str {
        &self.key_path
    }
}

impl Default for ScrollToken {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_KEY_PATH)
    }
}

impl ContinuationBuilder for ScrollToken {
    fn build(&self, last: &Extraction) -> Option<Request> {
        let content = last.successful_content()?;
        let token = render_token(lookup(content, &self.key_path)?)?;
        Some(last.request().with_header(self.key_path.clone(), token))
    }
}

fn render_token(value: &Value) -> Option<String> {
    let token = match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use extraction_domain::{ApiResponse, Attempt, RequestMethod};
    use serde_json::json;

    use super::*;

    fn extraction(status: u16, body: Value) -> Extraction {
        let request = Request::builder(RequestMethod::Post, "https://api.example.com/search")
            .body(json!({"query": "all"}))
            .param("size", 100)
            .build();
        Extraction::new(request, vec![Attempt::new(Utc::now(), ApiResponse::new(status, body))])
    }

    #[test]
    fn token_is_sent_as_header() {
        let last = extraction(200, json!({"scroll_id": "abc123", "hits": []}));

        let next = ScrollToken::default().build(&last).unwrap();

        assert_eq!(next.header("scroll_id"), Some("abc123"));
        assert_eq!(next.body(), Some(&json!({"query": "all"})));
        assert_eq!(next.params(), last.request().params());
        assert_eq!(next.id(), last.request().id());
    }

    #[test]
    fn new_token_replaces_previous_header() {
        let mut last = extraction(200, json!({"scroll_id": "second"}));
        let first_page = last.request().with_header("scroll_id", "first");
        last = Extraction::new(first_page, last.attempts().to_vec());

        assert_eq!(ScrollToken::default().build(&last).unwrap().header("scroll_id"), Some("second"));
    }

    #[test]
    fn missing_token_stops() {
        assert!(ScrollToken::default().build(&extraction(200, json!({"hits": []}))).is_none());
    }

    #[test]
    fn empty_null_and_structured_tokens_stop() {
        for token in [json!(""), json!(null), json!({"id": 1}), json!(["a"])] {
            let last = extraction(200, json!({ "scroll_id": token.clone() }));
            assert!(ScrollToken::default().build(&last).is_none(), "token {token}");
        }
    }

    #[test]
    fn scalar_tokens_are_rendered_as_text() {
        let last = extraction(200, json!({"scroll_id": 42}));
        assert_eq!(ScrollToken::default().build(&last).unwrap().header("scroll_id"), Some("42"));
    }

    #[test]
    fn failed_extraction_stops() {
        assert!(ScrollToken::default().build(&extraction(502, json!({"scroll_id": "abc"}))).is_none());
    }

    #[test]
    fn nested_key_path_names_the_header() {
        let last = extraction(200, json!({"cursor": {"next": "n-2"}}));
        let next = ScrollToken::new("cursor.next").build(&last).unwrap();
        assert_eq!(next.header("cursor.next"), Some("n-2"));
    }
}
