//! Continuation protocol: deriving the next page request
//!
//! A [`ContinuationBuilder`] inspects the most recent [`Extraction`] and
//! either produces the request for the following page or signals that the
//! traversal is complete. Builders are pure: the same extraction always
//! yields the same answer and no state is kept between calls. Malformed or
//! missing continuation metadata ends the traversal instead of failing it.

pub mod offset;
pub mod scroll;

use extraction_domain::{Extraction, Request};
use serde_json::Value;

pub use offset::OffsetPaging;
pub use scroll::ScrollToken;

/// Derives the next request of a multi-page fetch
pub trait ContinuationBuilder: Send + Sync {
    /// Request for the page after `last`, or `None` when there is none.
    fn build(&self, last: &Extraction) -> Option<Request>;
}

/// Resolve a dotted key path (`"meta.paging"`) inside a JSON document.
///
/// Returns `None` for an empty path, or when any segment is missing or
/// traverses a non-object.
pub(crate) fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    path.split('.').try_fold(document, |current, segment| current.as_object()?.get(segment))
}

/// Lenient integer reading: integers, floats (truncated toward zero) and
/// numeric strings.
pub(crate) fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| float_to_int(number.as_f64()?)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn float_to_int(value: f64) -> Option<i64> {
    // `as` saturates, so out-of-range floats are rejected explicitly.
    if value.is_finite() && value.abs() < 9.0e18 {
        Some(value.trunc() as i64)
    } else {
        None
    }
}
