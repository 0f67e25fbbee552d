//! Helpers shared by the SQLite repositories

use chrono::{DateTime, SecondsFormat, Utc};
use extraction_domain::{ExtractionError, Result};
use tokio::task;

/// RFC 3339 with nanoseconds so stored timestamps round-trip exactly.
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| ExtractionError::Database(format!("invalid stored timestamp '{text}': {err}")))
}

pub(crate) fn map_join_error(err: task::JoinError) -> ExtractionError {
    if err.is_cancelled() {
        ExtractionError::Internal("blocking task cancelled".into())
    } else {
        ExtractionError::Internal(format!("blocking task failed: {err}"))
    }
}
