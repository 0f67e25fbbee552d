//! SQLite extraction history
//!
//! Append-only: every call to `save` inserts a row, so re-running a request
//! yields one row per run. Rows keep both queryable columns and the full
//! request/attempt JSON needed to rebuild the [`Extraction`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use extraction_core::ports::ExtractionStore;
use extraction_domain::constants::AUTHORIZATION_HEADER;
use extraction_domain::{Attempt, Extraction, Request, Result as DomainResult};
use rusqlite::{params, Row};
use tokio::task;
use tracing::debug;
use uuid::Uuid;

use super::manager::{DbManager, SqliteConnection};
use super::support::{format_timestamp, map_join_error};
use crate::errors::to_domain;

const REDACTED: &str = "<redacted>";

/// SQLite-based [`ExtractionStore`] with audit/replay queries.
pub struct SqliteExtractionStore {
    db: Arc<DbManager>,
}

impl SqliteExtractionStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Number of recorded extractions
    pub async fn count(&self) -> DomainResult<i64> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<i64> {
            let conn = db.get_connection()?;
            conn.query_row("SELECT COUNT(*) FROM extractions", [], |row| row.get(0))
                .map_err(to_domain)
        })
        .await
        .map_err(map_join_error)?
    }

    /// Every extraction recorded for requests derived from `request_id`,
    /// oldest first. Credentials are redacted.
    pub async fn find_by_request_id(&self, request_id: Uuid) -> DomainResult<Vec<Extraction>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<Extraction>> {
            let conn = db.get_connection()?;
            query_extractions(
                &conn,
                "SELECT request, attempts FROM extractions WHERE request_id = ?1 ORDER BY id ASC",
                params![request_id.to_string()],
            )
        })
        .await
        .map_err(map_join_error)?
    }

    /// The `limit` most recently recorded extractions, newest first.
    pub async fn recent(&self, limit: usize) -> DomainResult<Vec<Extraction>> {
        let db = Arc::clone(&self.db);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        task::spawn_blocking(move || -> DomainResult<Vec<Extraction>> {
            let conn = db.get_connection()?;
            query_extractions(
                &conn,
                "SELECT request, attempts FROM extractions ORDER BY id DESC LIMIT ?1",
                params![limit],
            )
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl ExtractionStore for SqliteExtractionStore {
    async fn save(&self, extraction: &Extraction) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let row = ExtractionRow::from_extraction(extraction)?;

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            insert_extraction(&conn, &row)
        })
        .await
        .map_err(map_join_error)??;

        debug!(request_id = %extraction.request().id(), "extraction recorded");
        Ok(())
    }
}

/// Column values for one `extractions` row.
struct ExtractionRow {
    request_id: String,
    identifier: Option<String>,
    url: String,
    method: String,
    status: String,
    success: bool,
    retries: i64,
    fetched_at: Option<String>,
    created_at: String,
    headers: String,
    params: String,
    json_body: Option<String>,
    attempts: String,
    response: Option<String>,
    request: String,
}

impl ExtractionRow {
    fn from_extraction(extraction: &Extraction) -> DomainResult<Self> {
        let request = redact_credentials(extraction.request());
        let last_response = extraction.last_attempt().map(|attempt| &attempt.response);

        Ok(Self {
            request_id: request.id().to_string(),
            identifier: request.identity().map(str::to_owned),
            url: request.url().to_owned(),
            method: request.method().to_string(),
            status: extraction.status().to_string(),
            success: extraction.is_success(),
            retries: i64::try_from(extraction.retries()).unwrap_or(i64::MAX),
            fetched_at: extraction.fetched_at().map(format_timestamp),
            created_at: format_timestamp(request.created_at()),
            headers: serde_json::to_string(request.headers()).map_err(to_domain)?,
            params: serde_json::to_string(request.params()).map_err(to_domain)?,
            json_body: request.body().map(serde_json::to_string).transpose().map_err(to_domain)?,
            attempts: serde_json::to_string(extraction.attempts()).map_err(to_domain)?,
            response: last_response.map(serde_json::to_string).transpose().map_err(to_domain)?,
            request: serde_json::to_string(&request).map_err(to_domain)?,
        })
    }
}

/// Bearer values never reach the history table, whatever the header's case.
fn redact_credentials(request: &Request) -> Request {
    if request.header(AUTHORIZATION_HEADER).is_some() {
        request.with_header(AUTHORIZATION_HEADER, REDACTED)
    } else {
        request.clone()
    }
}

// ============================================================================
// SQL Operations (synchronous)
// ============================================================================

fn insert_extraction(conn: &SqliteConnection, row: &ExtractionRow) -> DomainResult<()> {
    conn.execute(
        "INSERT INTO extractions (request_id, identifier, url, method, status, success, retries,
                                  fetched_at, created_at, headers, params, json_body, attempts,
                                  response, request, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            row.request_id,
            row.identifier,
            row.url,
            row.method,
            row.status,
            row.success,
            row.retries,
            row.fetched_at,
            row.created_at,
            row.headers,
            row.params,
            row.json_body,
            row.attempts,
            row.response,
            row.request,
            format_timestamp(Utc::now()),
        ],
    )
    .map_err(to_domain)?;
    Ok(())
}

fn query_extractions<P: rusqlite::Params>(
    conn: &SqliteConnection,
    sql: &str,
    params: P,
) -> DomainResult<Vec<Extraction>> {
    let mut stmt = conn.prepare(sql).map_err(to_domain)?;
    let rows = stmt
        .query_map(params, map_stored_row)
        .map_err(to_domain)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(to_domain)?;

    rows.into_iter().map(|(request, attempts)| rebuild_extraction(&request, &attempts)).collect()
}

fn map_stored_row(row: &Row<'_>) -> rusqlite::Result<(String, String)> {
    Ok((row.get(0)?, row.get(1)?))
}

fn rebuild_extraction(request_json: &str, attempts_json: &str) -> DomainResult<Extraction> {
    let request: Request = serde_json::from_str(request_json).map_err(to_domain)?;
    let attempts: Vec<Attempt> = serde_json::from_str(attempts_json).map_err(to_domain)?;
    Ok(Extraction::new(request, attempts))
}
