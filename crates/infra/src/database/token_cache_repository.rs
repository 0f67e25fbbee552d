//! SQLite token cache
//!
//! Keeps one access token per credential identifier in `access_tokens`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use extraction_core::ports::TokenCache;
use extraction_domain::{AccessToken, Result as DomainResult};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;

use super::manager::{DbManager, SqliteConnection};
use super::support::{format_timestamp, map_join_error, parse_timestamp};
use crate::errors::to_domain;

/// SQLite-based [`TokenCache`]
pub struct SqliteTokenCache {
    db: Arc<DbManager>,
}

impl SqliteTokenCache {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenCache for SqliteTokenCache {
    async fn get(&self, identifier: &str) -> DomainResult<Option<AccessToken>> {
        let db = Arc::clone(&self.db);
        let identifier = identifier.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<AccessToken>> {
            let conn = db.get_connection()?;
            query_token(&conn, &identifier)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn save(&self, identifier: &str, token: &AccessToken) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let identifier = identifier.to_string();
        let token = token.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            upsert_token(&conn, &identifier, &token)
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// SQL Operations (synchronous)
// ============================================================================

fn query_token(conn: &SqliteConnection, identifier: &str) -> DomainResult<Option<AccessToken>> {
    let row = conn
        .query_row(
            "SELECT value, refresh_token, life_time, obtained_at
             FROM access_tokens
             WHERE identifier = ?1",
            params![identifier],
            map_token_row,
        )
        .optional()
        .map_err(to_domain)?;

    row.map(|(value, refresh_token, life_time, obtained_at)| {
        let life_time = u64::try_from(life_time).unwrap_or(0);
        Ok(AccessToken::new(value, refresh_token, life_time, parse_timestamp(&obtained_at)?))
    })
    .transpose()
}

fn upsert_token(conn: &SqliteConnection, identifier: &str, token: &AccessToken) -> DomainResult<()> {
    let life_time = i64::try_from(token.life_time()).unwrap_or(i64::MAX);

    conn.execute(
        "INSERT INTO access_tokens (identifier, value, refresh_token, life_time, obtained_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(identifier) DO UPDATE SET
             value = excluded.value,
             refresh_token = excluded.refresh_token,
             life_time = excluded.life_time,
             obtained_at = excluded.obtained_at,
             updated_at = excluded.updated_at",
        params![
            identifier,
            token.value(),
            token.refresh_token(),
            life_time,
            format_timestamp(token.obtained_at()),
            format_timestamp(Utc::now()),
        ],
    )
    .map_err(to_domain)?;
    Ok(())
}

type TokenRow = (String, String, i64, String);

fn map_token_row(row: &Row<'_>) -> rusqlite::Result<TokenRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}
