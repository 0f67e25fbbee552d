//! Conversions from external infrastructure errors into domain errors.

use extraction_domain::ExtractionError;
use r2d2::Error as PoolError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use serde_json::Error as JsonError;
use toml::de::Error as TomlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ExtractionError);

impl From<InfraError> for ExtractionError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ExtractionError> for InfraError {
    fn from(value: ExtractionError) -> Self {
        Self(value)
    }
}

trait IntoExtractionError {
    fn into_extraction_error(self) -> ExtractionError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → ExtractionError */
/* -------------------------------------------------------------------------- */

impl IntoExtractionError for SqlError {
    fn into_extraction_error(self) -> ExtractionError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        ExtractionError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        ExtractionError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        ExtractionError::Database("unique constraint violation".into())
                    }
                    _ => ExtractionError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => ExtractionError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                ExtractionError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                ExtractionError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => ExtractionError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => ExtractionError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        Self(value.into_extraction_error())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → ExtractionError */
/* -------------------------------------------------------------------------- */

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        Self(ExtractionError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ExtractionError */
/* -------------------------------------------------------------------------- */

impl IntoExtractionError for HttpError {
    fn into_extraction_error(self) -> ExtractionError {
        if self.is_timeout() {
            return ExtractionError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return ExtractionError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_builder() {
            return ExtractionError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => ExtractionError::Auth(message),
                404 => ExtractionError::NotFound(message),
                400..=499 => ExtractionError::InvalidInput(message),
                _ => ExtractionError::Network(message),
            };
        }

        ExtractionError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_extraction_error())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / toml → ExtractionError */
/* -------------------------------------------------------------------------- */

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        Self(ExtractionError::Internal(format!("JSON serialization failed: {value}")))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        Self(ExtractionError::Config(format!("Invalid TOML format: {value}")))
    }
}

/// Shorthand for `map_err` closures in adapters.
pub(crate) fn to_domain<E>(err: E) -> ExtractionError
where
    InfraError: From<E>,
{
    ExtractionError::from(InfraError::from(err))
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
