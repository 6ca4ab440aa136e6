//! Conversions from external infrastructure errors into domain errors.

use r2d2::Error as PoolError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use serde_json::Error as JsonError;
use snaptrack_domain::SnaptrackError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SnaptrackError);

impl From<InfraError> for SnaptrackError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SnaptrackError> for InfraError {
    fn from(value: SnaptrackError) -> Self {
        Self(value)
    }
}

trait IntoSnaptrackError {
    fn into_snaptrack(self) -> SnaptrackError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → SnaptrackError */
/* -------------------------------------------------------------------------- */

impl IntoSnaptrackError for SqlError {
    fn into_snaptrack(self) -> SnaptrackError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => SnaptrackError::Store("store is busy".into()),
                    ErrorCode::DatabaseLocked => SnaptrackError::Store("store is locked".into()),
                    ErrorCode::NotADatabase => {
                        SnaptrackError::Store("store file is not a sqlite database".into())
                    }
                    ErrorCode::ReadOnly => SnaptrackError::Store("store is read-only".into()),
                    _ => SnaptrackError::Store(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => SnaptrackError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                SnaptrackError::Store(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                SnaptrackError::Store(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => SnaptrackError::Config(format!(
                "invalid store path: {}",
                path.to_string_lossy()
            )),
            other => SnaptrackError::Store(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        Self(value.into_snaptrack())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → SnaptrackError */
/* -------------------------------------------------------------------------- */

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        Self(SnaptrackError::Store(format!("connection pool: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → SnaptrackError */
/* -------------------------------------------------------------------------- */

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        Self(SnaptrackError::Internal(format!("invalid JSON: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SnaptrackError */
/* -------------------------------------------------------------------------- */

impl IntoSnaptrackError for HttpError {
    fn into_snaptrack(self) -> SnaptrackError {
        if self.is_timeout() {
            return SnaptrackError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return SnaptrackError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            return status_error(status, None);
        }

        if self.is_decode() {
            return SnaptrackError::Network(format!("invalid HTTP response body: {self}"));
        }

        SnaptrackError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_snaptrack())
    }
}

/// Map a non-success HTTP status (plus optional response body) to a domain
/// error.
pub fn status_error(status: reqwest::StatusCode, body: Option<&str>) -> SnaptrackError {
    let code = status.as_u16();
    let mut message = format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));
    if let Some(body) = body.map(str::trim).filter(|body| !body.is_empty()) {
        message.push_str(": ");
        message.push_str(body);
    }

    match code {
        401 | 403 => SnaptrackError::Auth(message),
        404 => SnaptrackError::NotFound(message),
        400..=499 if code != 408 && code != 429 => SnaptrackError::InvalidInput(message),
        _ => SnaptrackError::Network(message),
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
