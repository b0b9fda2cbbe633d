//! Mapping of domain errors to HTTP responses.

use std::fmt;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use devs_core::api::service::ErrorBody;
use devs_core::client::ClientError;
use devs_core::prefs::PrefsError;
use devs_core::table::TableError;
use devs_core::validation::ValidationErrors;

#[derive(Debug)]
pub(crate) enum ApiError {
    /// 422 with the failing fields.
    Validation(ValidationErrors),
    /// 502, or 404 for `ClientError::NotFound`.
    Client(ClientError),
    /// 409: the gesture conflicts with the table state.
    Table(TableError),
    /// 500: preferences could not be written.
    Prefs(PrefsError),
    BadRequest(String),
    NotFound(String),
    Unavailable(&'static str),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(e) => write!(f, "{}", e),
            ApiError::Client(e) => write!(f, "{}", e),
            ApiError::Table(e) => write!(f, "{}", e),
            ApiError::Prefs(e) => write!(f, "{}", e),
            ApiError::BadRequest(msg) => write!(f, "bad request: {}", msg),
            ApiError::NotFound(what) => write!(f, "not found: {}", what),
            ApiError::Unavailable(what) => write!(f, "unavailable: {}", what),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Client(ClientError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Client(_) => StatusCode::BAD_GATEWAY,
            ApiError::Table(_) => StatusCode::CONFLICT,
            ApiError::Prefs(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        ApiError::Validation(e)
    }
}

impl From<ClientError> for ApiError {
    fn from(e: ClientError) -> Self {
        ApiError::Client(e)
    }
}

impl From<TableError> for ApiError {
    fn from(e: TableError) -> Self {
        ApiError::Table(e)
    }
}

impl From<PrefsError> for ApiError {
    fn from(e: PrefsError) -> Self {
        ApiError::Prefs(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else if status != StatusCode::NOT_FOUND {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        let body = match self {
            ApiError::Validation(e) => ErrorBody {
                error: "validation failed".to_string(),
                fields: Some(e.errors),
            },
            other => ErrorBody {
                error: other.to_string(),
                fields: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::from(ValidationErrors::default()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(ClientError::NotFound("post x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ClientError::Graphql(vec!["boom".into()])).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(ClientError::Http {
                status: 500,
                body: String::new()
            })
            .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(TableError::SortActive).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Unavailable("x").status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
