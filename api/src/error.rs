use alert_engine::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use indexer::KeyError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidPrivateKey(#[from] KeyError),

    #[error("{0}")]
    Reminder(#[from] StoreError),

    #[error("balance source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("HEDERA_ACCOUNT_ID is not configured")]
    HederaNotConfigured,

    #[error("hedera mirror node lookup failed: {0}")]
    HederaUpstream(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::InvalidPrivateKey(_) => (StatusCode::BAD_REQUEST, "INVALID_PRIVATE_KEY"),
            ApiError::Reminder(StoreError::UnknownCondition(_)) => {
                (StatusCode::BAD_REQUEST, "UNKNOWN_CONDITION")
            }
            ApiError::Reminder(StoreError::EmptyRecipient) => {
                (StatusCode::BAD_REQUEST, "INVALID_RECIPIENT")
            }
            ApiError::SourceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SOURCE_UNAVAILABLE"),
            ApiError::HederaNotConfigured => {
                (StatusCode::SERVICE_UNAVAILABLE, "HEDERA_NOT_CONFIGURED")
            }
            ApiError::HederaUpstream(_) => (StatusCode::BAD_GATEWAY, "HEDERA_UPSTREAM"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, error_code = code, "request failed");
        } else {
            tracing::warn!(error = %self, error_code = code, "request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use domain::UnknownCondition;

    use super::*;

    #[test]
    fn codes_per_variant() {
        let bad_key = ApiError::from(KeyError::NonHex);
        assert_eq!(
            bad_key.status_and_code(),
            (StatusCode::BAD_REQUEST, "INVALID_PRIVATE_KEY")
        );
        let unknown = ApiError::from(StoreError::from(UnknownCondition("x".to_string())));
        assert_eq!(
            unknown.status_and_code(),
            (StatusCode::BAD_REQUEST, "UNKNOWN_CONDITION")
        );
        assert_eq!(unknown.to_string(), "unknown condition 'x'");
        assert_eq!(
            ApiError::HederaUpstream("status 500".to_string()).status_and_code(),
            (StatusCode::BAD_GATEWAY, "HEDERA_UPSTREAM")
        );
    }
}
