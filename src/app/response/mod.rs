use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub use keel_core::response::Message;

/// Error type for HTTP handlers. Every variant renders as a JSON
/// [`Message`] with the matching status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("unsupported media type `{0}`")]
    UnsupportedMediaType(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let text = match &self {
            ApiError::Internal(err) => {
                tracing::error!(error = ?err, "request failed");
                "an internal error occurred".to_owned()
            }
            ApiError::Unavailable(reason) | ApiError::Upstream(reason) => {
                tracing::warn!(%reason, "dependency unavailable");
                self.to_string()
            }
            _ => self.to_string(),
        };

        keel_core::response::message(status, text)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_are_sanitized() {
        let response = ApiError::Internal(anyhow::anyhow!("password=hunter2")).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn statuses_follow_the_variant() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Validation("x".into()).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ApiError::UnsupportedMediaType("text/plain".into()).status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(ApiError::Upstream("timeout".into()).status(), StatusCode::BAD_GATEWAY);
    }
}
