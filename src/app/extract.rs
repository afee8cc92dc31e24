use axum::extract::{Form, FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use serde::de::DeserializeOwned;

use super::response::ApiError;

/// Body extractor that accepts both `application/json` and
/// `application/x-www-form-urlencoded`, picked by `Content-Type`.
#[derive(Debug, Clone)]
pub struct JsonOrForm<T>(pub T);

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mime = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_default();

        match mime.as_str() {
            "application/json" => {
                let Json(value) = Json::<T>::from_request(request, state)
                    .await
                    .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

                Ok(JsonOrForm(value))
            }
            "application/x-www-form-urlencoded" => {
                let Form(value) = Form::<T>::from_request(request, state)
                    .await
                    .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

                Ok(JsonOrForm(value))
            }
            other => Err(ApiError::UnsupportedMediaType(other.to_owned())),
        }
    }
}
