use axum::{Json, http::StatusCode, response::IntoResponse};

/// Body of every error response and of simple acknowledgements.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Message { message: message.into() }
    }
}

/// Shorthand for a JSON `{"message": ...}` response with the given status.
pub fn message(status: StatusCode, text: impl Into<String>) -> axum::response::Response {
    (status, Json(Message::new(text))).into_response()
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    #[tokio::test]
    async fn message_serializes_status_and_body() {
        let response = message(StatusCode::NOT_FOUND, "missing");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Message = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body, Message::new("missing"));
    }
}
