use std::path::Path;

use axum::Json;
use axum::extract::{Multipart, State};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::app::response::{ApiError, ApiResult, Message};
use crate::state::AppState;

const MAX_EXTENSION_LEN: usize = 10;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub field: String,
    pub original_name: String,
    pub stored_name: String,
    pub content_type: Option<String>,
    pub size: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub files: Vec<StoredFile>,
}

/// Stored files get a fresh uuid name; only a short alphanumeric extension
/// survives from the client's file name.
fn stored_name(original: &str) -> String {
    let extension = Path::new(original)
        .extension()
        .and_then(|extension| extension.to_str())
        .filter(|extension| extension.len() <= MAX_EXTENSION_LEN && extension.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(extension) => format!("{}.{}", Uuid::new_v4(), extension.to_ascii_lowercase()),
        None => Uuid::new_v4().to_string(),
    }
}

pub struct UploadController;

#[keel_macros::controller(state = AppState)]
impl UploadController {
    #[keel_macros::post("/")]
    #[keel_macros::responds(status = 200, body = UploadResponse, description = "Files stored")]
    #[keel_macros::responds(status = 400, body = Message, description = "Malformed body or no file part")]
    pub async fn store(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult<Json<UploadResponse>> {
        let dir = &state.config.upload_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|err| ApiError::Internal(anyhow::anyhow!("cannot create {}: {err}", dir.display())))?;

        let mut files = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| ApiError::BadRequest(err.body_text()))?
        {
            let Some(original_name) = field.file_name().map(str::to_owned) else {
                continue;
            };
            let name = field.name().unwrap_or_default().to_owned();
            let content_type = field.content_type().map(str::to_owned);
            let data = field.bytes().await.map_err(|err| ApiError::BadRequest(err.body_text()))?;

            let stored_name = stored_name(&original_name);
            tokio::fs::write(dir.join(&stored_name), &data)
                .await
                .map_err(|err| ApiError::Internal(anyhow::anyhow!("cannot write {stored_name}: {err}")))?;

            tracing::info!(file = %original_name, stored = %stored_name, size = data.len(), "file uploaded");

            files.push(StoredFile {
                field: name,
                original_name,
                stored_name,
                content_type,
                size: data.len(),
            });
        }

        if files.is_empty() {
            return Err(ApiError::BadRequest("the request contains no file part".into()));
        }

        Ok(Json(UploadResponse { files }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_names_keep_safe_extensions_only() {
        assert!(stored_name("photo.PNG").ends_with(".png"));
        assert!(!stored_name("../../etc/passwd").contains('/'));
        assert!(!stored_name("archive.tar.gz;rm").contains(';'));
        assert_eq!(stored_name("no-extension").len(), 36);
    }
}
