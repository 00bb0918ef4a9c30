//! Article image endpoints.
//!
//! Images live as blobs in the database, so serving one is a straight
//! repository read with the stored content type echoed back.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;

use super::middleware::{ApiError, AppState, AuthenticatedUser};
use super::responses::article_image_url;

#[derive(Debug, Serialize)]
pub struct UploadedImageResponse {
    pub file_name: String,
    pub image_url: String,
}

/// GET /api/article-images/{file_name}
pub async fn get_article_image(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response, ApiError> {
    let file = state.file_service.get(&file_name).await?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, file.content_type)],
        file.content,
    )
        .into_response())
}

/// POST /api/article-images
///
/// Accepts one multipart part named `file`; the part's file name becomes
/// the storage key after normalization.
pub async fn upload_article_image(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadedImageResponse>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation_error(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::validation_error("File name is required"))?;
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let content = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation_error(format!("Failed to read file: {}", e)))?
            .to_vec();

        let stored = state
            .file_service
            .put(&file_name, content_type, content, Some(&user.user_id))
            .await?;

        let image_url = article_image_url(state.public_url.as_deref(), &stored.file_name);
        return Ok((
            StatusCode::CREATED,
            Json(UploadedImageResponse {
                file_name: stored.file_name,
                image_url,
            }),
        ));
    }

    Err(ApiError::validation_error(
        "Multipart field 'file' is required",
    ))
}
