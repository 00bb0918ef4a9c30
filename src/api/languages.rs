//! Language metadata endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::middleware::{ApiError, AppState, AuthenticatedUser};
use super::responses::LanguageResponse;
use crate::models::{CreateLanguageInput, UpdateLanguageInput};

/// GET /api/languages
pub async fn list_languages(
    State(state): State<AppState>,
) -> Result<Json<Vec<LanguageResponse>>, ApiError> {
    let languages = state.language_service.list().await?;
    Ok(Json(languages.into_iter().map(Into::into).collect()))
}

/// GET /api/languages/{id}
pub async fn get_language(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LanguageResponse>, ApiError> {
    let language = state.language_service.get(&id).await?;
    Ok(Json(language.into()))
}

/// POST /api/languages
pub async fn create_language(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<CreateLanguageInput>,
) -> Result<(StatusCode, Json<LanguageResponse>), ApiError> {
    let language = state
        .language_service
        .create(body, Some(&user.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(language.into())))
}

/// PATCH /api/languages/{id}
pub async fn update_language(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateLanguageInput>,
) -> Result<Json<LanguageResponse>, ApiError> {
    let language = state
        .language_service
        .update(&id, body, Some(&user.user_id))
        .await?;
    Ok(Json(language.into()))
}

/// DELETE /api/languages/{id}
pub async fn delete_language(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.language_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
