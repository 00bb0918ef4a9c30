//! Article endpoints: listing, retrieval, authoring, comments and
//! reaction counters.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use super::middleware::{ApiError, AppState, AuthenticatedUser};
use super::responses::ArticleResponse;
use crate::models::{CreateArticleInput, UpdateArticleInput};

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub comment_text: String,
    #[serde(default)]
    pub parent_comment_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReactionsRequest {
    pub article_likes: i64,
    pub article_dislikes: i64,
}

/// GET /api/articles
pub async fn list_articles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ArticleResponse>>, ApiError> {
    let articles = state.article_service.list().await?;
    let responses = articles
        .into_iter()
        .map(|article| ArticleResponse::from_article(article, state.public_url.as_deref()))
        .collect();
    Ok(Json(responses))
}

/// GET /api/articles/{id}
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = state.article_service.get(&id).await?;
    Ok(Json(ArticleResponse::from_article(
        article,
        state.public_url.as_deref(),
    )))
}

/// POST /api/articles
pub async fn create_article(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<CreateArticleInput>,
) -> Result<(StatusCode, Json<ArticleResponse>), ApiError> {
    let article = state
        .article_service
        .create(body, Some(&user.user_id))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ArticleResponse::from_article(
            article,
            state.public_url.as_deref(),
        )),
    ))
}

/// PATCH /api/articles/{id} (PUT is routed here as well)
pub async fn update_article(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateArticleInput>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = state
        .article_service
        .update(&id, body, Some(&user.user_id))
        .await?;
    Ok(Json(ArticleResponse::from_article(
        article,
        state.public_url.as_deref(),
    )))
}

/// POST /api/articles/{id}/comments
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<crate::models::ArticleComment>), ApiError> {
    let comment = state
        .article_service
        .add_comment(
            &id,
            &body.comment_text,
            body.parent_comment_id,
            Some(&user.user_id),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PUT /api/articles/{id}/reactions
pub async fn update_reactions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateReactionsRequest>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = state
        .article_service
        .update_reactions(
            &id,
            body.article_likes,
            body.article_dislikes,
            Some(&user.user_id),
        )
        .await?;
    Ok(Json(ArticleResponse::from_article(
        article,
        state.public_url.as_deref(),
    )))
}
