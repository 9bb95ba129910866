use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    api::{extract::Viewer, ApiError, ApiResult},
    state::AppState,
};
use ripple_types::{
    Comment, CommentWithAuthor, CreateCommentRequest, CreatePostRequest, FieldError, LikeResponse,
    MessageResponse, NewComment, NewLike, NewPost, PostWithAuthor, PostWithDetails,
};

const MAX_CONTENT_LENGTH: usize = 500;

#[derive(Deserialize)]
pub struct FeedQuery {
    #[serde(default = "default_feed_limit")]
    limit: usize,
    #[serde(default)]
    offset: usize,
}

fn default_feed_limit() -> usize {
    10
}

fn validate_content(content: &str, field: &str) -> Result<(), FieldError> {
    if content.trim().is_empty() {
        return Err(FieldError::new(field, "Content cannot be empty"));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(FieldError::new(
            field,
            format!("Content must be at most {MAX_CONTENT_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// GET /api/feed - Posts by the viewer and everyone they follow
pub async fn get_feed(
    State(state): State<AppState>,
    Viewer(user_id): Viewer,
    Query(query): Query<FeedQuery>,
) -> ApiResult<Json<Vec<PostWithAuthor>>> {
    let posts = state
        .storage
        .get_feed_posts(user_id, query.limit, query.offset)?;
    Ok(Json(posts))
}

/// POST /api/posts - Create a post authored by the viewer
pub async fn create_post(
    State(state): State<AppState>,
    Viewer(author_id): Viewer,
    Json(body): Json<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<PostWithAuthor>)> {
    if let Err(field_error) = validate_content(&body.content, "content") {
        return Err(ApiError::Validation {
            message: "Invalid post data".to_string(),
            errors: vec![field_error],
        });
    }

    let post = state.storage.create_post(NewPost {
        author_id,
        content: body.content,
        image_url: body.image_url,
    })?;
    let post_with_author = state
        .storage
        .get_post_with_author(post.id, Some(author_id))?
        .ok_or_else(|| ApiError::InternalError("Created post vanished".to_string()))?;

    Ok((StatusCode::CREATED, Json(post_with_author)))
}

/// GET /api/posts/:id - Post with author and comments
pub async fn get_post(
    State(state): State<AppState>,
    Viewer(viewer_id): Viewer,
    Path(post_id): Path<i64>,
) -> ApiResult<Json<PostWithDetails>> {
    let post = state
        .storage
        .get_post_with_details(post_id, Some(viewer_id))?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;
    Ok(Json(post))
}

/// DELETE /api/posts/:id - Author-only delete
pub async fn delete_post(
    State(state): State<AppState>,
    Viewer(user_id): Viewer,
    Path(post_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.storage.delete_post(post_id, user_id)? {
        return Err(ApiError::NotFound(
            "Post not found or unauthorized".to_string(),
        ));
    }
    Ok(Json(MessageResponse {
        message: "Post deleted successfully".to_string(),
    }))
}

/// POST /api/posts/:id/like
pub async fn like_post(
    State(state): State<AppState>,
    Viewer(user_id): Viewer,
    Path(post_id): Path<i64>,
) -> ApiResult<(StatusCode, Json<LikeResponse>)> {
    let like = state.storage.like_post(NewLike { user_id, post_id })?;
    Ok((
        StatusCode::CREATED,
        Json(LikeResponse {
            message: "Post liked successfully".to_string(),
            like,
        }),
    ))
}

/// DELETE /api/posts/:id/like
pub async fn unlike_post(
    State(state): State<AppState>,
    Viewer(user_id): Viewer,
    Path(post_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.storage.unlike_post(user_id, post_id)? {
        return Err(ApiError::NotFound("Like not found".to_string()));
    }
    Ok(Json(MessageResponse {
        message: "Post unliked successfully".to_string(),
    }))
}

/// GET /api/posts/:id/comments - Comments on a post, oldest first
pub async fn get_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> ApiResult<Json<Vec<CommentWithAuthor>>> {
    let comments = state.storage.get_post_comments(post_id)?;
    Ok(Json(comments))
}

/// POST /api/posts/:id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Viewer(user_id): Viewer,
    Path(post_id): Path<i64>,
    Json(body): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    if let Err(field_error) = validate_content(&body.content, "content") {
        return Err(ApiError::Validation {
            message: "Invalid comment data".to_string(),
            errors: vec![field_error],
        });
    }

    let comment = state.storage.create_comment(NewComment {
        user_id,
        post_id,
        content: body.content,
    })?;
    Ok((StatusCode::CREATED, Json(comment)))
}
