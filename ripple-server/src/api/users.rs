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
    FollowCheckResponse, FollowResponse, MessageResponse, NewFollow, PostWithAuthor, User,
};

#[derive(Deserialize)]
pub struct SuggestedQuery {
    #[serde(default = "default_suggested_limit")]
    limit: usize,
}

fn default_suggested_limit() -> usize {
    5
}

/// GET /api/users/suggested - Accounts the viewer may want to follow
pub async fn get_suggested_users(
    State(state): State<AppState>,
    Viewer(user_id): Viewer,
    Query(query): Query<SuggestedQuery>,
) -> ApiResult<Json<Vec<User>>> {
    let users = state.storage.get_suggested_users(user_id, query.limit)?;
    Ok(Json(users))
}

/// GET /api/users/search/:query - Substring search on name or username
pub async fn search_users(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> ApiResult<Json<Vec<User>>> {
    let users = state.storage.search_users(&query)?;
    Ok(Json(users))
}

/// GET /api/users/:id - User profile
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<User>> {
    let user = state
        .storage
        .get_user(user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

/// GET /api/users/:id/posts - Posts authored by a user, newest first
pub async fn get_user_posts(
    State(state): State<AppState>,
    Viewer(viewer_id): Viewer,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<PostWithAuthor>>> {
    let posts = state.storage.get_user_posts(user_id, Some(viewer_id))?;
    Ok(Json(posts))
}

/// POST /api/users/:id/follow - Follow a user
pub async fn follow_user(
    State(state): State<AppState>,
    Viewer(follower_id): Viewer,
    Path(following_id): Path<i64>,
) -> ApiResult<(StatusCode, Json<FollowResponse>)> {
    let follow = state.storage.follow_user(NewFollow {
        follower_id,
        following_id,
    })?;
    Ok((
        StatusCode::CREATED,
        Json(FollowResponse {
            message: "User followed successfully".to_string(),
            follow,
        }),
    ))
}

/// DELETE /api/users/:id/follow - Unfollow a user
pub async fn unfollow_user(
    State(state): State<AppState>,
    Viewer(follower_id): Viewer,
    Path(following_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.storage.unfollow_user(follower_id, following_id)? {
        return Err(ApiError::NotFound(
            "Follow relationship not found".to_string(),
        ));
    }
    Ok(Json(MessageResponse {
        message: "User unfollowed successfully".to_string(),
    }))
}

/// GET /api/users/:id/followers
pub async fn get_followers(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<User>>> {
    let followers = state.storage.get_followers(user_id)?;
    Ok(Json(followers))
}

/// GET /api/users/:id/following
pub async fn get_following(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<User>>> {
    let following = state.storage.get_following(user_id)?;
    Ok(Json(following))
}

/// GET /api/users/:id/following/check - Does the viewer follow this user?
pub async fn check_following(
    State(state): State<AppState>,
    Viewer(follower_id): Viewer,
    Path(following_id): Path<i64>,
) -> ApiResult<Json<FollowCheckResponse>> {
    let is_following = state.storage.is_following(follower_id, following_id)?;
    Ok(Json(FollowCheckResponse { is_following }))
}
