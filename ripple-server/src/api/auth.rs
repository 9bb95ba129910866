use axum::{extract::State, Json};

use crate::{
    api::{extract::Viewer, ApiError, ApiResult},
    state::AppState,
};
use ripple_types::User;

/// GET /api/auth/me - Profile of the acting user
pub async fn me(State(state): State<AppState>, Viewer(user_id): Viewer) -> ApiResult<Json<User>> {
    let user = state
        .storage
        .get_user(user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}
