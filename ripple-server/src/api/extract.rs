use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{api::ApiError, state::AppState};

/// Identity of the requesting user.
///
/// There is no real authentication layer; the `X-User-Id` header selects
/// the acting user (handy for demos and tests) and requests without it
/// act as the configured default user.
#[derive(Debug, Clone, Copy)]
pub struct Viewer(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match parts.headers.get("X-User-Id") {
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .map(Viewer)
                .ok_or_else(|| {
                    ApiError::BadRequest("Invalid X-User-Id header".to_string())
                }),
            None => Ok(Viewer(state.current_user_id)),
        }
    }
}
