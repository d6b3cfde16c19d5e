use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, RegisterUserRequest, UserDto};

/// POST /api/user
///
/// Upsert the caller's display profile as reported by the identity provider.
/// The identity is keyed by `(oauthProvider, oauthId)`; repeated calls
/// refresh nickname and avatar.
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let oauth_provider = payload
        .oauth_provider
        .ok_or_else(|| ApiError::validation("Missing oauthProvider"))?;
    let oauth_id = payload
        .oauth_id
        .ok_or_else(|| ApiError::validation("Missing oauthId"))?;
    let nickname = payload
        .nickname
        .ok_or_else(|| ApiError::validation("Missing nickname"))?;
    if nickname.trim().is_empty() {
        return Err(ApiError::validation("Nickname cannot be empty"));
    }
    let avatar_url = payload.avatar_url.unwrap_or_default();

    let user = state
        .store()
        .upsert_user(&oauth_provider, &oauth_id, &nickname, &avatar_url)
        .await?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}
