// handlers/protected/auth/me.rs - GET /api/auth/me handler

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::database::UserProfile;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::server::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: UserProfile,
}

/// GET /api/auth/me - Current user for the bearer token
///
/// The route guard has already verified the token; a token whose user has
/// since disappeared yields 404.
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<MeResponse>> {
    let user = state.users.find_by_id(auth.user_id).await?.ok_or_else(|| {
        tracing::info!("Token user {} no longer exists", auth.user_id);
        ApiError::not_found("User not found")
    })?;

    Ok(Json(MeResponse {
        user: UserProfile::from(&user),
    }))
}
