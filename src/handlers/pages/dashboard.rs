use axum::{extract::OriginalUri, http::HeaderMap, Json};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::middleware::USER_ID_HEADER;

/// GET /dashboard[/*] - server-rendered entry for the authenticated area.
///
/// Reads the identity the gatekeeper forwarded in `x-user-id`.
pub async fn dashboard(OriginalUri(uri): OriginalUri, headers: HeaderMap) -> ApiResult<Json<Value>> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    Ok(Json(json!({
        "page": uri.path(),
        "userId": user_id,
    })))
}
