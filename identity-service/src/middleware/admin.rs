use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::AppState;

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    // Check for X-Admin-Api-Key header
    let api_key = headers
        .get("x-admin-api-key")
        .and_then(|value| value.to_str().ok());

    let authorized = api_key.is_some_and(|key| {
        key.as_bytes()
            .ct_eq(state.config.security.admin_api_key.as_bytes())
            .into()
    });

    if authorized {
        next.run(request).await
    } else {
        tracing::warn!("Failed admin authentication attempt");
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized: Invalid or missing admin API key" })),
        )
            .into_response()
    }
}
