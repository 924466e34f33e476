//! Administrative handlers.
//!
//! Operator tooling over the same credential store the authenticator uses;
//! guarded by the admin API key middleware, not by session tokens.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;
use service_core::error::AppError;

/// Unlock response.
#[derive(Debug, Serialize, ToSchema)]
pub struct UnlockResponse {
    pub username: String,
    /// Failed-attempt count before the reset (0 when already clear).
    pub cleared_attempts: i32,
    /// Whether an unexpired lock stood when the reset ran.
    pub was_locked: bool,
    pub message: String,
}

/// Reset an identity's failed-attempt counter and clear its lock.
///
/// POST /admin/identities/{username}/unlock
///
/// Idempotent: repeating the call reports zero cleared attempts.
#[utoipa::path(
    post,
    path = "/admin/identities/{username}/unlock",
    params(("username" = String, Path, description = "Username of the identity to unlock")),
    responses(
        (status = 200, description = "Lockout state cleared", body = UnlockResponse),
        (status = 401, description = "Missing or invalid admin API key"),
        (status = 404, description = "No identity with that username"),
        (status = 503, description = "Store unavailable")
    ),
    security(("admin_api_key" = [])),
    tag = "Admin"
)]
pub async fn unlock_identity(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UnlockResponse>, AppError> {
    let report = state.auth.unlock(&username).await?;

    Ok(Json(UnlockResponse {
        username: report.username,
        cleared_attempts: report.cleared_attempts,
        was_locked: report.was_locked,
        message: "Lockout state cleared".to_string(),
    }))
}
