//! Menu handler.

use axum::{extract::State, Json};
use uuid::Uuid;

use crate::middleware::AuthSession;
use crate::models::MenuTreeNode;
use crate::AppState;
use service_core::error::AppError;

/// Menu tree for the authenticated caller's role.
///
/// GET /menu
#[utoipa::path(
    get,
    path = "/menu",
    responses(
        (status = 200, description = "Ordered menu tree for the caller's role", body = [MenuTreeNode]),
        (status = 401, description = "Missing, malformed, expired, or invalid session token"),
        (status = 503, description = "Store unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn get_menu(
    State(state): State<AppState>,
    AuthSession(claims): AuthSession,
) -> Result<Json<Vec<MenuTreeNode>>, AppError> {
    let role_id = Uuid::parse_str(&claims.rid)
        .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("Invalid role in token")))?;

    let tree = state.menu.menu_for_role(role_id).await?;
    Ok(Json(tree))
}
