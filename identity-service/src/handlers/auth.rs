//! Authentication handlers.
//!
//! The login endpoint maps [`LoginOutcome`] values onto the wire contract:
//! unknown-username and wrong-password attempts produce byte-identical
//! responses, locked accounts report how long to wait, inactive accounts are
//! refused outright.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::IdentitySummary;
use crate::services::LoginOutcome;
use crate::utils::ValidatedJson;
use crate::AppState;
use service_core::error::AppError;

/// Login request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64, message = "Username is required"))]
    #[schema(example = "alice")]
    pub username: String,

    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    #[schema(example = "password123")]
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginSuccess {
    pub success: bool,
    pub token: String,
    pub user: IdentitySummary,
}

/// Refused login response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginRefused {
    pub success: bool,
    #[schema(example = "invalid_credentials")]
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
}

fn refused(status: StatusCode, reason: &str, retry_after_seconds: Option<u64>) -> Response {
    let body = LoginRefused {
        success: false,
        reason: reason.to_string(),
        retry_after_seconds,
    };
    let mut response = (status, Json(body)).into_response();
    if let Some(secs) = retry_after_seconds {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, secs.into());
    }
    response
}

/// Authenticate with username and password.
///
/// POST /auth/login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated; session token issued", body = LoginSuccess),
        (status = 401, description = "Unknown username or wrong password", body = LoginRefused),
        (status = 403, description = "Account is inactive", body = LoginRefused),
        (status = 423, description = "Account is locked; retry after the reported delay", body = LoginRefused),
        (status = 503, description = "Credential store unavailable")
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Response, AppError> {
    let outcome = state.auth.login(&req.username, &req.password).await?;

    Ok(match outcome {
        LoginOutcome::Success { token, identity } => (
            StatusCode::OK,
            Json(LoginSuccess {
                success: true,
                token,
                user: identity,
            }),
        )
            .into_response(),
        LoginOutcome::InvalidCredentials => {
            refused(StatusCode::UNAUTHORIZED, "invalid_credentials", None)
        }
        LoginOutcome::Locked { retry_after } => refused(
            StatusCode::LOCKED,
            "locked",
            Some(retry_after.num_seconds().max(0) as u64),
        ),
        LoginOutcome::Inactive => refused(StatusCode::FORBIDDEN, "inactive", None),
    })
}
