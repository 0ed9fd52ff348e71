//! Authentication routes: login and caller introspection.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vreg_core::User;

use crate::auth::{verify_password, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

/// Exchange email + password for a JWT.
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state.db.users().get_by_email(&request.email).await?;

    // Same rejection for unknown email and wrong password.
    let user = match user {
        Some(user) if verify_password(&request.password, &user.password_hash) => user,
        _ => {
            warn!(email = %request.email, "Failed login attempt");
            return Err(ApiError::Unauthorized("Invalid email or password".to_string()));
        }
    };

    let token = state.jwt.issue(&user)?;
    info!(user_id = %user.id, role = ?user.role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        expires_in: state.jwt.lifetime_secs(),
        user,
    }))
}

/// Return the account behind the presented token.
async fn me(State(state): State<AppState>, caller: AuthUser) -> ApiResult<Json<User>> {
    let user = state
        .db
        .users()
        .get(&caller.id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(Json(user))
}
