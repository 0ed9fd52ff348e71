//! User-account routes. Admin-only; passwords are hashed with argon2
//! before they reach the repository.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use vreg_core::paging::{ListParams, Page};
use vreg_core::validation;
use vreg_core::{NewUser, Role, User, UserUpdate};
use vreg_db::{build_user, UserChanges};

use crate::auth::{hash_password, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).patch(update).delete(remove))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    pub email: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<UserFilter>,
) -> ApiResult<Json<Page<User>>> {
    caller.require(Role::Admin)?;

    let page = state.db.users().list(filter.email.as_deref(), &params).await?;
    Ok(Json(page))
}

async fn get_one(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    caller.require(Role::Admin)?;

    let user = state
        .db
        .users()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {}", id)))?;

    Ok(Json(user))
}

async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(new): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    caller.require(Role::Admin)?;

    validation::validate_email(&new.email)?;
    validation::validate_password(&new.password)?;

    let user = build_user(
        new.email.clone(),
        hash_password(&new.password)?,
        new.role,
        new.party_key.clone(),
        new.employee_badge.clone(),
    );

    let created = state.db.users().create(&user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Json(update): Json<UserUpdate>,
) -> ApiResult<Json<User>> {
    caller.require(Role::Admin)?;

    if let Some(email) = &update.email {
        validation::validate_email(email)?;
    }
    let password_hash = match &update.password {
        Some(password) => {
            validation::validate_password(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let changes = UserChanges {
        email: update.email.clone(),
        password_hash,
        role: update.role,
        party_key: update.party_key.clone(),
        employee_badge: update.employee_badge.clone(),
    };

    let updated = state.db.users().update(&id, &changes).await?;
    Ok(Json(updated))
}

async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    caller.require(Role::Admin)?;

    state.db.users().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
