//! Operations-journal routes. Entries are append-only; there is no
//! update endpoint.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use vreg_core::paging::{ListParams, Page};
use vreg_core::{NewRegistrationOp, RegistrationOp, Role};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).delete(remove))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationFilter {
    pub doc_number: Option<String>,
    pub employee_badge: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<OperationFilter>,
) -> ApiResult<Json<Page<RegistrationOp>>> {
    caller.require(Role::Employee)?;

    let page = state
        .db
        .operations()
        .list(
            filter.doc_number.as_deref(),
            filter.employee_badge.as_deref(),
            &params,
        )
        .await?;

    Ok(Json(page))
}

async fn get_one(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<RegistrationOp>> {
    caller.require(Role::Employee)?;

    let op = state
        .db
        .operations()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("RegistrationOp not found: {}", id)))?;

    Ok(Json(op))
}

async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(new): Json<NewRegistrationOp>,
) -> ApiResult<(StatusCode, Json<RegistrationOp>)> {
    caller.require(Role::Employee)?;

    let created = state.db.operations().create(&new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    caller.require(Role::Admin)?;

    state.db.operations().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
