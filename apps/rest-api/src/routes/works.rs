//! Works-catalog routes. Reads require the employee role; writes are
//! admin-only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use vreg_core::paging::{ListParams, Page};
use vreg_core::validation;
use vreg_core::{NewWork, Role, Work, WorkUpdate};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).patch(update).delete(remove))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkFilter {
    pub name: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<WorkFilter>,
) -> ApiResult<Json<Page<Work>>> {
    caller.require(Role::Employee)?;

    let page = state.db.works().list(filter.name.as_deref(), &params).await?;
    Ok(Json(page))
}

async fn get_one(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Work>> {
    caller.require(Role::Employee)?;

    let work = state
        .db
        .works()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Work not found: {}", id)))?;

    Ok(Json(work))
}

async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(new): Json<NewWork>,
) -> ApiResult<(StatusCode, Json<Work>)> {
    caller.require(Role::Admin)?;

    validation::validate_name("name", &new.name)?;
    validation::validate_price_cents(new.price_cents)?;

    let created = state.db.works().create(&new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Json(update): Json<WorkUpdate>,
) -> ApiResult<Json<Work>> {
    caller.require(Role::Admin)?;

    if let Some(name) = &update.name {
        validation::validate_name("name", name)?;
    }
    if let Some(price_cents) = update.price_cents {
        validation::validate_price_cents(price_cents)?;
    }

    let updated = state.db.works().update(&id, &update).await?;
    Ok(Json(updated))
}

async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    caller.require(Role::Admin)?;

    state.db.works().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
