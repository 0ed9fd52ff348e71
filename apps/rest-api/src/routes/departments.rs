//! Department routes. Reads require the employee role; writes are
//! admin-only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use vreg_core::paging::{ListParams, Page};
use vreg_core::validation;
use vreg_core::{Department, DepartmentUpdate, NewDepartment, Role};

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
pub struct DepartmentFilter {
    pub name: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<DepartmentFilter>,
) -> ApiResult<Json<Page<Department>>> {
    caller.require(Role::Employee)?;

    let page = state
        .db
        .departments()
        .list(filter.name.as_deref(), &params)
        .await?;

    Ok(Json(page))
}

async fn get_one(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Department>> {
    caller.require(Role::Employee)?;

    let department = state
        .db
        .departments()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Department not found: {}", id)))?;

    Ok(Json(department))
}

async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(new): Json<NewDepartment>,
) -> ApiResult<(StatusCode, Json<Department>)> {
    caller.require(Role::Admin)?;

    validation::validate_name("name", &new.name)?;
    validation::validate_address(&new.address)?;

    let created = state.db.departments().create(&new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Json(update): Json<DepartmentUpdate>,
) -> ApiResult<Json<Department>> {
    caller.require(Role::Admin)?;

    if let Some(name) = &update.name {
        validation::validate_name("name", name)?;
    }
    if let Some(address) = &update.address {
        validation::validate_address(address)?;
    }

    let updated = state.db.departments().update(&id, &update).await?;
    Ok(Json(updated))
}

async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    caller.require(Role::Admin)?;

    state.db.departments().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
