//! Employee routes. Reads require the employee role; writes are
//! admin-only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use vreg_core::paging::{ListParams, Page};
use vreg_core::validation;
use vreg_core::{Employee, EmployeeUpdate, Role};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route(
            "/{badge_number}",
            get(get_one).put(update).patch(update).delete(remove),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeFilter {
    pub last_name: Option<String>,
    pub post: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<EmployeeFilter>,
) -> ApiResult<Json<Page<Employee>>> {
    caller.require(Role::Employee)?;

    let page = state
        .db
        .employees()
        .list(filter.last_name.as_deref(), filter.post.as_deref(), &params)
        .await?;

    Ok(Json(page))
}

async fn get_one(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(badge_number): Path<String>,
) -> ApiResult<Json<Employee>> {
    caller.require(Role::Employee)?;

    let employee = state
        .db
        .employees()
        .get(&badge_number)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Employee not found: {}", badge_number)))?;

    Ok(Json(employee))
}

async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(employee): Json<Employee>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    caller.require(Role::Admin)?;

    validation::validate_identifier("badgeNumber", &employee.badge_number)?;
    validation::validate_name("lastName", &employee.last_name)?;
    validation::validate_name("firstName", &employee.first_name)?;
    validation::validate_name("post", &employee.post)?;

    let created = state.db.employees().create(&employee).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(badge_number): Path<String>,
    Json(update): Json<EmployeeUpdate>,
) -> ApiResult<Json<Employee>> {
    caller.require(Role::Admin)?;

    if let Some(last_name) = &update.last_name {
        validation::validate_name("lastName", last_name)?;
    }
    if let Some(first_name) = &update.first_name {
        validation::validate_name("firstName", first_name)?;
    }
    if let Some(post) = &update.post {
        validation::validate_name("post", post)?;
    }

    let updated = state.db.employees().update(&badge_number, &update).await?;
    Ok(Json(updated))
}

async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(badge_number): Path<String>,
) -> ApiResult<StatusCode> {
    caller.require(Role::Admin)?;

    state.db.employees().delete(&badge_number).await?;
    Ok(StatusCode::NO_CONTENT)
}
