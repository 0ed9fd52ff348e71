//! Natural-person routes.
//!
//! Employees manage all persons; a citizen may read (only) the person
//! record their account is linked to.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use vreg_core::paging::{ListParams, Page};
use vreg_core::validation;
use vreg_core::{NaturalPerson, PersonUpdate, Role};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route(
            "/{passport}",
            get(get_one).put(update).patch(update).delete(remove),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonFilter {
    pub last_name: Option<String>,
    pub address: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<PersonFilter>,
) -> ApiResult<Json<Page<NaturalPerson>>> {
    caller.require(Role::Employee)?;

    let page = state
        .db
        .persons()
        .list(filter.last_name.as_deref(), filter.address.as_deref(), &params)
        .await?;

    Ok(Json(page))
}

async fn get_one(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(passport): Path<String>,
) -> ApiResult<Json<NaturalPerson>> {
    caller.require_party_access(&passport)?;

    let person = state
        .db
        .persons()
        .get(&passport)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("NaturalPerson not found: {}", passport)))?;

    Ok(Json(person))
}

async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(person): Json<NaturalPerson>,
) -> ApiResult<(StatusCode, Json<NaturalPerson>)> {
    caller.require(Role::Employee)?;

    validation::validate_passport(&person.passport)?;
    validation::validate_name("lastName", &person.last_name)?;
    validation::validate_name("firstName", &person.first_name)?;
    if let Some(middle_name) = &person.middle_name {
        validation::validate_name("middleName", middle_name)?;
    }
    validation::validate_address(&person.address)?;

    let created = state.db.persons().create(&person).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(passport): Path<String>,
    Json(update): Json<PersonUpdate>,
) -> ApiResult<Json<NaturalPerson>> {
    caller.require(Role::Employee)?;

    if let Some(last_name) = &update.last_name {
        validation::validate_name("lastName", last_name)?;
    }
    if let Some(first_name) = &update.first_name {
        validation::validate_name("firstName", first_name)?;
    }
    if let Some(middle_name) = &update.middle_name {
        validation::validate_name("middleName", middle_name)?;
    }
    if let Some(address) = &update.address {
        validation::validate_address(address)?;
    }

    let updated = state.db.persons().update(&passport, &update).await?;
    Ok(Json(updated))
}

async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(passport): Path<String>,
) -> ApiResult<StatusCode> {
    caller.require(Role::Employee)?;

    state.db.persons().delete(&passport).await?;
    Ok(StatusCode::NO_CONTENT)
}
