//! Legal-entity routes. Mirrors the person routes with a tax number as
//! the business key.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use vreg_core::paging::{ListParams, Page};
use vreg_core::validation;
use vreg_core::{LegalEntity, LegalEntityUpdate, Role};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route(
            "/{tax_number}",
            get(get_one).put(update).patch(update).delete(remove),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityFilter {
    pub company_name: Option<String>,
    pub address: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<EntityFilter>,
) -> ApiResult<Json<Page<LegalEntity>>> {
    caller.require(Role::Employee)?;

    let page = state
        .db
        .legal_entities()
        .list(filter.company_name.as_deref(), filter.address.as_deref(), &params)
        .await?;

    Ok(Json(page))
}

async fn get_one(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(tax_number): Path<String>,
) -> ApiResult<Json<LegalEntity>> {
    caller.require_party_access(&tax_number)?;

    let entity = state
        .db
        .legal_entities()
        .get(&tax_number)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("LegalEntity not found: {}", tax_number)))?;

    Ok(Json(entity))
}

async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(entity): Json<LegalEntity>,
) -> ApiResult<(StatusCode, Json<LegalEntity>)> {
    caller.require(Role::Employee)?;

    validation::validate_tax_number(&entity.tax_number)?;
    validation::validate_name("companyName", &entity.company_name)?;
    validation::validate_address(&entity.address)?;

    let created = state.db.legal_entities().create(&entity).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(tax_number): Path<String>,
    Json(update): Json<LegalEntityUpdate>,
) -> ApiResult<Json<LegalEntity>> {
    caller.require(Role::Employee)?;

    if let Some(company_name) = &update.company_name {
        validation::validate_name("companyName", company_name)?;
    }
    if let Some(address) = &update.address {
        validation::validate_address(address)?;
    }

    let updated = state.db.legal_entities().update(&tax_number, &update).await?;
    Ok(Json(updated))
}

async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(tax_number): Path<String>,
) -> ApiResult<StatusCode> {
    caller.require(Role::Employee)?;

    state.db.legal_entities().delete(&tax_number).await?;
    Ok(StatusCode::NO_CONTENT)
}
