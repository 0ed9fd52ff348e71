//! Registration-document routes.
//!
//! Employees manage all documents; `/mine` gives citizen accounts the
//! documents owned by their linked party.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use vreg_core::paging::{ListParams, Page};
use vreg_core::validation;
use vreg_core::{DocUpdate, NewRegistrationDoc, RegistrationDoc, Role};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/mine", get(mine))
        .route(
            "/{reg_number}",
            get(get_one).put(update).patch(update).delete(remove),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFilter {
    pub document_owner: Option<String>,
    pub vehicle_vin: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<DocumentFilter>,
) -> ApiResult<Json<Page<RegistrationDoc>>> {
    caller.require(Role::Employee)?;

    let page = state
        .db
        .documents()
        .list(
            filter.document_owner.as_deref(),
            filter.vehicle_vin.as_deref(),
            &params,
        )
        .await?;

    Ok(Json(page))
}

/// Documents owned by the caller's linked party.
async fn mine(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<Json<Vec<RegistrationDoc>>> {
    let party_key = caller
        .party_key
        .as_deref()
        .ok_or_else(|| ApiError::Forbidden("Account is not linked to a party".to_string()))?;

    let docs = state.db.documents().list_for_party(party_key).await?;
    Ok(Json(docs))
}

async fn get_one(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(reg_number): Path<String>,
) -> ApiResult<Json<RegistrationDoc>> {
    let doc = state
        .db
        .documents()
        .get(&reg_number)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("RegistrationDoc not found: {}", reg_number)))?;

    caller.require_party_access(&doc.document_owner)?;

    Ok(Json(doc))
}

async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(new): Json<NewRegistrationDoc>,
) -> ApiResult<(StatusCode, Json<RegistrationDoc>)> {
    caller.require(Role::Employee)?;

    validation::validate_identifier("regNumber", &new.reg_number)?;
    validation::validate_vin(&new.vehicle_vin)?;
    validation::validate_address(&new.address)?;

    let created = state.db.documents().create(&new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(reg_number): Path<String>,
    Json(update): Json<DocUpdate>,
) -> ApiResult<Json<RegistrationDoc>> {
    caller.require(Role::Employee)?;

    if let Some(address) = &update.address {
        validation::validate_address(address)?;
    }

    let updated = state.db.documents().update(&reg_number, &update).await?;
    Ok(Json(updated))
}

async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(reg_number): Path<String>,
) -> ApiResult<StatusCode> {
    caller.require(Role::Employee)?;

    state.db.documents().delete(&reg_number).await?;
    Ok(StatusCode::NO_CONTENT)
}
