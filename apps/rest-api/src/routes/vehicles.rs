//! Vehicle routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use vreg_core::paging::{ListParams, Page};
use vreg_core::validation;
use vreg_core::{Role, TransportVehicle, VehicleUpdate};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{vin}", get(get_one).put(update).patch(update).delete(remove))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleFilter {
    pub brand: Option<String>,
    pub model: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<VehicleFilter>,
) -> ApiResult<Json<Page<TransportVehicle>>> {
    caller.require(Role::Employee)?;

    let page = state
        .db
        .vehicles()
        .list(filter.brand.as_deref(), filter.model.as_deref(), &params)
        .await?;

    Ok(Json(page))
}

async fn get_one(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(vin): Path<String>,
) -> ApiResult<Json<TransportVehicle>> {
    caller.require(Role::Employee)?;

    let vehicle = state
        .db
        .vehicles()
        .get(&vin)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("TransportVehicle not found: {}", vin)))?;

    Ok(Json(vehicle))
}

async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(vehicle): Json<TransportVehicle>,
) -> ApiResult<(StatusCode, Json<TransportVehicle>)> {
    caller.require(Role::Employee)?;

    validation::validate_vin(&vehicle.vin)?;
    validation::validate_name("brand", &vehicle.brand)?;
    validation::validate_name("model", &vehicle.model)?;
    validation::validate_release_year(vehicle.release_year)?;
    validation::validate_identifier("engineNumber", &vehicle.engine_number)?;
    validation::validate_identifier("chassisNumber", &vehicle.chassis_number)?;
    validation::validate_name("color", &vehicle.color)?;

    let created = state.db.vehicles().create(&vehicle).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(vin): Path<String>,
    Json(update): Json<VehicleUpdate>,
) -> ApiResult<Json<TransportVehicle>> {
    caller.require(Role::Employee)?;

    if let Some(brand) = &update.brand {
        validation::validate_name("brand", brand)?;
    }
    if let Some(model) = &update.model {
        validation::validate_name("model", model)?;
    }
    if let Some(year) = update.release_year {
        validation::validate_release_year(year)?;
    }
    if let Some(engine_number) = &update.engine_number {
        validation::validate_identifier("engineNumber", engine_number)?;
    }
    if let Some(chassis_number) = &update.chassis_number {
        validation::validate_identifier("chassisNumber", chassis_number)?;
    }
    if let Some(color) = &update.color {
        validation::validate_name("color", color)?;
    }

    let updated = state.db.vehicles().update(&vin, &update).await?;
    Ok(Json(updated))
}

async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(vin): Path<String>,
) -> ApiResult<StatusCode> {
    caller.require(Role::Employee)?;

    state.db.vehicles().delete(&vin).await?;
    Ok(StatusCode::NO_CONTENT)
}
