//! Owner-registry routes. The registry is maintained by the database
//! layer's reconciliation routine, so the API exposes it read-only.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use vreg_core::paging::{ListParams, Page};
use vreg_core::{Owner, Role};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerFilter {
    pub address: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<OwnerFilter>,
) -> ApiResult<Json<Page<Owner>>> {
    caller.require(Role::Employee)?;

    let page = state
        .db
        .owners()
        .list(filter.address.as_deref(), &params)
        .await?;

    Ok(Json(page))
}
