//! # Vehicle Repository
//!
//! Database operations for transport vehicles. Vehicles carry no address,
//! so there is no registry reconciliation here; the policy concern is the
//! chassis and engine numbers, which freeze once a registration document
//! references the VIN.

use sqlx::SqlitePool;
use tracing::debug;

use vreg_core::paging::{ListParams, Page};
use vreg_core::policy::{frozen_violation, EntityKind};
use vreg_core::{TransportVehicle, VehicleUpdate};

use crate::error::{DbError, DbResult};
use crate::listing::ListQuery;

/// Repository for vehicle database operations.
#[derive(Debug, Clone)]
pub struct VehicleRepository {
    pool: SqlitePool,
}

impl VehicleRepository {
    /// Sortable fields: wire name → column.
    pub const SORT_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("vin", "vin"),
        ("brand", "brand"),
        ("model", "model"),
        ("releaseYear", "release_year"),
        ("color", "color"),
    ];

    /// Creates a new VehicleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        VehicleRepository { pool }
    }

    /// Lists vehicles with optional substring filters on brand and model.
    pub async fn list(
        &self,
        brand: Option<&str>,
        model: Option<&str>,
        params: &ListParams,
    ) -> DbResult<Page<TransportVehicle>> {
        let order_by = params.order_by(Self::SORT_FIELDS, "vin")?;

        ListQuery::new("transport_vehicles")
            .filter("brand", brand)
            .filter("model", model)
            .fetch_page(&self.pool, params, &order_by)
            .await
    }

    /// Gets a vehicle by VIN.
    pub async fn get(&self, vin: &str) -> DbResult<Option<TransportVehicle>> {
        let vehicle =
            sqlx::query_as::<_, TransportVehicle>("SELECT * FROM transport_vehicles WHERE vin = ?1")
                .bind(vin)
                .fetch_optional(&self.pool)
                .await?;

        Ok(vehicle)
    }

    /// Adds a vehicle to the register.
    pub async fn create(&self, vehicle: &TransportVehicle) -> DbResult<TransportVehicle> {
        debug!(vin = %vehicle.vin, "Creating vehicle");

        let mut tx = self.pool.begin().await?;

        let exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM transport_vehicles WHERE vin = ?1")
                .bind(&vehicle.vin)
                .fetch_one(&mut *tx)
                .await?;
        if exists > 0 {
            return Err(DbError::duplicate("vin", &vehicle.vin));
        }

        sqlx::query(
            r#"
            INSERT INTO transport_vehicles
                (vin, brand, model, release_year, engine_number, chassis_number, color)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&vehicle.vin)
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(vehicle.release_year)
        .bind(&vehicle.engine_number)
        .bind(&vehicle.chassis_number)
        .bind(&vehicle.color)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(vehicle.clone())
    }

    /// Updates a vehicle; omitted fields keep their current value.
    ///
    /// Chassis and engine numbers are rejected while any registration
    /// document references the VIN.
    pub async fn update(&self, vin: &str, update: &VehicleUpdate) -> DbResult<TransportVehicle> {
        let mut tx = self.pool.begin().await?;

        let current =
            sqlx::query_as::<_, TransportVehicle>("SELECT * FROM transport_vehicles WHERE vin = ?1")
                .bind(vin)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found("TransportVehicle", vin))?;

        let updated = TransportVehicle {
            vin: current.vin.clone(),
            brand: update.brand.clone().unwrap_or_else(|| current.brand.clone()),
            model: update.model.clone().unwrap_or_else(|| current.model.clone()),
            release_year: update.release_year.unwrap_or(current.release_year),
            engine_number: update
                .engine_number
                .clone()
                .unwrap_or_else(|| current.engine_number.clone()),
            chassis_number: update
                .chassis_number
                .clone()
                .unwrap_or_else(|| current.chassis_number.clone()),
            color: update.color.clone().unwrap_or_else(|| current.color.clone()),
        };

        let mut touched: Vec<&str> = Vec::new();
        if updated.engine_number != current.engine_number {
            touched.push("engineNumber");
        }
        if updated.chassis_number != current.chassis_number {
            touched.push("chassisNumber");
        }

        if !touched.is_empty() {
            let documents: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM registration_docs WHERE vehicle_vin = ?1")
                    .bind(vin)
                    .fetch_one(&mut *tx)
                    .await?;
            if documents > 0 {
                if let Some(field) = frozen_violation(EntityKind::TransportVehicle, &touched) {
                    return Err(DbError::frozen(EntityKind::TransportVehicle, field));
                }
            }
        }

        sqlx::query(
            r#"
            UPDATE transport_vehicles
            SET brand = ?2, model = ?3, release_year = ?4,
                engine_number = ?5, chassis_number = ?6, color = ?7
            WHERE vin = ?1
            "#,
        )
        .bind(vin)
        .bind(&updated.brand)
        .bind(&updated.model)
        .bind(updated.release_year)
        .bind(&updated.engine_number)
        .bind(&updated.chassis_number)
        .bind(&updated.color)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Deletes a vehicle from the register.
    ///
    /// The foreign key from registration documents blocks deletion while
    /// any document references the VIN.
    pub async fn delete(&self, vin: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM transport_vehicles WHERE vin = ?1")
            .bind(vin)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TransportVehicle", vin));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
