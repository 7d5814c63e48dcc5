use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::{Address, Rating, Ride, Role, Stop};
use crate::utils::errors::{map_db_error, AppResult};

use super::ride_store::{RideStore, RideTx};

const RIDE_COLUMNS: &str = "id, consumer_id, driver_id, date_created, date_ended";
const STOP_COLUMNS: &str = "id, ride_id, address_id, queue_order, date_created, date_ended";

pub struct PgRideStore {
    pool: PgPool,
}

impl PgRideStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RideStore for PgRideStore {
    async fn begin(&self) -> AppResult<Box<dyn RideTx>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error(e, "Error starting transaction"))?;
        Ok(Box::new(PgRideTx { tx }))
    }
}

/// Transacción PostgreSQL; si se descarta sin commit, sqlx hace rollback
pub struct PgRideTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl RideTx for PgRideTx {
    async fn lock_ride(&mut self, ride_id: Uuid) -> AppResult<Option<Ride>> {
        let query = format!("SELECT {} FROM rides WHERE id = $1 FOR UPDATE", RIDE_COLUMNS);
        sqlx::query_as::<_, Ride>(&query)
            .bind(ride_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_db_error(e, "Error locking ride"))
    }

    async fn lock_participant(&mut self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(user_id.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_db_error(e, "Error locking participant"))?;
        Ok(())
    }

    async fn find_ride(&mut self, ride_id: Uuid) -> AppResult<Option<Ride>> {
        let query = format!("SELECT {} FROM rides WHERE id = $1", RIDE_COLUMNS);
        sqlx::query_as::<_, Ride>(&query)
            .bind(ride_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_db_error(e, "Error finding ride"))
    }

    async fn find_open_ride_for(&mut self, user_id: Uuid) -> AppResult<Option<Ride>> {
        let query = format!(
            r#"
            SELECT {} FROM rides
            WHERE (consumer_id = $1 OR driver_id = $1) AND date_ended IS NULL
            ORDER BY date_created DESC
            LIMIT 1
            "#,
            RIDE_COLUMNS
        );
        sqlx::query_as::<_, Ride>(&query)
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_db_error(e, "Error finding current ride"))
    }

    async fn list_available_rides(&mut self, limit: i64) -> AppResult<Vec<Ride>> {
        let query = format!(
            r#"
            SELECT {} FROM rides
            WHERE driver_id IS NULL AND date_ended IS NULL
            ORDER BY date_created DESC
            LIMIT $1
            "#,
            RIDE_COLUMNS
        );
        sqlx::query_as::<_, Ride>(&query)
            .bind(limit)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| map_db_error(e, "Error listing available rides"))
    }

    async fn insert_ride(&mut self, ride: &Ride) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rides (id, consumer_id, driver_id, date_created, date_ended)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(ride.id)
        .bind(ride.consumer_id)
        .bind(ride.driver_id)
        .bind(ride.date_created)
        .bind(ride.date_ended)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_db_error(e, "Error creating ride"))?;
        Ok(())
    }

    async fn assign_driver(&mut self, ride_id: Uuid, driver_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE rides SET driver_id = $2
            WHERE id = $1 AND driver_id IS NULL AND date_ended IS NULL
            "#,
        )
        .bind(ride_id)
        .bind(driver_id)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_db_error(e, "Error accepting ride"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn close_ride(&mut self, ride_id: Uuid, ended_at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query("UPDATE rides SET date_ended = $2 WHERE id = $1 AND date_ended IS NULL")
            .bind(ride_id)
            .bind(ended_at)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_db_error(e, "Error closing ride"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn stops_for_ride(&mut self, ride_id: Uuid) -> AppResult<Vec<Stop>> {
        let query = format!(
            "SELECT {} FROM ride_stops WHERE ride_id = $1 ORDER BY queue_order ASC, date_created ASC",
            STOP_COLUMNS
        );
        sqlx::query_as::<_, Stop>(&query)
            .bind(ride_id)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| map_db_error(e, "Error listing stops"))
    }

    async fn find_stop(&mut self, stop_id: Uuid) -> AppResult<Option<Stop>> {
        let query = format!("SELECT {} FROM ride_stops WHERE id = $1", STOP_COLUMNS);
        sqlx::query_as::<_, Stop>(&query)
            .bind(stop_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_db_error(e, "Error finding stop"))
    }

    async fn insert_stop(&mut self, stop: &Stop) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ride_stops (id, ride_id, address_id, queue_order, date_created, date_ended)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(stop.id)
        .bind(stop.ride_id)
        .bind(stop.address_id)
        .bind(stop.order)
        .bind(stop.date_created)
        .bind(stop.date_ended)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_db_error(e, "Error creating stop"))?;
        Ok(())
    }

    async fn complete_stop(&mut self, stop_id: Uuid, ended_at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query("UPDATE ride_stops SET date_ended = $2 WHERE id = $1 AND date_ended IS NULL")
            .bind(stop_id)
            .bind(ended_at)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_db_error(e, "Error completing stop"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn set_stop_order(&mut self, stop_id: Uuid, order: i32) -> AppResult<()> {
        sqlx::query("UPDATE ride_stops SET queue_order = $2 WHERE id = $1")
            .bind(stop_id)
            .bind(order)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_db_error(e, "Error renumbering stop"))?;
        Ok(())
    }

    async fn delete_stop(&mut self, stop_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM ride_stops WHERE id = $1")
            .bind(stop_id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_db_error(e, "Error deleting stop"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn find_addresses(&mut self, ids: &[Uuid]) -> AppResult<Vec<Address>> {
        sqlx::query_as::<_, Address>(
            "SELECT id, city, district, street, name FROM addresses WHERE id = ANY($1)",
        )
        .bind(ids.to_vec())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_db_error(e, "Error finding addresses"))
    }

    async fn insert_address(&mut self, address: &Address) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO addresses (id, city, district, street, name)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(address.id)
        .bind(&address.city)
        .bind(&address.district)
        .bind(&address.street)
        .bind(&address.name)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_db_error(e, "Error creating address"))?;
        Ok(())
    }

    async fn list_addresses(&mut self, limit: i64) -> AppResult<Vec<Address>> {
        sqlx::query_as::<_, Address>(
            r#"
            SELECT id, city, district, street, name FROM addresses
            ORDER BY city, district, street, name
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_db_error(e, "Error listing addresses"))
    }

    async fn insert_rating(&mut self, rating: &Rating) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ratings (id, ride_id, author_id, target_id, target_role, rate, comment, date_created)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(rating.id)
        .bind(rating.ride_id)
        .bind(rating.author_id)
        .bind(rating.target_id)
        .bind(rating.target_role)
        .bind(rating.rate)
        .bind(&rating.comment)
        .bind(rating.date_created)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_db_error(e, "Error creating rating"))?;
        Ok(())
    }

    async fn rating_totals(&mut self, target_id: Uuid, role: Role) -> AppResult<(i64, i64)> {
        sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COALESCE(SUM(rate), 0)::BIGINT, COUNT(*)
            FROM ratings
            WHERE target_id = $1 AND target_role = $2
            "#,
        )
        .bind(target_id)
        .bind(role)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_db_error(e, "Error computing rating"))
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        // Los UNIQUE diferidos se verifican aquí y llegan como Conflict
        self.tx
            .commit()
            .await
            .map_err(|e| map_db_error(e, "Error committing transaction"))
    }
}
