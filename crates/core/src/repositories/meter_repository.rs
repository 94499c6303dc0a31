use crate::repositories::violated_constraint;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::entities::meter::{Meter, MeterChanges, NewMeter};
use meterpay_primitives::schema::meters;
use uuid::Uuid;

pub struct MeterRepository;

impl MeterRepository {
    pub fn find_by_id(conn: &mut PgConnection, meter_id: Uuid) -> Result<Option<Meter>, ApiError> {
        meters::table
            .find(meter_id)
            .first::<Meter>(conn)
            .optional()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }

    pub fn find_by_number(
        conn: &mut PgConnection,
        number: &str,
    ) -> Result<Option<Meter>, ApiError> {
        meters::table
            .filter(meters::meter_number.eq(number))
            .first::<Meter>(conn)
            .optional()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }

    pub fn find_by_number_for_update(
        conn: &mut PgConnection,
        number: &str,
    ) -> Result<Option<Meter>, ApiError> {
        meters::table
            .filter(meters::meter_number.eq(number))
            .for_update()
            .first::<Meter>(conn)
            .optional()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }

    pub fn create(conn: &mut PgConnection, new_meter: &NewMeter) -> Result<Meter, ApiError> {
        diesel::insert_into(meters::table)
            .values(new_meter)
            .get_result::<Meter>(conn)
            .map_err(|e| match violated_constraint(&e) {
                Some("meters_meter_number_key") => ApiError::Conflict(format!(
                    "Meter {} already exists",
                    new_meter.meter_number
                )),
                _ => ApiError::DatabaseConnection(e.to_string()),
            })
    }

    /// Inserts unless the number exists already; `None` means another writer won.
    pub fn create_if_absent(
        conn: &mut PgConnection,
        new_meter: &NewMeter,
    ) -> Result<Option<Meter>, ApiError> {
        diesel::insert_into(meters::table)
            .values(new_meter)
            .on_conflict(meters::meter_number)
            .do_nothing()
            .get_result::<Meter>(conn)
            .optional()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }

    pub fn assign(
        conn: &mut PgConnection,
        meter_id: Uuid,
        owner: Option<Uuid>,
        nickname: Option<&str>,
    ) -> Result<Meter, ApiError> {
        diesel::update(meters::table.find(meter_id))
            .set((
                meters::user_id.eq(owner),
                meters::nickname.eq(nickname),
                meters::updated_at.eq(Utc::now()),
            ))
            .get_result::<Meter>(conn)
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }

    pub fn update(
        conn: &mut PgConnection,
        meter_id: Uuid,
        changes: &MeterChanges,
    ) -> Result<Option<Meter>, ApiError> {
        diesel::update(meters::table.find(meter_id))
            .set((changes, meters::updated_at.eq(Utc::now())))
            .get_result::<Meter>(conn)
            .optional()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }

    pub fn touch(
        conn: &mut PgConnection,
        number: &str,
        at: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        diesel::update(meters::table.filter(meters::meter_number.eq(number)))
            .set(meters::updated_at.eq(at))
            .execute(conn)
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;
        Ok(())
    }

    pub fn recent_by_user(
        conn: &mut PgConnection,
        owner: Uuid,
        limit: i64,
    ) -> Result<Vec<Meter>, ApiError> {
        meters::table
            .filter(meters::user_id.eq(owner))
            .order((meters::updated_at.desc(), meters::id.asc()))
            .limit(limit)
            .load::<Meter>(conn)
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }
}
