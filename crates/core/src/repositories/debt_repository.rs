use chrono::{DateTime, Utc};
use diesel::prelude::*;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::entities::debt::{Debt, NewDebt};
use meterpay_primitives::models::entities::enum_types::DebtFilter;
use meterpay_primitives::schema::debts;
use uuid::Uuid;

pub struct DebtRepository;

impl DebtRepository {
    pub fn create(conn: &mut PgConnection, new_debt: &NewDebt) -> Result<Debt, ApiError> {
        diesel::insert_into(debts::table)
            .values(new_debt)
            .get_result::<Debt>(conn)
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }

    pub fn find_by_id_and_user(
        conn: &mut PgConnection,
        debt_id: Uuid,
        owner: Uuid,
    ) -> Result<Option<Debt>, ApiError> {
        debts::table
            .filter(debts::id.eq(debt_id))
            .filter(debts::user_id.eq(owner))
            .first::<Debt>(conn)
            .optional()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }

    pub fn list_by_user(
        conn: &mut PgConnection,
        owner: Uuid,
        filter: DebtFilter,
    ) -> Result<Vec<Debt>, ApiError> {
        let mut query = debts::table.filter(debts::user_id.eq(owner)).into_boxed();

        query = match filter {
            DebtFilter::Pending => query.filter(debts::is_paid.eq(false)),
            DebtFilter::Paid => query.filter(debts::is_paid.eq(true)),
            DebtFilter::All => query,
        };

        query
            .order((debts::due_date.asc(), debts::created_at.asc()))
            .load::<Debt>(conn)
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }

    /// Flips `is_paid` only if it is still false. Returns whether this call won.
    pub fn mark_paid(
        conn: &mut PgConnection,
        debt_id: Uuid,
        owner: Uuid,
        settling_tx: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, ApiError> {
        let rows = diesel::update(
            debts::table
                .filter(debts::id.eq(debt_id))
                .filter(debts::user_id.eq(owner))
                .filter(debts::is_paid.eq(false)),
        )
        .set((
            debts::is_paid.eq(true),
            debts::settled_by.eq(Some(settling_tx)),
            debts::paid_at.eq(Some(at)),
            debts::updated_at.eq(at),
        ))
        .execute(conn)
        .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;

        Ok(rows == 1)
    }
}
