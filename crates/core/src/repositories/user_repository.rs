use crate::repositories::violated_constraint;
use chrono::Utc;
use diesel::prelude::*;
use meterpay_primitives::error::{ApiError, AuthError};
use meterpay_primitives::models::entities::user::{NewUser, User};
use meterpay_primitives::schema::users;
use uuid::Uuid;

pub struct UserRepository;

impl UserRepository {
    pub fn find_by_id(conn: &mut PgConnection, user_id: Uuid) -> Result<Option<User>, ApiError> {
        users::table
            .find(user_id)
            .first::<User>(conn)
            .optional()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }

    pub fn find_by_username(
        conn: &mut PgConnection,
        user_name: &str,
    ) -> Result<Option<User>, ApiError> {
        users::table
            .filter(users::username.eq(user_name))
            .first::<User>(conn)
            .optional()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }

    pub fn create(conn: &mut PgConnection, new_user: NewUser) -> Result<User, ApiError> {
        diesel::insert_into(users::table)
            .values(&new_user)
            .get_result::<User>(conn)
            .map_err(|e| match violated_constraint(&e) {
                Some("users_username_key") => ApiError::Auth(AuthError::DuplicateUsername),
                _ => ApiError::DatabaseConnection(e.to_string()),
            })
    }

    pub fn balance(conn: &mut PgConnection, user_id: Uuid) -> Result<Option<i64>, ApiError> {
        users::table
            .find(user_id)
            .select(users::wallet_balance)
            .first::<i64>(conn)
            .optional()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }

    pub fn credit(conn: &mut PgConnection, user_id: Uuid, amount: i64) -> Result<i64, ApiError> {
        diesel::update(users::table.find(user_id))
            .set((
                users::wallet_balance.eq(users::wallet_balance + amount),
                users::updated_at.eq(Utc::now()),
            ))
            .returning(users::wallet_balance)
            .get_result::<i64>(conn)
            .optional()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))
    }

    /// Conditional debit: the balance is only touched when it covers `amount`.
    pub fn debit(conn: &mut PgConnection, user_id: Uuid, amount: i64) -> Result<i64, ApiError> {
        let updated = diesel::update(
            users::table
                .filter(users::id.eq(user_id))
                .filter(users::wallet_balance.ge(amount)),
        )
        .set((
            users::wallet_balance.eq(users::wallet_balance - amount),
            users::updated_at.eq(Utc::now()),
        ))
        .returning(users::wallet_balance)
        .get_result::<i64>(conn)
        .optional()
        .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;

        match updated {
            Some(balance) => Ok(balance),
            None => match Self::balance(conn, user_id)? {
                Some(available) => Err(ApiError::InsufficientFunds {
                    available,
                    requested: amount,
                }),
                None => Err(ApiError::NotFound("User not found".into())),
            },
        }
    }
}
