use diesel::r2d2::ConnectionManager;
use diesel::r2d2::Pool;
use diesel::PgConnection;
use eyre::{eyre, Report};
use meterpay_core::repositories::DbPool;
use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::time::Duration;
use tracing::info;

const POOL_MAX_SIZE: u32 = 20;

pub fn create_db_pool() -> Result<DbPool, Report> {
    let db_url = SecretString::from(
        env::var("DATABASE_URL").map_err(|_| eyre!("DATABASE_URL must be set for postgres"))?,
    );

    let manager = ConnectionManager::<PgConnection>::new(db_url.expose_secret());

    let pool = Pool::builder()
        .max_size(POOL_MAX_SIZE)
        .min_idle(Some(2))
        .connection_timeout(Duration::from_secs(8))
        .idle_timeout(Some(Duration::from_secs(300)))
        .max_lifetime(Some(Duration::from_secs(1800)))
        .test_on_check_out(true)
        .build(manager)?;

    info!("PostgreSQL connection pool created (max_size: {})", POOL_MAX_SIZE);

    Ok(pool)
}
