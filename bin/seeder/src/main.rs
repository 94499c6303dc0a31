use diesel::r2d2::{ConnectionManager, Pool};
use diesel::{sql_query, PgConnection, RunQueryDsl};
use eyre::{eyre, Report};
use meterpay_core::fixtures::{seed_demo_data, DEMO_PASSWORD, DEMO_USERNAME};
use meterpay_core::repositories::{DbPool, PgStore};
use meterpay_core::services::auth_service::AuthService;
use meterpay_primitives::models::app_state::billing_details::BillingInfo;
use secrecy::{ExposeSecret, SecretString};
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn establish_pool() -> Result<DbPool, Report> {
    let database_url = SecretString::from(
        env::var("DATABASE_URL").map_err(|_| eyre!("DATABASE_URL must be set"))?,
    );

    Pool::builder()
        .max_size(2)
        .build(ConnectionManager::<PgConnection>::new(
            database_url.expose_secret(),
        ))
        .map_err(|e| eyre!("Error connecting to database: {}", e))
}

fn clean_db(pool: &DbPool) -> Result<(), Report> {
    info!("Cleaning database...");
    let mut conn = pool.get()?;
    sql_query("TRUNCATE wallet_transactions, debts, transactions, meters, users CASCADE")
        .execute(&mut conn)?;
    Ok(())
}

fn main() -> Result<(), Report> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let fresh = env::args().any(|arg| arg == "--fresh");

    info!("Seeding database...");

    let pool = establish_pool()?;
    let store = PgStore::new(pool.clone());

    // 1. bring the schema up to date
    store.run_migrations().map_err(|e| eyre!("{}", e))?;

    // 2. optionally start from an empty database
    if fresh {
        clean_db(&pool)?;
    }

    // 3. seed the demo account
    let billing = BillingInfo::new()?;
    let password_hash = AuthService::hash_password(&SecretString::from(DEMO_PASSWORD.to_string()))
        .map_err(|e| eyre!("{}", e))?;
    let user = seed_demo_data(&store, &billing, password_hash).map_err(|e| eyre!("{}", e))?;

    info!(
        user_id = %user.id,
        username = DEMO_USERNAME,
        balance = user.wallet_balance,
        "Database seeded successfully"
    );
    Ok(())
}
