use log::{info, warn};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;

/// Connects to Postgres, retrying with exponential backoff.
/// Gives up with the last error after `connect_attempts` tries.
pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    let attempts = config.connect_attempts.max(1);
    let mut backoff = config.connect_backoff;
    let mut attempt = 1;

    loop {
        match PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => {
                info!("Connected to the database");
                return Ok(pool);
            }
            Err(err) if attempt < attempts => {
                warn!(
                    "Database connection attempt {}/{} failed: {}; retrying in {:?}",
                    attempt, attempts, err, backoff
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
