use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    // Each connection to an in-memory database gets its own private database.
    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
    let mut pool_options = SqlitePoolOptions::new();
    pool_options = if in_memory {
        pool_options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options.max_connections(max_connections)
    };

    pool_options.connect_with(options).await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!().run(pool).await
}

/// Fixed-width UTC timestamp, so text ordering matches time ordering.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Inserts the main admin row unless a main row already exists. A stored main
/// code that differs from `code` is kept, so only one main row ever exists.
pub async fn seed_main_admin(pool: &SqlitePool, code: &str, name: &str) -> Result<(), sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO admin_codes (code, sub_admin_name, is_main_admin, created_at)
        SELECT ?, ?, TRUE, ?
        WHERE NOT EXISTS (SELECT 1 FROM admin_codes WHERE is_main_admin = TRUE)
        "#,
    )
    .bind(code)
    .bind(name)
    .bind(timestamp_now())
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        tracing::info!(code = %code, "Seeded main admin code");
        return Ok(());
    }

    let stored: Option<String> =
        sqlx::query_scalar("SELECT code FROM admin_codes WHERE is_main_admin = TRUE")
            .fetch_optional(pool)
            .await?;

    match stored {
        Some(stored) if stored != code => {
            tracing::warn!(
                configured = %code,
                stored = %stored,
                "Main admin code already exists and differs from configuration, keeping stored code"
            );
        }
        Some(_) => {}
        None => {
            tracing::warn!(
                code = %code,
                "Main admin code is already in use as a sub-admin code, main admin not seeded"
            );
        }
    }
    Ok(())
}

/// Fresh in-memory database with the schema applied and the main code seeded.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = connect("sqlite::memory:", 1).await.unwrap();
    run_migrations(&pool).await.unwrap();
    seed_main_admin(&pool, "MAIN_ADMIN_2024", "Main Administrator")
        .await
        .unwrap();
    pool
}
