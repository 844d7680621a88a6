//! SQLite pool factory and module migration runner.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::Row;

pub type ChosenDB = sqlx::Sqlite;
pub type Pool = sqlx::Pool<ChosenDB>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration {module}/{id} failed: {source}")]
    MigrationFailed {
        module: String,
        id: String,
        #[source]
        source: sqlx::Error,
    },
}

/// Migration definition contributed by a module
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

const MIGRATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS _migrations (
    module     TEXT NOT NULL,
    id         TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (module, id)
)"#;

fn is_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Open a connection pool for the given SQLite URL.
///
/// In-memory databases live only as long as their connection, so they get exactly one
/// connection that is never recycled.
pub async fn connect(url: &str, max_connections: u32) -> Result<Pool> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = if is_memory(url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?
    };

    tracing::info!(url, "database pool ready");
    Ok(pool)
}

/// Apply every migration not yet recorded in `_migrations`, in the given order.
///
/// Each migration runs in its own transaction together with its bookkeeping row.
/// Returns how many migrations were newly applied.
pub async fn migrate(pool: &Pool, migrations: &[(String, Migration)]) -> Result<usize> {
    sqlx::query(MIGRATIONS_TABLE).execute(pool).await?;

    let applied: Vec<(String, String)> = sqlx::query("SELECT module, id FROM _migrations")
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| (row.get("module"), row.get("id")))
        .collect();

    let mut count = 0;
    for (module, migration) in migrations {
        if applied
            .iter()
            .any(|(m, id)| m == module && id == migration.id)
        {
            tracing::debug!(module = %module, id = migration.id, "migration already applied");
            continue;
        }

        let failed = |source: sqlx::Error| Error::MigrationFailed {
            module: module.clone(),
            id: migration.id.to_string(),
            source,
        };

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .map_err(&failed)?;
        sqlx::query("INSERT INTO _migrations (module, id) VALUES (?, ?)")
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await
            .map_err(&failed)?;
        tx.commit().await?;

        tracing::info!(module = %module, id = migration.id, "applied migration");
        count += 1;
    }

    Ok(count)
}
