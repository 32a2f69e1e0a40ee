pub mod activity_repo;
pub mod availability_repo;
pub mod export_repo;
pub mod player_repo;
pub mod schema;
pub mod web_session_repo;

use chrono::{SecondsFormat, TimeDelta, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Opens the pool and applies the schema. Writers are serialised by SQLite itself.
pub async fn connect(database_url: &str) -> sqlx::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    if let Some(dir) = options.get_filename().parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    schema::init(&pool).await?;
    Ok(pool)
}

/// UTC timestamp with second precision, e.g. `2025-06-01T18:30:00+00:00`.
pub fn utc_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// `utc_now()` shifted into the past by `age`, in the same format, so stored
/// timestamps compare against it as plain strings.
pub fn utc_before(age: TimeDelta) -> String {
    (Utc::now() - age).to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Column name from a SQLite `UNIQUE constraint failed: table.column` message.
pub fn unique_violation_column(err: &sqlx::Error) -> Option<String> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    if !db_err.is_unique_violation() {
        return None;
    }
    let column = db_err
        .message()
        .rsplit(&['.', ' '][..])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
    Some(column)
}
