use sqlx::SqlitePool;

use crate::models::WebSessionRow;

const SQL_LOAD_SESSION: &str = r#"
SELECT session_id, data
FROM web_session
WHERE session_id = ?1
  AND updated_at >= ?2
LIMIT 1
"#;

/// Loads a session row last written at or after `not_before`.
pub async fn load_session(
    pool: &SqlitePool,
    session_id: &str,
    not_before: &str,
) -> sqlx::Result<Option<WebSessionRow>> {
    sqlx::query_as::<_, WebSessionRow>(SQL_LOAD_SESSION)
        .bind(session_id)
        .bind(not_before)
        .fetch_optional(pool)
        .await
}

const SQL_UPSERT_SESSION: &str = r#"
INSERT INTO web_session (session_id, data, updated_at)
VALUES (?1, ?2, ?3)
ON CONFLICT (session_id) DO UPDATE SET
  data = excluded.data,
  updated_at = excluded.updated_at
"#;

pub async fn upsert_session(
    pool: &SqlitePool,
    session_id: &str,
    data: &str,
    updated_at: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPSERT_SESSION)
        .bind(session_id)
        .bind(data)
        .bind(updated_at)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_DELETE_SESSION: &str = "DELETE FROM web_session WHERE session_id = ?1";

pub async fn delete_session(pool: &SqlitePool, session_id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_SESSION)
        .bind(session_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_DELETE_STALE: &str = "DELETE FROM web_session WHERE updated_at < ?1";

pub async fn delete_stale_sessions(pool: &SqlitePool, not_before: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_STALE)
        .bind(not_before)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
