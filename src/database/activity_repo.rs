use sqlx::SqlitePool;

use crate::models::ActivityRow;

const SQL_LIST_ACTIVE: &str = r#"
SELECT
  id,
  name,
  description,
  event_date,
  is_active,
  created_at
FROM activity
WHERE is_active = 1
ORDER BY event_date IS NULL, event_date ASC, id ASC
"#;

pub async fn list_active(pool: &SqlitePool) -> sqlx::Result<Vec<ActivityRow>> {
    sqlx::query_as::<_, ActivityRow>(SQL_LIST_ACTIVE)
        .fetch_all(pool)
        .await
}

const SQL_LIST_ALL: &str = r#"
SELECT
  id,
  name,
  description,
  event_date,
  is_active,
  created_at
FROM activity
ORDER BY id DESC
"#;

pub async fn list_all(pool: &SqlitePool) -> sqlx::Result<Vec<ActivityRow>> {
    sqlx::query_as::<_, ActivityRow>(SQL_LIST_ALL)
        .fetch_all(pool)
        .await
}

const SQL_FIND_BY_ID: &str = r#"
SELECT
  id,
  name,
  description,
  event_date,
  is_active,
  created_at
FROM activity
WHERE id = ?1
LIMIT 1
"#;

pub async fn find_by_id(pool: &SqlitePool, activity_id: i64) -> sqlx::Result<Option<ActivityRow>> {
    sqlx::query_as::<_, ActivityRow>(SQL_FIND_BY_ID)
        .bind(activity_id)
        .fetch_optional(pool)
        .await
}

const SQL_INSERT_ACTIVITY: &str = r#"
INSERT INTO activity (
  name,
  description,
  event_date,
  is_active,
  created_at
) VALUES (?, ?, ?, ?, ?)
"#;

pub struct NewActivity<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub event_date: Option<&'a str>,
    pub is_active: bool,
    pub created_at: &'a str,
}

pub async fn insert_activity(pool: &SqlitePool, activity: NewActivity<'_>) -> sqlx::Result<i64> {
    let res = sqlx::query(SQL_INSERT_ACTIVITY)
        .bind(activity.name)
        .bind(activity.description)
        .bind(activity.event_date)
        .bind(activity.is_active)
        .bind(activity.created_at)
        .execute(pool)
        .await?;
    Ok(res.last_insert_rowid())
}
