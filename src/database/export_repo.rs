use sqlx::SqlitePool;

use crate::models::{ActivityRow, AvailabilityRow};

const SQL_ALL_ACTIVITIES: &str = r#"
SELECT id, name, description, event_date, is_active, created_at
FROM activity
ORDER BY id ASC
"#;

pub async fn all_activities(pool: &SqlitePool) -> sqlx::Result<Vec<ActivityRow>> {
    sqlx::query_as::<_, ActivityRow>(SQL_ALL_ACTIVITIES)
        .fetch_all(pool)
        .await
}

const SQL_ALL_AVAILABILITY: &str = r#"
SELECT id, player_id, activity_id, slot, created_at
FROM availability
ORDER BY activity_id ASC, player_id ASC, slot ASC
"#;

pub async fn all_availability(pool: &SqlitePool) -> sqlx::Result<Vec<AvailabilityRow>> {
    sqlx::query_as::<_, AvailabilityRow>(SQL_ALL_AVAILABILITY)
        .fetch_all(pool)
        .await
}
