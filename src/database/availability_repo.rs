use sqlx::{Sqlite, SqlitePool, Transaction};

const SQL_LIST_SLOTS: &str = r#"
SELECT slot
FROM availability
WHERE player_id = ?1
  AND activity_id = ?2
ORDER BY slot ASC
"#;

pub async fn list_slots(
    pool: &SqlitePool,
    player_id: i64,
    activity_id: i64,
) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(SQL_LIST_SLOTS)
        .bind(player_id)
        .bind(activity_id)
        .fetch_all(pool)
        .await
}

const SQL_DELETE_FOR_PAIR: &str = r#"
DELETE FROM availability
WHERE player_id = ?
  AND activity_id = ?
"#;

const SQL_INSERT_SLOT: &str = r#"
INSERT INTO availability (player_id, activity_id, slot, created_at)
VALUES (?, ?, ?, ?)
"#;

/// Deletes every slot for the pair and inserts `slots`, inside one transaction.
pub async fn replace_slots(
    pool: &SqlitePool,
    player_id: i64,
    activity_id: i64,
    slots: &[String],
    created_at: &str,
) -> sqlx::Result<u64> {
    let mut tx: Transaction<'_, Sqlite> = pool.begin().await?;

    sqlx::query(SQL_DELETE_FOR_PAIR)
        .bind(player_id)
        .bind(activity_id)
        .execute(&mut *tx)
        .await?;

    let mut inserted = 0;
    for slot in slots {
        let res = sqlx::query(SQL_INSERT_SLOT)
            .bind(player_id)
            .bind(activity_id)
            .bind(slot)
            .bind(created_at)
            .execute(&mut *tx)
            .await?;
        inserted += res.rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}
