use sqlx::SqlitePool;

const SQL_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS player (
  player_id      INTEGER PRIMARY KEY AUTOINCREMENT,
  user_game_id   INTEGER UNIQUE,
  game_username  TEXT NOT NULL UNIQUE,
  app_username   TEXT UNIQUE,
  alliance       TEXT,
  pin_hash       TEXT,
  is_admin       BOOLEAN NOT NULL DEFAULT 0,
  is_super_admin BOOLEAN NOT NULL DEFAULT 0,
  created_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS activity (
  id          INTEGER PRIMARY KEY AUTOINCREMENT,
  name        TEXT NOT NULL,
  description TEXT,
  event_date  TEXT,
  is_active   BOOLEAN NOT NULL DEFAULT 1,
  created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS availability (
  id          INTEGER PRIMARY KEY AUTOINCREMENT,
  player_id   INTEGER NOT NULL REFERENCES player(player_id) ON DELETE CASCADE,
  activity_id INTEGER NOT NULL REFERENCES activity(id) ON DELETE CASCADE,
  slot        TEXT NOT NULL,
  created_at  TEXT NOT NULL,
  UNIQUE (player_id, activity_id, slot)
);

CREATE INDEX IF NOT EXISTS idx_availability_player_activity
  ON availability (player_id, activity_id);

CREATE TABLE IF NOT EXISTS web_session (
  session_id TEXT PRIMARY KEY,
  data       TEXT NOT NULL,
  updated_at TEXT NOT NULL
);
"#;

pub async fn init(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::raw_sql(SQL_SCHEMA).execute(pool).await?;
    Ok(())
}
