use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::PlayerRow;

const SQL_PLAYER_COLUMNS: &str = r#"
SELECT
  player_id,
  user_game_id,
  game_username,
  app_username,
  alliance,
  pin_hash,
  is_admin,
  is_super_admin,
  created_at
FROM player
"#;

const SQL_FIND_BY_PLAYER_ID: &str = "WHERE player_id = ?1 LIMIT 1";
const SQL_FIND_BY_GAME_USERNAME: &str = "WHERE game_username = ?1 LIMIT 1";
const SQL_FIND_BY_APP_USERNAME: &str = "WHERE app_username = ?1 LIMIT 1";
const SQL_LIST_ALL: &str = "ORDER BY player_id ASC";

/// The fields a player can be looked up by. Each maps to one fixed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerLookup<'a> {
    PlayerId(i64),
    GameUsername(&'a str),
    AppUsername(&'a str),
}

pub async fn find_player(
    pool: &SqlitePool,
    lookup: PlayerLookup<'_>,
) -> sqlx::Result<Option<PlayerRow>> {
    let filter = match lookup {
        PlayerLookup::PlayerId(_) => SQL_FIND_BY_PLAYER_ID,
        PlayerLookup::GameUsername(_) => SQL_FIND_BY_GAME_USERNAME,
        PlayerLookup::AppUsername(_) => SQL_FIND_BY_APP_USERNAME,
    };
    let sql = format!("{}{}", SQL_PLAYER_COLUMNS, filter);
    let query = sqlx::query_as::<_, PlayerRow>(&sql);
    let query = match lookup {
        PlayerLookup::PlayerId(id) => query.bind(id),
        PlayerLookup::GameUsername(name) | PlayerLookup::AppUsername(name) => query.bind(name),
    };
    query.fetch_optional(pool).await
}

pub async fn list_players(pool: &SqlitePool) -> sqlx::Result<Vec<PlayerRow>> {
    let sql = format!("{}{}", SQL_PLAYER_COLUMNS, SQL_LIST_ALL);
    sqlx::query_as::<_, PlayerRow>(&sql).fetch_all(pool).await
}

const SQL_INSERT_PLAYER: &str = r#"
INSERT INTO player (
  user_game_id,
  game_username,
  app_username,
  alliance,
  pin_hash,
  is_admin,
  is_super_admin,
  created_at
) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#;

pub struct NewPlayer<'a> {
    pub user_game_id: Option<i64>,
    pub game_username: &'a str,
    pub app_username: Option<&'a str>,
    pub alliance: Option<&'a str>,
    pub pin_hash: Option<&'a str>,
    pub is_admin: bool,
    pub is_super_admin: bool,
    pub created_at: &'a str,
}

/// Inserts a player and returns the generated `player_id`.
pub async fn create_player(pool: &SqlitePool, player: NewPlayer<'_>) -> sqlx::Result<i64> {
    let res = sqlx::query(SQL_INSERT_PLAYER)
        .bind(player.user_game_id)
        .bind(player.game_username)
        .bind(player.app_username)
        .bind(player.alliance)
        .bind(player.pin_hash)
        .bind(player.is_admin)
        .bind(player.is_super_admin)
        .bind(player.created_at)
        .execute(pool)
        .await?;
    Ok(res.last_insert_rowid())
}

const SQL_SET_PIN_HASH: &str = r#"
UPDATE player
SET pin_hash = ?
WHERE player_id = ?
"#;

/// Takes any executor so it can run inside a caller's transaction.
pub async fn set_pin_hash<'e, E>(executor: E, player_id: i64, pin_hash: &str) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_SET_PIN_HASH)
        .bind(pin_hash)
        .bind(player_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_UPDATE_PROFILE: &str = r#"
UPDATE player
SET user_game_id = ?,
    game_username = ?,
    app_username = ?,
    alliance = ?
WHERE player_id = ?
"#;

pub struct ProfileUpdate<'a> {
    pub user_game_id: i64,
    pub game_username: &'a str,
    pub app_username: Option<&'a str>,
    pub alliance: Option<&'a str>,
}

pub async fn update_profile<'e, E>(
    executor: E,
    player_id: i64,
    update: ProfileUpdate<'_>,
) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_UPDATE_PROFILE)
        .bind(update.user_game_id)
        .bind(update.game_username)
        .bind(update.app_username)
        .bind(update.alliance)
        .bind(player_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_UPDATE_PLAYER: &str = r#"
UPDATE player
SET user_game_id = ?,
    game_username = ?,
    app_username = ?,
    alliance = ?,
    is_admin = ?,
    is_super_admin = ?
WHERE player_id = ?
"#;

pub struct PlayerEdit<'a> {
    pub profile: ProfileUpdate<'a>,
    pub is_admin: bool,
    pub is_super_admin: bool,
}

pub async fn update_player(
    pool: &SqlitePool,
    player_id: i64,
    edit: PlayerEdit<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_PLAYER)
        .bind(edit.profile.user_game_id)
        .bind(edit.profile.game_username)
        .bind(edit.profile.app_username)
        .bind(edit.profile.alliance)
        .bind(edit.is_admin)
        .bind(edit.is_super_admin)
        .bind(player_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_ANY_ADMIN_EXISTS: &str = r#"
SELECT EXISTS(SELECT 1 FROM player WHERE is_admin = 1)
"#;

pub async fn any_admin_exists(pool: &SqlitePool) -> sqlx::Result<bool> {
    let exists = sqlx::query_scalar::<_, i64>(SQL_ANY_ADMIN_EXISTS)
        .fetch_one(pool)
        .await?;
    Ok(exists != 0)
}
