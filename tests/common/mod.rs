#![allow(dead_code)]

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use slotboard::database::player_repo::{self, NewPlayer};
use slotboard::database::{schema, utc_now};
use slotboard::services::activity_service::{self, NewActivityForm};
use slotboard::services::pin_service;

/// Fresh in-memory database. One connection, kept for the whole test, so every
/// query sees the same memory store.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");
    schema::init(&pool).await.expect("apply schema");
    pool
}

pub struct SeedPlayer<'a> {
    pub user_game_id: i64,
    pub game_username: &'a str,
    pub app_username: Option<&'a str>,
    pub pin: Option<&'a str>,
    pub is_admin: bool,
    pub is_super_admin: bool,
}

impl<'a> SeedPlayer<'a> {
    pub fn named(user_game_id: i64, game_username: &'a str) -> Self {
        Self {
            user_game_id,
            game_username,
            app_username: None,
            pin: None,
            is_admin: false,
            is_super_admin: false,
        }
    }
}

pub async fn seed_player(pool: &SqlitePool, seed: SeedPlayer<'_>) -> i64 {
    let pin_hash = seed.pin.map(pin_service::hash_pin);
    let created_at = utc_now();
    player_repo::create_player(
        pool,
        NewPlayer {
            user_game_id: Some(seed.user_game_id),
            game_username: seed.game_username,
            app_username: seed.app_username,
            alliance: None,
            pin_hash: pin_hash.as_deref(),
            is_admin: seed.is_admin,
            is_super_admin: seed.is_super_admin,
            created_at: &created_at,
        },
    )
    .await
    .expect("seed player")
}

pub async fn seed_activity(pool: &SqlitePool, name: &str, active: bool) -> i64 {
    let form = NewActivityForm {
        name: name.to_string(),
        description: Some(format!("{} description", name)),
        event_date: Some("2025-07-01".to_string()),
        is_active: active.then(|| "on".to_string()),
    };
    activity_service::create_activity(pool, &form)
        .await
        .expect("seed activity")
}

pub async fn player_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM player")
        .fetch_one(pool)
        .await
        .expect("count players")
}
