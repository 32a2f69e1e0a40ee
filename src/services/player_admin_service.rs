use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::database::player_repo::{self, NewPlayer, PlayerEdit, ProfileUpdate};
use crate::database::{unique_violation_column, utc_now};
use crate::models::PlayerRow;
use crate::services::admin_auth_service::AuthenticatedAdmin;
use crate::services::form_fields::{self, GameIdError};
use crate::services::{identity_service, pin_service};

#[derive(Debug, Clone)]
pub struct PlayerTableRow {
    pub player_id: i64,
    pub user_game_id: String,
    pub game_username: String,
    pub app_username: String,
    pub alliance: String,
    pub is_admin: bool,
    pub is_super_admin: bool,
    pub has_pin: bool,
    pub created_at: String,
}

impl From<PlayerRow> for PlayerTableRow {
    fn from(row: PlayerRow) -> Self {
        Self {
            player_id: row.player_id,
            user_game_id: row.user_game_id.map(|id| id.to_string()).unwrap_or_default(),
            has_pin: row.has_pin(),
            game_username: row.game_username,
            app_username: row.app_username.unwrap_or_default(),
            alliance: row.alliance.unwrap_or_default(),
            is_admin: row.is_admin,
            is_super_admin: row.is_super_admin,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PlayerEditForm {
    pub game_username: String,
    pub user_game_id: String,
    pub app_username: Option<String>,
    pub alliance: Option<String>,
    pub is_admin: Option<String>,
    pub is_super_admin: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewPlayerForm {
    pub game_username: String,
    pub user_game_id: String,
    pub app_username: Option<String>,
    pub alliance: Option<String>,
    pub pin: Option<String>,
    pub is_admin: Option<String>,
    pub is_super_admin: Option<String>,
}

#[derive(Debug, Error)]
pub enum PlayerEditError {
    #[error("Only super admins can manage players.")]
    Forbidden,
    #[error("In-game username cannot be empty.")]
    MissingUsername,
    #[error("In-game ID cannot be empty.")]
    MissingId,
    #[error("In-game ID must be a number.")]
    InvalidId,
    #[error("That {0} is already used by another player.")]
    Duplicate(String),
    #[error("Player not found.")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<GameIdError> for PlayerEditError {
    fn from(e: GameIdError) -> Self {
        match e {
            GameIdError::Missing => PlayerEditError::MissingId,
            GameIdError::NotANumber => PlayerEditError::InvalidId,
        }
    }
}

fn map_store_error(e: sqlx::Error) -> PlayerEditError {
    match unique_violation_column(&e) {
        Some(column) => {
            PlayerEditError::Duplicate(form_fields::column_label(&column).to_string())
        }
        None => PlayerEditError::Database(e),
    }
}

async fn ensure_no_clash(
    pool: &SqlitePool,
    player_id: Option<i64>,
    game_username: &str,
    app_username: Option<&str>,
) -> Result<(), PlayerEditError> {
    let clash =
        identity_service::login_name_clash(pool, player_id, game_username, app_username).await?;
    match clash {
        Some(column) => Err(PlayerEditError::Duplicate(
            form_fields::column_label(column).to_string(),
        )),
        None => Ok(()),
    }
}

fn ensure_super_admin(actor: &AuthenticatedAdmin) -> Result<(), PlayerEditError> {
    if actor.is_super_admin {
        Ok(())
    } else {
        Err(PlayerEditError::Forbidden)
    }
}

pub async fn list_player_table(pool: &SqlitePool) -> sqlx::Result<Vec<PlayerTableRow>> {
    let rows = player_repo::list_players(pool).await?;
    Ok(rows.into_iter().map(PlayerTableRow::from).collect())
}

pub async fn update_player(
    pool: &SqlitePool,
    actor: &AuthenticatedAdmin,
    player_id: i64,
    form: &PlayerEditForm,
) -> Result<(), PlayerEditError> {
    ensure_super_admin(actor)?;

    let game_username = form.game_username.trim();
    if game_username.is_empty() {
        return Err(PlayerEditError::MissingUsername);
    }
    let user_game_id = form_fields::parse_game_id(&form.user_game_id)?;
    let is_super_admin = form_fields::checkbox(form.is_super_admin.as_deref());
    // A super admin is always an admin.
    let is_admin = is_super_admin || form_fields::checkbox(form.is_admin.as_deref());
    let app_username = form_fields::optional_text(form.app_username.as_deref());
    ensure_no_clash(pool, Some(player_id), game_username, app_username).await?;

    let updated = player_repo::update_player(
        pool,
        player_id,
        PlayerEdit {
            profile: ProfileUpdate {
                user_game_id,
                game_username,
                app_username,
                alliance: form_fields::optional_text(form.alliance.as_deref()),
            },
            is_admin,
            is_super_admin,
        },
    )
    .await
    .map_err(map_store_error)?;
    if updated == 0 {
        return Err(PlayerEditError::NotFound);
    }

    info!("Admin {} edited player {}", actor.admin_id, player_id);
    Ok(())
}

pub async fn create_player(
    pool: &SqlitePool,
    actor: &AuthenticatedAdmin,
    form: &NewPlayerForm,
) -> Result<i64, PlayerEditError> {
    ensure_super_admin(actor)?;

    let game_username = form.game_username.trim();
    if game_username.is_empty() {
        return Err(PlayerEditError::MissingUsername);
    }
    let user_game_id = form_fields::parse_game_id(&form.user_game_id)?;
    let is_super_admin = form_fields::checkbox(form.is_super_admin.as_deref());
    let is_admin = is_super_admin || form_fields::checkbox(form.is_admin.as_deref());
    let pin_hash = pin_service::normalize_pin(form.pin.as_deref()).map(pin_service::hash_pin);
    let app_username = form_fields::optional_text(form.app_username.as_deref());
    ensure_no_clash(pool, None, game_username, app_username).await?;
    let created_at = utc_now();

    let player_id = player_repo::create_player(
        pool,
        NewPlayer {
            user_game_id: Some(user_game_id),
            game_username,
            app_username,
            alliance: form_fields::optional_text(form.alliance.as_deref()),
            pin_hash: pin_hash.as_deref(),
            is_admin,
            is_super_admin,
            created_at: &created_at,
        },
    )
    .await
    .map_err(map_store_error)?;

    info!("Admin {} created player {}", actor.admin_id, player_id);
    Ok(player_id)
}
