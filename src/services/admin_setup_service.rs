use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::database::player_repo::{self, NewPlayer};
use crate::database::{unique_violation_column, utc_now};
use crate::services::{form_fields, identity_service, pin_service};

#[derive(Debug, Default, serde::Deserialize)]
pub struct AdminSetupForm {
    pub setup_token: String,
    pub user_game_id: String,
    pub game_username: String,
    pub app_username: String,
    pub pin: String,
    pub pin_confirm: String,
}

#[derive(Debug, Error)]
pub enum AdminSetupError {
    #[error("An admin account already exists.")]
    AlreadyInitialized,
    #[error("Server misconfigured: ADMIN_SETUP_TOKEN is not set.")]
    Misconfigured,
    #[error("Invalid setup token.")]
    InvalidToken,
    #[error("Please fill out all fields.")]
    MissingFields,
    #[error("PINs don't match.")]
    PinMismatch,
    #[error("In-game ID must be a number.")]
    InvalidId,
    #[error("Couldn't create admin: {0} is already in use.")]
    Duplicate(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Creates the first super admin. Only allowed while no admin exists and only
/// with the configured setup token.
pub async fn create_initial_admin(
    pool: &SqlitePool,
    expected_token: Option<&str>,
    form: &AdminSetupForm,
) -> Result<i64, AdminSetupError> {
    if player_repo::any_admin_exists(pool).await? {
        return Err(AdminSetupError::AlreadyInitialized);
    }

    let Some(expected_token) = expected_token.filter(|t| !t.is_empty()) else {
        return Err(AdminSetupError::Misconfigured);
    };
    if form.setup_token != expected_token {
        return Err(AdminSetupError::InvalidToken);
    }

    let user_game_id = form.user_game_id.trim();
    let game_username = form.game_username.trim();
    let app_username = form.app_username.trim();
    if user_game_id.is_empty()
        || game_username.is_empty()
        || app_username.is_empty()
        || form.pin.is_empty()
    {
        return Err(AdminSetupError::MissingFields);
    }
    if form.pin != form.pin_confirm {
        return Err(AdminSetupError::PinMismatch);
    }
    let user_game_id =
        form_fields::parse_game_id(user_game_id).map_err(|_| AdminSetupError::InvalidId)?;

    if let Some(column) =
        identity_service::login_name_clash(pool, None, game_username, Some(app_username)).await?
    {
        return Err(AdminSetupError::Duplicate(form_fields::column_label(column).to_string()));
    }

    let pin_hash = pin_service::hash_pin(&form.pin);
    let created_at = utc_now();
    let player_id = player_repo::create_player(
        pool,
        NewPlayer {
            user_game_id: Some(user_game_id),
            game_username,
            app_username: Some(app_username),
            alliance: None,
            pin_hash: Some(&pin_hash),
            is_admin: true,
            is_super_admin: true,
            created_at: &created_at,
        },
    )
    .await
    .map_err(|e| match unique_violation_column(&e) {
        Some(column) => {
            AdminSetupError::Duplicate(form_fields::column_label(&column).to_string())
        }
        None => AdminSetupError::Database(e),
    })?;

    info!("Created initial super admin {}", player_id);
    Ok(player_id)
}
