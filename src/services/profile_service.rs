use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::database::player_repo::{self, PlayerLookup, ProfileUpdate};
use crate::database::unique_violation_column;
use crate::services::form_fields::{self, GameIdError};
use crate::services::login_flow_service::AuthenticatedPlayer;
use crate::services::{identity_service, pin_service};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub game_username: String,
    pub user_game_id: String,
    pub app_username: String,
    pub alliance: String,
    pub has_pin: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    pub game_username: String,
    pub user_game_id: String,
    pub app_username: Option<String>,
    pub alliance: Option<String>,
    pub new_pin: Option<String>,
    pub new_pin_confirm: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("In-game username cannot be empty.")]
    MissingUsername,
    #[error("In-game ID cannot be empty.")]
    MissingId,
    #[error("In-game ID must be a number.")]
    InvalidId,
    #[error("New PIN and confirmation do not match.")]
    PinMismatch,
    #[error("That {0} is already used by another player.")]
    Duplicate(String),
    #[error("Could not load your profile from the database.")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub async fn load_profile_view(
    pool: &SqlitePool,
    player_id: i64,
) -> sqlx::Result<Option<ProfileView>> {
    let Some(player) = player_repo::find_player(pool, PlayerLookup::PlayerId(player_id)).await?
    else {
        return Ok(None);
    };

    Ok(Some(ProfileView {
        has_pin: player.has_pin(),
        user_game_id: player
            .user_game_id
            .map(|id| id.to_string())
            .unwrap_or_default(),
        app_username: player.app_username.unwrap_or_default(),
        alliance: player.alliance.unwrap_or_default(),
        game_username: player.game_username,
    }))
}

/// Saves the profile and, when a new PIN is given, replaces the PIN hash.
/// Returns the refreshed identity for the session.
pub async fn update_profile(
    pool: &SqlitePool,
    player_id: i64,
    form: &ProfileForm,
) -> Result<AuthenticatedPlayer, ProfileError> {
    let game_username = form.game_username.trim();
    if game_username.is_empty() {
        return Err(ProfileError::MissingUsername);
    }
    let user_game_id = form_fields::parse_game_id(&form.user_game_id).map_err(|e| match e {
        GameIdError::Missing => ProfileError::MissingId,
        GameIdError::NotANumber => ProfileError::InvalidId,
    })?;

    let new_pin = pin_service::normalize_pin(form.new_pin.as_deref());
    let new_pin_confirm = pin_service::normalize_pin(form.new_pin_confirm.as_deref());
    if (new_pin.is_some() || new_pin_confirm.is_some()) && new_pin != new_pin_confirm {
        return Err(ProfileError::PinMismatch);
    }

    let app_username = form_fields::optional_text(form.app_username.as_deref());
    if let Some(column) =
        identity_service::login_name_clash(pool, Some(player_id), game_username, app_username)
            .await?
    {
        return Err(ProfileError::Duplicate(form_fields::column_label(column).to_string()));
    }

    // Profile fields and PIN change are saved together or not at all.
    let mut tx = pool.begin().await?;
    let updated = player_repo::update_profile(
        &mut *tx,
        player_id,
        ProfileUpdate {
            user_game_id,
            game_username,
            app_username,
            alliance: form_fields::optional_text(form.alliance.as_deref()),
        },
    )
    .await
    .map_err(|e| match unique_violation_column(&e) {
        Some(column) => {
            ProfileError::Duplicate(form_fields::column_label(&column).to_string())
        }
        None => ProfileError::Database(e),
    })?;
    if updated == 0 {
        return Err(ProfileError::NotFound);
    }

    if let Some(pin) = new_pin {
        player_repo::set_pin_hash(&mut *tx, player_id, &pin_service::hash_pin(pin)).await?;
    }
    tx.commit().await?;
    if new_pin.is_some() {
        info!("Player {} changed their PIN", player_id);
    }

    let player = player_repo::find_player(pool, PlayerLookup::PlayerId(player_id))
        .await?
        .ok_or(ProfileError::NotFound)?;
    info!("Player {} updated their profile", player_id);
    Ok(AuthenticatedPlayer::from(&player))
}
