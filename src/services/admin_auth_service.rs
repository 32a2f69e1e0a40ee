use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

use crate::database::player_repo::{self, PlayerLookup};
use crate::services::pin_service;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedAdmin {
    pub admin_id: i64,
    pub admin_name: String,
    pub is_super_admin: bool,
}

#[derive(Debug, Error)]
pub enum AdminAuthError {
    #[error("Admin username is required.")]
    MissingUsername,
    #[error("PIN is required.")]
    MissingPin,
    #[error("Unknown admin username.")]
    UnknownUser,
    #[error("This user is not an admin.")]
    NotAdmin,
    #[error("This admin has no PIN set. Ask a super admin to set one.")]
    NoPinSet,
    #[error("Incorrect PIN.")]
    InvalidPin,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Single-shot admin login by app username and PIN. Checks run in order and
/// stop at the first failure.
pub async fn authenticate_admin(
    pool: &SqlitePool,
    app_username: &str,
    pin: &str,
) -> Result<AuthenticatedAdmin, AdminAuthError> {
    if app_username.is_empty() {
        return Err(AdminAuthError::MissingUsername);
    }
    if pin.is_empty() {
        return Err(AdminAuthError::MissingPin);
    }

    let player = player_repo::find_player(pool, PlayerLookup::AppUsername(app_username))
        .await?
        .ok_or(AdminAuthError::UnknownUser)?;

    if !player.is_admin {
        return Err(AdminAuthError::NotAdmin);
    }

    let Some(stored_hash) = player.pin_hash.as_deref().filter(|h| !h.is_empty()) else {
        return Err(AdminAuthError::NoPinSet);
    };

    if !pin_service::pin_matches(pin, stored_hash) {
        warn!("Admin login with wrong PIN for player {}", player.player_id);
        return Err(AdminAuthError::InvalidPin);
    }

    info!("Admin {} logged in", player.player_id);
    Ok(AuthenticatedAdmin {
        admin_id: player.player_id,
        admin_name: app_username.to_string(),
        is_super_admin: player.is_super_admin,
    })
}

/// Re-reads the admin behind a session. `None` when the player is gone or no
/// longer an admin; otherwise the identity with current role flags.
pub async fn refresh_admin(
    pool: &SqlitePool,
    admin: &AuthenticatedAdmin,
) -> sqlx::Result<Option<AuthenticatedAdmin>> {
    let lookup = PlayerLookup::PlayerId(admin.admin_id);
    let Some(player) = player_repo::find_player(pool, lookup).await? else {
        return Ok(None);
    };
    if !player.is_admin {
        info!("Admin session for player {} revoked", player.player_id);
        return Ok(None);
    }

    Ok(Some(AuthenticatedAdmin {
        admin_id: player.player_id,
        admin_name: player
            .app_username
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| admin.admin_name.clone()),
        is_super_admin: player.is_super_admin,
    }))
}
