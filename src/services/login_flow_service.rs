use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::database::player_repo::{self, NewPlayer, PlayerLookup};
use crate::database::{unique_violation_column, utc_now};
use crate::models::PlayerRow;
use crate::services::form_fields::{self, GameIdError};
use crate::services::{identity_service, pin_service};

/// Where a visitor is in the login wizard. Persisted in the session between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum LoginStage {
    #[default]
    EnterName,
    Existing {
        candidate_player_id: i64,
        candidate_name: String,
    },
    New {
        candidate_name: String,
    },
}

impl LoginStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginStage::EnterName => "enter_name",
            LoginStage::Existing { .. } => "existing",
            LoginStage::New { .. } => "new",
        }
    }

    pub fn candidate_name(&self) -> Option<&str> {
        match self {
            LoginStage::EnterName => None,
            LoginStage::Existing { candidate_name, .. } | LoginStage::New { candidate_name } => {
                Some(candidate_name.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedPlayer {
    pub player_id: i64,
    pub display_name: String,
}

impl From<&PlayerRow> for AuthenticatedPlayer {
    fn from(player: &PlayerRow) -> Self {
        Self {
            player_id: player.player_id,
            display_name: player.display_name().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum LoginAction {
    SubmitName { login_name: String },
    SubmitPin { pin: Option<String> },
    Register { user_game_id: String, pin: Option<String> },
    NotYou,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginTransition {
    Stage(LoginStage),
    Authenticated(AuthenticatedPlayer),
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("{name} has a PIN set, enter it to log in.")]
    PinRequired { name: String },
    #[error("Incorrect PIN.")]
    InvalidPin,
    #[error("In-game ID must be a number.")]
    InvalidId,
    #[error("In-game ID {0} is already registered to another player.")]
    DuplicateId(i64),
    #[error("Username {0} is already taken.")]
    DuplicateName(String),
    #[error("Could not load player from database. Please try again.")]
    NotFound,
    #[error("Your login session expired. Please start again.")]
    UnexpectedStep,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl LoginError {
    /// Errors after which the wizard starts over at the name prompt.
    /// Every other error leaves the current stage in place.
    pub fn resets_flow(&self) -> bool {
        matches!(self, LoginError::NotFound | LoginError::UnexpectedStep)
    }
}

/// Applies one wizard action to the current stage.
pub async fn advance(
    pool: &SqlitePool,
    stage: &LoginStage,
    action: LoginAction,
) -> Result<LoginTransition, LoginError> {
    match (stage, action) {
        (_, LoginAction::NotYou) => Ok(LoginTransition::Stage(LoginStage::EnterName)),
        (LoginStage::EnterName, LoginAction::SubmitName { login_name }) => {
            submit_login_name(pool, &login_name).await.map(LoginTransition::Stage)
        }
        (
            LoginStage::Existing {
                candidate_player_id,
                ..
            },
            LoginAction::SubmitPin { pin },
        ) => verify_existing_player(pool, *candidate_player_id, pin.as_deref())
            .await
            .map(LoginTransition::Authenticated),
        (LoginStage::New { candidate_name }, LoginAction::Register { user_game_id, pin }) => {
            register_new_player(pool, candidate_name, &user_game_id, pin.as_deref())
                .await
                .map(LoginTransition::Authenticated)
        }
        _ => Err(LoginError::UnexpectedStep),
    }
}

pub async fn submit_login_name(
    pool: &SqlitePool,
    login_name: &str,
) -> Result<LoginStage, LoginError> {
    let login_name = login_name.trim();
    if login_name.is_empty() {
        return Err(LoginError::Validation("Username is required."));
    }

    let stage = match identity_service::resolve_login_name(pool, login_name).await? {
        Some(player) => LoginStage::Existing {
            candidate_player_id: player.player_id,
            candidate_name: login_name.to_string(),
        },
        None => LoginStage::New {
            candidate_name: login_name.to_string(),
        },
    };
    Ok(stage)
}

/// Loads the candidate behind an `Existing` stage.
pub async fn load_candidate(
    pool: &SqlitePool,
    candidate_player_id: i64,
) -> Result<PlayerRow, LoginError> {
    player_repo::find_player(pool, PlayerLookup::PlayerId(candidate_player_id))
        .await?
        .ok_or(LoginError::NotFound)
}

/// A player without a stored PIN is open: any PIN, or none, is accepted.
pub async fn verify_existing_player(
    pool: &SqlitePool,
    candidate_player_id: i64,
    pin: Option<&str>,
) -> Result<AuthenticatedPlayer, LoginError> {
    let player = load_candidate(pool, candidate_player_id).await?;

    if let Some(stored_hash) = player.pin_hash.as_deref().filter(|h| !h.is_empty()) {
        let Some(pin) = pin_service::normalize_pin(pin) else {
            return Err(LoginError::PinRequired {
                name: player.display_name().to_string(),
            });
        };
        if !pin_service::pin_matches(pin, stored_hash) {
            return Err(LoginError::InvalidPin);
        }
    }

    info!("Player {} logged in", player.player_id);
    Ok(AuthenticatedPlayer::from(&player))
}

/// Creates the player the typed name did not match, then logs them in.
pub async fn register_new_player(
    pool: &SqlitePool,
    candidate_name: &str,
    user_game_id: &str,
    pin: Option<&str>,
) -> Result<AuthenticatedPlayer, LoginError> {
    let user_game_id = form_fields::parse_game_id(user_game_id).map_err(|e| match e {
        GameIdError::Missing => LoginError::Validation("In-game ID is required."),
        GameIdError::NotANumber => LoginError::InvalidId,
    })?;

    let pin_hash = pin_service::normalize_pin(pin).map(pin_service::hash_pin);
    let created_at = utc_now();

    let player_id = player_repo::create_player(
        pool,
        NewPlayer {
            user_game_id: Some(user_game_id),
            game_username: candidate_name,
            app_username: None,
            alliance: None,
            pin_hash: pin_hash.as_deref(),
            is_admin: false,
            is_super_admin: false,
            created_at: &created_at,
        },
    )
    .await
    .map_err(|e| match unique_violation_column(&e).as_deref() {
        Some("user_game_id") => LoginError::DuplicateId(user_game_id),
        Some(_) => LoginError::DuplicateName(candidate_name.to_string()),
        None => LoginError::Database(e),
    })?;

    info!("Registered new player {} ({})", player_id, candidate_name);
    Ok(AuthenticatedPlayer {
        player_id,
        display_name: candidate_name.to_string(),
    })
}
