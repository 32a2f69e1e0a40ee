use sqlx::SqlitePool;

use crate::database::player_repo::{self, PlayerLookup};
use crate::models::PlayerRow;

/// Finds the player a login name refers to: app username first, then in-game
/// username. Exact match only; callers trim the input.
pub async fn resolve_login_name(
    pool: &SqlitePool,
    login_name: &str,
) -> sqlx::Result<Option<PlayerRow>> {
    if let Some(player) =
        player_repo::find_player(pool, PlayerLookup::AppUsername(login_name)).await?
    {
        return Ok(Some(player));
    }
    player_repo::find_player(pool, PlayerLookup::GameUsername(login_name)).await
}

/// Finds the name column that would let one login name reach two players:
/// `game_username` already used as another player's app username, or
/// `app_username` already used as another player's in-game username.
/// `player_id` is the player being edited, `None` for a new one.
pub async fn login_name_clash(
    pool: &SqlitePool,
    player_id: Option<i64>,
    game_username: &str,
    app_username: Option<&str>,
) -> sqlx::Result<Option<&'static str>> {
    let is_other = |player: &PlayerRow| Some(player.player_id) != player_id;

    if let Some(player) =
        player_repo::find_player(pool, PlayerLookup::AppUsername(game_username)).await?
    {
        if is_other(&player) {
            return Ok(Some("game_username"));
        }
    }
    if let Some(app_username) = app_username {
        if let Some(player) =
            player_repo::find_player(pool, PlayerLookup::GameUsername(app_username)).await?
        {
            if is_other(&player) {
                return Ok(Some("app_username"));
            }
        }
    }
    Ok(None)
}
