use serde::Serialize;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct PlayerRow {
    pub player_id: i64,
    pub user_game_id: Option<i64>,
    pub game_username: String,
    pub app_username: Option<String>,
    pub alliance: Option<String>,
    #[serde(skip_serializing)]
    pub pin_hash: Option<String>,
    pub is_admin: bool,
    pub is_super_admin: bool,
    pub created_at: String,
}

impl PlayerRow {
    /// App username when one is set, otherwise the in-game username.
    pub fn display_name(&self) -> &str {
        self.app_username
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.game_username)
    }

    pub fn has_pin(&self) -> bool {
        self.pin_hash.as_deref().is_some_and(|h| !h.is_empty())
    }
}
