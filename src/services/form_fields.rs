/// Blank optional text fields are stored as NULL.
pub fn optional_text(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// HTML checkboxes are only submitted when ticked.
pub fn checkbox(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty() && v != "false")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameIdError {
    Missing,
    NotANumber,
}

pub fn parse_game_id(raw: &str) -> Result<i64, GameIdError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(GameIdError::Missing);
    }
    raw.parse().map_err(|_| GameIdError::NotANumber)
}

/// Human label for a `player` column named in a uniqueness violation.
pub fn column_label(column: &str) -> &str {
    match column {
        "user_game_id" => "in-game ID",
        "game_username" => "in-game username",
        "app_username" => "app username",
        other => other,
    }
}
