use serde::Serialize;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct AvailabilityRow {
    pub id: i64,
    pub player_id: i64,
    pub activity_id: i64,
    pub slot: String,
    pub created_at: String,
}
