#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WebSessionRow {
    pub session_id: String,
    pub data: String,
}
