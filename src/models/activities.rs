use serde::Serialize;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ActivityRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub event_date: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl ActivityRow {
    pub fn label(&self) -> String {
        match self.event_date.as_deref().filter(|d| !d.is_empty()) {
            Some(date) => format!("{} ({})", self.name, date),
            None => self.name.clone(),
        }
    }
}
