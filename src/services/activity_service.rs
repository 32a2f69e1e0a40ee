use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::database::activity_repo::{self, NewActivity};
use crate::database::utc_now;
use crate::models::ActivityRow;
use crate::services::form_fields;

#[derive(Debug, Default, Deserialize)]
pub struct NewActivityForm {
    pub name: String,
    pub description: Option<String>,
    pub event_date: Option<String>,
    pub is_active: Option<String>,
}

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("A name for the activity must be provided.")]
    MissingName,
    #[error("Event date must look like YYYY-MM-DD.")]
    InvalidDate,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct ActivityTableRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub event_date: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<ActivityRow> for ActivityTableRow {
    fn from(row: ActivityRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description.unwrap_or_default(),
            event_date: row.event_date.unwrap_or_default(),
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

pub async fn create_activity(
    pool: &SqlitePool,
    form: &NewActivityForm,
) -> Result<i64, ActivityError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(ActivityError::MissingName);
    }
    let description = form_fields::optional_text(form.description.as_deref());
    let event_date = parse_event_date(form.event_date.as_deref())?;
    let event_date = event_date.map(|d| d.format("%Y-%m-%d").to_string());
    let created_at = utc_now();

    let id = activity_repo::insert_activity(
        pool,
        NewActivity {
            name,
            description,
            event_date: event_date.as_deref(),
            is_active: form_fields::checkbox(form.is_active.as_deref()),
            created_at: &created_at,
        },
    )
    .await?;

    info!("Created activity {} ({})", id, name);
    Ok(id)
}

pub async fn list_active_activities(pool: &SqlitePool) -> sqlx::Result<Vec<ActivityRow>> {
    activity_repo::list_active(pool).await
}

pub async fn list_activity_table(pool: &SqlitePool) -> sqlx::Result<Vec<ActivityTableRow>> {
    let rows = activity_repo::list_all(pool).await?;
    Ok(rows.into_iter().map(ActivityTableRow::from).collect())
}

fn parse_event_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ActivityError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ActivityError::InvalidDate)
}
