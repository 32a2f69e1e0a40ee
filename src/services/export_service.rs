use serde::Serialize;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::database::{export_repo, player_repo};

/// Tables that can be downloaded as CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTable {
    Players,
    Activities,
    Availability,
}

impl ExportTable {
    pub const ALL: [ExportTable; 3] = [
        ExportTable::Players,
        ExportTable::Activities,
        ExportTable::Availability,
    ];

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "players" => Some(ExportTable::Players),
            "activities" => Some(ExportTable::Activities),
            "availability" => Some(ExportTable::Availability),
            _ => None,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            ExportTable::Players => "players",
            ExportTable::Activities => "activities",
            ExportTable::Availability => "availability",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.csv", self.slug())
    }

    fn headers(self) -> &'static [&'static str] {
        match self {
            // pin_hash is never exported
            ExportTable::Players => &[
                "player_id",
                "user_game_id",
                "game_username",
                "app_username",
                "alliance",
                "is_admin",
                "is_super_admin",
                "created_at",
            ],
            ExportTable::Activities => &[
                "id",
                "name",
                "description",
                "event_date",
                "is_active",
                "created_at",
            ],
            ExportTable::Availability => &["id", "player_id", "activity_id", "slot", "created_at"],
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Full snapshot of one table as CSV bytes, header row first.
pub async fn export_csv(pool: &SqlitePool, table: ExportTable) -> Result<Vec<u8>, ExportError> {
    match table {
        ExportTable::Players => {
            let rows = player_repo::list_players(pool).await?;
            write_csv(table.headers(), &rows)
        }
        ExportTable::Activities => {
            let rows = export_repo::all_activities(pool).await?;
            write_csv(table.headers(), &rows)
        }
        ExportTable::Availability => {
            let rows = export_repo::all_availability(pool).await?;
            write_csv(table.headers(), &rows)
        }
    }
}

/// Writes every table into `dir` and returns the written paths.
pub async fn export_all_to_dir(
    pool: &SqlitePool,
    dir: &Path,
) -> Result<Vec<PathBuf>, ExportError> {
    tokio::fs::create_dir_all(dir).await?;
    let mut written = Vec::with_capacity(ExportTable::ALL.len());
    for table in ExportTable::ALL {
        let bytes = export_csv(pool, table).await?;
        let path = dir.join(table.file_name());
        tokio::fs::write(&path, bytes).await?;
        info!("Exported {} to {}", table.slug(), path.display());
        written.push(path);
    }
    Ok(written)
}

fn write_csv<T: Serialize>(headers: &[&str], rows: &[T]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}
