use sqlx::SqlitePool;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::info;

use crate::database::{activity_repo, availability_repo, utc_now};
use crate::models::ActivityRow;

pub const SLOTS_PER_ROW: usize = 6;

#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("Activity not found.")]
    UnknownActivity,
    #[error("{0} is not open for availability.")]
    InactiveActivity(String),
    #[error("Unknown time slot: {0}")]
    UnknownSlot(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Half-hour slot labels covering a full UTC day: `00:00`, `00:30`, ... `23:30`.
pub fn slot_grid() -> Vec<String> {
    (0..24)
        .flat_map(|h| [0, 30].map(move |m| format!("{:02}:{:02}", h, m)))
        .collect()
}

pub fn is_valid_slot(slot: &str) -> bool {
    let Some((h, m)) = slot.split_once(':') else {
        return false;
    };
    if h.len() != 2 || !h.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    matches!((h.parse::<u8>(), m), (Ok(hour), "00" | "30") if hour < 24)
}

#[derive(Clone)]
pub struct SlotCell {
    pub label: String,
    pub checked: bool,
}

/// The grid in rows of `SLOTS_PER_ROW`, with the player's saved slots ticked.
pub fn slot_rows(selected: &[String]) -> Vec<Vec<SlotCell>> {
    let selected: BTreeSet<&str> = selected.iter().map(String::as_str).collect();
    let cells: Vec<SlotCell> = slot_grid()
        .into_iter()
        .map(|label| SlotCell {
            checked: selected.contains(label.as_str()),
            label,
        })
        .collect();
    cells.chunks(SLOTS_PER_ROW).map(|c| c.to_vec()).collect()
}

pub async fn availability_slots(
    pool: &SqlitePool,
    player_id: i64,
    activity_id: i64,
) -> sqlx::Result<Vec<String>> {
    availability_repo::list_slots(pool, player_id, activity_id).await
}

/// Replaces the player's whole selection for one activity. An empty selection
/// clears it.
pub async fn replace_availability(
    pool: &SqlitePool,
    player_id: i64,
    activity_id: i64,
    slots: &[String],
) -> Result<usize, AvailabilityError> {
    let activity = activity_repo::find_by_id(pool, activity_id)
        .await?
        .ok_or(AvailabilityError::UnknownActivity)?;
    ensure_active(&activity)?;

    let mut unique = BTreeSet::new();
    for slot in slots {
        let slot = slot.trim();
        if !is_valid_slot(slot) {
            return Err(AvailabilityError::UnknownSlot(slot.to_string()));
        }
        unique.insert(slot.to_string());
    }
    let slots: Vec<String> = unique.into_iter().collect();

    let created_at = utc_now();
    availability_repo::replace_slots(pool, player_id, activity_id, &slots, &created_at).await?;

    info!(
        "Saved {} slots for player {} on activity {}",
        slots.len(),
        player_id,
        activity_id
    );
    Ok(slots.len())
}

fn ensure_active(activity: &ActivityRow) -> Result<(), AvailabilityError> {
    if activity.is_active {
        Ok(())
    } else {
        Err(AvailabilityError::InactiveActivity(activity.name.clone()))
    }
}
