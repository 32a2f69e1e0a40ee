mod common;

use anyhow::Result;
use common::{seed_activity, seed_player, test_pool, SeedPlayer};
use slotboard::services::activity_service::{self, ActivityError, NewActivityForm};
use slotboard::services::availability_service::{
    availability_slots, replace_availability, slot_grid, slot_rows, AvailabilityError,
};

fn slots(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn resubmission_replaces_previous_selection() -> Result<()> {
    let pool = test_pool().await;
    let player_id = seed_player(&pool, SeedPlayer::named(12345678, "Alice")).await;
    let activity_id = seed_activity(&pool, "KvK", true).await;

    let saved = replace_availability(&pool, player_id, activity_id, &slots(&["18:00", "18:30"]))
        .await?;
    assert_eq!(saved, 2);

    replace_availability(&pool, player_id, activity_id, &slots(&["19:00", "01:30", "19:00"]))
        .await?;
    assert_eq!(
        availability_slots(&pool, player_id, activity_id).await?,
        slots(&["01:30", "19:00"])
    );
    Ok(())
}

#[tokio::test]
async fn empty_selection_clears_all_slots() -> Result<()> {
    let pool = test_pool().await;
    let player_id = seed_player(&pool, SeedPlayer::named(12345678, "Alice")).await;
    let activity_id = seed_activity(&pool, "KvK", true).await;

    replace_availability(&pool, player_id, activity_id, &slots(&["00:00", "23:30"])).await?;
    let saved = replace_availability(&pool, player_id, activity_id, &[]).await?;
    assert_eq!(saved, 0);
    assert!(availability_slots(&pool, player_id, activity_id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn selections_are_scoped_per_player_and_activity() -> Result<()> {
    let pool = test_pool().await;
    let alice = seed_player(&pool, SeedPlayer::named(12345678, "Alice")).await;
    let bob = seed_player(&pool, SeedPlayer::named(87654321, "Bob")).await;
    let kvk = seed_activity(&pool, "KvK", true).await;
    let ark = seed_activity(&pool, "Ark", true).await;

    replace_availability(&pool, alice, kvk, &slots(&["10:00"])).await?;
    replace_availability(&pool, alice, ark, &slots(&["11:00"])).await?;
    replace_availability(&pool, bob, kvk, &slots(&["12:00"])).await?;
    replace_availability(&pool, alice, kvk, &[]).await?;

    assert!(availability_slots(&pool, alice, kvk).await?.is_empty());
    assert_eq!(availability_slots(&pool, alice, ark).await?, slots(&["11:00"]));
    assert_eq!(availability_slots(&pool, bob, kvk).await?, slots(&["12:00"]));
    Ok(())
}

#[tokio::test]
async fn invalid_slot_leaves_previous_selection() -> Result<()> {
    let pool = test_pool().await;
    let player_id = seed_player(&pool, SeedPlayer::named(12345678, "Alice")).await;
    let activity_id = seed_activity(&pool, "KvK", true).await;
    replace_availability(&pool, player_id, activity_id, &slots(&["08:00"])).await?;

    for bad in ["24:00", "08:15", "8:00", "noon"] {
        let err = replace_availability(&pool, player_id, activity_id, &slots(&["09:00", bad]))
            .await
            .unwrap_err();
        assert!(matches!(err, AvailabilityError::UnknownSlot(_)), "{}: {:?}", bad, err);
    }
    assert_eq!(
        availability_slots(&pool, player_id, activity_id).await?,
        slots(&["08:00"])
    );
    Ok(())
}

#[tokio::test]
async fn failed_insert_rolls_back_the_whole_replacement() -> Result<()> {
    let pool = test_pool().await;
    let player_id = seed_player(&pool, SeedPlayer::named(12345678, "Alice")).await;
    let activity_id = seed_activity(&pool, "KvK", true).await;
    replace_availability(&pool, player_id, activity_id, &slots(&["08:00"])).await?;

    sqlx::raw_sql(
        "CREATE TRIGGER reject_noon BEFORE INSERT ON availability WHEN NEW.slot = '12:00' \
         BEGIN SELECT RAISE(ABORT, 'slot rejected'); END;",
    )
    .execute(&pool)
    .await?;

    let err = replace_availability(&pool, player_id, activity_id, &slots(&["10:00", "12:00"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AvailabilityError::Database(_)), "{:?}", err);
    assert_eq!(
        availability_slots(&pool, player_id, activity_id).await?,
        slots(&["08:00"])
    );
    Ok(())
}

#[tokio::test]
async fn inactive_or_unknown_activity_is_refused() -> Result<()> {
    let pool = test_pool().await;
    let player_id = seed_player(&pool, SeedPlayer::named(12345678, "Alice")).await;
    let closed = seed_activity(&pool, "Old event", false).await;

    let err = replace_availability(&pool, player_id, closed, &slots(&["10:00"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AvailabilityError::InactiveActivity(_)), "{:?}", err);

    let err = replace_availability(&pool, player_id, closed + 100, &slots(&["10:00"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AvailabilityError::UnknownActivity), "{:?}", err);
    Ok(())
}

#[test]
fn grid_has_48_half_hour_slots() {
    let grid = slot_grid();
    assert_eq!(grid.len(), 48);
    assert_eq!(grid.first().map(String::as_str), Some("00:00"));
    assert_eq!(grid.get(1).map(String::as_str), Some("00:30"));
    assert_eq!(grid.last().map(String::as_str), Some("23:30"));

    let rows = slot_rows(&slots(&["00:30", "23:30"]));
    assert_eq!(rows.len(), 8);
    assert!(rows.iter().all(|row| row.len() == 6));
    let checked: Vec<&str> = rows
        .iter()
        .flatten()
        .filter(|cell| cell.checked)
        .map(|cell| cell.label.as_str())
        .collect();
    assert_eq!(checked, vec!["00:30", "23:30"]);
}

#[tokio::test]
async fn only_active_activities_are_offered() -> Result<()> {
    let pool = test_pool().await;
    seed_activity(&pool, "Open", true).await;
    seed_activity(&pool, "Closed", false).await;
    let undated = activity_service::create_activity(
        &pool,
        &NewActivityForm {
            name: "Undated".to_string(),
            is_active: Some("on".to_string()),
            ..Default::default()
        },
    )
    .await?;

    let active = activity_service::list_active_activities(&pool).await?;
    let names: Vec<&str> = active.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Open", "Undated"]);
    assert_eq!(active[1].id, undated);
    assert_eq!(active[0].label(), "Open (2025-07-01)");

    let table = activity_service::list_activity_table(&pool).await?;
    assert_eq!(table.len(), 3);
    assert_eq!(table[0].name, "Undated", "admin table lists newest first");
    Ok(())
}

#[tokio::test]
async fn activity_needs_a_name_and_iso_date() -> Result<()> {
    let pool = test_pool().await;

    let err = activity_service::create_activity(&pool, &NewActivityForm::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ActivityError::MissingName));

    let form = NewActivityForm {
        name: "Dated".to_string(),
        event_date: Some("01.07.2025".to_string()),
        ..Default::default()
    };
    let err = activity_service::create_activity(&pool, &form).await.unwrap_err();
    assert!(matches!(err, ActivityError::InvalidDate));
    assert!(activity_service::list_activity_table(&pool).await?.is_empty());
    Ok(())
}
