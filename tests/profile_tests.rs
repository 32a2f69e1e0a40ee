mod common;

use anyhow::Result;
use common::{seed_player, test_pool, SeedPlayer};
use slotboard::database::web_session_repo;
use slotboard::services::login_flow_service::{
    advance, AuthenticatedPlayer, LoginAction, LoginStage, LoginTransition,
};
use slotboard::services::profile_service::{
    load_profile_view, update_profile, ProfileError, ProfileForm,
};
use slotboard::services::session_service::{
    load_session, prune_expired_sessions, save_session, Session, SessionData,
};

fn form_for(game_username: &str, user_game_id: &str) -> ProfileForm {
    ProfileForm {
        game_username: game_username.to_string(),
        user_game_id: user_game_id.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn profile_view_reflects_stored_player() -> Result<()> {
    let pool = test_pool().await;
    let mut seed = SeedPlayer::named(12345678, "Alice");
    seed.app_username = Some("ally");
    let alice_id = seed_player(&pool, seed).await;

    let view = load_profile_view(&pool, alice_id).await?.expect("profile");
    assert_eq!(view.game_username, "Alice");
    assert_eq!(view.user_game_id, "12345678");
    assert_eq!(view.app_username, "ally");
    assert_eq!(view.alliance, "");
    assert!(!view.has_pin);

    assert!(load_profile_view(&pool, alice_id + 1).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn setting_a_pin_closes_an_open_identity() -> Result<()> {
    let pool = test_pool().await;
    let alice_id = seed_player(&pool, SeedPlayer::named(12345678, "Alice")).await;

    let mut form = form_for("Alice", "12345678");
    form.app_username = Some(" ally ".to_string());
    form.alliance = Some("Wolves".to_string());
    form.new_pin = Some("2580".to_string());
    form.new_pin_confirm = Some("2580".to_string());
    let identity = update_profile(&pool, alice_id, &form).await?;
    assert_eq!(identity.player_id, alice_id);
    assert_eq!(identity.display_name, "ally");

    let view = load_profile_view(&pool, alice_id).await?.expect("profile");
    assert!(view.has_pin);
    assert_eq!(view.alliance, "Wolves");

    // Logging in as "ally" now needs the PIN.
    let stage = match advance(
        &pool,
        &LoginStage::EnterName,
        LoginAction::SubmitName {
            login_name: "ally".to_string(),
        },
    )
    .await?
    {
        LoginTransition::Stage(stage) => stage,
        other => panic!("unexpected {:?}", other),
    };
    assert!(advance(&pool, &stage, LoginAction::SubmitPin { pin: None })
        .await
        .is_err());
    Ok(())
}

#[tokio::test]
async fn blank_pin_fields_keep_the_current_pin() -> Result<()> {
    let pool = test_pool().await;
    let mut seed = SeedPlayer::named(12345678, "Alice");
    seed.pin = Some("1111");
    let alice_id = seed_player(&pool, seed).await;

    let mut form = form_for("Alice", "12345678");
    form.new_pin = Some(String::new());
    form.new_pin_confirm = Some(String::new());
    update_profile(&pool, alice_id, &form).await?;
    assert!(load_profile_view(&pool, alice_id).await?.expect("profile").has_pin);
    Ok(())
}

#[tokio::test]
async fn profile_update_validation() -> Result<()> {
    let pool = test_pool().await;
    let alice_id = seed_player(&pool, SeedPlayer::named(12345678, "Alice")).await;
    seed_player(&pool, SeedPlayer::named(87654321, "Bob")).await;

    let err = update_profile(&pool, alice_id, &form_for(" ", "12345678"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProfileError::MissingUsername), "{:?}", err);

    let err = update_profile(&pool, alice_id, &form_for("Alice", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, ProfileError::MissingId), "{:?}", err);

    let err = update_profile(&pool, alice_id, &form_for("Alice", "12x"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProfileError::InvalidId), "{:?}", err);

    let mut mismatch = form_for("Alice", "12345678");
    mismatch.new_pin = Some("1234".to_string());
    mismatch.new_pin_confirm = Some("4321".to_string());
    let err = update_profile(&pool, alice_id, &mismatch).await.unwrap_err();
    assert!(matches!(err, ProfileError::PinMismatch), "{:?}", err);

    let err = update_profile(&pool, alice_id, &form_for("Bob", "12345678"))
        .await
        .unwrap_err();
    match err {
        ProfileError::Duplicate(label) => assert_eq!(label, "in-game username"),
        other => panic!("unexpected {:?}", other),
    }

    let err = update_profile(&pool, alice_id, &form_for("Alice", "87654321"))
        .await
        .unwrap_err();
    match err {
        ProfileError::Duplicate(label) => assert_eq!(label, "in-game ID"),
        other => panic!("unexpected {:?}", other),
    }

    let err = update_profile(&pool, 999, &form_for("Nobody", "1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProfileError::NotFound), "{:?}", err);
    Ok(())
}

#[tokio::test]
async fn session_round_trips_wizard_stage() -> Result<()> {
    let pool = test_pool().await;

    let mut session = Session::new();
    assert!(session.is_new);
    session.data.login = LoginStage::Existing {
        candidate_player_id: 3,
        candidate_name: "Alice".to_string(),
    };
    save_session(&pool, &session).await?;

    let loaded = load_session(&pool, &session.id).await?.expect("stored session");
    assert!(!loaded.is_new);
    assert_eq!(loaded.data, session.data);

    // Saving again overwrites in place.
    session.data.login = LoginStage::New {
        candidate_name: "Newbie".to_string(),
    };
    save_session(&pool, &session).await?;
    let loaded = load_session(&pool, &session.id).await?.expect("stored session");
    assert_eq!(loaded.data.login, session.data.login);
    assert_eq!(session_rows(&pool).await?, 1);

    assert!(load_session(&pool, "not-a-uuid").await?.is_none());
    assert!(load_session(&pool, &Session::new().id).await?.is_none());
    Ok(())
}

async fn session_rows(pool: &sqlx::SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM web_session")
        .fetch_one(pool)
        .await?)
}

#[tokio::test]
async fn session_back_to_initial_state_is_deleted() -> Result<()> {
    let pool = test_pool().await;

    let mut session = Session::new();
    session.data.player = Some(AuthenticatedPlayer {
        player_id: 1,
        display_name: "Alice".to_string(),
    });
    save_session(&pool, &session).await?;
    assert_eq!(session_rows(&pool).await?, 1);

    session.data = SessionData::default();
    save_session(&pool, &session).await?;
    assert_eq!(session_rows(&pool).await?, 0);
    assert!(load_session(&pool, &session.id).await?.is_none());

    // A fresh visitor who never logs in leaves nothing behind.
    save_session(&pool, &Session::new()).await?;
    assert_eq!(session_rows(&pool).await?, 0);
    Ok(())
}

#[tokio::test]
async fn stale_sessions_expire_and_are_pruned() -> Result<()> {
    let pool = test_pool().await;
    let data = r#"{"player":{"player_id":1,"display_name":"Alice"}}"#;

    let stale = Session::new();
    web_session_repo::upsert_session(&pool, &stale.id, data, "2000-01-01T00:00:00+00:00")
        .await?;
    let mut fresh = Session::new();
    fresh.data.player = Some(AuthenticatedPlayer {
        player_id: 2,
        display_name: "Bob".to_string(),
    });
    save_session(&pool, &fresh).await?;

    assert!(load_session(&pool, &stale.id).await?.is_none());
    assert!(load_session(&pool, &fresh.id).await?.is_some());

    assert_eq!(prune_expired_sessions(&pool).await?, 1);
    assert_eq!(session_rows(&pool).await?, 1);
    assert_eq!(prune_expired_sessions(&pool).await?, 0);
    Ok(())
}

#[tokio::test]
async fn failed_pin_write_rolls_back_profile_fields() -> Result<()> {
    let pool = test_pool().await;
    let alice_id = seed_player(&pool, SeedPlayer::named(12345678, "Alice")).await;
    sqlx::raw_sql(
        "CREATE TRIGGER no_pin_change BEFORE UPDATE OF pin_hash ON player \
         BEGIN SELECT RAISE(ABORT, 'pin write failed'); END;",
    )
    .execute(&pool)
    .await?;

    let mut form = form_for("Alicia", "12345678");
    form.alliance = Some("Wolves".to_string());
    form.new_pin = Some("2580".to_string());
    form.new_pin_confirm = Some("2580".to_string());
    let err = update_profile(&pool, alice_id, &form).await.unwrap_err();
    assert!(matches!(err, ProfileError::Database(_)), "{:?}", err);

    let view = load_profile_view(&pool, alice_id).await?.expect("profile");
    assert_eq!(view.game_username, "Alice");
    assert_eq!(view.alliance, "");
    assert!(!view.has_pin);
    Ok(())
}

#[tokio::test]
async fn login_names_cannot_cross_between_players() -> Result<()> {
    let pool = test_pool().await;
    let alice_id = seed_player(&pool, SeedPlayer::named(12345678, "Alice")).await;
    let mut bob = SeedPlayer::named(87654321, "Bob");
    bob.app_username = Some("bobby");
    seed_player(&pool, bob).await;

    // Alice's in-game name may not be Bob's app username.
    let err = update_profile(&pool, alice_id, &form_for("bobby", "12345678"))
        .await
        .unwrap_err();
    match err {
        ProfileError::Duplicate(label) => assert_eq!(label, "in-game username"),
        other => panic!("unexpected {:?}", other),
    }

    // Nor her app username Bob's in-game name.
    let mut form = form_for("Alice", "12345678");
    form.app_username = Some("Bob".to_string());
    let err = update_profile(&pool, alice_id, &form).await.unwrap_err();
    match err {
        ProfileError::Duplicate(label) => assert_eq!(label, "app username"),
        other => panic!("unexpected {:?}", other),
    }

    // Her own in-game name is fine as her app username.
    form.app_username = Some("Alice".to_string());
    let identity = update_profile(&pool, alice_id, &form).await?;
    assert_eq!(identity.display_name, "Alice");
    Ok(())
}
