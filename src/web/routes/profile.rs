use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::services::login_flow_service::AuthenticatedPlayer;
use crate::services::profile_service::{self, ProfileError, ProfileForm, ProfileView};
use crate::services::session_service::Session;
use crate::web::{internal_error, persist_session, render_html};

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub player_name: String,
    pub profile: ProfileView,
    pub notice: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ProfileQuery {
    pub notice: Option<String>,
}

pub async fn profile_page(
    Extension(player): Extension<AuthenticatedPlayer>,
    State(pool): State<SqlitePool>,
    Query(query): Query<ProfileQuery>,
) -> Response {
    let notice = match query.notice.as_deref() {
        Some("saved") => Some("Profile updated.".to_string()),
        _ => None,
    };
    render_profile_page(&pool, &player, notice, None).await
}

pub async fn profile_update_handler(
    Extension(player): Extension<AuthenticatedPlayer>,
    Extension(mut session): Extension<Session>,
    State(pool): State<SqlitePool>,
    Form(form): Form<ProfileForm>,
) -> Response {
    match profile_service::update_profile(&pool, player.player_id, &form).await {
        Ok(refreshed) => {
            // Keep the session display name in sync.
            session.data.player = Some(refreshed);
            if let Err(resp) = persist_session(&pool, &session).await {
                return resp;
            }
            Redirect::to("/profile?notice=saved").into_response()
        }
        Err(ProfileError::Database(e)) => internal_error("Profile update", e),
        Err(e) => render_profile_page(&pool, &player, None, Some(e.to_string())).await,
    }
}

async fn render_profile_page(
    pool: &SqlitePool,
    player: &AuthenticatedPlayer,
    notice: Option<String>,
    error: Option<String>,
) -> Response {
    let profile = match profile_service::load_profile_view(pool, player.player_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                "Could not load your profile from the database.",
            )
                .into_response()
        }
        Err(e) => return internal_error("Profile load", e),
    };

    let template = ProfileTemplate {
        player_name: player.display_name.clone(),
        profile,
        notice,
        error,
    };
    render_html(&template)
}
