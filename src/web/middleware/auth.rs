use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;

use crate::services::admin_auth_service;
use crate::services::session_service::Session;
use crate::web::{internal_error, persist_session};

/// Lets logged-in players through with their `AuthenticatedPlayer` in the
/// extensions; everyone else goes back to the login wizard.
pub async fn require_player(mut request: Request, next: Next) -> Response {
    let player = request
        .extensions()
        .get::<Session>()
        .and_then(|s| s.data.player.clone());

    match player {
        Some(player) => {
            request.extensions_mut().insert(player);
            next.run(request).await
        }
        None => Redirect::to("/").into_response(),
    }
}

/// Admin guard. Role flags are re-read on every request, so a demoted admin
/// loses access immediately.
pub async fn require_admin(
    State(pool): State<SqlitePool>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(mut session) = request.extensions().get::<Session>().cloned() else {
        return Redirect::to("/admin").into_response();
    };
    let Some(stored) = session.data.admin.clone() else {
        return Redirect::to("/admin").into_response();
    };

    let current = match admin_auth_service::refresh_admin(&pool, &stored).await {
        Ok(current) => current,
        Err(e) => return internal_error("Admin check", e),
    };

    if current.as_ref() != Some(&stored) {
        session.data.admin = current.clone();
        if let Err(resp) = persist_session(&pool, &session).await {
            return resp;
        }
        request.extensions_mut().insert(session);
    }

    match current {
        Some(admin) => {
            request.extensions_mut().insert(admin);
            next.run(request).await
        }
        None => Redirect::to("/admin").into_response(),
    }
}
