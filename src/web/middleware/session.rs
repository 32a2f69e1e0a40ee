use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use cookie::time::Duration;
use cookie::{Cookie, SameSite};
use sqlx::SqlitePool;
use tracing::warn;

use crate::services::session_service::{self, Session, SESSION_MAX_AGE_DAYS};

pub const SESSION_COOKIE: &str = "slotboard_session";

/// Loads (or starts) the visitor's session and puts it in the request extensions.
/// Handlers that change it store it again with `persist_session`.
pub async fn attach_session(
    State(pool): State<SqlitePool>,
    mut request: Request,
    next: Next,
) -> Response {
    let session_id = request
        .headers()
        .get(header::COOKIE)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|cookies| cookie_value(cookies, SESSION_COOKIE))
        .map(str::to_string);

    let session = match session_id {
        Some(id) => match session_service::load_session(&pool, &id).await {
            Ok(Some(session)) => session,
            Ok(None) => Session::new(),
            Err(e) => {
                warn!("Session load failed: {}", e);
                Session::new()
            }
        },
        None => Session::new(),
    };

    let new_cookie = session.is_new.then(|| session_cookie(&session.id));
    request.extensions_mut().insert(session);

    let mut response = next.run(request).await;
    if let Some(cookie) = new_cookie {
        if let Ok(value) = cookie.to_string().parse() {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

pub fn session_cookie(session_id: &str) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, session_id.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(Duration::days(SESSION_MAX_AGE_DAYS));
    cookie
}

fn cookie_value<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|c| c.strip_prefix(name)?.strip_prefix('='))
}
