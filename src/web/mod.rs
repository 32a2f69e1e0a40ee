pub mod middleware;
pub mod routes;

use askama::Template;
use axum::{
    extract::FromRef,
    http::{
        header::{HeaderValue, CACHE_CONTROL},
        StatusCode,
    },
    middleware::{from_fn, from_fn_with_state},
    response::{Html, IntoResponse, Response},
    routing::{get, get_service, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{error, warn};

use crate::config::AppConfig;
use crate::services::session_service::{self, Session};
use middleware::{auth, session};
use routes::{activities, admin, login, profile};

/// Stamped by build.rs.
pub const BUILD_ID: &str = env!("SLOTBOARD_BUILD_ID");

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: AppConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

pub fn build_router(state: AppState) -> Router {
    // Player area
    let player_routes = Router::new()
        .route("/activities", get(activities::activities_handler))
        .route(
            "/activities/:activity_id/availability",
            post(activities::save_availability_handler),
        )
        .route(
            "/profile",
            get(profile::profile_page).post(profile::profile_update_handler),
        )
        .route_layer(from_fn(auth::require_player));

    // Admin area, past the login
    let admin_routes = Router::new()
        .route("/admin/logout", post(admin::admin_logout_handler))
        .route("/admin/activities", post(admin::create_activity_handler))
        .route("/admin/export/:table", get(admin::export_handler))
        .route("/admin/players", post(admin::create_player_handler))
        .route("/admin/players/:player_id", post(admin::update_player_handler))
        .route_layer(from_fn_with_state(state.clone(), auth::require_admin));

    Router::new()
        // Public routes
        .route("/", get(login::login_page))
        .route("/login/name", post(login::login_name_handler))
        .route("/login/pin", post(login::login_pin_handler))
        .route("/login/register", post(login::register_handler))
        .route("/login/reset", post(login::not_you_handler))
        .route("/logout", post(login::logout_handler))
        .route("/admin", get(admin::admin_page))
        .route("/admin/login", post(admin::admin_login_handler))
        .route("/admin/setup", post(admin::admin_setup_handler))
        // Protected routes
        .merge(player_routes)
        .merge(admin_routes)
        // Static files
        .nest_service("/assets", get_service(ServeDir::new("assets")))
        // Layers
        .layer(from_fn_with_state(state.clone(), session::attach_session))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        // State
        .with_state(state)
}

pub fn render_html<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Template render failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Stores the session, or the 500 response to return when that fails.
pub async fn persist_session(pool: &SqlitePool, session: &Session) -> Result<(), Response> {
    session_service::save_session(pool, session).await.map_err(|e| {
        warn!("Session save failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

pub fn internal_error(context: &str, err: impl std::fmt::Display) -> Response {
    warn!("{} failed: {}", context, err);
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}
