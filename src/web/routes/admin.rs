use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::database::player_repo;
use crate::services::activity_service::{self, ActivityError, ActivityTableRow, NewActivityForm};
use crate::services::admin_auth_service::{self, AdminAuthError, AuthenticatedAdmin};
use crate::services::admin_setup_service::{self, AdminSetupError, AdminSetupForm};
use crate::services::export_service::{self, ExportTable};
use crate::services::player_admin_service::{
    self, NewPlayerForm, PlayerEditError, PlayerEditForm, PlayerTableRow,
};
use crate::services::session_service::Session;
use crate::web::{internal_error, persist_session, render_html, AppState};

#[derive(Template)]
#[template(path = "admin_login.html")]
pub struct AdminLoginTemplate {
    pub show_setup: bool,
    pub error: Option<String>,
    pub setup_error: Option<String>,
    pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminDashboardTemplate {
    pub admin: AuthenticatedAdmin,
    pub activities: Vec<ActivityTableRow>,
    pub players: Vec<PlayerTableRow>,
    pub export_tables: Vec<&'static str>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AdminQuery {
    pub notice: Option<String>,
}

#[derive(Deserialize)]
pub struct AdminLoginForm {
    app_username: String,
    pin: String,
}

pub async fn admin_page(
    State(pool): State<SqlitePool>,
    Extension(mut session): Extension<Session>,
    Query(query): Query<AdminQuery>,
) -> Response {
    let notice = query.notice.as_deref().and_then(notice_message);
    let Some(stored) = session.data.admin.clone() else {
        return render_login(&pool, None, None, notice).await;
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
    }

    match current {
        Some(admin) => render_dashboard(&pool, admin, notice, None).await,
        None => render_login(&pool, None, None, notice).await,
    }
}

pub async fn admin_login_handler(
    State(pool): State<SqlitePool>,
    Extension(mut session): Extension<Session>,
    Form(form): Form<AdminLoginForm>,
) -> Response {
    let username = form.app_username.trim();
    match admin_auth_service::authenticate_admin(&pool, username, &form.pin).await {
        Ok(admin) => {
            session.data.admin = Some(admin);
            if let Err(resp) = persist_session(&pool, &session).await {
                return resp;
            }
            Redirect::to("/admin").into_response()
        }
        Err(AdminAuthError::Database(e)) => internal_error("Admin login", e),
        Err(e) => render_login(&pool, Some(e.to_string()), None, None).await,
    }
}

pub async fn admin_setup_handler(
    State(state): State<AppState>,
    Form(form): Form<AdminSetupForm>,
) -> Response {
    let token = state.config.admin_setup_token.as_deref();
    match admin_setup_service::create_initial_admin(&state.pool, token, &form).await {
        Ok(_) => Redirect::to("/admin?notice=setup_done").into_response(),
        Err(AdminSetupError::Database(e)) => internal_error("Admin setup", e),
        Err(e) => render_login(&state.pool, None, Some(e.to_string()), None).await,
    }
}

pub async fn admin_logout_handler(
    State(pool): State<SqlitePool>,
    Extension(mut session): Extension<Session>,
) -> Response {
    session.data.admin = None;
    if let Err(resp) = persist_session(&pool, &session).await {
        return resp;
    }
    Redirect::to("/admin").into_response()
}

pub async fn create_activity_handler(
    Extension(admin): Extension<AuthenticatedAdmin>,
    State(pool): State<SqlitePool>,
    Form(form): Form<NewActivityForm>,
) -> Response {
    match activity_service::create_activity(&pool, &form).await {
        Ok(_) => Redirect::to("/admin?notice=activity_created").into_response(),
        Err(ActivityError::Database(e)) => internal_error("Activity create", e),
        Err(e) => render_dashboard(&pool, admin, None, Some(e.to_string())).await,
    }
}

pub async fn export_handler(
    Extension(_admin): Extension<AuthenticatedAdmin>,
    Path(table): Path<String>,
    State(pool): State<SqlitePool>,
) -> Response {
    let Some(table) = ExportTable::from_slug(&table) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match export_service::export_csv(&pool, table).await {
        Ok(bytes) => {
            let headers = [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", table.file_name()),
                ),
            ];
            (headers, bytes).into_response()
        }
        Err(e) => internal_error("CSV export", e),
    }
}

pub async fn create_player_handler(
    Extension(admin): Extension<AuthenticatedAdmin>,
    State(pool): State<SqlitePool>,
    Form(form): Form<NewPlayerForm>,
) -> Response {
    let result = player_admin_service::create_player(&pool, &admin, &form).await;
    player_edit_response(&pool, admin, result.map(|_| "player_created")).await
}

pub async fn update_player_handler(
    Extension(admin): Extension<AuthenticatedAdmin>,
    Path(player_id): Path<i64>,
    State(pool): State<SqlitePool>,
    Form(form): Form<PlayerEditForm>,
) -> Response {
    let result = player_admin_service::update_player(&pool, &admin, player_id, &form).await;
    player_edit_response(&pool, admin, result.map(|_| "player_saved")).await
}

async fn player_edit_response(
    pool: &SqlitePool,
    admin: AuthenticatedAdmin,
    result: Result<&'static str, PlayerEditError>,
) -> Response {
    match result {
        Ok(notice) => Redirect::to(&format!("/admin?notice={}", notice)).into_response(),
        Err(PlayerEditError::Forbidden) => StatusCode::FORBIDDEN.into_response(),
        Err(PlayerEditError::Database(e)) => internal_error("Player edit", e),
        Err(e) => render_dashboard(pool, admin, None, Some(e.to_string())).await,
    }
}

async fn render_login(
    pool: &SqlitePool,
    error: Option<String>,
    setup_error: Option<String>,
    notice: Option<&str>,
) -> Response {
    let show_setup = match player_repo::any_admin_exists(pool).await {
        Ok(exists) => !exists,
        Err(e) => return internal_error("Admin lookup", e),
    };

    let template = AdminLoginTemplate {
        show_setup,
        error,
        setup_error,
        notice: notice.map(str::to_string),
    };
    render_html(&template)
}

async fn render_dashboard(
    pool: &SqlitePool,
    admin: AuthenticatedAdmin,
    notice: Option<&str>,
    error: Option<String>,
) -> Response {
    let activities = match activity_service::list_activity_table(pool).await {
        Ok(rows) => rows,
        Err(e) => return internal_error("Activity table load", e),
    };

    let players = if admin.is_super_admin {
        match player_admin_service::list_player_table(pool).await {
            Ok(rows) => rows,
            Err(e) => return internal_error("Player table load", e),
        }
    } else {
        Vec::new()
    };

    let template = AdminDashboardTemplate {
        admin,
        activities,
        players,
        export_tables: ExportTable::ALL.iter().map(|t| t.slug()).collect(),
        notice: notice.map(str::to_string),
        error,
    };
    render_html(&template)
}

fn notice_message(code: &str) -> Option<&'static str> {
    match code {
        "setup_done" => Some("Admin account created! Log in to continue."),
        "activity_created" => Some("Activity created."),
        "player_created" => Some("Player created."),
        "player_saved" => Some("Player saved."),
        _ => None,
    }
}
