use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::services::login_flow_service::{
    self, LoginAction, LoginError, LoginStage, LoginTransition,
};
use crate::services::session_service::Session;
use crate::web::{internal_error, persist_session, render_html};

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub stage: &'static str,
    pub candidate_name: String,
    pub requires_pin: bool,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginNameForm {
    login_name: String,
}

#[derive(Deserialize)]
pub struct LoginPinForm {
    pin: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    user_game_id: String,
    pin: Option<String>,
}

pub async fn login_page(
    State(pool): State<SqlitePool>,
    Extension(mut session): Extension<Session>,
) -> Response {
    if session.data.player.is_some() {
        return Redirect::to("/activities").into_response();
    }
    render_login(&pool, &mut session, None).await
}

pub async fn login_name_handler(
    State(pool): State<SqlitePool>,
    Extension(session): Extension<Session>,
    Form(form): Form<LoginNameForm>,
) -> Response {
    let action = LoginAction::SubmitName {
        login_name: form.login_name,
    };
    apply_login_action(&pool, session, action).await
}

pub async fn login_pin_handler(
    State(pool): State<SqlitePool>,
    Extension(session): Extension<Session>,
    Form(form): Form<LoginPinForm>,
) -> Response {
    let action = LoginAction::SubmitPin { pin: form.pin };
    apply_login_action(&pool, session, action).await
}

pub async fn register_handler(
    State(pool): State<SqlitePool>,
    Extension(session): Extension<Session>,
    Form(form): Form<RegisterForm>,
) -> Response {
    let action = LoginAction::Register {
        user_game_id: form.user_game_id,
        pin: form.pin,
    };
    apply_login_action(&pool, session, action).await
}

pub async fn not_you_handler(
    State(pool): State<SqlitePool>,
    Extension(session): Extension<Session>,
) -> Response {
    apply_login_action(&pool, session, LoginAction::NotYou).await
}

pub async fn logout_handler(
    State(pool): State<SqlitePool>,
    Extension(mut session): Extension<Session>,
) -> Response {
    session.data.player = None;
    session.data.login = LoginStage::EnterName;
    if let Err(resp) = persist_session(&pool, &session).await {
        return resp;
    }
    Redirect::to("/").into_response()
}

async fn apply_login_action(
    pool: &SqlitePool,
    mut session: Session,
    action: LoginAction,
) -> Response {
    let result = login_flow_service::advance(pool, &session.data.login, action).await;
    match result {
        Ok(LoginTransition::Stage(stage)) => {
            session.data.login = stage;
            if let Err(resp) = persist_session(pool, &session).await {
                return resp;
            }
            Redirect::to("/").into_response()
        }
        Ok(LoginTransition::Authenticated(player)) => {
            session.data.player = Some(player);
            session.data.login = LoginStage::EnterName;
            if let Err(resp) = persist_session(pool, &session).await {
                return resp;
            }
            Redirect::to("/activities").into_response()
        }
        Err(LoginError::Database(e)) => internal_error("Login step", e),
        Err(e) => {
            if e.resets_flow() {
                session.data.login = LoginStage::EnterName;
                if let Err(resp) = persist_session(pool, &session).await {
                    return resp;
                }
            }
            render_login(pool, &mut session, Some(e.to_string())).await
        }
    }
}

async fn render_login(
    pool: &SqlitePool,
    session: &mut Session,
    mut error: Option<String>,
) -> Response {
    let candidate_player_id = match &session.data.login {
        LoginStage::Existing {
            candidate_player_id,
            ..
        } => Some(*candidate_player_id),
        _ => None,
    };

    let mut requires_pin = false;
    if let Some(candidate_player_id) = candidate_player_id {
        match login_flow_service::load_candidate(pool, candidate_player_id).await {
            Ok(player) => requires_pin = player.has_pin(),
            Err(LoginError::Database(e)) => return internal_error("Login candidate load", e),
            Err(e) => {
                // Candidate disappeared since the name step; start over.
                error = Some(e.to_string());
                session.data.login = LoginStage::EnterName;
                if let Err(resp) = persist_session(pool, session).await {
                    return resp;
                }
            }
        }
    }

    let template = LoginTemplate {
        stage: session.data.login.as_str(),
        candidate_name: session
            .data
            .login
            .candidate_name()
            .unwrap_or_default()
            .to_string(),
        requires_pin,
        error,
    };
    render_html(&template)
}
