use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::services::activity_service;
use crate::services::availability_service::{self, AvailabilityError, SlotCell};
use crate::services::login_flow_service::AuthenticatedPlayer;
use crate::web::{internal_error, render_html};

pub struct ActivityOption {
    pub id: i64,
    pub label: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "activities.html")]
pub struct ActivitiesTemplate {
    pub player_name: String,
    pub activities: Vec<ActivityOption>,
    pub selected_activity_id: i64,
    pub selected_description: String,
    pub slot_rows: Vec<Vec<SlotCell>>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ActivitiesQuery {
    pub activity_id: Option<i64>,
    pub notice: Option<String>,
}

pub async fn activities_handler(
    Extension(player): Extension<AuthenticatedPlayer>,
    State(pool): State<SqlitePool>,
    Query(query): Query<ActivitiesQuery>,
) -> Response {
    let notice = query.notice.as_deref().and_then(notice_message);
    render_activities_page(&pool, &player, query.activity_id, notice, None).await
}

pub async fn save_availability_handler(
    Extension(player): Extension<AuthenticatedPlayer>,
    Path(activity_id): Path<i64>,
    State(pool): State<SqlitePool>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    // Checkboxes arrive as repeated `slot=HH:MM` pairs.
    let slots: Vec<String> = fields
        .into_iter()
        .filter(|(key, _)| key == "slot")
        .map(|(_, value)| value)
        .collect();

    match availability_service::replace_availability(&pool, player.player_id, activity_id, &slots)
        .await
    {
        Ok(_) => Redirect::to(&format!(
            "/activities?activity_id={}&notice=saved",
            activity_id
        ))
        .into_response(),
        Err(AvailabilityError::Database(e)) => internal_error("Availability save", e),
        Err(e) => {
            render_activities_page(&pool, &player, Some(activity_id), None, Some(e.to_string()))
                .await
        }
    }
}

async fn render_activities_page(
    pool: &SqlitePool,
    player: &AuthenticatedPlayer,
    requested_activity_id: Option<i64>,
    notice: Option<&str>,
    error: Option<String>,
) -> Response {
    let activities = match activity_service::list_active_activities(pool).await {
        Ok(rows) => rows,
        Err(e) => return internal_error("Active activities load", e),
    };

    let selected = requested_activity_id
        .and_then(|id| activities.iter().find(|a| a.id == id))
        .or_else(|| activities.first());

    let (selected_activity_id, selected_description, saved_slots) = match selected {
        Some(activity) => {
            let slots = match availability_service::availability_slots(
                pool,
                player.player_id,
                activity.id,
            )
            .await
            {
                Ok(slots) => slots,
                Err(e) => return internal_error("Availability load", e),
            };
            (
                activity.id,
                activity.description.clone().unwrap_or_default(),
                slots,
            )
        }
        None => (0, String::new(), Vec::new()),
    };

    let options = activities
        .iter()
        .map(|a| ActivityOption {
            id: a.id,
            label: a.label(),
            selected: a.id == selected_activity_id,
        })
        .collect();

    let template = ActivitiesTemplate {
        player_name: player.display_name.clone(),
        activities: options,
        selected_activity_id,
        selected_description,
        slot_rows: availability_service::slot_rows(&saved_slots),
        notice: notice.map(str::to_string),
        error,
    };
    render_html(&template)
}

fn notice_message(code: &str) -> Option<&'static str> {
    match code {
        "saved" => Some("Availability saved."),
        _ => None,
    }
}
