use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::{utc_before, utc_now, web_session_repo};
use crate::services::admin_auth_service::AuthenticatedAdmin;
use crate::services::login_flow_service::{AuthenticatedPlayer, LoginStage};

/// Sessions untouched for longer than this are treated as gone.
pub const SESSION_MAX_AGE_DAYS: i64 = 30;

fn session_cutoff() -> String {
    utc_before(TimeDelta::days(SESSION_MAX_AGE_DAYS))
}

/// Everything a visitor carries between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub login: LoginStage,
    #[serde(default)]
    pub player: Option<AuthenticatedPlayer>,
    #[serde(default)]
    pub admin: Option<AuthenticatedAdmin>,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub data: SessionData,
    pub is_new: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            data: SessionData::default(),
            is_new: true,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Loads a stored session. Unknown ids, malformed ids and unreadable data all
/// yield `None`, so the caller starts a fresh session.
pub async fn load_session(pool: &SqlitePool, session_id: &str) -> sqlx::Result<Option<Session>> {
    if Uuid::parse_str(session_id).is_err() {
        return Ok(None);
    }
    let Some(row) = web_session_repo::load_session(pool, session_id, &session_cutoff()).await?
    else {
        return Ok(None);
    };
    match serde_json::from_str::<SessionData>(&row.data) {
        Ok(data) => Ok(Some(Session {
            id: row.session_id,
            data,
            is_new: false,
        })),
        Err(e) => {
            warn!("Discarding unreadable session data: {}", e);
            Ok(None)
        }
    }
}

/// Stores the session. A session back in its initial state (no login in
/// progress, nobody logged in) is deleted instead.
pub async fn save_session(pool: &SqlitePool, session: &Session) -> sqlx::Result<()> {
    if session.data == SessionData::default() {
        web_session_repo::delete_session(pool, &session.id).await?;
        return Ok(());
    }
    let data =
        serde_json::to_string(&session.data).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
    web_session_repo::upsert_session(pool, &session.id, &data, &utc_now()).await?;
    Ok(())
}

/// Deletes sessions older than `SESSION_MAX_AGE_DAYS`. Run at startup.
pub async fn prune_expired_sessions(pool: &SqlitePool) -> sqlx::Result<u64> {
    let removed = web_session_repo::delete_stale_sessions(pool, &session_cutoff()).await?;
    if removed > 0 {
        info!("Pruned {} expired sessions", removed);
    }
    Ok(removed)
}
