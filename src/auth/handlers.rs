use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::SET_COOKIE, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{GoogleAuthRequest, LoginRequest, MessageResponse, PublicUser, RegisterRequest},
        extractors::{clear_cookie, session_cookie, Session},
        services,
    },
    error::{AppError, Result},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(current_session))
        .route("/auth/google", post(google))
}

/// Binds a fresh session to `user_id`, dropping whatever session the request carried.
async fn start_session(state: &AppState, previous: &Session, user_id: i64) -> String {
    if let Some(old) = previous.token.as_deref() {
        state.sessions.destroy(old).await;
    }
    let token = state.sessions.create(user_id).await;
    session_cookie(
        &state.config.session,
        &token,
        state.sessions.ttl().whole_seconds(),
    )
}

#[instrument(skip(state, session, payload))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let user = services::register(state.users.as_ref(), payload).await?;
    let cookie = start_session(&state, &session, user.id).await;
    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, cookie)],
        Json(PublicUser::from(user)),
    ))
}

#[instrument(skip(state, session, payload))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let user = services::login(state.users.as_ref(), payload).await?;
    let cookie = start_session(&state, &session, user.id).await;
    Ok(([(SET_COOKIE, cookie)], Json(PublicUser::from(user))))
}

#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    if let Some(token) = session.token.as_deref() {
        if state.sessions.destroy(token).await {
            info!(user_id = ?session.user_id, "user logged out");
        }
    }
    (
        [(SET_COOKIE, clear_cookie(&state.config.session))],
        Json(MessageResponse {
            message: "Logged out successfully",
        }),
    )
}

#[instrument(skip(state, session))]
pub async fn current_session(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<PublicUser>> {
    let user_id = session
        .user_id
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".into()))?;
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".into()))?;
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, session, payload))]
pub async fn google(
    State(state): State<AppState>,
    session: Session,
    payload: std::result::Result<Json<GoogleAuthRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let (user, created) = services::login_with_google(state.users.as_ref(), payload).await?;
    let cookie = start_session(&state, &session, user.id).await;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, [(SET_COOKIE, cookie)], Json(PublicUser::from(user))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_omits_secrets() {
        let user = crate::auth::repo_types::User {
            id: 1,
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: Some("$argon2id$v=19$...".into()),
            google_id: Some("g-1".into()),
            name: None,
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("alice@example.com"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("g-1"));
    }
}
