use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::config::SessionConfig;
use crate::error::AppError;
use crate::state::AppState;

/// The request's session, resolved from the cookie. Anonymous when `user_id` is `None`.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub token: Option<String>,
    pub user_id: Option<i64>,
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = cookie_value(&parts.headers, &state.config.session.cookie_name) else {
            return Ok(Session::default());
        };
        let user_id = state.sessions.get(token).await;
        if user_id.is_none() {
            debug!("unknown or expired session cookie");
        }
        Ok(Session {
            token: Some(token.to_string()),
            user_id,
        })
    }
}

/// Gate for protected routes: the id of the authenticated user.
pub struct AuthUser(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        session
            .user_id
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".into()))
    }
}

pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, v)| *k == name && !v.is_empty())
        .map(|(_, v)| v)
}

pub fn session_cookie(cfg: &SessionConfig, token: &str, max_age_secs: i64) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        cfg.cookie_name, token, max_age_secs
    );
    if cfg.secure_cookie {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_cookie(cfg: &SessionConfig) -> String {
    session_cookie(cfg, "", 0)
}
