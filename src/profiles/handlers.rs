use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthUser,
    error::{AppError, Result},
    profiles::dto::{ProfileRequest, ProfileResponse},
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/health-profile", get(get_profile).post(save_profile))
}

/// 201 on first submission, 200 when an existing profile was updated.
#[instrument(skip(state, payload))]
pub async fn save_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: std::result::Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProfileResponse>)> {
    let Json(payload) = payload?;
    let new = payload.validate(user_id)?;
    let (profile, created) = state.profiles.upsert(new).await?;

    let status = if created {
        info!(profile_id = profile.id, "health profile created");
        StatusCode::CREATED
    } else {
        info!(profile_id = profile.id, "health profile updated");
        StatusCode::OK
    };
    Ok((status, Json(ProfileResponse::from(profile))))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>> {
    let profile = state
        .profiles
        .find_by_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Health profile not found".into()))?;
    Ok(Json(ProfileResponse::from(profile)))
}
