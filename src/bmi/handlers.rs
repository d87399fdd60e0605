use axum::{
    extract::{rejection::QueryRejection, Query},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    bmi::services::{check_measurements, BmiReport},
    error::{AppError, Result},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct BmiQuery {
    pub weight: f64,
    pub height: f64,
}

pub fn bmi_routes() -> Router<AppState> {
    Router::new().route("/bmi", get(calculate))
}

#[instrument]
pub async fn calculate(
    query: std::result::Result<Query<BmiQuery>, QueryRejection>,
) -> Result<Json<BmiReport>> {
    let Query(q) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let mut errors = Vec::new();
    check_measurements(q.weight, q.height, &mut errors);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    Ok(Json(BmiReport::new(q.weight, q.height)))
}
