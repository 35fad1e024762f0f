//! Patient intake and record operations.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use triagedesk_common::{IntakeRequest, PatientId, PatientRecord, Profile};

use crate::error::ApiError;
use crate::state::SharedState;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub profile: String,
}

/// POST /api/patients
pub async fn create_patient(
    State(state): State<SharedState>,
    body: Result<Json<IntakeRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PatientRecord>)> {
    let Json(req) = body?;
    let record = state.desk.intake(req).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/patients/{id}
pub async fn get_patient(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PatientRecord>> {
    Ok(Json(state.desk.get(&PatientId::from(id)).await?))
}

/// POST /api/patients/{id}/retriage
pub async fn retriage_patient(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Result<Json<IntakeRequest>, JsonRejection>,
) -> ApiResult<Json<PatientRecord>> {
    let Json(req) = body?;
    Ok(Json(state.desk.retriage(&PatientId::from(id), req).await?))
}

/// POST /api/patients/{id}/seen
pub async fn mark_seen(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PatientRecord>> {
    Ok(Json(state.desk.mark_seen(&PatientId::from(id)).await?))
}

/// PUT /api/patients/{id}/profile
pub async fn set_profile(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Result<Json<ProfileUpdate>, JsonRejection>,
) -> ApiResult<Json<PatientRecord>> {
    let Json(update) = body?;
    let profile: Profile = update.profile.parse().map_err(ApiError::BadRequest)?;
    Ok(Json(state.desk.reassign_profile(&PatientId::from(id), profile).await?))
}
