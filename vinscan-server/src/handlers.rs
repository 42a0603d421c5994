use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use serde::Deserialize;
use tracing::info;
use vinscan_core::validator;
use vinscan_model::{
    AddVinRequest, AddVinResponse, CheckVinResponse, HealthResponse, ValidationResult,
};

use crate::{
    errors::{AppError, AppResult},
    state::AppState,
};

pub async fn health(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let records = state.store.len().await?;
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        message: "VIN Scanner API is running".to_string(),
        records,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CheckVinParams {
    vin: Option<String>,
}

pub async fn check_vin(
    State(state): State<AppState>,
    Query(params): Query<CheckVinParams>,
) -> AppResult<Json<CheckVinResponse>> {
    let vin = params
        .vin
        .as_deref()
        .map(str::trim)
        .filter(|vin| !vin.is_empty())
        .ok_or_else(|| AppError::bad_request("No VIN provided"))?;

    let body = match state.store.get(vin).await? {
        Some(record) => {
            info!(vin = %record.code, "VIN found");
            CheckVinResponse::found(record.description, record.recorded_at)
        }
        None => {
            info!(vin, "VIN not found");
            CheckVinResponse::missing()
        }
    };
    Ok(Json(body))
}

pub async fn add_vin(
    State(state): State<AppState>,
    body: Result<Json<AddVinRequest>, JsonRejection>,
) -> AppResult<Json<AddVinResponse>> {
    let Json(request) = body.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    if request.vin_value.trim().is_empty() {
        return Err(AppError::bad_request("No VIN provided"));
    }

    let code = match validator::validate_str(request.vin_value.trim()) {
        ValidationResult::Valid(code) => code,
        ValidationResult::Invalid(reason) => {
            return Err(AppError::bad_request(reason.to_string()));
        }
    };

    let upserted = state.store.upsert(&code, request.description.trim()).await?;
    info!(vin = %code, created = upserted.created, "VIN enrolled");
    Ok(Json(AddVinResponse {
        success: true,
        created: upserted.created,
    }))
}
