use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::database::models::{
    CreateShiftsRequest, ShiftsQuery, UpdateSettingsRequest, UpdateShiftRequest,
};
use crate::database::repositories::ShiftRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::Claims;

/// Create one or more shifts in a single batch.
pub async fn create_shifts(
    claims: Claims,
    input: web::Json<CreateShiftsRequest>,
    repo: web::Data<ShiftRepository>,
) -> Result<HttpResponse, AppError> {
    claims.require_manager()?;

    let request = input.into_inner();
    if request.shifts.is_empty() {
        return Err(AppError::BadRequest(
            "At least one shift entry is required".to_string(),
        ));
    }
    for entry in &request.shifts {
        if let Some(end_time) = entry.end_time {
            if end_time < entry.start_time {
                return Err(AppError::BadRequest(
                    "Shift end time must not precede its start time".to_string(),
                ));
            }
        }
    }

    let shifts = repo
        .create_shifts(claims.organization_id, &request.shifts)
        .await?;

    Ok(ApiResponse::created(shifts))
}

pub async fn get_shifts(
    claims: Claims,
    query: web::Query<ShiftsQuery>,
    repo: web::Data<ShiftRepository>,
) -> Result<HttpResponse, AppError> {
    // Managers may narrow the listing to one user's shifts; employees only
    // ever see their own.
    let user_filter = if claims.is_manager_or_admin() {
        query.manager_id
    } else {
        Some(claims.user_id())
    };

    let shifts = repo
        .find_by_organization(claims.organization_id, user_filter)
        .await?;

    Ok(ApiResponse::success(shifts))
}

pub async fn get_shift(
    claims: Claims,
    path: web::Path<Uuid>,
    repo: web::Data<ShiftRepository>,
) -> Result<HttpResponse, AppError> {
    let shift_id = path.into_inner();

    let shift = repo
        .find_by_id(shift_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;

    claims.require_same_organization(shift.organization_id)?;
    claims.require_self_or_manager(shift.user_id)?;

    Ok(ApiResponse::success(shift))
}

pub async fn update_shift(
    claims: Claims,
    path: web::Path<Uuid>,
    input: web::Json<UpdateShiftRequest>,
    repo: web::Data<ShiftRepository>,
) -> Result<HttpResponse, AppError> {
    claims.require_manager()?;

    let shift_id = path.into_inner();
    let changes = input.into_inner();

    let shift = repo
        .find_by_id(shift_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;

    claims.require_same_organization(shift.organization_id)?;

    let effective_start = changes.start_time.unwrap_or(shift.start_time);
    if let Some(end_time) = changes.end_time {
        if end_time < effective_start {
            return Err(AppError::BadRequest(
                "Shift end time must not precede its start time".to_string(),
            ));
        }
    }

    let updated = repo
        .update_shift(shift_id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;

    Ok(ApiResponse::success(updated))
}

pub async fn get_shift_settings(
    claims: Claims,
    repo: web::Data<ShiftRepository>,
) -> Result<HttpResponse, AppError> {
    let settings = repo
        .get_settings(claims.organization_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Settings not found".to_string()))?;

    Ok(ApiResponse::success(settings))
}

pub async fn update_shift_settings(
    claims: Claims,
    input: web::Json<UpdateSettingsRequest>,
    repo: web::Data<ShiftRepository>,
) -> Result<HttpResponse, AppError> {
    claims.require_manager()?;

    let settings = repo
        .update_settings(claims.organization_id, &input.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Settings not found".to_string()))?;

    Ok(ApiResponse::success(settings))
}
