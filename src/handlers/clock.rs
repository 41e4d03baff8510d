use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::database::models::{
    ClockEventInput, ClockMethod, CodeClockInRequest, UpdateClockRulesRequest,
};
use crate::database::repositories::{ClockRepository, ShiftRepository};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{Claims, ClockCodeService};

pub async fn clock_in(
    claims: Claims,
    path: web::Path<Uuid>,
    input: web::Json<ClockEventInput>,
    shift_repo: web::Data<ShiftRepository>,
    clock_repo: web::Data<ClockRepository>,
) -> Result<HttpResponse, AppError> {
    let shift_id = path.into_inner();

    let shift = shift_repo
        .find_by_id(shift_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;

    claims.require_same_organization(shift.organization_id)?;

    let clock = clock_repo
        .clock_in(shift_id, claims.user_id(), claims.user_id(), &input.into_inner())
        .await?;

    Ok(ApiResponse::created(clock))
}

pub async fn clock_out(
    claims: Claims,
    path: web::Path<Uuid>,
    input: web::Json<ClockEventInput>,
    shift_repo: web::Data<ShiftRepository>,
    clock_repo: web::Data<ClockRepository>,
) -> Result<HttpResponse, AppError> {
    let shift_id = path.into_inner();

    if let Some(shift) = shift_repo.find_by_id(shift_id).await? {
        claims.require_same_organization(shift.organization_id)?;
    }

    let clock = clock_repo
        .clock_out(shift_id, claims.user_id(), &input.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Clock not found for this shift/user".to_string()))?;

    Ok(ApiResponse::created(clock))
}

pub async fn get_shift_clocks(
    claims: Claims,
    path: web::Path<Uuid>,
    shift_repo: web::Data<ShiftRepository>,
    clock_repo: web::Data<ClockRepository>,
) -> Result<HttpResponse, AppError> {
    let shift_id = path.into_inner();

    let shift = shift_repo
        .find_by_id(shift_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;

    claims.require_same_organization(shift.organization_id)?;
    claims.require_self_or_manager(shift.user_id)?;

    let clocks = clock_repo.find_by_shift(shift_id).await?;

    Ok(ApiResponse::success(clocks))
}

pub async fn update_clock_rules(
    claims: Claims,
    path: web::Path<Uuid>,
    input: web::Json<UpdateClockRulesRequest>,
    shift_repo: web::Data<ShiftRepository>,
    clock_repo: web::Data<ClockRepository>,
) -> Result<HttpResponse, AppError> {
    claims.require_manager()?;

    let clock_id = path.into_inner();

    let clock = clock_repo
        .find_by_id(clock_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Clock not found".to_string()))?;

    let shift = shift_repo
        .find_by_id(clock.shift_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;

    claims.require_same_organization(shift.organization_id)?;

    let updated = clock_repo
        .update_rules(clock_id, &input.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Clock not found".to_string()))?;

    Ok(ApiResponse::success(updated))
}

/// Issue a short-lived proof-of-presence code for the caller's clock on this
/// shift, creating the clock if this is the first touch.
pub async fn generate_clock_code(
    claims: Claims,
    path: web::Path<Uuid>,
    shift_repo: web::Data<ShiftRepository>,
    clock_repo: web::Data<ClockRepository>,
    code_service: web::Data<ClockCodeService>,
) -> Result<HttpResponse, AppError> {
    let shift_id = path.into_inner();

    let shift = shift_repo
        .find_by_id(shift_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;

    claims.require_same_organization(shift.organization_id)?;

    let clock = clock_repo
        .find_or_create(shift_id, claims.user_id(), claims.user_id())
        .await?;

    let issued = code_service.issue(clock.id, shift_id, claims.user_id())?;

    Ok(ApiResponse::success(issued))
}

pub async fn clock_in_with_code(
    claims: Claims,
    path: web::Path<Uuid>,
    input: web::Json<CodeClockInRequest>,
    shift_repo: web::Data<ShiftRepository>,
    clock_repo: web::Data<ClockRepository>,
    code_service: web::Data<ClockCodeService>,
) -> Result<HttpResponse, AppError> {
    let shift_id = path.into_inner();

    let shift = shift_repo
        .find_by_id(shift_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;

    claims.require_same_organization(shift.organization_id)?;

    let request = input.into_inner();
    let clock_id = code_service.verify(&request.code, shift_id, claims.user_id())?;

    let event = ClockEventInput {
        method: ClockMethod::Qr,
        latitude: request.latitude,
        longitude: request.longitude,
        ip_address: request.ip_address,
        device: request.device,
        clock_at: request.clock_at,
    };

    let clock = clock_repo
        .clock_in_with_code(clock_id, shift_id, claims.user_id(), &event)
        .await?
        .ok_or_else(|| AppError::NotFound("Clock not found for this shift/user".to_string()))?;

    Ok(ApiResponse::created(clock))
}
