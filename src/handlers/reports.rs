use actix_web::{HttpResponse, web};

use crate::database::models::ClockedInReport;
use crate::database::repositories::AttendanceRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::Claims;

pub async fn get_shift_adherence(
    claims: Claims,
    repo: web::Data<AttendanceRepository>,
) -> Result<HttpResponse, AppError> {
    claims.require_manager()?;

    let report = repo.shift_adherence(claims.organization_id).await?;

    Ok(ApiResponse::success(report))
}

pub async fn get_clocked_in_count(
    claims: Claims,
    repo: web::Data<AttendanceRepository>,
) -> Result<HttpResponse, AppError> {
    claims.require_manager()?;

    let clocked_in = repo.clocked_in_count(claims.organization_id).await?;

    Ok(ApiResponse::success(ClockedInReport { clocked_in }))
}

pub async fn get_shift_timing_issues(
    claims: Claims,
    repo: web::Data<AttendanceRepository>,
) -> Result<HttpResponse, AppError> {
    claims.require_manager()?;

    let issues = repo.shift_timing_issues(claims.organization_id).await?;

    Ok(ApiResponse::success(issues))
}
