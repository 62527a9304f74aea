use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

use crate::config::Config;
use crate::engine::leave::{
    self, LeaveBalanceView, NewLeaveRequest, SeedSummary, UpdateLeaveRequest,
};
use crate::error::EngineError;
use crate::model::leave::{LeaveBalance, LeaveRequest};

/// Submit a leave request
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body = NewLeaveRequest,
    responses(
        (status = 201, description = "Leave request created", body = LeaveRequest),
        (status = 400, description = "Invalid dates"),
        (status = 409, description = "Overlapping request or insufficient balance"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    payload: web::Json<NewLeaveRequest>,
) -> Result<HttpResponse, EngineError> {
    let created = leave::create_leave_request(
        pool.get_ref(),
        &config.attendance_defaults,
        &config.ledger_policy,
        payload.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(created))
}

/// Edit a leave request
///
/// Status transitions move the ledger's `used` in step; changing the span
/// of an approved request reverses and reapplies the usage atomically.
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}",
    request_body = UpdateLeaveRequest,
    params(
        ("leave_id" = i64, Path, description = "ID of the leave request to edit")
    ),
    responses(
        (status = 200, description = "Leave request updated", body = LeaveRequest),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Overlapping request or insufficient balance"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn update_leave(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    path: web::Path<i64>,
    payload: web::Json<UpdateLeaveRequest>,
) -> Result<HttpResponse, EngineError> {
    let updated = leave::update_leave_request(
        pool.get_ref(),
        &config.attendance_defaults,
        &config.ledger_policy,
        path.into_inner(),
        payload.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Approve a leave request
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(
        ("leave_id" = i64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved", body = LeaveRequest),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Insufficient leave balance"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    path: web::Path<i64>,
) -> Result<HttpResponse, EngineError> {
    let approved = leave::approve_leave_request(
        pool.get_ref(),
        &config.attendance_defaults,
        &config.ledger_policy,
        path.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(approved))
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RejectBody {
    #[schema(example = "Project deadline", nullable = true)]
    pub reason: Option<String>,
}

/// Reject a leave request
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    request_body = RejectBody,
    params(
        ("leave_id" = i64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected", body = LeaveRequest),
        (status = 404, description = "Leave request not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    path: web::Path<i64>,
    payload: Option<web::Json<RejectBody>>,
) -> Result<HttpResponse, EngineError> {
    let reason = payload.and_then(|p| p.into_inner().reason);
    let rejected = leave::reject_leave_request(
        pool.get_ref(),
        &config.attendance_defaults,
        &config.ledger_policy,
        path.into_inner(),
        reason,
    )
    .await?;
    Ok(HttpResponse::Ok().json(rejected))
}

#[derive(Deserialize, IntoParams)]
pub struct BalanceQuery {
    #[param(example = 1)]
    pub employee_id: i64,

    #[param(example = 2025)]
    pub year: i32,
}

/// Leave balances of one employee for a year
#[utoipa::path(
    get,
    path = "/api/v1/leave-balances",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Balances with computed availability", body = [LeaveBalanceView]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn list_balances(
    pool: web::Data<SqlitePool>,
    query: web::Query<BalanceQuery>,
) -> Result<HttpResponse, EngineError> {
    let rows = leave::list_leave_balances(pool.get_ref(), query.employee_id, query.year).await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[derive(Deserialize, ToSchema)]
pub struct SeedBody {
    #[schema(example = 2025)]
    pub year: i32,
}

/// Seed opening quotas for every employee and balance-affecting leave type
#[utoipa::path(
    post,
    path = "/api/v1/leave-balances/seed",
    request_body = SeedBody,
    responses(
        (status = 200, description = "Balances seeded", body = SeedSummary),
        (status = 400, description = "Invalid year"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn seed_balances(
    pool: web::Data<SqlitePool>,
    payload: web::Json<SeedBody>,
) -> Result<HttpResponse, EngineError> {
    let summary = leave::seed_leave_balances(pool.get_ref(), payload.year).await?;
    tracing::info!(year = summary.year, created = summary.created, "Leave balances seeded");
    Ok(HttpResponse::Ok().json(summary))
}

#[derive(Deserialize, ToSchema)]
pub struct AdjustBody {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = 1)]
    pub leave_type_id: i64,
    #[schema(example = 2025)]
    pub year: i32,
    /// Signed correction applied to the `adjusted` field.
    #[schema(example = 1.5)]
    pub delta: f64,
}

/// Administrative balance adjustment
#[utoipa::path(
    post,
    path = "/api/v1/leave-balances/adjust",
    request_body = AdjustBody,
    responses(
        (status = 200, description = "Balance adjusted", body = LeaveBalance),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn adjust_balance(
    pool: web::Data<SqlitePool>,
    payload: web::Json<AdjustBody>,
) -> Result<HttpResponse, EngineError> {
    let balance = leave::adjust_leave_balance(
        pool.get_ref(),
        payload.employee_id,
        payload.leave_type_id,
        payload.year,
        payload.delta,
    )
    .await?;
    Ok(HttpResponse::Ok().json(balance))
}
