use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

use crate::config::Config;
use crate::engine::snapshot::{self, AttendanceMetrics, RebuildSummary};
use crate::error::EngineError;

#[derive(Deserialize, ToSchema)]
pub struct RebuildRequest {
    #[schema(example = "2025-06-01", value_type = String, format = "date")]
    pub start: NaiveDate,

    #[schema(example = "2025-06-30", value_type = String, format = "date")]
    pub end: NaiveDate,

    /// Restrict the rebuild to one employee.
    #[schema(example = 1, nullable = true)]
    pub employee_id: Option<i64>,
}

/// Rebuild the attendance snapshot for a date range
#[utoipa::path(
    post,
    path = "/api/v1/attendance/rebuild",
    request_body = RebuildRequest,
    responses(
        (status = 200, description = "Snapshot rebuilt", body = RebuildSummary),
        (status = 400, description = "Invalid range"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn rebuild(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    payload: web::Json<RebuildRequest>,
) -> Result<HttpResponse, EngineError> {
    if payload.start > payload.end {
        return Err(EngineError::Validation(
            "start cannot be after end".into(),
        ));
    }

    let summary = snapshot::rebuild_attendance_range(
        pool.get_ref(),
        &config.attendance_defaults,
        payload.start,
        payload.end,
        payload.employee_id,
    )
    .await?;

    tracing::info!(
        start = %summary.start,
        end = %summary.end,
        rows = summary.rows_inserted,
        "Attendance snapshot rebuilt"
    );
    Ok(HttpResponse::Ok().json(summary))
}

#[derive(Deserialize, IntoParams)]
pub struct MetricsQuery {
    #[param(example = 1)]
    pub employee_id: i64,

    #[param(example = "2025-06-01", value_type = String)]
    pub start: NaiveDate,

    #[param(example = "2025-06-30", value_type = String)]
    pub end: NaiveDate,
}

/// Attendance and overtime aggregates for a period
#[utoipa::path(
    get,
    path = "/api/v1/attendance/metrics",
    params(MetricsQuery),
    responses(
        (status = 200, description = "Aggregated metrics", body = AttendanceMetrics),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn metrics(
    pool: web::Data<SqlitePool>,
    query: web::Query<MetricsQuery>,
) -> Result<HttpResponse, EngineError> {
    let metrics =
        snapshot::attendance_metrics(pool.get_ref(), query.employee_id, query.start, query.end)
            .await?;
    Ok(HttpResponse::Ok().json(metrics))
}
