use actix_web::{HttpResponse, web};
use sqlx::SqlitePool;

use crate::engine::payroll;
use crate::error::EngineError;
use crate::model::payroll::PayrollEntry;

/// Calculate and save the payroll entry for one employee in a run
///
/// Recomputes base salary, fixed and formula-driven items, upserts the
/// entry keyed by (run, employee) and refreshes the run's total.
#[utoipa::path(
    post,
    path = "/api/v1/payroll/runs/{run_id}/employees/{employee_id}/calculate",
    params(
        ("run_id" = i64, Path, description = "Payroll run ID"),
        ("employee_id" = i64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Entry calculated", body = PayrollEntry),
        (status = 404, description = "Run or employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Payroll"
)]
pub async fn calculate_entry(
    pool: web::Data<SqlitePool>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, EngineError> {
    let (run_id, employee_id) = path.into_inner();
    let entry = payroll::calculate_and_save_payroll_entry(pool.get_ref(), run_id, employee_id)
        .await?;
    Ok(HttpResponse::Ok().json(entry))
}
