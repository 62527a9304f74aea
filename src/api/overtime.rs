use actix_web::{HttpResponse, web};
use sqlx::SqlitePool;

use crate::engine::overtime::{self, NewOvertimeRequest};
use crate::error::EngineError;
use crate::model::overtime::OvertimeRequest;

/// Submit an overtime request
#[utoipa::path(
    post,
    path = "/api/v1/overtime",
    request_body = NewOvertimeRequest,
    responses(
        (status = 201, description = "Overtime request created", body = OvertimeRequest),
        (status = 400, description = "Invalid time span"),
        (status = 409, description = "Overlapping overtime request"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Overtime"
)]
pub async fn create_ot(
    pool: web::Data<SqlitePool>,
    payload: web::Json<NewOvertimeRequest>,
) -> Result<HttpResponse, EngineError> {
    let created = overtime::create_ot_request(pool.get_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}
