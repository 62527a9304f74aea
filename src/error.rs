use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

/// Failure taxonomy of the engine operations.
///
/// Configuration gaps (no schedule, bad formula) are not errors: the
/// classifier skips the day and the evaluator yields 0.0, so nothing in
/// this enum covers them.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("insufficient leave balance for year {year}: need {needed:.2} days, available {available:.2}")]
    InsufficientBalance {
        year: i32,
        needed: f64,
        available: f64,
    },

    #[error("an overlapping request (ID: {id}) already exists for this period")]
    Overlap { id: i64 },

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        match self {
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::InsufficientBalance { .. } | EngineError::Overlap { .. } => {
                StatusCode::CONFLICT
            }
            EngineError::Validation(_) => StatusCode::BAD_REQUEST,
            EngineError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let EngineError::Db(e) = self {
            tracing::error!(error = %e, "Database error");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Internal Server Error"
            }));
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "message": self.to_string()
        }))
    }
}
