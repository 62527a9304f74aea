use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::leave::RequestStatus;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct OvertimeType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,

    /// Pay multiplier applied to overtime in this class (1.0, 1.5, 3.0).
    pub rate_multiplier: f64,
    /// Explicit marker for the 3x holiday bucket, checked ahead of the
    /// multiplier and name heuristics.
    pub is_holiday_rate: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct OvertimeRequest {
    pub id: i64,
    pub employee_id: i64,
    pub ot_type_id: i64,

    #[schema(example = "2025-06-02T18:00:00", value_type = String, format = "date-time")]
    pub start_time: NaiveDateTime,
    #[schema(example = "2025-06-02T20:00:00", value_type = String, format = "date-time")]
    pub end_time: NaiveDateTime,

    pub reason: Option<String>,
    pub status: RequestStatus,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub request_date: Option<NaiveDateTime>,
}
