use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

/// Raw clock pair for one calendar day, as ingested from the device feed.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TimeEntry {
    pub id: i64,
    pub employee_id: i64,

    #[schema(example = "2025-06-02T08:40:00", value_type = String, format = "date-time")]
    pub check_in_time: NaiveDateTime,

    #[schema(example = "2025-06-02T17:30:00", value_type = String, format = "date-time", nullable = true)]
    pub check_out_time: Option<NaiveDateTime>,

    pub notes: Option<String>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    Display,
    ToSchema,
)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absence,
    Leave,
}

/// Materialized per-employee-per-day verdict. Fully derived: the rebuild
/// operation deletes and regenerates rows for a range, never edits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceDaily {
    pub id: i64,
    pub employee_id: i64,

    #[schema(example = "2025-06-02", value_type = String, format = "date")]
    pub day: NaiveDate,

    pub status_code: AttendanceStatus,
    pub work_minutes: i64,
    pub late_minutes: i64,
    pub early_leave_minutes: i64,
    pub is_paid_leave: bool,
    pub ot_weekday_minutes: i64,
    pub ot_holiday_minutes: i64,
}
