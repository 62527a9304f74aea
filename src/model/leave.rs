use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Shared status family of leave and overtime requests.
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
    EnumString,
    ToSchema,
)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,

    /// Base yearly quota in days.
    pub annual_quota: f64,
    /// When false the ledger ignores this type entirely.
    pub affects_balance: bool,
    pub is_paid_leave: bool,
    /// Extra days granted per completed year of service.
    pub accrue_per_year: f64,
    /// Cap applied to the seeded opening; 0 means uncapped.
    pub max_quota: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    pub id: i64,
    pub employee_id: i64,
    pub leave_type_id: i64,

    #[schema(example = "2025-06-02T00:00:00", value_type = String, format = "date-time")]
    pub start_date: NaiveDateTime,
    #[schema(example = "2025-06-03T00:00:00", value_type = String, format = "date-time")]
    pub end_date: NaiveDateTime,

    pub reason: Option<String>,
    pub status: RequestStatus,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub request_date: Option<NaiveDateTime>,
}

/// Per employee, leave type and year. `available` is always derived, never
/// stored: opening + accrued + carry_in + adjusted - used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveBalance {
    pub id: i64,
    pub employee_id: i64,
    pub leave_type_id: i64,
    pub year: i32,
    pub opening: f64,
    pub accrued: f64,
    pub used: f64,
    pub adjusted: f64,
    pub carry_in: f64,
}

impl LeaveBalance {
    pub fn available(&self) -> f64 {
        self.opening + self.accrued + self.carry_in + self.adjusted - self.used
    }
}
