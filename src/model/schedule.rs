use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

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
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(wd: Weekday) -> Self {
        match wd {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

/// One weekday of a work policy. `employee_id` NULL marks the
/// organization-wide template; an employee-specific row always wins.
/// NULL policy fields fall back to the global defaults at resolution time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct WorkingSchedule {
    pub id: i64,
    pub employee_id: Option<i64>,
    pub name: String,
    pub day_of_week: DayOfWeek,
    pub is_working_day: bool,

    #[schema(value_type = String, format = "time", nullable = true)]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = String, format = "time", nullable = true)]
    pub end_time: Option<NaiveTime>,
    #[schema(value_type = String, format = "time", nullable = true)]
    pub break_start_time: Option<NaiveTime>,
    #[schema(value_type = String, format = "time", nullable = true)]
    pub break_end_time: Option<NaiveTime>,

    pub is_active: bool,
    pub is_default: bool,

    pub late_grace_min: Option<i64>,
    pub early_leave_grace_min: Option<i64>,
    pub absence_after_min: Option<i64>,
    pub standard_daily_minutes: Option<i64>,
    pub break_minutes_override: Option<i64>,
}
