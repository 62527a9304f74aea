//! Schedule Policy Resolver: picks the effective working schedule for an
//! employee on a given day and materializes it into a complete policy,
//! filling NULL fields from the global defaults.

use chrono::{Datelike, NaiveDate, NaiveTime};
use sqlx::SqliteConnection;

use crate::config::AttendanceDefaults;
use crate::model::schedule::{DayOfWeek, WorkingSchedule};

/// Fully resolved policy for one employee-day. All thresholds are concrete;
/// `is_working_day` false means the day is skipped by classification.
#[derive(Debug, Clone, PartialEq)]
pub struct DayPolicy {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub late_grace_min: i64,
    pub early_leave_grace_min: i64,
    pub absence_after_min: i64,
    pub standard_daily_minutes: i64,
    pub break_minutes: i64,
    pub is_working_day: bool,
}

const SCHEDULE_COLUMNS: &str = "id, employee_id, name, day_of_week, is_working_day, \
     start_time, end_time, break_start_time, break_end_time, is_active, is_default, \
     late_grace_min, early_leave_grace_min, absence_after_min, standard_daily_minutes, \
     break_minutes_override";

/// Effective schedule for the weekday: an active employee-specific row if
/// one exists, otherwise the active template (no employee). Candidates are
/// ordered `is_default DESC, id ASC` so resolution never depends on
/// insertion order.
pub async fn schedule_for_day(
    conn: &mut SqliteConnection,
    employee_id: i64,
    day: NaiveDate,
) -> Result<Option<WorkingSchedule>, sqlx::Error> {
    let dow: DayOfWeek = day.weekday().into();

    let sql = format!(
        "SELECT {SCHEDULE_COLUMNS} FROM working_schedules \
         WHERE day_of_week = ? AND is_active = 1 AND employee_id = ? \
         ORDER BY is_default DESC, id ASC LIMIT 1"
    );
    let own: Option<WorkingSchedule> = sqlx::query_as(&sql)
        .bind(dow)
        .bind(employee_id)
        .fetch_optional(&mut *conn)
        .await?;
    if own.is_some() {
        return Ok(own);
    }

    let sql = format!(
        "SELECT {SCHEDULE_COLUMNS} FROM working_schedules \
         WHERE day_of_week = ? AND is_active = 1 AND employee_id IS NULL \
         ORDER BY is_default DESC, id ASC LIMIT 1"
    );
    sqlx::query_as(&sql).bind(dow).fetch_optional(conn).await
}

/// Break minutes: the explicit override wins, else the break window span.
fn break_minutes(ws: &WorkingSchedule) -> i64 {
    if let Some(v) = ws.break_minutes_override {
        return v.max(0);
    }
    match (ws.break_start_time, ws.break_end_time) {
        (Some(start), Some(end)) if start < end => (end - start).num_minutes(),
        _ => 0,
    }
}

pub fn policy_from_schedule(ws: &WorkingSchedule, defaults: &AttendanceDefaults) -> DayPolicy {
    DayPolicy {
        start_time: ws.start_time.unwrap_or(defaults.start_time),
        end_time: ws.end_time.unwrap_or(defaults.end_time),
        late_grace_min: ws.late_grace_min.unwrap_or(defaults.late_grace_min),
        early_leave_grace_min: ws
            .early_leave_grace_min
            .unwrap_or(defaults.early_leave_grace_min),
        absence_after_min: ws.absence_after_min.unwrap_or(defaults.absence_after_min),
        standard_daily_minutes: ws
            .standard_daily_minutes
            .unwrap_or(defaults.standard_daily_minutes),
        break_minutes: break_minutes(ws),
        is_working_day: ws.is_working_day,
    }
}

/// Resolves the applicable policy, or None when no schedule matches at all
/// (the day is then simply unclassifiable, not an error).
pub async fn resolve_policy(
    conn: &mut SqliteConnection,
    defaults: &AttendanceDefaults,
    employee_id: i64,
    day: NaiveDate,
) -> Result<Option<DayPolicy>, sqlx::Error> {
    let ws = schedule_for_day(conn, employee_id, day).await?;
    Ok(ws.map(|ws| policy_from_schedule(&ws, defaults)))
}

/// Per-weekday break override used when clipping overtime requests. Only
/// the explicit override counts here; a break window derived from start/end
/// times does not apply to overtime spans.
pub async fn break_override_minutes(
    conn: &mut SqliteConnection,
    employee_id: i64,
    day: NaiveDate,
) -> Result<i64, sqlx::Error> {
    let ws = schedule_for_day(conn, employee_id, day).await?;
    Ok(ws
        .and_then(|ws| ws.break_minutes_override)
        .map(|v| v.max(0))
        .unwrap_or(0))
}
