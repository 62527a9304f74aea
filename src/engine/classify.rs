//! Daily Attendance Classifier: turns one employee-day into at most one
//! snapshot record.
//!
//! Priority order: approved leave, then holiday / missing policy /
//! non-working day (skipped), then no clock event (absence), then the
//! clocked computation. The arithmetic lives in [`classify_clocked`] so the
//! grace and threshold rules are testable without a database.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use sqlx::SqliteConnection;

use crate::config::AttendanceDefaults;
use crate::engine::schedule::{self, DayPolicy};
use crate::model::attendance::AttendanceStatus;
use crate::model::leave::RequestStatus;

/// Classification outcome for one employee-day, ready to be inserted as a
/// snapshot row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRecord {
    pub status: AttendanceStatus,
    pub work_minutes: i64,
    pub late_minutes: i64,
    pub early_leave_minutes: i64,
    pub is_paid_leave: bool,
    pub ot_weekday_minutes: i64,
    pub ot_holiday_minutes: i64,
}

impl DayRecord {
    fn leave(is_paid: bool) -> Self {
        Self {
            status: AttendanceStatus::Leave,
            work_minutes: 0,
            late_minutes: 0,
            early_leave_minutes: 0,
            is_paid_leave: is_paid,
            ot_weekday_minutes: 0,
            ot_holiday_minutes: 0,
        }
    }

    fn absence(work_minutes: i64) -> Self {
        Self {
            status: AttendanceStatus::Absence,
            work_minutes,
            late_minutes: 0,
            early_leave_minutes: 0,
            is_paid_leave: false,
            ot_weekday_minutes: 0,
            ot_holiday_minutes: 0,
        }
    }
}

/// An approved leave request covers the day when its span contains the
/// day's midnight instant.
async fn approved_leave_for_day(
    conn: &mut SqliteConnection,
    employee_id: i64,
    day: NaiveDate,
) -> Result<Option<bool>, sqlx::Error> {
    let midnight = day.and_hms_opt(0, 0, 0).unwrap();
    let row: Option<(i64, bool)> = sqlx::query_as(
        "SELECT lr.id, lt.is_paid_leave FROM leave_requests lr \
         JOIN leave_types lt ON lt.id = lr.leave_type_id \
         WHERE lr.employee_id = ? AND lr.status = ? \
           AND lr.start_date <= ? AND lr.end_date >= ? \
         ORDER BY lr.id ASC LIMIT 1",
    )
    .bind(employee_id)
    .bind(RequestStatus::Approved)
    .bind(midnight)
    .bind(midnight)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(|(_, is_paid)| is_paid))
}

pub async fn is_holiday(conn: &mut SqliteConnection, day: NaiveDate) -> Result<bool, sqlx::Error> {
    // Dates are stored ISO (YYYY-MM-DD), so the month-day tail compares a
    // recurring holiday against any year.
    let month_day = format!("{:02}-{:02}", day.month(), day.day());
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM holidays \
         WHERE is_active = 1 \
           AND (holiday_date = ? OR (is_recurring = 1 AND substr(holiday_date, 6) = ?))",
    )
    .bind(day)
    .bind(month_day)
    .fetch_one(conn)
    .await?;
    Ok(count > 0)
}

async fn clock_pair_for_day(
    conn: &mut SqliteConnection,
    employee_id: i64,
    day: NaiveDate,
) -> Result<Option<(NaiveDateTime, Option<NaiveDateTime>)>, sqlx::Error> {
    let day_start = day.and_hms_opt(0, 0, 0).unwrap();
    let day_end = day_start + chrono::Duration::days(1);
    sqlx::query_as(
        "SELECT check_in_time, check_out_time FROM time_entries \
         WHERE employee_id = ? AND check_in_time >= ? AND check_in_time < ? \
         ORDER BY check_in_time ASC, id ASC LIMIT 1",
    )
    .bind(employee_id)
    .bind(day_start)
    .bind(day_end)
    .fetch_optional(conn)
    .await
}

/// Pure clocked-day computation: grace-adjusted late/early minutes, work
/// minutes net of break, absence-threshold collapse, weekday overtime past
/// the scheduled end.
pub fn classify_clocked(
    policy: &DayPolicy,
    day: NaiveDate,
    check_in: NaiveDateTime,
    check_out: Option<NaiveDateTime>,
) -> DayRecord {
    let sched_start = day.and_time(policy.start_time);
    let sched_end = day.and_time(policy.end_time);

    let ci = check_in;
    let co = check_out.unwrap_or(ci).max(ci);

    let raw_late = (ci - sched_start).num_minutes().max(0);
    let late_minutes = (raw_late - policy.late_grace_min).max(0);
    let raw_early = (sched_end - co).num_minutes().max(0);
    let early_leave_minutes = (raw_early - policy.early_leave_grace_min).max(0);
    let work_minutes = ((co - ci).num_minutes() - policy.break_minutes).max(0);

    if work_minutes < policy.absence_after_min {
        return DayRecord::absence(work_minutes);
    }

    let ot_weekday_minutes = (co - sched_end).num_minutes().max(0);

    DayRecord {
        status: if late_minutes > 0 {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Present
        },
        work_minutes,
        late_minutes,
        early_leave_minutes,
        is_paid_leave: true,
        ot_weekday_minutes,
        ot_holiday_minutes: 0,
    }
}

/// Classifies one employee-day. `None` means the day produces no snapshot
/// row: holiday, rest day, or no resolvable schedule.
pub async fn classify_day(
    conn: &mut SqliteConnection,
    defaults: &AttendanceDefaults,
    employee_id: i64,
    day: NaiveDate,
) -> Result<Option<DayRecord>, sqlx::Error> {
    if let Some(is_paid) = approved_leave_for_day(conn, employee_id, day).await? {
        return Ok(Some(DayRecord::leave(is_paid)));
    }

    if is_holiday(conn, day).await? {
        return Ok(None);
    }

    let policy = match schedule::resolve_policy(conn, defaults, employee_id, day).await? {
        Some(p) if p.is_working_day => p,
        _ => return Ok(None),
    };

    match clock_pair_for_day(conn, employee_id, day).await? {
        None => Ok(Some(DayRecord::absence(0))),
        Some((ci, co)) => Ok(Some(classify_clocked(&policy, day, ci, co))),
    }
}
