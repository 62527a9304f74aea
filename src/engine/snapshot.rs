//! Attendance Snapshot Store: rebuilds the materialized per-day records for
//! a date range and aggregates them into the metrics bundle consumed by
//! payroll formulas.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use utoipa::ToSchema;

use crate::config::AttendanceDefaults;
use crate::engine::{classify, overtime};
use crate::error::EngineError;
use crate::model::attendance::AttendanceStatus;

#[derive(Debug, Serialize, ToSchema)]
pub struct RebuildSummary {
    #[schema(example = "2025-06-01", value_type = String, format = "date")]
    pub start: NaiveDate,
    #[schema(example = "2025-06-30", value_type = String, format = "date")]
    pub end: NaiveDate,
    pub employees: i64,
    pub rows_inserted: i64,
}

/// Deletes and regenerates the snapshot for `[start, end]`, optionally
/// scoped to one employee. One transaction; running it twice over unchanged
/// sources yields identical rows. Concurrent rebuilds over overlapping
/// ranges are the caller's problem to serialize.
pub async fn rebuild_attendance_range(
    pool: &SqlitePool,
    defaults: &AttendanceDefaults,
    start: NaiveDate,
    end: NaiveDate,
    employee_id: Option<i64>,
) -> Result<RebuildSummary, EngineError> {
    let mut tx = pool.begin().await?;

    let employees: Vec<i64> = match employee_id {
        Some(id) => {
            let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM employees WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
            match found {
                Some((id,)) => vec![id],
                None => return Err(EngineError::NotFound("employee")),
            }
        }
        None => sqlx::query_scalar("SELECT id FROM employees ORDER BY id ASC")
            .fetch_all(&mut *tx)
            .await?,
    };

    match employee_id {
        Some(id) => {
            sqlx::query("DELETE FROM attendance_daily WHERE day >= ? AND day <= ? AND employee_id = ?")
                .bind(start)
                .bind(end)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        None => {
            sqlx::query("DELETE FROM attendance_daily WHERE day >= ? AND day <= ?")
                .bind(start)
                .bind(end)
                .execute(&mut *tx)
                .await?;
        }
    }

    let mut rows_inserted = 0i64;
    let mut day = start;
    while day <= end {
        for &emp in &employees {
            let rec = classify::classify_day(&mut tx, defaults, emp, day).await?;
            match rec {
                None => {
                    tracing::debug!(employee_id = emp, day = %day, "skip (holiday / no schedule / rest day)");
                }
                Some(rec) => {
                    tracing::debug!(
                        employee_id = emp,
                        day = %day,
                        status = %rec.status,
                        work = rec.work_minutes,
                        late = rec.late_minutes,
                        early = rec.early_leave_minutes,
                        "classified"
                    );
                    sqlx::query(
                        "INSERT INTO attendance_daily \
                         (employee_id, day, status_code, work_minutes, late_minutes, \
                          early_leave_minutes, is_paid_leave, ot_weekday_minutes, ot_holiday_minutes) \
                         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    )
                    .bind(emp)
                    .bind(day)
                    .bind(rec.status)
                    .bind(rec.work_minutes)
                    .bind(rec.late_minutes)
                    .bind(rec.early_leave_minutes)
                    .bind(rec.is_paid_leave)
                    .bind(rec.ot_weekday_minutes)
                    .bind(rec.ot_holiday_minutes)
                    .execute(&mut *tx)
                    .await?;
                    rows_inserted += 1;
                }
            }
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    tx.commit().await?;

    Ok(RebuildSummary {
        start,
        end,
        employees: employees.len() as i64,
        rows_inserted,
    })
}

/// Attendance aggregates plus the OT rate buckets for a period; the
/// variable source of every payroll formula.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct AttendanceMetrics {
    pub late_minutes: i64,
    pub early_leave_minutes: i64,
    pub absent_days: i64,
    pub unpaid_leave_days: i64,
    pub work_minutes: i64,
    /// 1.5x minutes under the legacy snapshot naming.
    pub ot_weekday_minutes: i64,
    /// 3x minutes under the legacy snapshot naming.
    pub ot_holiday_minutes: i64,
    pub ot1x_minutes: i64,
    pub ot15x_minutes: i64,
    pub ot3x_minutes: i64,
    pub ot_total_minutes: i64,
}

/// Metrics over `[start, end]`. Overtime prefers the snapshot sums; when
/// they are zero the approved overtime requests are bucketed directly.
pub async fn attendance_metrics_with(
    conn: &mut SqliteConnection,
    employee_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<AttendanceMetrics, EngineError> {
    let rows: Vec<(AttendanceStatus, i64, i64, i64, bool, i64, i64)> = sqlx::query_as(
        "SELECT status_code, work_minutes, late_minutes, early_leave_minutes, \
                is_paid_leave, ot_weekday_minutes, ot_holiday_minutes \
         FROM attendance_daily \
         WHERE employee_id = ? AND day >= ? AND day <= ? \
         ORDER BY day ASC",
    )
    .bind(employee_id)
    .bind(start)
    .bind(end)
    .fetch_all(&mut *conn)
    .await?;

    let mut m = AttendanceMetrics::default();
    for (status, work, late, early, is_paid, ot_wd, ot_hol) in rows {
        m.late_minutes += late;
        m.early_leave_minutes += early;
        m.work_minutes += work;
        m.ot_weekday_minutes += ot_wd;
        m.ot_holiday_minutes += ot_hol;
        match status {
            AttendanceStatus::Absence => m.absent_days += 1,
            AttendanceStatus::Leave if !is_paid => m.unpaid_leave_days += 1,
            _ => {}
        }
    }

    if m.ot_weekday_minutes + m.ot_holiday_minutes == 0 {
        let buckets = overtime::resolve_ot_buckets(conn, employee_id, start, end).await?;
        m.ot1x_minutes = buckets.ot1x_minutes;
        m.ot15x_minutes = buckets.ot15x_minutes;
        m.ot3x_minutes = buckets.ot3x_minutes;
        m.ot_weekday_minutes = buckets.ot15x_minutes;
        m.ot_holiday_minutes = buckets.ot3x_minutes;
        m.ot_total_minutes = buckets.total();
    } else {
        m.ot15x_minutes = m.ot_weekday_minutes;
        m.ot3x_minutes = m.ot_holiday_minutes;
        m.ot_total_minutes = m.ot_weekday_minutes + m.ot_holiday_minutes;
    }

    Ok(m)
}

pub async fn attendance_metrics(
    pool: &SqlitePool,
    employee_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<AttendanceMetrics, EngineError> {
    let mut tx = pool.begin().await?;
    let metrics = attendance_metrics_with(&mut tx, employee_id, start, end).await?;
    tx.commit().await?;
    Ok(metrics)
}
