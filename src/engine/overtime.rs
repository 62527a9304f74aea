//! OT Bucket Resolver: classifies approved overtime into the 1x / 1.5x / 3x
//! rate buckets, plus the overlap guard for overtime requests.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use sqlx::SqliteConnection;
use utoipa::ToSchema;

use crate::engine::schedule;
use crate::error::EngineError;
use crate::model::leave::RequestStatus;
use crate::model::overtime::OvertimeRequest;

/// Minutes per rate bucket over a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OtBuckets {
    pub ot1x_minutes: i64,
    pub ot15x_minutes: i64,
    pub ot3x_minutes: i64,
}

impl OtBuckets {
    pub fn total(&self) -> i64 {
        self.ot1x_minutes + self.ot15x_minutes + self.ot3x_minutes
    }
}

/// A type pays the holiday (3x) rate when explicitly flagged, when its
/// multiplier reaches 2.5, or when its name indicates a holiday rate.
pub fn is_holiday_rate(flag: bool, multiplier: f64, name: &str) -> bool {
    if flag || multiplier >= 2.5 {
        return true;
    }
    let name = name.to_lowercase();
    name.contains("holiday") || name.contains("x3") || name.contains(" 3") || name.trim().ends_with('3')
}

fn bucket_of(flag: bool, multiplier: f64, name: &str) -> Bucket {
    if is_holiday_rate(flag, multiplier, name) {
        Bucket::Holiday3x
    } else if multiplier >= 1.4 {
        Bucket::Weekday15x
    } else {
        Bucket::Plain1x
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Plain1x,
    Weekday15x,
    Holiday3x,
}

/// Fallback bucket resolution straight from approved overtime requests:
/// each request is clipped to the period, reduced by the start weekday's
/// break override, and filed under its type's bucket.
pub async fn resolve_ot_buckets(
    conn: &mut SqliteConnection,
    employee_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<OtBuckets, sqlx::Error> {
    let period_start = start.and_hms_opt(0, 0, 0).unwrap();
    let period_end = end.and_hms_opt(23, 59, 59).unwrap();

    let rows: Vec<(NaiveDateTime, NaiveDateTime, f64, bool, String)> = sqlx::query_as(
        "SELECT r.start_time, r.end_time, t.rate_multiplier, t.is_holiday_rate, t.name \
         FROM ot_requests r \
         JOIN ot_types t ON t.id = r.ot_type_id \
         WHERE r.employee_id = ? AND r.status = ? \
           AND r.start_time <= ? AND r.end_time >= ? \
         ORDER BY r.start_time ASC, r.id ASC",
    )
    .bind(employee_id)
    .bind(RequestStatus::Approved)
    .bind(period_end)
    .bind(period_start)
    .fetch_all(&mut *conn)
    .await?;

    let mut buckets = OtBuckets::default();
    for (req_start, req_end, multiplier, flag, name) in rows {
        let s = req_start.max(period_start);
        let e = req_end.min(period_end);
        if e <= s {
            continue;
        }
        let minutes = (e - s).num_minutes();
        let brk = schedule::break_override_minutes(conn, employee_id, s.date()).await?;
        let effective = (minutes - brk).max(0);

        match bucket_of(flag, multiplier, &name) {
            Bucket::Holiday3x => buckets.ot3x_minutes += effective,
            Bucket::Weekday15x => buckets.ot15x_minutes += effective,
            Bucket::Plain1x => buckets.ot1x_minutes += effective,
        }
    }

    Ok(buckets)
}

/// Pending/Approved overtime requests for one employee must not overlap.
pub async fn check_for_overlapping_ot(
    conn: &mut SqliteConnection,
    employee_id: i64,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    existing_request_id: Option<i64>,
) -> Result<(), EngineError> {
    let existing: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM ot_requests \
         WHERE employee_id = ? AND status IN (?, ?) \
           AND start_time < ? AND end_time > ? AND id != ? \
         ORDER BY id ASC LIMIT 1",
    )
    .bind(employee_id)
    .bind(RequestStatus::Pending)
    .bind(RequestStatus::Approved)
    .bind(end_time)
    .bind(start_time)
    .bind(existing_request_id.unwrap_or(0))
    .fetch_optional(conn)
    .await?;

    match existing {
        Some((id,)) => Err(EngineError::Overlap { id }),
        None => Ok(()),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewOvertimeRequest {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = 1)]
    pub ot_type_id: i64,
    #[schema(example = "2025-06-02T18:00:00", value_type = String, format = "date-time")]
    pub start_time: NaiveDateTime,
    #[schema(example = "2025-06-02T20:00:00", value_type = String, format = "date-time")]
    pub end_time: NaiveDateTime,
    pub reason: Option<String>,
}

pub async fn create_ot_request(
    pool: &sqlx::SqlitePool,
    req: NewOvertimeRequest,
) -> Result<OvertimeRequest, EngineError> {
    if req.start_time >= req.end_time {
        return Err(EngineError::Validation(
            "start_time must be before end_time".into(),
        ));
    }

    let mut tx = pool.begin().await?;

    check_for_overlapping_ot(&mut tx, req.employee_id, req.start_time, req.end_time, None)
        .await?;

    let now = chrono::Local::now().naive_local();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO ot_requests (employee_id, ot_type_id, start_time, end_time, reason, status, request_date) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(req.employee_id)
    .bind(req.ot_type_id)
    .bind(req.start_time)
    .bind(req.end_time)
    .bind(&req.reason)
    .bind(RequestStatus::Pending)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let created: OvertimeRequest = sqlx::query_as(
        "SELECT id, employee_id, ot_type_id, start_time, end_time, reason, status, request_date \
         FROM ot_requests WHERE id = ?",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(created)
}
