//! Leave Balance Ledger: per employee / leave type / year quantities with
//! the sufficiency invariant, plus the leave-request lifecycle operations
//! that move `used` up and down.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use utoipa::ToSchema;

use crate::config::{AttendanceDefaults, LedgerPolicy, YearAttribution};
use crate::error::EngineError;
use crate::model::employee::Employee;
use crate::model::leave::{LeaveBalance, LeaveRequest, LeaveType, RequestStatus};

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Day cost of a leave span: real minutes divided by the standard day.
/// A span rounding to zero minutes costs one standard day when the policy
/// says so.
pub fn days_between_std(
    policy: &LedgerPolicy,
    standard_day_minutes: i64,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> f64 {
    let mut minutes = (end - start).num_minutes().max(0);
    if minutes == 0 && policy.minimum_one_day {
        minutes = standard_day_minutes;
    }
    round4(minutes as f64 / standard_day_minutes as f64)
}

/// Splits a span's day cost across ledger years.
fn charge_years(
    policy: &LedgerPolicy,
    start: NaiveDateTime,
    days: f64,
) -> Vec<(i32, f64)> {
    match policy.year_attribution {
        YearAttribution::StartYear => vec![(start.year(), days)],
    }
}

/// Completed anniversaries of the hire date as of `as_of`.
pub fn years_of_service(hire_date: NaiveDate, as_of: NaiveDate) -> i64 {
    let mut years = i64::from(as_of.year() - hire_date.year());
    if (as_of.month(), as_of.day()) < (hire_date.month(), hire_date.day()) {
        years -= 1;
    }
    years.max(0)
}

const BALANCE_COLUMNS: &str =
    "id, employee_id, leave_type_id, year, opening, accrued, used, adjusted, carry_in";

const REQUEST_COLUMNS: &str =
    "id, employee_id, leave_type_id, start_date, end_date, reason, status, request_date";

async fn fetch_request(
    conn: &mut SqliteConnection,
    request_id: i64,
) -> Result<Option<LeaveRequest>, sqlx::Error> {
    let sql = format!("SELECT {REQUEST_COLUMNS} FROM leave_requests WHERE id = ?");
    sqlx::query_as(&sql).bind(request_id).fetch_optional(conn).await
}

async fn fetch_leave_type(
    conn: &mut SqliteConnection,
    leave_type_id: i64,
) -> Result<Option<LeaveType>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, name, description, annual_quota, affects_balance, is_paid_leave, \
                accrue_per_year, max_quota \
         FROM leave_types WHERE id = ?",
    )
    .bind(leave_type_id)
    .fetch_optional(conn)
    .await
}

/// Returns the ledger row, creating an all-zero one on first reference.
pub async fn get_or_create_leave_balance(
    conn: &mut SqliteConnection,
    employee_id: i64,
    leave_type_id: i64,
    year: i32,
) -> Result<(LeaveBalance, bool), sqlx::Error> {
    let sql = format!(
        "SELECT {BALANCE_COLUMNS} FROM leave_balances \
         WHERE employee_id = ? AND leave_type_id = ? AND year = ?"
    );
    if let Some(existing) = sqlx::query_as::<_, LeaveBalance>(&sql)
        .bind(employee_id)
        .bind(leave_type_id)
        .bind(year)
        .fetch_optional(&mut *conn)
        .await?
    {
        return Ok((existing, false));
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO leave_balances (employee_id, leave_type_id, year) \
         VALUES (?, ?, ?) RETURNING id",
    )
    .bind(employee_id)
    .bind(leave_type_id)
    .bind(year)
    .fetch_one(&mut *conn)
    .await?;

    let sql = format!("SELECT {BALANCE_COLUMNS} FROM leave_balances WHERE id = ?");
    let created = sqlx::query_as(&sql).bind(id).fetch_one(conn).await?;
    Ok((created, true))
}

/// Pending/Approved leave requests for one employee must not overlap.
pub async fn check_for_overlapping_leave(
    conn: &mut SqliteConnection,
    employee_id: i64,
    start_date: NaiveDateTime,
    end_date: NaiveDateTime,
    existing_request_id: Option<i64>,
) -> Result<(), EngineError> {
    let existing: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM leave_requests \
         WHERE employee_id = ? AND status IN (?, ?) \
           AND start_date < ? AND end_date > ? AND id != ? \
         ORDER BY id ASC LIMIT 1",
    )
    .bind(employee_id)
    .bind(RequestStatus::Pending)
    .bind(RequestStatus::Approved)
    .bind(end_date)
    .bind(start_date)
    .bind(existing_request_id.unwrap_or(0))
    .fetch_optional(conn)
    .await?;

    match existing {
        Some((id,)) => Err(EngineError::Overlap { id }),
        None => Ok(()),
    }
}

/// Checks `available >= needed` for every charged year, without writing.
/// Types that do not affect the balance always pass.
async fn ensure_sufficient(
    conn: &mut SqliteConnection,
    defaults: &AttendanceDefaults,
    policy: &LedgerPolicy,
    employee_id: i64,
    leave_type_id: i64,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<(), EngineError> {
    let affects = fetch_leave_type(&mut *conn, leave_type_id)
        .await?
        .map(|lt| lt.affects_balance)
        .unwrap_or(false);
    if !affects {
        return Ok(());
    }

    let days = days_between_std(policy, defaults.standard_daily_minutes, start, end);
    for (year, needed) in charge_years(policy, start, days) {
        let (lb, _) =
            get_or_create_leave_balance(&mut *conn, employee_id, leave_type_id, year).await?;
        let available = lb.available();
        if available < needed {
            return Err(EngineError::InsufficientBalance {
                year,
                needed,
                available,
            });
        }
    }
    Ok(())
}

/// Moves `used` by the span's day cost; `sign = -1` reverses an approval.
/// `used` never drops below zero.
async fn apply_usage(
    conn: &mut SqliteConnection,
    defaults: &AttendanceDefaults,
    policy: &LedgerPolicy,
    employee_id: i64,
    leave_type_id: i64,
    start: NaiveDateTime,
    end: NaiveDateTime,
    sign: i32,
) -> Result<(), EngineError> {
    let affects = fetch_leave_type(&mut *conn, leave_type_id)
        .await?
        .map(|lt| lt.affects_balance)
        .unwrap_or(false);
    if !affects {
        return Ok(());
    }

    let days = days_between_std(policy, defaults.standard_daily_minutes, start, end);
    for (year, d) in charge_years(policy, start, days) {
        let (lb, _) =
            get_or_create_leave_balance(&mut *conn, employee_id, leave_type_id, year).await?;
        let delta = if sign >= 0 { d } else { -d };
        sqlx::query("UPDATE leave_balances SET used = MAX(0, used + ?) WHERE id = ?")
            .bind(delta)
            .bind(lb.id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Approves a leave request after the sufficiency check, charging `used`.
/// Already-approved requests pass through unchanged.
pub async fn approve_leave_request(
    pool: &SqlitePool,
    defaults: &AttendanceDefaults,
    policy: &LedgerPolicy,
    request_id: i64,
) -> Result<LeaveRequest, EngineError> {
    let mut tx = pool.begin().await?;

    let req = fetch_request(&mut tx, request_id)
        .await?
        .ok_or(EngineError::NotFound("leave request"))?;
    if req.status == RequestStatus::Approved {
        return Ok(req);
    }

    ensure_sufficient(
        &mut tx,
        defaults,
        policy,
        req.employee_id,
        req.leave_type_id,
        req.start_date,
        req.end_date,
    )
    .await?;
    apply_usage(
        &mut tx,
        defaults,
        policy,
        req.employee_id,
        req.leave_type_id,
        req.start_date,
        req.end_date,
        1,
    )
    .await?;

    sqlx::query("UPDATE leave_requests SET status = ? WHERE id = ?")
        .bind(RequestStatus::Approved)
        .bind(request_id)
        .execute(&mut *tx)
        .await?;

    let updated = fetch_request(&mut tx, request_id)
        .await?
        .ok_or(EngineError::NotFound("leave request"))?;
    tx.commit().await?;
    Ok(updated)
}

/// Rejects a request; rejecting an approved one gives the usage back.
pub async fn reject_leave_request(
    pool: &SqlitePool,
    defaults: &AttendanceDefaults,
    policy: &LedgerPolicy,
    request_id: i64,
    reason: Option<String>,
) -> Result<LeaveRequest, EngineError> {
    let mut tx = pool.begin().await?;

    let req = fetch_request(&mut tx, request_id)
        .await?
        .ok_or(EngineError::NotFound("leave request"))?;

    if req.status == RequestStatus::Approved {
        apply_usage(
            &mut tx,
            defaults,
            policy,
            req.employee_id,
            req.leave_type_id,
            req.start_date,
            req.end_date,
            -1,
        )
        .await?;
    }

    match &reason {
        Some(reason) => {
            sqlx::query("UPDATE leave_requests SET status = ?, reason = ? WHERE id = ?")
                .bind(RequestStatus::Rejected)
                .bind(reason)
                .bind(request_id)
                .execute(&mut *tx)
                .await?;
        }
        None => {
            sqlx::query("UPDATE leave_requests SET status = ? WHERE id = ?")
                .bind(RequestStatus::Rejected)
                .bind(request_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    let updated = fetch_request(&mut tx, request_id)
        .await?
        .ok_or(EngineError::NotFound("leave request"))?;
    tx.commit().await?;
    Ok(updated)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewLeaveRequest {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = 1)]
    pub leave_type_id: i64,
    #[schema(example = "2025-06-02T00:00:00", value_type = String, format = "date-time")]
    pub start_date: NaiveDateTime,
    #[schema(example = "2025-06-03T00:00:00", value_type = String, format = "date-time")]
    pub end_date: NaiveDateTime,
    pub reason: Option<String>,
    /// Defaults to Pending; Approved is balance-checked and charged
    /// immediately.
    pub status: Option<RequestStatus>,
}

pub async fn create_leave_request(
    pool: &SqlitePool,
    defaults: &AttendanceDefaults,
    policy: &LedgerPolicy,
    req: NewLeaveRequest,
) -> Result<LeaveRequest, EngineError> {
    if req.start_date > req.end_date {
        return Err(EngineError::Validation(
            "start_date cannot be after end_date".into(),
        ));
    }
    let status = req.status.unwrap_or(RequestStatus::Pending);

    let mut tx = pool.begin().await?;

    check_for_overlapping_leave(&mut tx, req.employee_id, req.start_date, req.end_date, None)
        .await?;

    if status == RequestStatus::Approved {
        ensure_sufficient(
            &mut tx,
            defaults,
            policy,
            req.employee_id,
            req.leave_type_id,
            req.start_date,
            req.end_date,
        )
        .await?;
    }

    let now = chrono::Local::now().naive_local();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO leave_requests \
         (employee_id, leave_type_id, start_date, end_date, reason, status, request_date) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(req.employee_id)
    .bind(req.leave_type_id)
    .bind(req.start_date)
    .bind(req.end_date)
    .bind(&req.reason)
    .bind(status)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    if status == RequestStatus::Approved {
        apply_usage(
            &mut tx,
            defaults,
            policy,
            req.employee_id,
            req.leave_type_id,
            req.start_date,
            req.end_date,
            1,
        )
        .await?;
    }

    let created = fetch_request(&mut tx, id)
        .await?
        .ok_or(EngineError::NotFound("leave request"))?;
    tx.commit().await?;
    Ok(created)
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateLeaveRequest {
    pub employee_id: Option<i64>,
    pub leave_type_id: Option<i64>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub start_date: Option<NaiveDateTime>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub end_date: Option<NaiveDateTime>,
    pub reason: Option<String>,
    pub status: Option<RequestStatus>,
}

/// Edits a request. Status transitions move `used` in step; editing the
/// dates, type or employee of an approved request reverses the old usage,
/// re-checks sufficiency and reapplies — atomically, in one transaction.
pub async fn update_leave_request(
    pool: &SqlitePool,
    defaults: &AttendanceDefaults,
    policy: &LedgerPolicy,
    request_id: i64,
    patch: UpdateLeaveRequest,
) -> Result<LeaveRequest, EngineError> {
    let mut tx = pool.begin().await?;

    let old = fetch_request(&mut tx, request_id)
        .await?
        .ok_or(EngineError::NotFound("leave request"))?;

    let new_employee = patch.employee_id.unwrap_or(old.employee_id);
    let new_type = patch.leave_type_id.unwrap_or(old.leave_type_id);
    let new_start = patch.start_date.unwrap_or(old.start_date);
    let new_end = patch.end_date.unwrap_or(old.end_date);
    let new_status = patch.status.unwrap_or(old.status);
    let new_reason = patch.reason.or_else(|| old.reason.clone());

    if new_start > new_end {
        return Err(EngineError::Validation(
            "start_date cannot be after end_date".into(),
        ));
    }

    check_for_overlapping_leave(&mut tx, new_employee, new_start, new_end, Some(request_id))
        .await?;

    let was_approved = old.status == RequestStatus::Approved;
    let is_approved = new_status == RequestStatus::Approved;
    let span_changed = (old.employee_id, old.leave_type_id, old.start_date, old.end_date)
        != (new_employee, new_type, new_start, new_end);

    if was_approved && (!is_approved || span_changed) {
        apply_usage(
            &mut tx,
            defaults,
            policy,
            old.employee_id,
            old.leave_type_id,
            old.start_date,
            old.end_date,
            -1,
        )
        .await?;
    }
    if is_approved && (!was_approved || span_changed) {
        ensure_sufficient(
            &mut tx, defaults, policy, new_employee, new_type, new_start, new_end,
        )
        .await?;
        apply_usage(
            &mut tx, defaults, policy, new_employee, new_type, new_start, new_end, 1,
        )
        .await?;
    }

    sqlx::query(
        "UPDATE leave_requests \
         SET employee_id = ?, leave_type_id = ?, start_date = ?, end_date = ?, \
             reason = ?, status = ? \
         WHERE id = ?",
    )
    .bind(new_employee)
    .bind(new_type)
    .bind(new_start)
    .bind(new_end)
    .bind(&new_reason)
    .bind(new_status)
    .bind(request_id)
    .execute(&mut *tx)
    .await?;

    let updated = fetch_request(&mut tx, request_id)
        .await?
        .ok_or(EngineError::NotFound("leave request"))?;
    tx.commit().await?;
    Ok(updated)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SeedSummary {
    pub year: i32,
    pub created: i64,
    pub seeded: i64,
}

/// Seeds the opening quota for every employee and balance-affecting leave
/// type: `opening = min(annual_quota + years_of_service * accrue_per_year,
/// max_quota when positive)`.
pub async fn seed_leave_balances(
    pool: &SqlitePool,
    year: i32,
) -> Result<SeedSummary, EngineError> {
    let mut tx = pool.begin().await?;

    let employees: Vec<Employee> = sqlx::query_as(
        "SELECT id, employee_code, first_name, last_name, email, hire_date, status \
         FROM employees ORDER BY id ASC",
    )
    .fetch_all(&mut *tx)
    .await?;
    let leave_types: Vec<(i64, f64, f64, f64)> = sqlx::query_as(
        "SELECT id, annual_quota, accrue_per_year, max_quota \
         FROM leave_types WHERE affects_balance = 1 ORDER BY id ASC",
    )
    .fetch_all(&mut *tx)
    .await?;

    let as_of = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| EngineError::Validation(format!("invalid year {year}")))?;

    let mut created = 0i64;
    let mut seeded = 0i64;
    for emp in &employees {
        let years = emp
            .hire_date
            .map(|hd| years_of_service(hd, as_of))
            .unwrap_or(0);
        for &(leave_type_id, base, accrue, cap) in &leave_types {
            let (lb, is_new) =
                get_or_create_leave_balance(&mut tx, emp.id, leave_type_id, year).await?;

            let mut opening = base + years as f64 * accrue;
            if cap > 0.0 {
                opening = opening.min(cap);
            }
            opening = opening.max(0.0);

            sqlx::query("UPDATE leave_balances SET opening = ? WHERE id = ?")
                .bind(opening)
                .bind(lb.id)
                .execute(&mut *tx)
                .await?;

            if is_new {
                created += 1;
            }
            seeded += 1;
        }
    }

    tx.commit().await?;
    Ok(SeedSummary {
        year,
        created,
        seeded,
    })
}

/// Administrative correction, signed.
pub async fn adjust_leave_balance(
    pool: &SqlitePool,
    employee_id: i64,
    leave_type_id: i64,
    year: i32,
    delta: f64,
) -> Result<LeaveBalance, EngineError> {
    let mut tx = pool.begin().await?;

    let (lb, _) = get_or_create_leave_balance(&mut tx, employee_id, leave_type_id, year).await?;
    sqlx::query("UPDATE leave_balances SET adjusted = adjusted + ? WHERE id = ?")
        .bind(delta)
        .bind(lb.id)
        .execute(&mut *tx)
        .await?;

    let sql = format!("SELECT {BALANCE_COLUMNS} FROM leave_balances WHERE id = ?");
    let updated: LeaveBalance = sqlx::query_as(&sql).bind(lb.id).fetch_one(&mut *tx).await?;
    tx.commit().await?;
    Ok(updated)
}

/// Ledger row joined with its type name, availability precomputed.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct LeaveBalanceView {
    pub id: i64,
    pub employee_id: i64,
    pub leave_type_id: i64,
    pub leave_type_name: String,
    pub year: i32,
    pub opening: f64,
    pub accrued: f64,
    pub used: f64,
    pub adjusted: f64,
    pub carry_in: f64,
    pub available: f64,
}

pub async fn list_leave_balances(
    pool: &SqlitePool,
    employee_id: i64,
    year: i32,
) -> Result<Vec<LeaveBalanceView>, EngineError> {
    let rows = sqlx::query_as(
        "SELECT lb.id, lb.employee_id, lb.leave_type_id, lt.name AS leave_type_name, \
                lb.year, lb.opening, lb.accrued, lb.used, lb.adjusted, lb.carry_in, \
                lb.opening + lb.accrued + lb.carry_in + lb.adjusted - lb.used AS available \
         FROM leave_balances lb \
         JOIN leave_types lt ON lt.id = lb.leave_type_id \
         WHERE lb.employee_id = ? AND lb.year = ? \
         ORDER BY lt.name ASC",
    )
    .bind(employee_id)
    .bind(year)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
